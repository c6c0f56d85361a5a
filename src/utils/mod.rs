pub mod format_utils;
pub mod hash_utils;
pub mod path_utils;
