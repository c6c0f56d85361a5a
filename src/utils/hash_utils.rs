pub struct MurMurHasher;

impl MurMurHasher {
    /// Stable non-negative 64-bit id derived from a string, used where the
    /// media source has no numeric ids of its own.
    pub fn hash_str_to_id(str: &str) -> i64 {
        MurMurHasher::hash_bytes_to_id(str.as_bytes())
    }

    pub fn hash_bytes_to_id(bytes: &[u8]) -> i64 {
        let hash = fastmurmur3::murmur3_x64_128(bytes, 0);
        (hash as u64 & i64::MAX as u64) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = MurMurHasher::hash_str_to_id("/DCIM/a/IMG1.jpg");
        let b = MurMurHasher::hash_bytes_to_id(b"/DCIM/a/IMG1.jpg");
        assert_eq!(a, b);
        assert!(a >= 0);
    }

    #[test]
    fn test_hash_differs_per_path() {
        assert_ne!(MurMurHasher::hash_str_to_id("/DCIM/a/IMG1.jpg"), MurMurHasher::hash_str_to_id("/DCIM/a/IMG2.jpg"));
    }
}
