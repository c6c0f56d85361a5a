pub mod aggregator;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod entities;
pub mod error;
pub mod index;
pub mod logging;
pub mod utils;
