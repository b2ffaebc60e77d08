pub mod config;
pub mod error;
pub mod queue;
pub mod shutdown;
pub mod types;
