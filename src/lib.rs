pub mod api;
pub mod config;
pub mod display;
pub mod encode;
pub mod error;
pub mod sequence;
pub mod shutdown;
pub mod spool;
pub mod store;
pub mod watcher;

pub use error::{Result, SpoolError};
