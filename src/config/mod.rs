pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod file;
pub mod types;

pub use config::Config;
pub use file::{ConfigError, FileConfig};
pub use types::LogLevel;
