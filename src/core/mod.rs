pub mod config;
pub mod error;
pub mod types;

pub use config::{ChoresConfig, ConfigLoader, ConfigValidator};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use types::*;
