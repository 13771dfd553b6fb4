//! SpaceChat Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other SpaceChat crates:
//! - Application configuration (storage, logging, notification defaults)
//! - Global error type covering all error categories
//! - Structured logging with tracing
//! - Platform data/config directory resolution
//! - Common constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{ScError, ScResult};
pub use logging::init_logging;
pub use platform::Platform;
