//! Common utilities and types shared across the application.

pub mod cache;
pub mod error;
pub mod text;

pub use cache::TtlCache;
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult};
