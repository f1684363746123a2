//! Shared service plumbing for the cascade alerting stack
//!
//! Provides the pieces every service needs, independent of domain:
//! - standard API response envelopes (`api_types`)
//! - tracing-based logging initialization (`logging`)
//! - serde default helpers (`serde_helpers`)
//! - graceful shutdown signal handling (`shutdown`)

pub mod api_types;
pub mod logging;
pub mod serde_helpers;
pub mod shutdown;

pub use api_types::{ErrorInfo, ErrorResponse, ServiceStatus, SuccessResponse};
#[cfg(feature = "axum")]
pub use api_types::AppError;
pub use shutdown::wait_for_shutdown;

/// Default host services bind to when nothing else is configured
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
