//! HTTP middleware components.

pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security_headers;
pub mod trace_id;

pub use cors::build_cors_layer;
pub use rate_limit::RateLimiterState;
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
