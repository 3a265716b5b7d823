//! HTTP middleware for LMS Core
//!
//! - Request id propagation and Prometheus metrics (`ObservabilityLayer`)
//! - Request spans with sensitive query values redacted (`SanitizedMakeSpan`)

pub mod metrics;
pub mod trace;

pub use metrics::ObservabilityLayer;
pub use trace::SanitizedMakeSpan;
