//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle transitions (listen, close, failures)
//!     → tracing events with server name and address
//! HTTP requests
//!     → tower_http TraceLayer spans
//! Both
//!     → logging.rs subscriber (stdout)
//! ```

pub mod logging;
