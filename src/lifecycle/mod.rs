//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! listen():
//!     Created → Starting (initializer, bind) → Listening (ready) → Closed
//!
//! close():
//!     Listening → Closing → engine drains → Closed → close() returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → caller invokes close()
//! ```
//!
//! # Design Decisions
//! - Ordered startup: initializer first, then bind, then ready
//! - Ordered shutdown: stop accept, drain, close
//! - No restart after Closed

pub mod service;
pub mod signals;
pub mod state;

pub use service::ManagedService;
pub use signals::shutdown_signal;
pub use state::{Exit, Lifecycle, Phase};
