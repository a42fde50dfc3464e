//! HTTP engine subsystem.
//!
//! # Data Flow
//! ```text
//! ManagedServer::listen
//!     → engine.rs (Engine from merged settings)
//!     → initializer registers routes/middleware on &mut Engine
//!     → engine.rs (settings applied as tower-http layers)
//!     → serve.rs (accept loop, hyper-util connections, drain/abort)
//! ```

pub mod engine;
pub mod readiness;
mod serve;
pub mod server;

pub use engine::Engine;
pub use readiness::ReadinessCheck;
pub use server::{Initializer, ManagedServer};
