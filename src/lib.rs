//! Managed lifecycle for axum HTTP servers.
//!
//! A [`ManagedServer`] wraps an axum engine so a host process can start,
//! stop and check it like any other [`ManagedService`].

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{EngineSettings, PlatformConfig, ServerConfig, ServerOptions};
pub use error::{BoxError, ServerError};
pub use http::{Engine, ManagedServer, ReadinessCheck};
pub use lifecycle::ManagedService;
