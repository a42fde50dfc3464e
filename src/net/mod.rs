//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerOptions
//!     → pre-bound std listener? → listener.rs adopt()
//!     → otherwise bind address  → listener.rs bind()
//!     → Tokio TcpListener handed to the engine
//! ```
//!
//! # Design Decisions
//! - Binding happens only after the initializer succeeded
//! - The engine owns the listener and drops it when it stops accepting

pub mod listener;
