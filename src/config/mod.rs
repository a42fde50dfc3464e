//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PlatformConfig (validated)
//!     → options.rs (ServerOptions, merged with builder calls)
//!     → ManagedServer
//!
//! Any other source implementing ServerConfig
//!     → ServerOptions::with_config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Engine settings are passed through untouched except for the app name

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use options::ServerOptions;
pub use schema::{EngineSettings, PlatformConfig, ServerConfig};
pub use validation::ValidationError;
