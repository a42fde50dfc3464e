//! Configuration schema definitions.
//!
//! This module defines the configuration contract consumed by the managed
//! server and the settings passed through to the engine. All types derive
//! Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration contract for a managed server.
///
/// Any configuration source (a file-backed struct, an environment loader, a
/// larger application config) can drive the server by exposing its bind
/// address.
pub trait ServerConfig {
    /// Address to bind, as `host:port` or `:port`.
    fn bind_address(&self) -> &str;
}

/// Default file-backed implementation of [`ServerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Bind address (e.g., "0.0.0.0:8080" or ":8080").
    pub bind_address: String,

    /// Display name reported by the managed server.
    pub name: Option<String>,

    /// Application name handed to the engine.
    pub app_name: Option<String>,

    /// Engine settings.
    pub engine: EngineSettings,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            bind_address: ":8080".to_string(),
            name: None,
            app_name: None,
            engine: EngineSettings::default(),
        }
    }
}

impl ServerConfig for PlatformConfig {
    fn bind_address(&self) -> &str {
        &self.bind_address
    }
}

/// Settings applied when the engine is constructed.
///
/// Zero disables a timeout or limit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Application name. Overridden by the server options at listen time.
    pub app_name: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,

    /// Emit a `server` response header carrying the application name.
    pub server_header: bool,

    /// Grace period for in-flight connections on shutdown, in milliseconds.
    /// Zero waits for every connection to finish.
    pub shutdown_grace_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            request_timeout_secs: 30,
            body_limit_bytes: 4 * 1024 * 1024,
            server_header: false,
            shutdown_grace_ms: 0,
        }
    }
}

impl EngineSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn body_limit(&self) -> Option<usize> {
        (self.body_limit_bytes > 0).then_some(self.body_limit_bytes)
    }

    pub fn shutdown_grace(&self) -> Option<Duration> {
        (self.shutdown_grace_ms > 0).then(|| Duration::from_millis(self.shutdown_grace_ms))
    }
}
