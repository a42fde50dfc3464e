//! Builder-style options for a managed server.

use std::net::TcpListener;

use crate::config::schema::{EngineSettings, PlatformConfig, ServerConfig};

pub const DEFAULT_NAME: &str = "HTTP Server";
pub const DEFAULT_APP_NAME: &str = "http-server";
pub const DEFAULT_BIND_ADDRESS: &str = ":8080";

/// Options applied to a [`ManagedServer`](crate::ManagedServer) at construction.
#[derive(Debug)]
pub struct ServerOptions {
    pub(crate) name: String,
    pub(crate) app_name: String,
    pub(crate) bind_address: String,
    pub(crate) listener: Option<TcpListener>,
    pub(crate) engine: EngineSettings,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            listener: None,
            engine: EngineSettings::default(),
        }
    }
}

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve on an already bound listener instead of binding the bind address.
    ///
    /// The server takes ownership and closes it on shutdown.
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.bind_address = bind_address.into();
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the display name. Also becomes the app name if none is set.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        if self.app_name.is_empty() {
            self.app_name = self.name.clone();
        }
        self
    }

    /// Take the bind address from any configuration source.
    pub fn with_config(self, config: &dyn ServerConfig) -> Self {
        self.with_bind_address(config.bind_address())
    }

    /// Replace the engine settings wholesale.
    pub fn with_engine_settings(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn engine_settings(&self) -> &EngineSettings {
        &self.engine
    }

    /// Engine settings with the options' app name applied on top.
    pub(crate) fn merged_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            app_name: self.app_name.clone(),
            ..self.engine.clone()
        }
    }
}

impl From<PlatformConfig> for ServerOptions {
    fn from(config: PlatformConfig) -> Self {
        let mut options = ServerOptions::new().with_config(&config);

        if !config.engine.app_name.is_empty() {
            options = options.with_app_name(config.engine.app_name.clone());
        }
        if let Some(app_name) = config.app_name {
            options = options.with_app_name(app_name);
        }
        if let Some(name) = config.name {
            options = options.with_name(name);
        }

        options.with_engine_settings(config.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ServerOptions::default();
        assert_eq!(options.name(), DEFAULT_NAME);
        assert_eq!(options.app_name(), DEFAULT_APP_NAME);
        assert_eq!(options.bind_address(), DEFAULT_BIND_ADDRESS);
        assert!(options.listener.is_none());
    }

    #[test]
    fn with_name_keeps_explicit_app_name() {
        let options = ServerOptions::new().with_name("want name");
        assert_eq!(options.name(), "want name");
        assert_eq!(options.app_name(), DEFAULT_APP_NAME);
    }

    #[test]
    fn with_name_fills_empty_app_name() {
        let options = ServerOptions::new().with_app_name("").with_name("billing");
        assert_eq!(options.app_name(), "billing");
    }

    #[test]
    fn with_config_takes_bind_address() {
        let config = PlatformConfig {
            bind_address: ":18080".into(),
            ..Default::default()
        };
        let options = ServerOptions::new().with_config(&config);
        assert_eq!(options.bind_address(), ":18080");
    }

    #[test]
    fn merged_settings_use_options_app_name() {
        let engine = EngineSettings {
            app_name: "ignored".into(),
            request_timeout_secs: 3,
            ..Default::default()
        };
        let merged = ServerOptions::new()
            .with_app_name("reports")
            .with_engine_settings(engine)
            .merged_engine_settings();
        assert_eq!(merged.app_name, "reports");
        assert_eq!(merged.request_timeout_secs, 3);
    }

    #[test]
    fn platform_config_converts() {
        let mut config = PlatformConfig {
            bind_address: "127.0.0.1:7000".into(),
            name: Some("Reports".into()),
            ..Default::default()
        };
        config.engine.server_header = true;

        let options = ServerOptions::from(config);
        assert_eq!(options.bind_address(), "127.0.0.1:7000");
        assert_eq!(options.name(), "Reports");
        assert_eq!(options.app_name(), DEFAULT_APP_NAME);
        assert!(options.engine_settings().server_header);
    }
}
