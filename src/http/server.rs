//! Managed HTTP server.
//!
//! # Responsibilities
//! - Build the engine from merged settings
//! - Run the initializer before any socket is opened
//! - Resolve the listener and serve until closed
//! - Report readiness to health checks
//!
//! # Design Decisions
//! - `listen` blocks the calling task for the lifetime of the server; run it
//!   on its own task and call `close` from elsewhere
//! - `close` returns only after the serving loop has exited, the listener is
//!   dropped and every connection is finished or aborted
//! - Startup failures are never retried here

use std::net::SocketAddr;
use std::sync::{Mutex, OnceLock, PoisonError};

use async_trait::async_trait;

use crate::config::validation::validate_bind_address;
use crate::config::{ConfigError, ServerOptions};
use crate::error::{BoxError, ServerError};
use crate::http::engine::Engine;
use crate::http::serve;
use crate::lifecycle::{Exit, Lifecycle, ManagedService, Phase};
use crate::net::listener;

/// Hook that registers routes and middleware on the engine.
pub type Initializer = Box<dyn Fn(&mut Engine) -> Result<(), BoxError> + Send + Sync>;

/// An axum server with a managed lifecycle.
pub struct ManagedServer {
    options: ServerOptions,
    initializer: Initializer,
    prebound: Mutex<Option<std::net::TcpListener>>,
    lifecycle: Lifecycle,
    local_addr: OnceLock<SocketAddr>,
}

impl ManagedServer {
    /// Create a server. Nothing is bound until [`listen`](Self::listen).
    pub fn new<F>(initializer: F, mut options: ServerOptions) -> Self
    where
        F: Fn(&mut Engine) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let prebound = options.listener.take();
        Self {
            options,
            initializer: Box::new(initializer),
            prebound: Mutex::new(prebound),
            lifecycle: Lifecycle::new(),
            local_addr: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Address the server is bound to, once it has started serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Build the engine, bind, and serve until [`close`](Self::close) is called.
    ///
    /// An initializer error is returned unchanged and nothing is bound. A
    /// failed start leaves the server startable again.
    pub async fn listen(&self) -> Result<(), ServerError> {
        let mut guard = self.lifecycle.start()?;

        let prebound = self.take_prebound_for_start()?;
        if prebound.is_none() {
            validate_bind_address(&self.options.bind_address).map_err(ConfigError::from)?;
        }

        let settings = self.options.merged_engine_settings();
        let grace = settings.shutdown_grace();
        let mut engine = Engine::new(settings);

        if let Err(e) = (self.initializer)(&mut engine) {
            tracing::warn!(server = %self.name(), error = %e, "Initializer failed");
            if let Some(prebound) = prebound {
                self.restore_prebound(prebound);
            }
            return Err(ServerError::Initializer(e));
        }
        let router = engine.into_router();

        let tcp = match prebound {
            Some(prebound) => listener::adopt(prebound)?,
            None => listener::bind(&self.options.bind_address).await?,
        };
        let local_addr = tcp.local_addr().map_err(ServerError::Listener)?;

        guard.serving()?;
        let _ = self.local_addr.set(local_addr);

        tracing::info!(
            server = %self.name(),
            app_name = %self.options.app_name,
            address = %local_addr,
            "Server listening"
        );

        match serve::serve(tcp, router, &self.lifecycle, grace).await {
            Ok(exit) => {
                guard.finish(exit);
                tracing::info!(server = %self.name(), ?exit, "Server stopped");
                Ok(())
            }
            Err(e) => {
                guard.finish(Exit::Failed);
                tracing::error!(server = %self.name(), error = %e, "Server terminated");
                Err(ServerError::Serve(e))
            }
        }
    }

    /// Request graceful shutdown and wait for the serving loop to exit.
    ///
    /// Safe to call before `listen`, concurrently with it, and repeatedly.
    pub async fn close(&self) -> Result<(), ServerError> {
        let previous = self.lifecycle.request_close();

        // An unused pre-bound listener is owned by us and closed here.
        drop(self.take_prebound());

        match previous {
            Phase::Created | Phase::Closed(_) => return Ok(()),
            Phase::Starting | Phase::Listening | Phase::Closing => {}
        }

        tracing::info!(server = %self.name(), "Shutdown requested");

        match self.lifecycle.wait_closed().await {
            Exit::Forced => Err(ServerError::ShutdownTimeout(
                self.options.engine.shutdown_grace().unwrap_or_default(),
            )),
            Exit::Graceful | Exit::Failed => Ok(()),
        }
    }

    /// `Ok` while serving, [`ServerError::NotReady`] otherwise.
    pub fn is_ready(&self) -> Result<(), ServerError> {
        if self.lifecycle.is_ready() {
            Ok(())
        } else {
            Err(ServerError::NotReady)
        }
    }

    /// Take the pre-bound listener for this start attempt.
    ///
    /// Checked under the slot lock so a concurrent `close` either sees the
    /// listener still in the slot or makes this fail with `Closed`.
    fn take_prebound_for_start(&self) -> Result<Option<std::net::TcpListener>, ServerError> {
        let mut slot = self.prebound.lock().unwrap_or_else(PoisonError::into_inner);
        if self.lifecycle.phase() != Phase::Starting {
            return Err(ServerError::Closed);
        }
        Ok(slot.take())
    }

    /// Put the listener back after a failed start, unless `close` came in.
    fn restore_prebound(&self, listener: std::net::TcpListener) {
        let mut slot = self.prebound.lock().unwrap_or_else(PoisonError::into_inner);
        if self.lifecycle.phase() == Phase::Starting {
            *slot = Some(listener);
        }
    }

    fn take_prebound(&self) -> Option<std::net::TcpListener> {
        self.prebound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl ManagedService for ManagedServer {
    fn name(&self) -> &str {
        ManagedServer::name(self)
    }

    async fn listen(&self) -> Result<(), ServerError> {
        ManagedServer::listen(self).await
    }

    async fn close(&self) -> Result<(), ServerError> {
        ManagedServer::close(self).await
    }

    async fn is_ready(&self) -> Result<(), ServerError> {
        ManagedServer::is_ready(self)
    }
}

impl std::fmt::Debug for ManagedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedServer")
            .field("name", &self.options.name)
            .field("bind_address", &self.options.bind_address)
            .field("phase", &self.lifecycle.phase())
            .field("local_addr", &self.local_addr.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::DEFAULT_NAME;

    fn noop() -> impl Fn(&mut Engine) -> Result<(), BoxError> + Send + Sync + 'static {
        |_engine: &mut Engine| Ok(())
    }

    #[test]
    fn name_defaults_and_overrides() {
        let server = ManagedServer::new(noop(), ServerOptions::new());
        assert_eq!(server.name(), DEFAULT_NAME);

        let server = ManagedServer::new(noop(), ServerOptions::new().with_name("want name"));
        assert_eq!(server.name(), "want name");
    }

    #[test]
    fn not_ready_before_listen() {
        let server = ManagedServer::new(noop(), ServerOptions::new());
        assert!(server.is_ready().unwrap_err().is_not_ready());
        assert_eq!(server.local_addr(), None);
        assert_eq!(server.phase(), Phase::Created);
    }

    #[tokio::test]
    async fn invalid_bind_address_fails_before_initializer() {
        let server = ManagedServer::new(
            |_engine: &mut Engine| -> Result<(), BoxError> { panic!("initializer must not run") },
            ServerOptions::new().with_bind_address("no-port"),
        );

        let err = server.listen().await.unwrap_err();
        assert!(matches!(err, ServerError::Config(ConfigError::Validation(_))));
        assert_eq!(server.phase(), Phase::Created);
    }

    #[tokio::test]
    async fn close_before_listen_is_terminal() {
        let server = ManagedServer::new(noop(), ServerOptions::new().with_bind_address("127.0.0.1:0"));

        server.close().await.unwrap();
        server.close().await.unwrap();

        assert!(matches!(server.listen().await, Err(ServerError::Closed)));
        assert!(server.is_ready().is_err());
    }

    #[tokio::test]
    async fn close_drops_unused_prebound_listener() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        let server = ManagedServer::new(noop(), ServerOptions::new().with_listener(std_listener));

        server.close().await.unwrap();

        // the port is free again once the listener was dropped
        std::net::TcpListener::bind(addr).unwrap();
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let server: Box<dyn ManagedService> =
            Box::new(ManagedServer::new(noop(), ServerOptions::new().with_name("svc")));
        assert_eq!(server.name(), "svc");
        assert!(server.is_ready().await.is_err());
        server.close().await.unwrap();
    }
}
