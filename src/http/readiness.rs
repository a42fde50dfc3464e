//! Readiness endpoint backed by a server's own readiness flag.
//!
//! The route is registered inside the initializer, before the server it
//! reports on exists, so the server is attached afterwards.

use std::sync::{Arc, OnceLock, Weak};

use axum::{
    http::StatusCode,
    routing::{get, MethodRouter},
};

use crate::error::ServerError;
use crate::http::server::ManagedServer;

/// Late-bound handle to a server's readiness.
#[derive(Clone, Default)]
pub struct ReadinessCheck {
    server: Arc<OnceLock<Weak<ManagedServer>>>,
}

impl ReadinessCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the check at `server`. Only the first call has an effect.
    pub fn attach(&self, server: &Arc<ManagedServer>) {
        let _ = self.server.set(Arc::downgrade(server));
    }

    /// The attached server's readiness; not ready when detached or dropped.
    pub fn check(&self) -> Result<(), ServerError> {
        match self.server.get().and_then(Weak::upgrade) {
            Some(server) => server.is_ready(),
            None => Err(ServerError::NotReady),
        }
    }

    /// `GET` route answering 200 when ready and 503 otherwise.
    pub fn route(&self) -> MethodRouter {
        let check = self.clone();
        get(move || async move {
            match check.check() {
                Ok(()) => (StatusCode::OK, "ready"),
                Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerOptions;
    use crate::http::Engine;
    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt;

    #[test]
    fn detached_check_is_not_ready() {
        assert!(ReadinessCheck::new().check().unwrap_err().is_not_ready());
    }

    #[test]
    fn dropped_server_is_not_ready() {
        let readiness = ReadinessCheck::new();
        let server = Arc::new(ManagedServer::new(
            |_engine: &mut Engine| Ok(()),
            ServerOptions::new(),
        ));
        readiness.attach(&server);
        drop(server);
        assert!(readiness.check().is_err());
    }

    #[tokio::test]
    async fn route_reports_unavailable_before_listen() {
        let readiness = ReadinessCheck::new();
        let server = Arc::new(ManagedServer::new(
            |_engine: &mut Engine| Ok(()),
            ServerOptions::new(),
        ));
        readiness.attach(&server);

        let res = Router::new()
            .route("/healthz", readiness.route())
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
