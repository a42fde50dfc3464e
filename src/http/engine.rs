//! Engine handle passed to initialization hooks.
//!
//! # Responsibilities
//! - Collect routes and middleware registered by the embedding application
//! - Apply the engine settings as tower-http layers once registration is done
//!
//! # Design Decisions
//! - Layers from settings wrap every registered route, so they are applied
//!   after the initializer returns
//! - Tracing is the outermost layer so timeouts and limits are logged too

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{header, HeaderValue},
    routing::MethodRouter,
    Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EngineSettings;

/// Mutable handle to the engine under construction.
pub struct Engine {
    router: Router,
    settings: EngineSettings,
}

impl Engine {
    pub(crate) fn new(settings: EngineSettings) -> Self {
        Self {
            router: Router::new(),
            settings,
        }
    }

    /// Settings the engine was constructed with.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn app_name(&self) -> &str {
        &self.settings.app_name
    }

    /// Register a route.
    pub fn route(&mut self, path: &str, method_router: MethodRouter) -> &mut Self {
        self.map(|router| router.route(path, method_router))
    }

    /// Merge routes from another router.
    pub fn merge(&mut self, other: Router) -> &mut Self {
        self.map(|router| router.merge(other))
    }

    /// Handler for requests that match no route.
    pub fn fallback<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.map(|router| router.fallback(handler))
    }

    /// Transform the underlying router, e.g. to add middleware layers.
    pub fn map(&mut self, f: impl FnOnce(Router) -> Router) -> &mut Self {
        let router = std::mem::take(&mut self.router);
        self.router = f(router);
        self
    }

    /// Finish construction, wrapping all routes in the configured layers.
    #[allow(deprecated)]
    pub(crate) fn into_router(self) -> Router {
        let Engine {
            mut router,
            settings,
        } = self;

        if let Some(limit) = settings.body_limit() {
            router = router
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(limit));
        }

        if let Some(timeout) = settings.request_timeout() {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        if settings.server_header {
            match HeaderValue::from_str(&settings.app_name) {
                Ok(value) => {
                    router = router.layer(SetResponseHeaderLayer::if_not_present(
                        header::SERVER,
                        value,
                    ));
                }
                Err(_) => tracing::warn!(
                    app_name = %settings.app_name,
                    "App name is not a valid header value, server header disabled"
                ),
            }
        }

        router.layer(TraceLayer::new_for_http())
    }
}
