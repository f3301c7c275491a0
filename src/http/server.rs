//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the application and admin routes
//! - Wire up middleware (tracing, timeout, X-Frame-Options decoration)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::ServiceConfig;
use crate::policy::PolicyStore;
use crate::security::XFrameLayer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PolicyStore>,
    pub config: Arc<ServiceConfig>,
}

/// HTTP server whose every response is decorated from the policy store.
pub struct HttpServer {
    router: Router,
    config: Arc<ServiceConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and policy store.
    pub fn new(config: ServiceConfig, store: Arc<PolicyStore>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            store,
            config: config.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler))
            .fallback(not_found_handler);

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(XFrameLayer::new(state.store.clone()))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving it some other way.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin_enabled = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn index_handler() -> &'static str {
    "xframe-filter"
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");
    (StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{HeaderPolicy, MemoryBackend};
    use axum::body::Body;
    use axum::http::{header::X_FRAME_OPTIONS, Request};
    use tower::ServiceExt;

    fn server(admin: bool) -> (HttpServer, Arc<PolicyStore>) {
        let store = Arc::new(PolicyStore::load(Arc::new(MemoryBackend::new())));
        let mut config = ServiceConfig::default();
        config.admin.enabled = admin;
        config.admin.api_key = "test-key".to_string();
        (HttpServer::new(config, store.clone()), store)
    }

    #[tokio::test]
    async fn test_every_route_is_decorated() {
        let (server, _) = server(false);
        let router = server.into_router();

        for path in ["/", "/health", "/no/such/page"] {
            let response = router
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.headers()[X_FRAME_OPTIONS], "SAMEORIGIN", "path {path}");
        }
    }

    #[tokio::test]
    async fn test_admin_routes_absent_when_disabled() {
        let (server, _) = server(false);
        let response = server
            .into_router()
            .oneshot(Request::get("/admin/xframe").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_requires_token() {
        let (server, _) = server(true);
        let response = server
            .into_router()
            .oneshot(Request::get("/admin/xframe").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_form_submission_updates_policy() {
        let (server, store) = server(true);
        let response = server
            .into_router()
            .oneshot(
                Request::post("/admin/xframe")
                    .header("authorization", "Bearer test-key")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("sendHeader=on&options=DENY"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "DENY");
        assert_eq!(*store.current(), HeaderPolicy::new(true, "DENY"));
    }

    #[tokio::test]
    async fn test_invalid_submission_is_unprocessable() {
        let (server, store) = server(true);
        let response = server
            .into_router()
            .oneshot(
                Request::post("/admin/xframe")
                    .header("authorization", "Bearer test-key")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("sendHeader=on"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(*store.current(), HeaderPolicy::default());
    }
}
