//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener and shut down gracefully
//! - Dispatch requests to the redirect resolver
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RedirectorConfig;
use crate::http::request::request_url;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{RedirectResolver, ResolveResult, RuleError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
}

/// HTTP server answering every request with a redirect or 410.
pub struct HttpServer {
    router: Router,
    config: RedirectorConfig,
}

impl HttpServer {
    /// Compile the redirect rules and build the router.
    pub fn new(config: RedirectorConfig) -> Result<Self, RuleError> {
        let resolver = Arc::new(RedirectResolver::from_config(&config.redirect)?);
        Ok(Self::with_resolver(config, resolver))
    }

    /// Build the router around an already-compiled resolver.
    pub fn with_resolver(config: RedirectorConfig, resolver: Arc<RedirectResolver>) -> Self {
        let state = AppState { resolver };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectorConfig, state: AppState) -> Router {
        Router::new()
            // Single catch-all: every method, every path
            .fallback(redirect_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RedirectorConfig {
        &self.config
    }
}

/// Main redirect handler.
/// Rebuilds the request URL, resolves it, and translates the decision.
async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();

    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = parts.method.clone();

    let url = match request_url(&parts) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(request_id = %request_id, uri = %parts.uri, error = %e, "Malformed request URL");
            return (StatusCode::BAD_REQUEST, "Malformed request URL").into_response();
        }
    };

    let resolution = state.resolver.resolve_with_stage(&parts, &url);
    let status = match &resolution.result {
        ResolveResult::Gone => StatusCode::GONE.as_u16(),
        ResolveResult::Redirect { code, .. } => code.as_u16(),
    };

    match &resolution.result {
        ResolveResult::Gone => tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %url.path(),
            stage = %resolution.stage,
            status,
            "Resolved as gone"
        ),
        ResolveResult::Redirect { target, .. } => tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %url.path(),
            stage = %resolution.stage,
            status,
            location = %target,
            "Resolved as redirect"
        ),
    }

    metrics::record_resolution(&method, resolution.stage, status, start_time);

    resolution.result.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use tower::ServiceExt;

    use crate::config::{ExactRuleConfig, PatternRuleConfig};
    use crate::routing::TrailingSlash;

    fn scenario_config() -> RedirectorConfig {
        let mut config = RedirectorConfig::default();
        config.redirect.new_origin = "https://new.example".into();
        config.redirect.lowercase = true;
        config.redirect.trailing_slash = TrailingSlash::Strip;
        config.redirect.exact.push(ExactRuleConfig {
            from: "/Posts".into(),
            to: "/blog".into(),
        });
        config.redirect.gone.push("/old-image.jpg".into());
        config.redirect.patterns.push(PatternRuleConfig {
            pattern: "/lab/:rest*".into(),
            to: "/projects/lab/:rest".into(),
        });
        config
    }

    async fn send(router: Router, method: &str, uri: &str) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("host", "old.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_scenario_redirects() {
        let server = HttpServer::new(scenario_config()).unwrap();

        let cases = [
            ("/Posts/?ref=x", "https://new.example/blog?ref=x"),
            ("/lab/alpha", "https://new.example/projects/lab/alpha"),
            ("/random/page", "https://new.example/random/page"),
        ];
        for (uri, location) in cases {
            let response = send(server.router(), "GET", uri).await;
            assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT, "{uri}");
            assert_eq!(response.headers()[header::LOCATION], location, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_scenario_gone() {
        let server = HttpServer::new(scenario_config()).unwrap();
        let response = send(server.router(), "GET", "/old-image.jpg").await;

        assert_eq!(response.status(), StatusCode::GONE);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_any_method_is_resolved() {
        let server = HttpServer::new(scenario_config()).unwrap();
        for method in ["POST", "HEAD", "DELETE"] {
            let response = send(server.router(), method, "/posts").await;
            assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT, "{method}");
        }
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let server = HttpServer::new(scenario_config()).unwrap();
        let response = send(server.router(), "GET", "/").await;
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_configured_code_is_used() {
        let mut config = scenario_config();
        config.redirect.permanent_code = 301;
        let server = HttpServer::new(config).unwrap();

        let response = send(server.router(), "GET", "/anything").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn test_invalid_host_is_bad_request() {
        let server = HttpServer::new(scenario_config()).unwrap();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header("host", "bad host")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_rules_fail_construction() {
        let mut config = scenario_config();
        config.redirect.gone.push("no-slash".into());
        assert!(HttpServer::new(config).is_err());
    }
}
