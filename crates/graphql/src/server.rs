//! GraphQL HTTP server.

use std::future::Future;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
};
use tracing::{debug, info};

use crate::messages::Locale;
use crate::schema::{RequestContext, ANONYMOUS_USER};
use crate::types::TrackerSchema;

/// Header naming the user on whose behalf a request runs.
const USER_KEY_HEADER: &str = "x-user-key";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_playground: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            enable_playground: true,
        }
    }
}

fn router(schema: TrackerSchema, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .route("/health", get(health_check))
        .with_state(schema);

    if config.enable_playground {
        app = app.route("/", get(graphql_playground));
    }

    app
}

/// Start the GraphQL server with graceful shutdown support.
pub async fn serve_with_shutdown<F>(
    schema: TrackerSchema,
    config: ServerConfig,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(schema, &config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("⚡ GraphQL server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

/// Caller information carried by request headers.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let user = headers
        .get(USER_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string();

    let locale = headers
        .get(axum::http::header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(Locale::from_accept_language)
        .unwrap_or_default();

    RequestContext { user, locale }
}

/// GraphQL query handler.
async fn graphql_handler(
    State(schema): State<TrackerSchema>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let context = request_context(&headers);
    debug!(user = %context.user, locale = ?context.locale, "GraphQL request");

    schema.execute(req.into_inner().data(context)).await.into()
}

/// GraphQL Playground UI.
async fn graphql_playground() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_request_context_defaults() {
        let context = request_context(&HeaderMap::new());
        assert_eq!(context, RequestContext::default());
        assert_eq!(context.user, "anonymous");
    }

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_KEY_HEADER, HeaderValue::from_static("users/42"));
        headers.insert(
            axum::http::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("fr-CA,en;q=0.8"),
        );

        let context = request_context(&headers);
        assert_eq!(context.user, "users/42");
        assert_eq!(context.locale, Locale::Fr);
    }

    #[test]
    fn test_blank_user_key_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_KEY_HEADER, HeaderValue::from_static("  "));
        assert_eq!(request_context(&headers).user, ANONYMOUS_USER);
    }
}
