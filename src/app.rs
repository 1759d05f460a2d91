use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::config::AppConfig;
use crate::data::DataError;
use crate::state::AppState;
use crate::{family, inventory, recipes, session, shopping};

pub type ApiError = (StatusCode, String);

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(session::handlers::router())
                .merge(family::router())
                .merge(inventory::router())
                .merge(recipes::router())
                .merge(shopping::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub(crate) fn data_error(e: DataError) -> ApiError {
    match e {
        DataError::BackendNotConfigured => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        DataError::Backend(_) => {
            error!(error = %e, "backend call failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
        DataError::Local(_) => internal(e),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::call;
    use crate::state::AppState;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn health_is_ok() {
        let (_dir, state) = AppState::fake();
        let (status, body) = call(&state, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (_dir, state) = AppState::fake();
        let (status, _) = call(&state, Method::GET, "/api/v1/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
