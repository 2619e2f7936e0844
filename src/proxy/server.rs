use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::ProxyHandler;

pub(crate) const RELAY_PATH: &str = "/api/gemini";

#[derive(Deserialize)]
struct RelayRequest {
    prompt: String,
}

pub(crate) fn router(handler: Arc<ProxyHandler>) -> Router {
    Router::new()
        .route(
            RELAY_PATH,
            post(relay).options(preflight).fallback(method_not_allowed),
        )
        .with_state(handler)
        .layer(middleware::map_response(cors_headers))
}

pub(crate) async fn run_server(handler: ProxyHandler, bind: SocketAddr) -> Result<()> {
    if !handler.has_credential() {
        tracing::warn!("SPENDLENS_GEMINI_KEY is not set; relay requests will fail");
    }
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!(%addr, path = RELAY_PATH, "relay listening");

    axum::serve(listener, router(Arc::new(handler)))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("Relay server failed")?;
    tracing::info!("relay stopped");
    Ok(())
}

async fn relay(State(handler): State<Arc<ProxyHandler>>, body: Bytes) -> Response {
    let prompt = match serde_json::from_slice::<RelayRequest>(&body) {
        Ok(req) => req.prompt,
        Err(e) => {
            tracing::warn!("rejecting malformed relay body: {e}");
            return error_response("Request body must be JSON with a \"prompt\" string");
        }
    };

    match handler.handle(&prompt).await {
        Ok(answer) => (StatusCode::OK, Json(json!({ "answer": answer }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "relay request failed");
            error_response(&e.public_message())
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            _ => tracing::debug!("signal handlers unavailable, falling back to ctrl-c"),
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}
