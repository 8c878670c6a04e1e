use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use rust_embed::RustEmbed;
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use super::auth;
use crate::config::PromptpressConfig;
use crate::provider;
use crate::render;

/// Chat page bundled into the binary.
#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

pub struct AppState {
    pub token: Option<String>,
    pub config: PromptpressConfig,
}

pub async fn run(config: PromptpressConfig, token: Option<String>) -> anyhow::Result<()> {
    let is_loopback = config.gateway.bind == "127.0.0.1" || config.gateway.bind == "::1";

    if !is_loopback && token.is_none() {
        anyhow::bail!(
            "Auth token required when binding to non-loopback address. \
             Set --token or PROMPTPRESS_TOKEN env var."
        );
    }

    let addr = format!("{}:{}", config.gateway.bind, config.gateway.port);

    let state = Arc::new(AppState { token, config });

    let app = Router::new()
        .route("/", get(index))
        .route("/assets/{*path}", get(asset))
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("promptpress gateway listening on {addr}");
    if is_loopback {
        info!("bound to loopback — local access only");
    } else {
        warn!("bound to {addr} — ensure auth token is set");
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn ping() -> &'static str {
    "pong"
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Response {
    serve_asset("index.html")
}

async fn asset(Path(path): Path<String>) -> Response {
    serve_asset(&path)
}

fn serve_asset(path: &str) -> Response {
    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                file.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// Handle a chat request end to end.
///
/// 1. Check the bearer token (when one is configured)
/// 2. Validate the prompt
/// 3. Call the configured completion provider
/// 4. Render the completion as safe HTML
/// 5. Return `{ ok, html, model, created_at }`
async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    if !auth::verify_bearer(&headers, &state.token) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid or missing auth token");
    }

    let prompt = match request.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "missing required field `prompt`");
        }
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, prompt_chars = prompt.len(), "chat request");

    let provider = match provider::from_config(&state.config.model) {
        Ok(p) => p,
        Err(e) => {
            warn!(%request_id, "provider setup failed: {e}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    match provider.complete(&prompt).await {
        Ok(completion) => {
            let html = render::render(Some(&completion));
            info!(%request_id, html_bytes = html.len(), "chat response rendered");
            Json(json!({
                "ok": true,
                "html": html,
                "model": provider.model(),
                "created_at": Utc::now(),
            }))
            .into_response()
        }
        Err(e) => {
            warn!(%request_id, "completion failed: {e}");
            error_response(
                StatusCode::BAD_GATEWAY,
                &format!("failed to query model: {e}"),
            )
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "ok": false, "error": message }))).into_response()
}
