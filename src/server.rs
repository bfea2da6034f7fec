//! JSON HTTP server.
//!
//! Exposes recommendations to a presentation layer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/recommendations` | Recommendations for a username or an inline bottle list |
//! | `POST` | `/similar` | Ranked matches for one catalog bottle |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "provide either username or bottles" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `upstream_error` (502).
//! `/recommendations` never reports pipeline failures; it serves the
//! fallback list instead.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::bar::BarClient;
use crate::catalog::{find_bottle, load_catalog};
use crate::config::Config;
use crate::matcher::find_similar_bottles;
use crate::models::{Bottle, Recommendation};
use crate::recommend::{build_recommender, Recommender};

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub catalog: Arc<Vec<Bottle>>,
    pub bar: Arc<BarClient>,
}

/// Wire up the recommender, catalog, and bar client from configuration.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let catalog = load_catalog(&config.catalog.path)?;
    Ok(AppState {
        recommender: Arc::new(build_recommender(config)?),
        catalog: Arc::new(catalog),
        bar: Arc::new(BarClient::new(&config.bar)?),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/recommendations", post(handle_recommendations))
        .route("/similar", post(handle_similar))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Binds to `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = build_state(config)?;
    let bind_addr = config.server.bind.clone();
    tracing::info!(
        catalog = state.catalog.len(),
        model = state.recommender.resolver().provider().model_name(),
        "starting server"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream_error",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /recommendations ============

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bottles: Option<Vec<Bottle>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Inline `bottles` win over `username`.
async fn handle_recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let user_bottles = match (req.bottles, req.username) {
        (Some(bottles), _) => bottles,
        (None, Some(username)) => state
            .bar
            .fetch_collection(&username)
            .await
            .map_err(|e| upstream_error(format!("{:#}", e)))?,
        (None, None) => return Err(bad_request("provide either username or bottles")),
    };

    let recommendations = state
        .recommender
        .recommend(&user_bottles, &state.catalog)
        .await;
    Ok(Json(RecommendResponse { recommendations }))
}

// ============ POST /similar ============

#[derive(Debug, Deserialize)]
pub struct SimilarRequest {
    pub bottle_id: i64,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarItem {
    pub bottle: Bottle,
    pub similarity: f32,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarResponse {
    pub matches: Vec<SimilarItem>,
}

async fn handle_similar(
    State(state): State<AppState>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<SimilarResponse>, AppError> {
    let limit = req.limit.unwrap_or(state.recommender.per_bottle_limit());
    if limit == 0 {
        return Err(bad_request("limit must be >= 1"));
    }

    let seed = find_bottle(&state.catalog, req.bottle_id)
        .ok_or_else(|| not_found(format!("bottle not found: {}", req.bottle_id)))?;
    let others: Vec<Bottle> = state
        .catalog
        .iter()
        .filter(|b| b.id != seed.id)
        .cloned()
        .collect();

    let matches = find_similar_bottles(state.recommender.resolver(), seed, &others, limit)
        .await
        .map_err(|e| upstream_error(e.to_string()))?
        .into_iter()
        .map(|c| SimilarItem {
            bottle: c.bottle,
            similarity: c.similarity,
            reason: c.reason,
        })
        .collect();

    Ok(Json(SimilarResponse { matches }))
}
