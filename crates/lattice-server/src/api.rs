//! API handlers for the server.

use crate::controls::{ControlState, ControlUpdate, Controls};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use lattice_core::RenderConfig;
use lattice_world::{PixelRenderer, Renderer, SnapshotRenderer};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

#[derive(Clone)]
pub struct AppState {
    pub controls: Arc<Controls>,
    pub frames: SnapshotRenderer,
    pub render_config: RenderConfig,
    pub started_at: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/controls", get(get_controls).put(update_controls))
        .route("/api/grid", get(get_grid))
        .route("/api/frame.ppm", get(get_frame))
        .route("/api/status", get(get_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_controls(State(state): State<AppState>) -> Json<ControlState> {
    Json(state.controls.state())
}

/// Change temperature and/or move method for subsequent ticks
pub async fn update_controls(
    State(state): State<AppState>,
    Json(update): Json<ControlUpdate>,
) -> Result<Json<ControlState>, ApiError> {
    state.controls.apply(update)?;
    Ok(Json(state.controls.state()))
}

#[derive(Serialize)]
pub struct GridResponse {
    size: usize,
    tick: u64,
    occupied: usize,
    rows: Vec<String>,
}

/// Latest rendered frame as text rows
pub async fn get_grid(State(state): State<AppState>) -> Json<GridResponse> {
    let frame = state.frames.latest();
    Json(GridResponse {
        size: frame.size,
        tick: frame.tick,
        occupied: frame.occupied_count(),
        rows: frame.text_rows(),
    })
}

/// Latest rendered frame as a PPM image
pub async fn get_frame(State(state): State<AppState>) -> Response {
    let frame = state.frames.latest();
    let mut renderer = PixelRenderer::new(state.render_config.clone());
    renderer.render(&frame, frame.tick);

    (
        [(header::CONTENT_TYPE, "image/x-portable-pixmap")],
        renderer.to_ppm(),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct StatusResponse {
    tick: u64,
    occupied: usize,
    temperature: f64,
    move_method: String,
    started_at: DateTime<Utc>,
    uptime_secs: i64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let frame = state.frames.latest();
    let params = state.controls.snapshot();
    Json(StatusResponse {
        tick: frame.tick,
        occupied: frame.occupied_count(),
        temperature: params.temperature,
        move_method: params.move_method.to_string(),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

// Error handling
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<lattice_core::Error> for ApiError {
    fn from(err: lattice_core::Error) -> Self {
        if err.is_config() {
            warn!("Rejected control update: {}", err);
            ApiError::BadRequest(err.to_string())
        } else {
            error!("Core error: {}", err);
            ApiError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use lattice_core::{ControlConfig, Position};
    use lattice_world::Grid;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut frames = SnapshotRenderer::new();
        let mut grid = Grid::new(4);
        grid.set(Position::new(1, 1), true);
        grid.set(Position::new(3, 0), true);
        frames.render(&grid, 12);

        AppState {
            controls: Arc::new(Controls::new(&ControlConfig::default())),
            frames,
            render_config: RenderConfig::default(),
            started_at: Utc::now(),
        }
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(router(test_state()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_grid_snapshot() {
        let (status, body) = send(router(test_state()), Method::GET, "/api/grid", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["size"], 4);
        assert_eq!(json["tick"], 12);
        assert_eq!(json["occupied"], 2);
        assert_eq!(json["rows"][1], ".#..");
        assert_eq!(json["rows"][3], "#...");
    }

    #[tokio::test]
    async fn test_frame_is_ppm() {
        let (status, body) = send(router(test_state()), Method::GET, "/api/frame.ppm", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"P6\n20 20\n255\n"));
    }

    #[tokio::test]
    async fn test_update_controls() {
        let state = test_state();
        let app = router(state.clone());
        let (status, body) = send(
            app,
            Method::PUT,
            "/api/controls",
            Some(r#"{"temperature": 0.25, "move_method": "teleport"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["move_method"], "teleport");
        assert_eq!(json["temperature"], 0.25);
        assert_eq!(state.controls.snapshot().temperature, 0.25);

        let (status, body) = send(router(state), Method::GET, "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["tick"], 12);
        assert_eq!(json["move_method"], "teleport");
    }

    #[tokio::test]
    async fn test_invalid_move_method_is_bad_request() {
        let state = test_state();
        let (status, body) = send(
            router(state.clone()),
            Method::PUT,
            "/api/controls",
            Some(r#"{"move_method": "wormhole"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).contains("wormhole"));
        assert_eq!(state.controls.state().move_method, lattice_core::MoveMethod::Adjacent);
    }

    #[tokio::test]
    async fn test_out_of_range_temperature_is_bad_request() {
        let (status, _) = send(
            router(test_state()),
            Method::PUT,
            "/api/controls",
            Some(r#"{"temperature": 12.0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
