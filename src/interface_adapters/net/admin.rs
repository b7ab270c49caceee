use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::ArenaDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::ResizeError;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, serde::Deserialize)]
pub struct ResizeArenaRequest {
    width: f32,
    height: f32,
}

/// Operator-only arena resize; applied at the next tick boundary.
pub async fn resize_arena_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResizeArenaRequest>,
) -> impl IntoResponse {
    match state.arena.resize(payload.width, payload.height).await {
        Ok(arena) => {
            info!(
                width = arena.width(),
                height = arena.height(),
                "arena resized via admin route"
            );
            (
                StatusCode::OK,
                Json(ArenaDto {
                    width: arena.width(),
                    height: arena.height(),
                }),
            )
                .into_response()
        }
        Err(ResizeError::Invalid(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(ResizeError::Closed) => {
            error!("arena resize requested but world task is gone");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "arena unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}
