use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use crate::dto::transport_dto::{
    AutoAssignResponse, EventTransportRequest, GenerateRoutesResponse, ResetResponse,
    SendRoutesResponse,
};
use crate::dto::ApiResponse;
use crate::models::RouteWithDriver;
use crate::state::AppState;
use crate::utils::errors::AppError;
use uuid::Uuid;

pub fn create_transport_router() -> Router<AppState> {
    Router::new()
        .route("/auto-assign", post(auto_assign))
        .route("/generate-routes", post(generate_routes))
        .route("/reset", post(reset))
        .route("/send-routes", post(send_routes))
        .route("/routes/:event_id", get(list_routes))
}

async fn auto_assign(
    State(state): State<AppState>,
    Json(request): Json<EventTransportRequest>,
) -> Result<Json<AutoAssignResponse>, AppError> {
    let event_id = request.event_id()?;
    let response = state.transport_controller().auto_assign(event_id).await?;
    Ok(Json(response))
}

async fn generate_routes(
    State(state): State<AppState>,
    Json(request): Json<EventTransportRequest>,
) -> Result<Json<GenerateRoutesResponse>, AppError> {
    let event_id = request.event_id()?;
    let response = state.transport_controller().generate_routes(event_id).await?;
    Ok(Json(response))
}

async fn reset(
    State(state): State<AppState>,
    Json(request): Json<EventTransportRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    let event_id = request.event_id()?;
    let response = state.transport_controller().reset(event_id).await?;
    Ok(Json(response))
}

async fn send_routes(
    State(state): State<AppState>,
    Json(request): Json<EventTransportRequest>,
) -> Result<Json<SendRoutesResponse>, AppError> {
    let event_id = request.event_id()?;
    let response = state.transport_controller().send_routes(event_id).await?;
    Ok(Json(response))
}

async fn list_routes(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RouteWithDriver>>>, AppError> {
    let response = state.transport_controller().list_routes(event_id).await?;
    Ok(Json(response))
}
