//! JSON API for the web form

use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::{Deserialize, Serialize};

use crate::TripAgentError;
use crate::agent::Planner;
use crate::models::{TravelItinerary, TripRequest};

/// Shared state for the web handlers
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<dyn Planner>,
}

/// Request body for `POST /api/plan`
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub interests: Vec<String>,
    pub budget: String,
}

/// Error body shown in the form's inline banner
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan", post(plan_trip))
        .with_state(state)
}

async fn plan_trip(
    State(state): State<AppState>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<TravelItinerary>, (StatusCode, Json<ApiError>)> {
    let request = TripRequest::new(
        payload.destination,
        payload.start_date,
        payload.end_date,
        payload.interests,
        payload.budget,
    )
    .map_err(reject)?;

    let itinerary = state.planner.plan(&request).await.map_err(|e| {
        tracing::error!(error = %e, "planning request failed");
        reject(e)
    })?;

    Ok(Json(itinerary))
}

fn reject(error: TripAgentError) -> (StatusCode, Json<ApiError>) {
    let status = match &error {
        TripAgentError::Validation { .. } => StatusCode::BAD_REQUEST,
        TripAgentError::Api { .. } | TripAgentError::Decode { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            error: error.user_message(),
        }),
    )
}
