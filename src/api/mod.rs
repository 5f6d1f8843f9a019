use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    PlannerError,
    models::TripRequest,
    planner::{PlanBody, TripPlanner},
};

const LIVENESS_MESSAGE: &str = "A.I.R trip planner server is up and running! 🚀";

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    planner: Arc<TripPlanner>,
}

impl AppState {
    pub fn new(planner: TripPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Liveness {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Request rejected before any model was called
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        let status = match err {
            PlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/generate-trip-plan", post(generate_trip_plan))
        .with_state(state)
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

/// Always 200 once the request is valid; model failure is reported in the body
async fn generate_trip_plan(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<PlanBody>, ApiError> {
    let Json(request) = payload.inspect_err(|rejection| {
        warn!("Rejected trip request: {}", rejection.body_text());
    })?;
    request.validate()?;

    let outcome = state.planner.plan(&request).await;
    Ok(Json(outcome.into_body(state.planner.currency())))
}
