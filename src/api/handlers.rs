//! HTTP request handlers for the kiosk controller API.
//!
//! The kiosk shell (keypad widgets, buttons, reason field) drives the
//! session through these endpoints and redraws from the returned view.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Location;
use crate::workflow::SessionEvent;

use super::request::{DigitRequest, LocationRequest, ReasonRequest};
use super::response::ApiErrorResponse;
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/view", get(view_handler))
        .route("/keypad/digit", post(digit_handler))
        .route("/keypad/backspace", post(backspace_handler))
        .route("/keypad/clear", post(clear_handler))
        .route("/success/dismiss", post(dismiss_handler))
        .route("/approval/approve", post(approve_handler))
        .route("/approval/back", post(back_handler))
        .route("/approval/cancel", post(cancel_handler))
        .route("/approval/force-clockout", post(force_clockout_handler))
        .route("/approval/reason", put(reason_handler))
        .route(
            "/location",
            put(set_location_handler).delete(clear_location_handler),
        )
        .with_state(state)
}

/// Applies `event` to the kiosk and answers with the resulting view.
async fn dispatch(state: &AppState, event: SessionEvent) -> Response {
    let correlation_id = Uuid::new_v4();
    let name = event.name();
    match state.kiosk().dispatch(event).await {
        Ok(view) => {
            debug!(correlation_id = %correlation_id, event = name, "Kiosk event applied");
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                event = name,
                error = %err,
                "Kiosk event rejected"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Handler for GET /view.
async fn view_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.kiosk().view())
}

/// Handler for POST /keypad/digit.
async fn digit_handler(
    State(state): State<AppState>,
    payload: Result<Json<DigitRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiErrorResponse::from(rejection).into_response(),
    };
    match request.key() {
        Ok(key) => dispatch(&state, SessionEvent::Digit(key)).await,
        Err(error) => ApiErrorResponse::bad_request(error).into_response(),
    }
}

async fn backspace_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::Backspace).await
}

async fn clear_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::ClearPin).await
}

async fn dismiss_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::DismissSuccess).await
}

async fn approve_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::ChooseApprove).await
}

async fn back_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::Back).await
}

async fn cancel_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::Cancel).await
}

async fn force_clockout_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::ForceClockOut).await
}

/// Handler for PUT /approval/reason.
async fn reason_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReasonRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => dispatch(&state, SessionEvent::SetReason(request.reason)).await,
        Err(rejection) => ApiErrorResponse::from(rejection).into_response(),
    }
}

/// Handler for PUT /location.
async fn set_location_handler(
    State(state): State<AppState>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiErrorResponse::from(rejection).into_response(),
    };
    match Location::try_from(request) {
        Ok(location) => dispatch(&state, SessionEvent::SetLocation(Some(location))).await,
        Err(error) => ApiErrorResponse::bad_request(error).into_response(),
    }
}

async fn clear_location_handler(State(state): State<AppState>) -> Response {
    dispatch(&state, SessionEvent::SetLocation(None)).await
}
