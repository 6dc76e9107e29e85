//! HTTP controller API for the kiosk shell.
//!
//! The browser shell that draws the keypad and buttons feeds user input
//! through these endpoints and renders the view snapshot they return.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DigitRequest, LocationRequest, ReasonRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
