//! reqwest-backed implementation of [`KioskBackend`].

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::error::{KioskError, KioskResult};
use crate::models::{ClockOutcome, Location};

use super::KioskBackend;
use super::request::{ClockRequest, ForceClockoutRequest, ShiftApproval};
use super::response::{BackendStatus, clock_outcome_from_response, error_message};

/// Fallback text when force-clockout fails without an `error` field.
pub const FORCE_CLOCKOUT_FAILED_MESSAGE: &str = "Failed to clock out user.";

/// Fallback text when dual-shift approval fails without an `error` field.
pub const APPROVAL_FAILED_MESSAGE: &str = "Approval failed";

const JSON: &str = "application/json";

/// HTTP client for the time-tracking backend.
///
/// Requests are sent once; nothing is retried, since a silent retry could
/// record a clock action twice.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Builds a client with the configured timeouts.
    pub fn new(config: BackendConfig) -> KioskResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| KioskError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { config, client })
    }

    /// POSTs a JSON body and returns the status and raw response text.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> KioskResult<(reqwest::StatusCode, String)> {
        let url = self.config.url(path);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, JSON)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(url = %url, status = status.as_u16(), "Backend responded");
        Ok((status, text))
    }

    fn check(status: reqwest::StatusCode, body: &str, fallback: &str) -> KioskResult<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(KioskError::Backend {
                status: status.as_u16(),
                message: error_message(body, fallback),
            })
        }
    }
}

#[async_trait]
impl KioskBackend for HttpBackend {
    async fn submit_pin(&self, pin: &str, location: Option<Location>) -> ClockOutcome {
        let request = ClockRequest::new(pin, location);
        match self.post_json(&self.config.clock_path, &request).await {
            Ok((status, body)) => {
                let outcome = clock_outcome_from_response(status.as_u16(), &body);
                info!(
                    status = status.as_u16(),
                    outcome = outcome.kind(),
                    "Clock decision received"
                );
                outcome
            }
            Err(err) => {
                warn!(error = %err, "Clock decision request failed");
                ClockOutcome::Failure {
                    message: err.user_message(),
                }
            }
        }
    }

    async fn force_clockout(&self, active_record_id: i64) -> KioskResult<()> {
        let request = ForceClockoutRequest { active_record_id };
        let (status, body) = self
            .post_json(&self.config.force_clockout_path, &request)
            .await?;
        Self::check(status, &body, FORCE_CLOCKOUT_FAILED_MESSAGE)?;
        info!(active_record_id, "Force clock-out accepted");
        Ok(())
    }

    async fn approve_shift(&self, approval: ShiftApproval) -> KioskResult<()> {
        let (status, body) = self
            .post_json(&self.config.approve_shift_path, &approval)
            .await?;
        Self::check(status, &body, APPROVAL_FAILED_MESSAGE)?;
        info!(
            approver_id = approval.approver_id,
            new_employee_id = approval.new_employee_id,
            "Dual shift approved"
        );
        Ok(())
    }

    async fn status(&self) -> KioskResult<BackendStatus> {
        let url = self.config.url(&self.config.status_path);
        let response = self.client.get(&url).header(ACCEPT, JSON).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(KioskError::Backend {
                status: status.as_u16(),
                message: error_message(&body, "Status check failed"),
            });
        }
        serde_json::from_str(&body).map_err(|e| KioskError::UnexpectedResponse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    use crate::models::ClockAction;

    /// Start a test server and return its base URL.
    async fn start_test_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend_for(base_url: &str) -> HttpBackend {
        HttpBackend::new(BackendConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    /// Route that records every request body and answers with a fixed reply.
    fn recording_route(
        path: &str,
        status: StatusCode,
        reply: Value,
    ) -> (Router, Arc<Mutex<Vec<(Value, Option<String>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            path,
            post(move |headers: HeaderMap, axum::Json(body): axum::Json<Value>| {
                let recorder = recorder.clone();
                let reply = reply.clone();
                async move {
                    let accept = headers
                        .get("accept")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorder.lock().unwrap().push((body, accept));
                    (status, axum::Json(reply))
                }
            }),
        );
        (app, seen)
    }

    #[tokio::test]
    async fn test_submit_pin_sends_pin_body_and_maps_success() {
        let (app, seen) = recording_route(
            "/clock",
            StatusCode::OK,
            json!({"status": "ok", "action": "clock_out", "employee": "Alice", "time": "05:00 PM"}),
        );
        let backend = backend_for(&start_test_server(app).await);

        let outcome = backend.submit_pin("1234", None).await;

        assert_eq!(
            outcome,
            ClockOutcome::Success {
                employee_name: "Alice".to_string(),
                action: ClockAction::ClockOut,
                time: "05:00 PM".to_string(),
            }
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, json!({"pin": "1234"}));
        assert_eq!(seen[0].1.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_submit_pin_maps_approval_required() {
        let (app, _) = recording_route(
            "/clock",
            StatusCode::OK,
            json!({
                "status": "approval_required",
                "employee": {"id": 2, "name": "Bob"},
                "active_record": {"id": 9, "employee_id": 1, "employee_name": "Alice", "clock_in": "2025-03-04T08:00:00"}
            }),
        );
        let backend = backend_for(&start_test_server(app).await);

        match backend.submit_pin("2222", None).await {
            ClockOutcome::ApprovalRequired { active_record, .. } => {
                assert_eq!(active_record.id, 9);
                assert_eq!(active_record.clock_in_display(), "08:00 AM");
            }
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_pin_surfaces_server_error() {
        let (app, _) = recording_route(
            "/clock",
            StatusCode::BAD_REQUEST,
            json!({"error": "Invalid PIN. Please try again."}),
        );
        let backend = backend_for(&start_test_server(app).await);

        assert_eq!(
            backend.submit_pin("0000", None).await,
            ClockOutcome::Failure {
                message: "Invalid PIN. Please try again.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_submit_pin_unreachable_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = backend_for(&format!("http://{addr}"));

        assert_eq!(
            backend.submit_pin("1234", None).await,
            ClockOutcome::Failure {
                message: "Connection error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_force_clockout_sends_record_id() {
        let (app, seen) = recording_route(
            "/force_clockout",
            StatusCode::OK,
            json!({"status": "clocked_out"}),
        );
        let backend = backend_for(&start_test_server(app).await);

        backend.force_clockout(9).await.unwrap();

        assert_eq!(seen.lock().unwrap()[0].0, json!({"active_record_id": 9}));
    }

    #[tokio::test]
    async fn test_force_clockout_not_found_is_backend_error() {
        let (app, _) = recording_route(
            "/force_clockout",
            StatusCode::NOT_FOUND,
            json!({"error": "No active record found."}),
        );
        let backend = backend_for(&start_test_server(app).await);

        match backend.force_clockout(9).await {
            Err(KioskError::Backend { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "No active record found.");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_force_clockout_without_error_body_uses_fallback() {
        let app = Router::new().route(
            "/force_clockout",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let backend = backend_for(&start_test_server(app).await);

        let err = backend.force_clockout(9).await.unwrap_err();
        assert!(matches!(err, KioskError::Backend { status: 500, .. }));
        assert_eq!(err.user_message(), FORCE_CLOCKOUT_FAILED_MESSAGE);
        assert_eq!(err.user_message(), "Failed to clock out user.");
    }

    #[tokio::test]
    async fn test_approve_shift_rejection_keeps_server_text() {
        let (app, seen) = recording_route(
            "/approve_shift",
            StatusCode::BAD_REQUEST,
            json!({"error": "bad pin"}),
        );
        let backend = backend_for(&start_test_server(app).await);
        let approval = ShiftApproval {
            approver_id: 1,
            new_employee_id: 2,
            approver_pin: "1111".to_string(),
            reason: "Cover".to_string(),
        };

        let err = backend.approve_shift(approval).await.unwrap_err();

        assert_eq!(err.user_message(), "bad pin");
        assert_eq!(seen.lock().unwrap()[0].0["approver_id"], json!(1));
    }

    #[tokio::test]
    async fn test_status_parses_health_body() {
        let app = Router::new().route(
            "/api/status",
            get(|| async { axum::Json(json!({"status": "ok", "app": "WorkClock"})) }),
        );
        let backend = backend_for(&start_test_server(app).await);

        let status = backend.status().await.unwrap();
        assert_eq!(status.status, "ok");
        assert_eq!(status.app.as_deref(), Some("WorkClock"));
    }
}
