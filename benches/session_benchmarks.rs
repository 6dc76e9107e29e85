//! Performance benchmarks for the kiosk session.
//!
//! The reducer runs on every key press, so it has to stay well under a
//! frame budget:
//! - Typing and submitting a PIN: < 10μs mean
//! - Full dual-shift approval flow: < 50μs mean
//! - Key press through the controller API: < 200μs mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use workclock_kiosk::api::{AppState, create_router};
use workclock_kiosk::client::{BackendStatus, KioskBackend, ShiftApproval};
use workclock_kiosk::config::KioskSettings;
use workclock_kiosk::error::KioskResult;
use workclock_kiosk::models::{ActiveRecord, ClockAction, ClockOutcome, EmployeeRef, Location};
use workclock_kiosk::workflow::{Effect, RequestId, Session, SessionEvent, spawn_kiosk};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

/// Backend that answers instantly without touching the network.
struct InstantBackend;

#[async_trait]
impl KioskBackend for InstantBackend {
    async fn submit_pin(&self, _pin: &str, _location: Option<Location>) -> ClockOutcome {
        ClockOutcome::Failure {
            message: "Invalid PIN. Please try again.".to_string(),
        }
    }

    async fn force_clockout(&self, _active_record_id: i64) -> KioskResult<()> {
        Ok(())
    }

    async fn approve_shift(&self, _approval: ShiftApproval) -> KioskResult<()> {
        Ok(())
    }

    async fn status(&self) -> KioskResult<BackendStatus> {
        Ok(BackendStatus {
            status: "ok".to_string(),
            app: None,
        })
    }
}

fn conflict() -> ClockOutcome {
    ClockOutcome::ApprovalRequired {
        requesting_employee: EmployeeRef {
            id: 2,
            name: "Bob".to_string(),
        },
        active_record: ActiveRecord {
            id: 9,
            employee_id: 1,
            employee_name: "Alice".to_string(),
            clock_in: "2025-03-04T08:00:00".to_string(),
        },
    }
}

/// Types `pin` and returns the id of the submitted request, if any.
fn type_pin(session: &mut Session, pin: &str) -> Option<RequestId> {
    let mut submitted = None;
    for key in pin.chars() {
        for effect in session.handle(SessionEvent::Digit(key)) {
            if let Effect::SubmitPin { request_id, .. } = effect {
                submitted = Some(request_id);
            }
        }
    }
    submitted
}

/// Benchmark: type a PIN and apply a clock-in confirmation.
///
/// Target: < 10μs mean
fn bench_clock_in(c: &mut Criterion) {
    c.bench_function("clock_in", |b| {
        b.iter(|| {
            let mut session = Session::new(KioskSettings::default());
            let request_id = type_pin(&mut session, black_box("1234")).unwrap();
            let effects = session.handle(SessionEvent::ClockResolved {
                request_id,
                outcome: ClockOutcome::Success {
                    employee_name: "Alice".to_string(),
                    action: ClockAction::ClockIn,
                    time: "09:00 AM".to_string(),
                },
            });
            black_box((effects, session.snapshot()))
        })
    });
}

/// Benchmark: conflict, approve step, reason, approver PIN, resolution.
///
/// Target: < 50μs mean
fn bench_approval_flow(c: &mut Criterion) {
    c.bench_function("approval_flow", |b| {
        b.iter(|| {
            let mut session = Session::new(KioskSettings::default());
            let request_id = type_pin(&mut session, "2222").unwrap();
            session.handle(SessionEvent::ClockResolved {
                request_id,
                outcome: conflict(),
            });
            session.handle(SessionEvent::ChooseApprove);
            session.handle(SessionEvent::SetReason("Handover".to_string()));
            let mut workflow_id = None;
            for key in "1111".chars() {
                for effect in session.handle(SessionEvent::Digit(key)) {
                    if let Effect::ApproveShift { workflow_id: id, .. } = effect {
                        workflow_id = Some(id);
                    }
                }
            }
            let effects = session.handle(SessionEvent::ApprovalResolved {
                workflow_id: workflow_id.unwrap(),
                result: Ok(()),
            });
            black_box((effects, session.snapshot()))
        })
    });
}

/// Benchmark: render cost for each view.
fn bench_snapshot(c: &mut Criterion) {
    let idle = Session::new(KioskSettings::default());
    let mut approval = Session::new(KioskSettings::default());
    let request_id = type_pin(&mut approval, "2222").unwrap();
    approval.handle(SessionEvent::ClockResolved {
        request_id,
        outcome: conflict(),
    });

    let mut group = c.benchmark_group("snapshot");
    group.throughput(Throughput::Elements(1));
    for (name, session) in [("idle", &idle), ("approval", &approval)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), session, |b, session| {
            b.iter(|| black_box(session.snapshot()))
        });
    }
    group.finish();
}

/// Benchmark: a key press and a clear through the HTTP controller and runtime.
///
/// Target: < 200μs mean
fn bench_api_key_press(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = rt.block_on(async {
        let (kiosk, _task) = spawn_kiosk(Arc::new(InstantBackend), KioskSettings::default());
        create_router(AppState::new(kiosk))
    });

    c.bench_function("api_key_press", |b| {
        b.to_async(&rt).iter(|| async {
            let digit = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/keypad/digit")
                        .header("Content-Type", "application/json")
                        .body(Body::from(r#"{"digit":"5"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            let clear = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/keypad/clear")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box((digit, clear))
        })
    });
}

criterion_group!(
    benches,
    bench_clock_in,
    bench_approval_flow,
    bench_snapshot,
    bench_api_key_press,
);
criterion_main!(benches);
