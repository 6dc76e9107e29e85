//! The kiosk workflow engine.
//!
//! - [`approval`]: the dual-shift approval state machine.
//! - [`session`]: the view-state container and its event reducer.
//! - [`runtime`]: the task that executes session effects.

pub mod approval;
pub mod runtime;
pub mod session;

pub use approval::{
    ApprovalSnapshot, ApprovalStep, ApprovalWorkflow, ApproverPinInput, REASON_REQUIRED_MESSAGE,
    Resolution, WorkflowId,
};
pub use runtime::{KioskHandle, spawn_kiosk};
pub use session::{
    Confirmation, ConfirmationKind, Effect, RequestId, Session, SessionEvent, TimerKind,
    ViewSnapshot,
};
