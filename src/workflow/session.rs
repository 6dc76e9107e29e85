//! Kiosk session state.
//!
//! [`Session`] owns everything the kiosk shows: the main keypad, the
//! success view, the approval workflow and the error banner. It is a pure
//! reducer. [`Session::handle`] applies one [`SessionEvent`] and returns
//! the [`Effect`]s (requests, timers) the runtime must carry out; results
//! come back later as further events.
//!
//! Only one request is outstanding at a time. Each request is tagged with
//! the id it was issued for, and a result whose id no longer matches the
//! current state is dropped.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::ShiftApproval;
use crate::config::KioskSettings;
use crate::models::{ClockAction, ClockOutcome, Location, PinBuffer, PinInput};

use super::approval::{
    ApprovalSnapshot, ApprovalStep, ApprovalWorkflow, ApproverPinInput, Resolution, WorkflowId,
};

/// Identifies one clock-decision request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// The two transient-message timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Returns from the success view to the keypad.
    SuccessDismiss,
    /// Clears the error banner.
    ErrorClear,
}

/// Input to the session: user actions and completions of earlier effects.
#[derive(Clone, PartialEq)]
pub enum SessionEvent {
    /// A keypad digit.
    Digit(char),
    /// Keypad backspace.
    Backspace,
    /// Keypad clear.
    ClearPin,
    /// Tap on the success view.
    DismissSuccess,
    /// "Approve Dual Shift".
    ChooseApprove,
    /// "Back" from the approve step.
    Back,
    /// "Cancel" on the decision step.
    Cancel,
    /// "Clock Them Out".
    ForceClockOut,
    /// Reason text changed.
    SetReason(String),
    /// Kiosk position captured or lost.
    SetLocation(Option<Location>),
    /// The clock-decision request finished.
    ClockResolved {
        /// Request the outcome belongs to.
        request_id: RequestId,
        /// The outcome.
        outcome: ClockOutcome,
    },
    /// The force clock-out request finished.
    ForceClockOutResolved {
        /// Workflow that issued the request.
        workflow_id: WorkflowId,
        /// `Err` carries the message to show.
        result: Result<(), String>,
    },
    /// The dual-shift approval request finished.
    ApprovalResolved {
        /// Workflow that issued the request.
        workflow_id: WorkflowId,
        /// `Err` carries the message to show.
        result: Result<(), String>,
    },
    /// A transient-message timer fired.
    TimerExpired {
        /// Which timer.
        timer: TimerKind,
        /// The message generation it was started for.
        token: u64,
    },
}

impl SessionEvent {
    /// Event name for logs. Never includes keypad digits.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Digit(_) => "digit",
            SessionEvent::Backspace => "backspace",
            SessionEvent::ClearPin => "clear_pin",
            SessionEvent::DismissSuccess => "dismiss_success",
            SessionEvent::ChooseApprove => "choose_approve",
            SessionEvent::Back => "back",
            SessionEvent::Cancel => "cancel",
            SessionEvent::ForceClockOut => "force_clock_out",
            SessionEvent::SetReason(_) => "set_reason",
            SessionEvent::SetLocation(_) => "set_location",
            SessionEvent::ClockResolved { .. } => "clock_resolved",
            SessionEvent::ForceClockOutResolved { .. } => "force_clock_out_resolved",
            SessionEvent::ApprovalResolved { .. } => "approval_resolved",
            SessionEvent::TimerExpired { .. } => "timer_expired",
        }
    }
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Work the runtime carries out on behalf of the session.
#[derive(Clone, PartialEq)]
pub enum Effect {
    /// Send the PIN to the clock-decision endpoint.
    SubmitPin {
        /// Tag for the result.
        request_id: RequestId,
        /// The completed PIN.
        pin: String,
        /// Kiosk position, if known.
        location: Option<Location>,
    },
    /// Force the incumbent out.
    ForceClockOut {
        /// Tag for the result.
        workflow_id: WorkflowId,
        /// Record to close.
        active_record_id: i64,
    },
    /// Request dual-shift approval.
    ApproveShift {
        /// Tag for the result.
        workflow_id: WorkflowId,
        /// Request body.
        approval: ShiftApproval,
    },
    /// Start (or restart) a timer.
    StartTimer {
        /// Which timer. A running timer of the same kind is replaced.
        timer: TimerKind,
        /// Passed back in [`SessionEvent::TimerExpired`].
        token: u64,
        /// Delay before expiry.
        after: Duration,
    },
    /// Stop a timer if it is running.
    CancelTimer {
        /// Which timer.
        timer: TimerKind,
    },
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::SubmitPin { request_id, .. } => {
                write!(f, "SubmitPin({})", request_id.0)
            }
            Effect::ForceClockOut {
                workflow_id,
                active_record_id,
            } => write!(f, "ForceClockOut({}, record {})", workflow_id, active_record_id),
            Effect::ApproveShift { workflow_id, .. } => write!(f, "ApproveShift({})", workflow_id),
            Effect::StartTimer { timer, token, after } => {
                write!(f, "StartTimer({:?}, {}, {:?})", timer, token, after)
            }
            Effect::CancelTimer { timer } => write!(f, "CancelTimer({:?})", timer),
        }
    }
}

/// What the success view says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationKind {
    /// A shift started.
    ClockIn,
    /// A shift ended.
    ClockOut,
    /// The incumbent was forced out.
    ForcedClockOut,
    /// A dual shift was approved.
    DualShift,
}

/// Contents of the success view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// What happened.
    pub kind: ConfirmationKind,
    /// The employee the view addresses.
    pub employee: String,
    /// Full banner text.
    pub message: String,
    /// Recorded time, when the backend sent one.
    pub time: Option<String>,
}

impl Confirmation {
    fn clocked(employee_name: String, action: ClockAction, time: String) -> Self {
        let kind = match action {
            ClockAction::ClockIn => ConfirmationKind::ClockIn,
            ClockAction::ClockOut => ConfirmationKind::ClockOut,
        };
        Self {
            kind,
            message: format!(
                "{}, {}. {} at {}",
                action.greeting(),
                employee_name,
                action.caption(),
                time
            ),
            employee: employee_name,
            time: Some(time),
        }
    }

    fn resolved(resolution: Resolution) -> Self {
        let message = resolution.message().to_string();
        match resolution {
            Resolution::ForcedClockOut { incumbent } => Self {
                kind: ConfirmationKind::ForcedClockOut,
                employee: incumbent,
                message,
                time: None,
            },
            Resolution::DualShiftStarted { employee } => Self {
                kind: ConfirmationKind::DualShift,
                employee,
                message,
                time: None,
            },
        }
    }
}

/// Serializable view of the session for the kiosk shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewSnapshot {
    /// Main keypad, possibly with an error banner.
    Idle {
        /// Digits entered.
        pin_entered: usize,
        /// PIN length.
        pin_length: usize,
        /// True while a clock decision is outstanding.
        submitting: bool,
        /// Error banner text.
        error: Option<String>,
    },
    /// Success view.
    Success {
        /// What to show.
        confirmation: Confirmation,
    },
    /// Approval workflow.
    Approval(ApprovalSnapshot),
}

#[derive(Debug, Clone)]
enum View {
    Idle,
    Success {
        confirmation: Confirmation,
        token: u64,
    },
    Approval(ApprovalWorkflow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Clock(RequestId),
    Workflow(WorkflowId),
}

#[derive(Debug, Clone)]
struct Banner {
    text: String,
    token: u64,
}

/// The kiosk's single view-state container.
#[derive(Debug, Clone)]
pub struct Session {
    settings: KioskSettings,
    pin: PinBuffer,
    view: View,
    error: Option<Banner>,
    in_flight: Option<InFlight>,
    location: Option<Location>,
    next_request: u64,
    next_token: u64,
}

impl Session {
    /// A fresh session on the idle keypad.
    pub fn new(settings: KioskSettings) -> Self {
        Self {
            pin: PinBuffer::new(settings.pin_length),
            settings,
            view: View::Idle,
            error: None,
            in_flight: None,
            location: None,
            next_request: 0,
            next_token: 0,
        }
    }

    /// Returns true while any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The active workflow, if the approval view is showing.
    pub fn workflow(&self) -> Option<&ApprovalWorkflow> {
        match &self.view {
            View::Approval(workflow) => Some(workflow),
            _ => None,
        }
    }

    /// Applies one event and returns the effects to carry out.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        debug!(event = event.name(), "Session event");
        let mut effects = Vec::new();
        match event {
            SessionEvent::Digit(key) => self.on_digit(key, &mut effects),
            SessionEvent::Backspace => self.on_backspace(),
            SessionEvent::ClearPin => self.on_clear(),
            SessionEvent::DismissSuccess => self.dismiss_success(&mut effects),
            SessionEvent::ChooseApprove => {
                if let (None, View::Approval(workflow)) = (self.in_flight, &mut self.view) {
                    workflow.choose_approve();
                }
            }
            SessionEvent::Back => {
                if let View::Approval(workflow) = &mut self.view {
                    workflow.back();
                }
            }
            SessionEvent::Cancel => self.on_cancel(),
            SessionEvent::ForceClockOut => self.on_force_clockout(&mut effects),
            SessionEvent::SetReason(reason) => {
                if let View::Approval(workflow) = &mut self.view {
                    workflow.set_reason(reason);
                }
            }
            SessionEvent::SetLocation(location) => self.location = location,
            SessionEvent::ClockResolved {
                request_id,
                outcome,
            } => self.on_clock_resolved(request_id, outcome, &mut effects),
            SessionEvent::ForceClockOutResolved {
                workflow_id,
                result,
            } => self.on_workflow_resolved(workflow_id, &mut effects, |workflow| {
                workflow.finish_force_clockout(result)
            }),
            SessionEvent::ApprovalResolved {
                workflow_id,
                result,
            } => self.on_workflow_resolved(workflow_id, &mut effects, |workflow| {
                workflow.finish_approval(result)
            }),
            SessionEvent::TimerExpired { timer, token } => self.on_timer(timer, token),
        }
        effects
    }

    /// Renders the current state.
    pub fn snapshot(&self) -> ViewSnapshot {
        match &self.view {
            View::Idle => ViewSnapshot::Idle {
                pin_entered: self.pin.len(),
                pin_length: self.pin.capacity(),
                submitting: self.is_busy(),
                error: self.error.as_ref().map(|banner| banner.text.clone()),
            },
            View::Success { confirmation, .. } => ViewSnapshot::Success {
                confirmation: confirmation.clone(),
            },
            View::Approval(workflow) => ViewSnapshot::Approval(workflow.snapshot()),
        }
    }

    fn on_digit(&mut self, key: char, effects: &mut Vec<Effect>) {
        if self.is_busy() {
            return;
        }
        match &mut self.view {
            View::Success { .. } => {}
            View::Approval(workflow) => match workflow.push_digit(key) {
                ApproverPinInput::Submit(approval) => {
                    let workflow_id = workflow.id();
                    info!(workflow_id = %workflow_id, "Submitting dual shift approval");
                    self.in_flight = Some(InFlight::Workflow(workflow_id));
                    effects.push(Effect::ApproveShift {
                        workflow_id,
                        approval,
                    });
                }
                ApproverPinInput::Rejected(err) => {
                    info!(workflow_id = %workflow.id(), error = %err, "Approval rejected locally");
                }
                ApproverPinInput::Accepted | ApproverPinInput::Ignored => {}
            },
            View::Idle => {
                if let PinInput::Complete(pin) = self.pin.push(key) {
                    self.next_request += 1;
                    let request_id = RequestId(self.next_request);
                    if self.error.take().is_some() {
                        effects.push(Effect::CancelTimer {
                            timer: TimerKind::ErrorClear,
                        });
                    }
                    info!(request_id = request_id.0, "Submitting PIN");
                    self.in_flight = Some(InFlight::Clock(request_id));
                    effects.push(Effect::SubmitPin {
                        request_id,
                        pin,
                        location: self.location,
                    });
                }
            }
        }
    }

    fn on_backspace(&mut self) {
        if self.is_busy() {
            return;
        }
        match &mut self.view {
            View::Idle => {
                self.pin.backspace();
            }
            View::Approval(workflow) if workflow.step() == ApprovalStep::Approve => {
                workflow.backspace();
            }
            _ => {}
        }
    }

    fn on_clear(&mut self) {
        if self.is_busy() {
            return;
        }
        match &mut self.view {
            View::Idle => self.pin.clear(),
            View::Approval(workflow) => workflow.clear_pin(),
            View::Success { .. } => {}
        }
    }

    fn dismiss_success(&mut self, effects: &mut Vec<Effect>) {
        if matches!(self.view, View::Success { .. }) {
            self.view = View::Idle;
            effects.push(Effect::CancelTimer {
                timer: TimerKind::SuccessDismiss,
            });
        }
    }

    fn on_cancel(&mut self) {
        let cancellable = match &self.view {
            View::Approval(workflow) if workflow.can_cancel() => Some(workflow.id()),
            _ => None,
        };
        if let Some(workflow_id) = cancellable {
            info!(workflow_id = %workflow_id, "Approval workflow cancelled");
            self.view = View::Idle;
        }
    }

    fn on_force_clockout(&mut self, effects: &mut Vec<Effect>) {
        if self.is_busy() {
            return;
        }
        let View::Approval(workflow) = &mut self.view else {
            return;
        };
        if let Some(active_record_id) = workflow.begin_force_clockout() {
            let workflow_id = workflow.id();
            info!(workflow_id = %workflow_id, active_record_id, "Forcing clock-out");
            self.in_flight = Some(InFlight::Workflow(workflow_id));
            effects.push(Effect::ForceClockOut {
                workflow_id,
                active_record_id,
            });
        }
    }

    fn on_clock_resolved(
        &mut self,
        request_id: RequestId,
        outcome: ClockOutcome,
        effects: &mut Vec<Effect>,
    ) {
        if self.in_flight != Some(InFlight::Clock(request_id)) {
            warn!(request_id = request_id.0, "Dropping stale clock decision");
            return;
        }
        self.in_flight = None;
        info!(request_id = request_id.0, outcome = outcome.kind(), "Clock decision applied");

        match outcome {
            ClockOutcome::Success {
                employee_name,
                action,
                time,
            } => self.show_success(Confirmation::clocked(employee_name, action, time), effects),
            ClockOutcome::ApprovalRequired {
                requesting_employee,
                active_record,
            } => {
                self.clear_transients(effects);
                let workflow = ApprovalWorkflow::new(
                    requesting_employee,
                    active_record,
                    self.settings.pin_length,
                );
                info!(workflow_id = %workflow.id(), "Approval workflow started");
                self.view = View::Approval(workflow);
            }
            ClockOutcome::Failure { message } => {
                self.view = View::Idle;
                self.next_token += 1;
                let token = self.next_token;
                self.error = Some(Banner {
                    text: message,
                    token,
                });
                effects.push(Effect::StartTimer {
                    timer: TimerKind::ErrorClear,
                    token,
                    after: self.settings.error_display(),
                });
            }
        }
    }

    fn on_workflow_resolved<F>(
        &mut self,
        workflow_id: WorkflowId,
        effects: &mut Vec<Effect>,
        finish: F,
    ) where
        F: FnOnce(&mut ApprovalWorkflow) -> Option<Resolution>,
    {
        if self.in_flight == Some(InFlight::Workflow(workflow_id)) {
            self.in_flight = None;
        }
        let resolution = match &mut self.view {
            View::Approval(workflow) if workflow.id() == workflow_id => finish(workflow),
            _ => {
                warn!(workflow_id = %workflow_id, "Dropping response for inactive workflow");
                return;
            }
        };
        if let Some(resolution) = resolution {
            info!(workflow_id = %workflow_id, "Approval workflow resolved");
            self.show_success(Confirmation::resolved(resolution), effects);
        }
    }

    fn show_success(&mut self, confirmation: Confirmation, effects: &mut Vec<Effect>) {
        self.clear_transients(effects);
        self.next_token += 1;
        let token = self.next_token;
        self.view = View::Success {
            confirmation,
            token,
        };
        effects.push(Effect::StartTimer {
            timer: TimerKind::SuccessDismiss,
            token,
            after: self.settings.success_display(),
        });
    }

    fn clear_transients(&mut self, effects: &mut Vec<Effect>) {
        if self.error.take().is_some() {
            effects.push(Effect::CancelTimer {
                timer: TimerKind::ErrorClear,
            });
        }
        if matches!(self.view, View::Success { .. }) {
            effects.push(Effect::CancelTimer {
                timer: TimerKind::SuccessDismiss,
            });
        }
    }

    fn on_timer(&mut self, timer: TimerKind, token: u64) {
        match timer {
            TimerKind::SuccessDismiss => {
                if matches!(self.view, View::Success { token: current, .. } if current == token) {
                    self.view = View::Idle;
                }
            }
            TimerKind::ErrorClear => {
                if self.error.as_ref().is_some_and(|banner| banner.token == token) {
                    self.error = None;
                }
            }
        }
    }
}
