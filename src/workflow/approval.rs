//! Dual-shift approval workflow.
//!
//! Entered when a PIN entry conflicts with another employee's open shift.
//! The workflow starts in [`ApprovalStep::Decision`], where the kiosk can
//! force the incumbent out or move on to [`ApprovalStep::Approve`] to collect
//! a reason and the incumbent's PIN. Every transition is a plain method
//! call; network requests are described by return values and their results
//! are fed back through `finish_*`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ShiftApproval;
use crate::error::KioskError;
use crate::models::{ActiveRecord, EmployeeRef, PinBuffer, PinInput};

/// Shown when the approver PIN is completed before a reason was typed.
pub const REASON_REQUIRED_MESSAGE: &str = "Please enter a reason first";

/// Identifies one workflow instance. Responses for another id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the workflow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStep {
    /// Choose between force clock-out and dual-shift approval.
    Decision,
    /// Collect the reason and the incumbent's PIN.
    Approve,
}

/// How a workflow ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The incumbent was clocked out.
    ForcedClockOut {
        /// Name of the employee who was clocked out.
        incumbent: String,
    },
    /// The incumbent approved the overlap.
    DualShiftStarted {
        /// The employee whose shift overlaps.
        employee: String,
    },
}

impl Resolution {
    /// Banner text for the resolution.
    pub fn message(&self) -> &'static str {
        match self {
            Resolution::ForcedClockOut { .. } => "Forced clock out successful",
            Resolution::DualShiftStarted { .. } => "Dual shift started",
        }
    }
}

/// Result of a key on the approver keypad.
#[derive(Debug)]
pub enum ApproverPinInput {
    /// The digit was taken.
    Accepted,
    /// The key had no effect.
    Ignored,
    /// The PIN was complete but the reason was blank. Nothing is sent.
    Rejected(KioskError),
    /// The PIN was complete and the approval request should be sent.
    Submit(ShiftApproval),
}

/// One approval conflict from first prompt to resolution.
#[derive(Debug, Clone)]
pub struct ApprovalWorkflow {
    id: WorkflowId,
    requesting_employee: EmployeeRef,
    active_record: ActiveRecord,
    step: ApprovalStep,
    reason: String,
    approver_pin: PinBuffer,
    error: Option<String>,
    pending: bool,
}

impl ApprovalWorkflow {
    /// Starts a workflow in the decision step.
    pub fn new(
        requesting_employee: EmployeeRef,
        active_record: ActiveRecord,
        pin_length: usize,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            requesting_employee,
            active_record,
            step: ApprovalStep::Decision,
            reason: String::new(),
            approver_pin: PinBuffer::new(pin_length),
            error: None,
            pending: false,
        }
    }

    /// This instance's id.
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    /// Current step.
    pub fn step(&self) -> ApprovalStep {
        self.step
    }

    /// Reason typed so far.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Last error shown in the workflow, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true while a request from this workflow is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Cancel is only offered on the decision step.
    pub fn can_cancel(&self) -> bool {
        self.step == ApprovalStep::Decision
    }

    /// "Approve Dual Shift": moves to the approve step without any request.
    pub fn choose_approve(&mut self) -> bool {
        if self.step != ApprovalStep::Decision || self.pending {
            return false;
        }
        self.step = ApprovalStep::Approve;
        self.error = None;
        true
    }

    /// "Back": returns to the decision step. The typed reason is kept.
    pub fn back(&mut self) -> bool {
        if self.step != ApprovalStep::Approve || self.pending {
            return false;
        }
        self.step = ApprovalStep::Decision;
        self.approver_pin.clear();
        self.error = None;
        true
    }

    /// Replaces the reason text.
    pub fn set_reason(&mut self, reason: impl Into<String>) -> bool {
        if self.step != ApprovalStep::Approve || self.pending {
            return false;
        }
        self.reason = reason.into();
        true
    }

    /// Starts a force clock-out. Returns the record to clock out, or `None`
    /// when the action is unavailable.
    pub fn begin_force_clockout(&mut self) -> Option<i64> {
        if self.step != ApprovalStep::Decision || self.pending {
            return None;
        }
        self.pending = true;
        self.error = None;
        Some(self.active_record.id)
    }

    /// Applies the force clock-out result. Failure keeps the workflow on the
    /// decision step with `message` shown.
    pub fn finish_force_clockout(&mut self, result: Result<(), String>) -> Option<Resolution> {
        self.pending = false;
        match result {
            Ok(()) => Some(Resolution::ForcedClockOut {
                incumbent: self.active_record.employee_name.clone(),
            }),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    /// Feeds a key to the approver keypad.
    ///
    /// # Examples
    ///
    /// ```
    /// use workclock_kiosk::models::{ActiveRecord, EmployeeRef};
    /// use workclock_kiosk::workflow::{ApprovalWorkflow, ApproverPinInput};
    ///
    /// let mut workflow = ApprovalWorkflow::new(
    ///     EmployeeRef { id: 2, name: "Bob".to_string() },
    ///     ActiveRecord {
    ///         id: 9,
    ///         employee_id: 1,
    ///         employee_name: "Alice".to_string(),
    ///         clock_in: "08:00 AM".to_string(),
    ///     },
    ///     4,
    /// );
    /// workflow.choose_approve();
    /// workflow.set_reason("Overlap for handover");
    /// for digit in ['1', '1', '1'] {
    ///     workflow.push_digit(digit);
    /// }
    /// match workflow.push_digit('1') {
    ///     ApproverPinInput::Submit(approval) => assert_eq!(approval.approver_id, 1),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn push_digit(&mut self, key: char) -> ApproverPinInput {
        if self.step != ApprovalStep::Approve || self.pending {
            return ApproverPinInput::Ignored;
        }
        match self.approver_pin.push(key) {
            PinInput::Accepted => ApproverPinInput::Accepted,
            PinInput::Ignored => ApproverPinInput::Ignored,
            PinInput::Complete(pin) => {
                let reason = self.reason.trim();
                if reason.is_empty() {
                    self.error = Some(REASON_REQUIRED_MESSAGE.to_string());
                    return ApproverPinInput::Rejected(KioskError::Validation {
                        message: REASON_REQUIRED_MESSAGE.to_string(),
                    });
                }
                let approval = ShiftApproval {
                    approver_id: self.active_record.employee_id,
                    new_employee_id: self.requesting_employee.id,
                    approver_pin: pin,
                    reason: reason.to_string(),
                };
                self.pending = true;
                self.error = None;
                ApproverPinInput::Submit(approval)
            }
        }
    }

    /// Removes the last approver digit.
    pub fn backspace(&mut self) -> bool {
        self.step == ApprovalStep::Approve && !self.pending && self.approver_pin.backspace()
    }

    /// Clears the approver keypad.
    pub fn clear_pin(&mut self) {
        if self.step == ApprovalStep::Approve && !self.pending {
            self.approver_pin.clear();
        }
    }

    /// Applies the dual-shift approval result. Failure keeps the workflow on
    /// the approve step, with the reason intact and `message` shown.
    pub fn finish_approval(&mut self, result: Result<(), String>) -> Option<Resolution> {
        self.pending = false;
        match result {
            Ok(()) => Some(Resolution::DualShiftStarted {
                employee: self.requesting_employee.name.clone(),
            }),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    /// Renders the workflow for the kiosk shell.
    pub fn snapshot(&self) -> ApprovalSnapshot {
        ApprovalSnapshot {
            workflow_id: self.id,
            step: self.step,
            active_record_id: self.active_record.id,
            incumbent: self.active_record.employee_name.clone(),
            incumbent_since: self.active_record.clock_in_display(),
            requesting: self.requesting_employee.name.clone(),
            reason: self.reason.clone(),
            pin_entered: self.approver_pin.len(),
            pin_length: self.approver_pin.capacity(),
            error: self.error.clone(),
            pending: self.pending,
        }
    }
}

/// What the kiosk shell needs to draw an approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSnapshot {
    /// Instance id.
    pub workflow_id: WorkflowId,
    /// Current step.
    pub step: ApprovalStep,
    /// The incumbent's record id.
    pub active_record_id: i64,
    /// Name of the employee currently clocked in.
    pub incumbent: String,
    /// When the incumbent clocked in, for display.
    pub incumbent_since: String,
    /// Name of the employee who entered the PIN.
    pub requesting: String,
    /// Reason typed so far.
    pub reason: String,
    /// Approver digits entered.
    pub pin_entered: usize,
    /// Approver PIN length.
    pub pin_length: usize,
    /// Error to show, if any.
    pub error: Option<String>,
    /// True while a request is outstanding; submit buttons are disabled.
    pub pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> ApprovalWorkflow {
        ApprovalWorkflow::new(
            EmployeeRef {
                id: 2,
                name: "Bob".to_string(),
            },
            ActiveRecord {
                id: 9,
                employee_id: 1,
                employee_name: "Alice".to_string(),
                clock_in: "08:00 AM".to_string(),
            },
            4,
        )
    }

    fn type_pin(workflow: &mut ApprovalWorkflow, pin: &str) -> ApproverPinInput {
        let mut last = ApproverPinInput::Ignored;
        for digit in pin.chars() {
            last = workflow.push_digit(digit);
        }
        last
    }

    #[test]
    fn test_starts_in_decision_referencing_incumbent() {
        let workflow = workflow();
        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.step, ApprovalStep::Decision);
        assert_eq!(snapshot.incumbent, "Alice");
        assert_eq!(snapshot.active_record_id, 9);
        assert_eq!(snapshot.requesting, "Bob");
        assert!(workflow.can_cancel());
    }

    #[test]
    fn test_each_workflow_has_its_own_id() {
        assert_ne!(workflow().id(), workflow().id());
    }

    #[test]
    fn test_digits_ignored_on_decision_step() {
        let mut workflow = workflow();
        assert!(matches!(workflow.push_digit('1'), ApproverPinInput::Ignored));
        assert_eq!(workflow.snapshot().pin_entered, 0);
    }

    #[test]
    fn test_force_clockout_success_resolves() {
        let mut workflow = workflow();
        assert_eq!(workflow.begin_force_clockout(), Some(9));
        assert!(workflow.is_pending());
        assert_eq!(workflow.begin_force_clockout(), None);

        let resolution = workflow.finish_force_clockout(Ok(()));
        assert_eq!(
            resolution,
            Some(Resolution::ForcedClockOut {
                incumbent: "Alice".to_string()
            })
        );
        assert_eq!(
            resolution.unwrap().message(),
            "Forced clock out successful"
        );
    }

    #[test]
    fn test_force_clockout_failure_stays_in_decision() {
        let mut workflow = workflow();
        workflow.begin_force_clockout();
        let resolution =
            workflow.finish_force_clockout(Err("Failed to clock out user.".to_string()));
        assert!(resolution.is_none());
        assert_eq!(workflow.step(), ApprovalStep::Decision);
        assert_eq!(workflow.error(), Some("Failed to clock out user."));
        assert!(!workflow.is_pending());
        assert_eq!(workflow.begin_force_clockout(), Some(9));
    }

    #[test]
    fn test_force_clockout_unavailable_on_approve_step() {
        let mut workflow = workflow();
        workflow.choose_approve();
        assert_eq!(workflow.begin_force_clockout(), None);
    }

    #[test]
    fn test_empty_reason_rejects_without_request() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.set_reason("   ");

        match type_pin(&mut workflow, "1111") {
            ApproverPinInput::Rejected(KioskError::Validation { message }) => {
                assert_eq!(message, REASON_REQUIRED_MESSAGE)
            }
            other => panic!("expected validation rejection, got {:?}", other),
        }
        assert!(!workflow.is_pending());
        assert_eq!(workflow.error(), Some(REASON_REQUIRED_MESSAGE));
        assert_eq!(workflow.snapshot().pin_entered, 0);
    }

    #[test]
    fn test_approval_uses_incumbent_as_approver() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.set_reason("  Training overlap ");

        match type_pin(&mut workflow, "4321") {
            ApproverPinInput::Submit(approval) => {
                assert_eq!(approval.approver_id, 1);
                assert_eq!(approval.new_employee_id, 2);
                assert_eq!(approval.approver_pin, "4321");
                assert_eq!(approval.reason, "Training overlap");
            }
            other => panic!("expected submit, got {:?}", other),
        }
        assert!(workflow.is_pending());
        assert!(matches!(workflow.push_digit('1'), ApproverPinInput::Ignored));
        assert!(!workflow.back());
    }

    #[test]
    fn test_approval_failure_keeps_reason_and_step() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.set_reason("Handover");
        type_pin(&mut workflow, "0000");

        assert!(workflow.finish_approval(Err("bad pin".to_string())).is_none());
        assert_eq!(workflow.step(), ApprovalStep::Approve);
        assert_eq!(workflow.error(), Some("bad pin"));
        assert_eq!(workflow.reason(), "Handover");
        assert_eq!(workflow.snapshot().pin_entered, 0);
        assert!(matches!(workflow.push_digit('5'), ApproverPinInput::Accepted));
    }

    #[test]
    fn test_approval_success_resolves_dual_shift() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.set_reason("Handover");
        type_pin(&mut workflow, "1111");

        let resolution = workflow.finish_approval(Ok(())).unwrap();
        assert_eq!(resolution.message(), "Dual shift started");
    }

    #[test]
    fn test_back_returns_to_decision_and_clears_pin() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.set_reason("Handover");
        workflow.push_digit('1');
        workflow.push_digit('2');

        assert!(workflow.back());
        assert_eq!(workflow.step(), ApprovalStep::Decision);
        assert_eq!(workflow.snapshot().pin_entered, 0);
        assert_eq!(workflow.reason(), "Handover");
        assert!(workflow.can_cancel());
    }

    #[test]
    fn test_reason_only_editable_on_approve_step() {
        let mut workflow = workflow();
        assert!(!workflow.set_reason("early"));
        workflow.choose_approve();
        assert!(workflow.set_reason("Handover"));
        assert_eq!(workflow.reason(), "Handover");
    }

    #[test]
    fn test_backspace_and_clear_on_approver_pad() {
        let mut workflow = workflow();
        workflow.choose_approve();
        workflow.push_digit('1');
        workflow.push_digit('2');
        assert!(workflow.backspace());
        assert_eq!(workflow.snapshot().pin_entered, 1);
        workflow.clear_pin();
        assert_eq!(workflow.snapshot().pin_entered, 0);
        assert!(!workflow.backspace());
    }
}
