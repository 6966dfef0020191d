//! Two-phase confirmation workflow for conflicting mutations.
//!
//! Every destructive schedule mutation follows the same protocol: attempt
//! without override, surface the collisions to the operator, then either
//! re-attempt with override (cancelling the colliding bookings) or abandon
//! the change. [`ConflictWorkflow`] captures that protocol once so callers
//! cannot skip the unforced attempt or commit without an explicit decision.

use std::future::Future;

use tracing::debug;

use crate::error::{Result, SlotbookError};
use crate::schedule::types::{ConflictReport, Outcome};

/// Where a proposed mutation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing attempted yet.
    Idle,
    /// The unforced attempt collided; awaiting the operator's decision.
    PendingConfirmation,
    /// The mutation was applied (directly or after override).
    Committed,
    /// The operator abandoned the mutation.
    Cancelled,
}

/// Drives one mutation through propose / confirm / cancel.
///
/// The action is invoked with the override flag: `false` on
/// [`propose`](Self::propose), `true` on [`confirm`](Self::confirm). The same
/// closure runs both times, so the confirm path re-fetches state and re-detects
/// conflicts rather than trusting the earlier report.
pub struct ConflictWorkflow<A> {
    action: A,
    state: WorkflowState,
    report: Option<ConflictReport>,
}

impl<A> ConflictWorkflow<A> {
    /// Wrap a mutation in the confirmation protocol.
    pub fn new(action: A) -> Self {
        Self {
            action,
            state: WorkflowState::Idle,
            report: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The conflict report from the unforced attempt, while pending.
    pub fn report(&self) -> Option<&ConflictReport> {
        self.report.as_ref()
    }

    /// Abandon the pending mutation. Nothing was written.
    pub fn cancel(&mut self) -> Result<()> {
        if self.state != WorkflowState::PendingConfirmation {
            return Err(SlotbookError::Validation(
                "nothing is pending confirmation".into(),
            ));
        }
        self.state = WorkflowState::Cancelled;
        self.report = None;
        Ok(())
    }
}

impl<T, A, Fut> ConflictWorkflow<A>
where
    A: Fn(bool) -> Fut,
    Fut: Future<Output = Result<Outcome<T>>>,
{
    /// Attempt the mutation without override.
    ///
    /// Applies and commits when nothing collides; otherwise stores the report
    /// and moves to [`WorkflowState::PendingConfirmation`] with nothing
    /// written.
    pub async fn propose(&mut self) -> Result<Option<T>> {
        if self.state != WorkflowState::Idle {
            return Err(SlotbookError::Validation(
                "workflow already proposed".into(),
            ));
        }
        match (self.action)(false).await? {
            Outcome::Applied(value) => {
                self.state = WorkflowState::Committed;
                Ok(Some(value))
            }
            Outcome::Conflict(report) => {
                debug!(bookings = report.bookings.len(), "mutation pending confirmation");
                self.report = Some(report);
                self.state = WorkflowState::PendingConfirmation;
                Ok(None)
            }
        }
    }

    /// Re-attempt with override, cancelling the colliding bookings.
    ///
    /// Only valid while pending. A conflict surfacing even under override
    /// means the action ignored the flag, which is a caller bug.
    pub async fn confirm(&mut self) -> Result<T> {
        if self.state != WorkflowState::PendingConfirmation {
            return Err(SlotbookError::Validation(
                "nothing is pending confirmation".into(),
            ));
        }
        match (self.action)(true).await? {
            Outcome::Applied(value) => {
                self.state = WorkflowState::Committed;
                self.report = None;
                Ok(value)
            }
            Outcome::Conflict(_) => Err(SlotbookError::Validation(
                "action reported a conflict despite override".into(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
