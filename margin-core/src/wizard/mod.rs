//! UI-agnostic step wizards.
//!
//! Each wizard owns its form state and returns a snapshot after every
//! operation. A renderer consumes the snapshot; the wizard never touches a
//! UI directly.

pub mod audit;
pub mod gate;
pub mod qualification;

pub use audit::{AUDIT_FORM_STEPS, AUDIT_TOTAL_STEPS, AuditSnapshot, AuditValidity, AuditWizard, StepHeader};
pub use gate::ContactGate;
pub use qualification::{
    QUALIFICATION_STEPS, QualificationSnapshot, QualificationValidity, QualificationWizard,
    SubmitOutcome,
};

/// Result of a navigation request.
///
/// `accepted` is false when the wizard refused the move (the current step
/// is incomplete); the snapshot then describes the unchanged state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    pub accepted: bool,
    pub snapshot: S,
}

impl<S> Transition<S> {
    pub fn accepted(snapshot: S) -> Self {
        Self {
            accepted: true,
            snapshot,
        }
    }

    pub fn refused(snapshot: S) -> Self {
        Self {
            accepted: false,
            snapshot,
        }
    }
}
