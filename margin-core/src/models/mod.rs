mod audit_input;
mod audit_result;
mod contact;
mod qualification;
mod view;

pub use audit_input::{AuditField, AuditInput, OpenSchedule, WEEKS_PER_MONTH};
pub use audit_result::AuditResult;
pub use contact::{
    COUNTRY_CODE, Contact, ContactField, ContactValidity, is_valid_email, normalize_phone_full,
    normalize_phone_national,
};
pub use qualification::{QualificationField, QualificationInput, YesNo};
pub use view::{StepIndicator, StepMarker, StepState, View, ViewChange};
