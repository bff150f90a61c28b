//! The three-step audit wizard.
//!
//! | Step | Title | Fields |
//! |------|-------|--------|
//! | 1    | O Custo de Existir | fixed cost, open hours |
//! | 2    | O Procedimento | name, price, minutes |
//! | 3    | Custos Variáveis | taxes %, commission %, materials |
//!
//! The progress indicator has a fourth, virtual step for the result screen.
//! Forward moves are gated by `ok1 ⊆ ok2 ⊆ ok3`; back moves always succeed.
//! Finishing step 3 never advances by itself: it only allows the contact
//! gate to open.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::{compute_audit, format_brl, room_hours_rounded};
use crate::models::{AuditField, AuditInput, AuditResult, OpenSchedule, StepIndicator};
use crate::parse::{clamp, parse_integer, parse_localized_number};

use super::Transition;

/// Data-entry steps.
pub const AUDIT_FORM_STEPS: u8 = 3;

/// Indicator steps: the data steps plus the result.
pub const AUDIT_TOTAL_STEPS: u8 = 4;

/// Longest minutes value accepted, in digits.
const MAX_MINUTES_DIGITS: usize = 4;

/// Cumulative validity of the audit steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditValidity {
    pub ok1: bool,
    pub ok2: bool,
    pub ok3: bool,
}

impl AuditValidity {
    /// Whether the given data step (1..=3) is complete.
    pub fn step(
        &self,
        step: u8,
    ) -> bool {
        match step {
            1 => self.ok1,
            2 => self.ok2,
            3 => self.ok3,
            _ => false,
        }
    }
}

/// Title and description shown above a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHeader {
    pub title: &'static str,
    pub description: &'static str,
}

impl StepHeader {
    pub fn for_step(step: u8) -> Self {
        match step {
            2 => StepHeader {
                title: "O Procedimento",
                description: "Agora vamos entender quanto esse procedimento paga de verdade para a sua clínica.",
            },
            3 => StepHeader {
                title: "Custos Variáveis",
                description: "Impostos, comissão e materiais: o que sai do caixa em cada atendimento.",
            },
            _ => StepHeader {
                title: "O Custo de Existir",
                description: "Antes de atender qualquer paciente, sua clínica já tem um custo por hora.",
            },
        }
    }
}

/// Everything a renderer needs to draw the audit wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSnapshot {
    pub step: u8,
    pub header: StepHeader,
    pub indicator: StepIndicator,
    pub validity: AuditValidity,
    /// Field that should receive input focus.
    pub focus: AuditField,
    /// Formatted cost per hour, present once step 1 is complete.
    pub hourly_cost_preview: Option<String>,
    /// Room hours billed for the procedure, present once step 2 is complete.
    pub rounded_hours_preview: Option<u32>,
    /// Monthly open hours derived from the schedule, when one was set.
    pub open_hours_preview: Option<u32>,
}

impl AuditSnapshot {
    /// Whether the green callout of `step` is visible.
    pub fn callout_visible(
        &self,
        step: u8,
    ) -> bool {
        self.validity.step(step)
    }
}

/// Owner of the audit form state and its current step.
#[derive(Debug, Clone)]
pub struct AuditWizard {
    input: AuditInput,
    schedule: Option<OpenSchedule>,
    step: u8,
    validity: AuditValidity,
}

impl Default for AuditWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditWizard {
    pub fn new() -> Self {
        Self {
            input: AuditInput::default(),
            schedule: None,
            step: 1,
            validity: AuditValidity::default(),
        }
    }

    pub fn input(&self) -> &AuditInput {
        &self.input
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn validity(&self) -> AuditValidity {
        self.validity
    }

    /// Reads raw form text into `field` and revalidates.
    pub fn set_field(
        &mut self,
        field: AuditField,
        raw: &str,
    ) -> AuditSnapshot {
        let input = &mut self.input;
        match field {
            AuditField::FixedCost => input.fixed_cost_monthly = non_negative(raw),
            AuditField::OpenHours => {
                self.schedule = None;
                input.open_hours_monthly = positive(raw);
            }
            AuditField::ProcedureName => input.procedure_name = raw.trim().to_string(),
            AuditField::ProcedurePrice => input.procedure_price = non_negative(raw),
            AuditField::ProcedureMinutes => {
                let digits: String = raw
                    .chars()
                    .filter(char::is_ascii_digit)
                    .take(MAX_MINUTES_DIGITS)
                    .collect();
                input.procedure_minutes = parse_integer(&digits);
            }
            AuditField::TaxesPercent => input.taxes_percent = percent(raw),
            AuditField::CommissionPercent => input.commission_percent = percent(raw),
            AuditField::MaterialsCost => input.cmv_value = non_negative(raw),
        }

        self.validate();
        self.snapshot()
    }

    /// Derives monthly open hours from a weekly schedule and revalidates.
    pub fn set_schedule(
        &mut self,
        schedule: OpenSchedule,
    ) -> AuditSnapshot {
        self.schedule = Some(schedule);
        self.input.open_hours_monthly = schedule.monthly_hours().map(Decimal::from);

        self.validate();
        self.snapshot()
    }

    /// Recomputes the cumulative step flags from the current input.
    pub fn validate(&mut self) -> AuditValidity {
        self.validity = validate(&self.input);
        self.validity
    }

    /// Enters step `n` (clamped into `1..=3`) unconditionally.
    pub fn set_step(
        &mut self,
        n: u8,
    ) -> AuditSnapshot {
        self.step = n.clamp(1, AUDIT_FORM_STEPS);
        self.validate();
        debug!(step = self.step, "audit step entered");
        self.snapshot()
    }

    /// Moves forward one step when the current step is complete.
    ///
    /// On step 3 there is nowhere to go; use [`request_unlock`] instead.
    ///
    /// [`request_unlock`]: AuditWizard::request_unlock
    pub fn next(&mut self) -> Transition<AuditSnapshot> {
        let validity = self.validate();
        if self.step >= AUDIT_FORM_STEPS || !validity.step(self.step) {
            return Transition::refused(self.snapshot());
        }
        Transition::accepted(self.set_step(self.step + 1))
    }

    /// Moves back one step. Always accepted, except on step 1.
    pub fn back(&mut self) -> Transition<AuditSnapshot> {
        if self.step <= 1 {
            return Transition::refused(self.snapshot());
        }
        Transition::accepted(self.set_step(self.step - 1))
    }

    /// Whether the contact gate may open: all three steps are complete.
    pub fn request_unlock(&mut self) -> bool {
        self.validate().ok3
    }

    /// Clears every field and returns to step 1.
    pub fn reset(&mut self) -> AuditSnapshot {
        self.input = AuditInput::default();
        self.schedule = None;
        self.set_step(1)
    }

    /// The margin breakdown for the current input.
    pub fn result(&self) -> AuditResult {
        compute_audit(&self.input)
    }

    pub fn snapshot(&self) -> AuditSnapshot {
        let validity = self.validity;

        let hourly_cost_preview = validity
            .ok1
            .then(|| format_brl(self.result().cost_per_hour, 2));

        let rounded_hours_preview = self
            .input
            .procedure_minutes
            .filter(|_| validity.ok2)
            .map(room_hours_rounded);

        AuditSnapshot {
            step: self.step,
            header: StepHeader::for_step(self.step),
            indicator: StepIndicator::new(self.step, AUDIT_TOTAL_STEPS),
            validity,
            focus: focus_field(self.step),
            hourly_cost_preview,
            rounded_hours_preview,
            open_hours_preview: self.schedule.and_then(|s| s.monthly_hours()),
        }
    }
}

/// Cumulative validation of the audit input.
pub fn validate(input: &AuditInput) -> AuditValidity {
    let positive = |value: Option<Decimal>| value.is_some_and(|v| v > Decimal::ZERO);

    let ok1 = positive(input.fixed_cost_monthly) && positive(input.open_hours_monthly);

    let ok2 = ok1
        && input.procedure_name.chars().count() >= 2
        && positive(input.procedure_price)
        && input.procedure_minutes.is_some_and(|m| m > 0);

    let ok3 = ok2
        && input.taxes_percent.is_some()
        && input.commission_percent.is_some()
        && input.cmv_value.is_some_and(|v| v >= Decimal::ZERO);

    AuditValidity { ok1, ok2, ok3 }
}

fn focus_field(step: u8) -> AuditField {
    match step {
        2 => AuditField::ProcedureName,
        3 => AuditField::TaxesPercent,
        _ => AuditField::FixedCost,
    }
}

/// Money field: negative amounts are rejected, not coerced.
fn non_negative(raw: &str) -> Option<Decimal> {
    parse_localized_number(raw).filter(|v| !v.is_sign_negative())
}

/// Hours field: separators follow the money format, so `160,5` is 160.5.
fn positive(raw: &str) -> Option<Decimal> {
    parse_localized_number(raw).filter(|v| *v > Decimal::ZERO)
}

/// Percent field: negative rejected, above 100 clamped.
fn percent(raw: &str) -> Option<Decimal> {
    clamp(non_negative(raw), Decimal::ZERO, Decimal::ONE_HUNDRED)
}
