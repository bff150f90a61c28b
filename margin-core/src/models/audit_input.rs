use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Approximation used to turn a weekly schedule into monthly open hours.
pub const WEEKS_PER_MONTH: u32 = 4;

/// Values entered across the three audit steps.
///
/// `None` means "not filled in (or not readable) yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInput {
    // Step 1: the cost of existing
    pub fixed_cost_monthly: Option<Decimal>,
    pub open_hours_monthly: Option<Decimal>,

    // Step 2: the procedure
    pub procedure_name: String,
    pub procedure_price: Option<Decimal>,
    pub procedure_minutes: Option<u32>,

    // Step 3: variable costs
    pub taxes_percent: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub cmv_value: Option<Decimal>,
}

/// Fields the audit wizard accepts raw text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditField {
    FixedCost,
    OpenHours,
    ProcedureName,
    ProcedurePrice,
    ProcedureMinutes,
    TaxesPercent,
    CommissionPercent,
    MaterialsCost,
}

impl AuditField {
    pub fn all() -> &'static [AuditField] {
        &[
            AuditField::FixedCost,
            AuditField::OpenHours,
            AuditField::ProcedureName,
            AuditField::ProcedurePrice,
            AuditField::ProcedureMinutes,
            AuditField::TaxesPercent,
            AuditField::CommissionPercent,
            AuditField::MaterialsCost,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            AuditField::FixedCost => "fixed_cost",
            AuditField::OpenHours => "open_hours",
            AuditField::ProcedureName => "procedure_name",
            AuditField::ProcedurePrice => "procedure_price",
            AuditField::ProcedureMinutes => "procedure_minutes",
            AuditField::TaxesPercent => "taxes_percent",
            AuditField::CommissionPercent => "commission_percent",
            AuditField::MaterialsCost => "materials_cost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.key() == s)
    }
}

/// Weekly opening schedule used to derive monthly open hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSchedule {
    /// Open weekdays (Monday to Friday).
    pub weekdays: u32,
    /// Hours open on each of those weekdays.
    pub weekday_hours: u32,
    pub saturday_hours: Option<u32>,
    pub sunday_hours: Option<u32>,
}

impl OpenSchedule {
    /// Monthly open hours, or `None` when the weekday part is missing.
    ///
    /// `(weekdays * weekday_hours + saturday + sunday) * 4`
    pub fn monthly_hours(&self) -> Option<u32> {
        if self.weekdays == 0 || self.weekday_hours == 0 {
            return None;
        }

        let weekly = self
            .weekdays
            .checked_mul(self.weekday_hours)?
            .checked_add(self.saturday_hours.unwrap_or(0))?
            .checked_add(self.sunday_hours.unwrap_or(0))?;

        if weekly == 0 {
            return None;
        }
        weekly.checked_mul(WEEKS_PER_MONTH)
    }
}
