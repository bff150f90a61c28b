use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Financial breakdown of one procedure, derived from an [`AuditInput`].
///
/// Never persisted; recompute it whenever the input changes.
///
/// [`AuditInput`]: crate::models::AuditInput
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    // Echoed inputs (absent values read as zero)
    pub fixed: Decimal,
    pub hours: Decimal,
    pub procedure_name: String,
    pub price: Decimal,
    pub minutes: u32,
    pub taxes_percent: Decimal,
    pub commission_percent: Decimal,
    pub cmv: Decimal,

    // Derived values
    pub cost_per_hour: Decimal,
    pub room_hours_raw: Decimal,
    pub room_hours_rounded: u32,
    pub taxes: Decimal,
    pub commission: Decimal,
    pub contribution: Decimal,
    pub room_cost: Decimal,
    pub profit: Decimal,
    /// `profit` floored at zero; the chart never shows a negative slice.
    pub profit_for_chart: Decimal,
    pub margin_percent: Decimal,
}
