//! Per-procedure margin calculation.
//!
//! Turns the three audit steps into a profit breakdown for one procedure.
//!
//! # Calculation Structure
//!
//! | Step | Value | Formula |
//! |------|-------|---------|
//! | 1    | Cost per hour | fixed cost / monthly open hours (0 when hours is 0) |
//! | 2    | Room hours | minutes / 60, rounded **up** to a full hour (0 when minutes is 0) |
//! | 3    | Taxes, commission | percent / 100 x price |
//! | 4    | Contribution margin | price - taxes - materials - commission |
//! | 5    | Room cost | cost per hour x room hours |
//! | 6    | Net profit | contribution - room cost |
//! | 7    | Net margin | profit / price x 100 (0 when price is 0) |
//! | 8    | Chart profit | max(0, profit) |
//!
//! Room time always rounds up: a clinic pays for a full hour of the room
//! even for a five minute procedure.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use margin_core::calculations::compute_audit;
//! use margin_core::models::AuditInput;
//!
//! let input = AuditInput {
//!     fixed_cost_monthly: Some(dec!(3000)),
//!     open_hours_monthly: Some(dec!(160)),
//!     procedure_name: "Limpeza de pele".to_string(),
//!     procedure_price: Some(dec!(200)),
//!     procedure_minutes: Some(90),
//!     taxes_percent: Some(dec!(10)),
//!     commission_percent: Some(dec!(10)),
//!     cmv_value: Some(dec!(20)),
//! };
//!
//! let result = compute_audit(&input);
//!
//! assert_eq!(result.cost_per_hour, dec!(18.75));
//! assert_eq!(result.room_hours_rounded, 2);
//! assert_eq!(result.profit, dec!(102.5));
//! assert_eq!(result.margin_percent, dec!(51.25));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{max, percent_of, ratio};
use crate::models::{AuditInput, AuditResult};

const MINUTES_PER_HOUR: u32 = 60;

/// Computes the margin breakdown for `input`.
///
/// Absent fields read as zero. The function is pure and total: it never
/// panics and identical input always yields identical output. No
/// intermediate value is rounded.
pub fn compute_audit(input: &AuditInput) -> AuditResult {
    let fixed = input.fixed_cost_monthly.unwrap_or_default();
    let hours = input.open_hours_monthly.unwrap_or_default();
    let price = input.procedure_price.unwrap_or_default();
    let minutes = input.procedure_minutes.unwrap_or_default();
    let taxes_percent = input.taxes_percent.unwrap_or_default();
    let commission_percent = input.commission_percent.unwrap_or_default();
    let cmv = input.cmv_value.unwrap_or_default();

    let cost_per_hour = ratio(fixed, hours);
    let room_hours_raw = room_hours_raw(minutes);
    let room_hours_rounded = room_hours_rounded(minutes);

    let taxes = percent_of(taxes_percent, price);
    let commission = percent_of(commission_percent, price);
    let contribution = price
        .saturating_sub(taxes)
        .saturating_sub(cmv)
        .saturating_sub(commission);

    let room_cost = cost_per_hour.saturating_mul(Decimal::from(room_hours_rounded));
    let profit = contribution.saturating_sub(room_cost);
    let margin_percent = ratio(profit, price).saturating_mul(Decimal::ONE_HUNDRED);

    AuditResult {
        fixed,
        hours,
        procedure_name: input.procedure_name.clone(),
        price,
        minutes,
        taxes_percent,
        commission_percent,
        cmv,
        cost_per_hour,
        room_hours_raw,
        room_hours_rounded,
        taxes,
        commission,
        contribution,
        room_cost,
        profit,
        profit_for_chart: max(profit, Decimal::ZERO),
        margin_percent,
    }
}

/// Procedure duration in fractional hours.
pub fn room_hours_raw(minutes: u32) -> Decimal {
    ratio(Decimal::from(minutes), Decimal::from(MINUTES_PER_HOUR))
}

/// Procedure duration rounded up to whole hours; zero for zero minutes.
pub fn room_hours_rounded(minutes: u32) -> u32 {
    minutes.div_ceil(MINUTES_PER_HOUR)
}
