//! Presentation data derived from an [`AuditResult`]: status verdict, chart
//! slices, income statement lines and pt-BR number formatting.
//!
//! Nothing here draws anything; a renderer consumes these values.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{max, ratio, round_half_up};
use crate::models::AuditResult;

/// Margin at or above which the procedure is considered healthy.
pub const HEALTHY_MARGIN_PERCENT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Margin at or above which the procedure is tight rather than at a loss.
pub const TIGHT_MARGIN_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Verdict shown on the result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginStatus {
    Healthy,
    Tight,
    Loss,
}

impl MarginStatus {
    pub fn classify(margin_percent: Decimal) -> Self {
        if margin_percent >= HEALTHY_MARGIN_PERCENT {
            MarginStatus::Healthy
        } else if margin_percent >= TIGHT_MARGIN_PERCENT {
            MarginStatus::Tight
        } else {
            MarginStatus::Loss
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MarginStatus::Healthy => "Parabéns! Sua margem está saudável.",
            MarginStatus::Tight => "Atenção: sua margem está apertada.",
            MarginStatus::Loss => "Alerta: você pode estar no prejuízo.",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            MarginStatus::Healthy => {
                "Sua precificação está no caminho certo! Continue monitorando para manter essa margem saudável."
            }
            MarginStatus::Tight => {
                "Pequenos ajustes em comissão, custos e tempo de sala podem mudar bastante seu lucro real."
            }
            MarginStatus::Loss => {
                "Revisar impostos/taxas, comissão, materiais e custo de sala é urgente para não pagar para trabalhar."
            }
        }
    }
}

/// Identifies a slice of the revenue chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Taxes,
    Cmv,
    Commission,
    Room,
    Profit,
}

impl SliceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SliceKind::Taxes => "Impostos/Taxas",
            SliceKind::Cmv => "Materiais (CMV)",
            SliceKind::Commission => "Comissão",
            SliceKind::Room => "Custo da Sala",
            SliceKind::Profit => "Seu Lucro",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SliceKind::Taxes => "#F59E0B",
            SliceKind::Cmv => "#F97316",
            SliceKind::Commission => "#1E3A8A",
            SliceKind::Room => "#9CA3AF",
            SliceKind::Profit => "#10B981",
        }
    }
}

/// One slice of the revenue chart with its share of the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub kind: SliceKind,
    /// Never negative.
    pub value: Decimal,
    /// `value / price * 100`, zero when the price is zero.
    pub percent_of_revenue: Decimal,
}

/// Splits the price into the five chart slices, in display order.
pub fn breakdown_slices(result: &AuditResult) -> Vec<ChartSlice> {
    [
        (SliceKind::Taxes, result.taxes),
        (SliceKind::Cmv, result.cmv),
        (SliceKind::Commission, result.commission),
        (SliceKind::Room, result.room_cost),
        (SliceKind::Profit, result.profit_for_chart),
    ]
    .into_iter()
    .map(|(kind, value)| {
        let value = max(value, Decimal::ZERO);
        ChartSlice {
            kind,
            value,
            percent_of_revenue: ratio(value, result.price).saturating_mul(Decimal::ONE_HUNDRED),
        }
    })
    .collect()
}

/// One line of the per-procedure income statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    pub label: &'static str,
    pub amount: String,
}

/// Income statement lines, already formatted; deductions carry a leading `-`.
pub fn income_statement(result: &AuditResult) -> Vec<StatementLine> {
    let deduction = |value: Decimal| format!("-{}", format_brl(value, 2));

    vec![
        StatementLine {
            label: "Receita",
            amount: format_brl(result.price, 2),
        },
        StatementLine {
            label: "Impostos/Taxas",
            amount: deduction(result.taxes),
        },
        StatementLine {
            label: "Materiais (CMV)",
            amount: deduction(result.cmv),
        },
        StatementLine {
            label: "Comissão",
            amount: deduction(result.commission),
        },
        StatementLine {
            label: "Margem de contribuição",
            amount: format_brl(result.contribution, 2),
        },
        StatementLine {
            label: "Custo da sala",
            amount: deduction(result.room_cost),
        },
        StatementLine {
            label: "Lucro líquido",
            amount: format_brl(result.profit, 2),
        },
        StatementLine {
            label: "Margem líquida",
            amount: format_pct(result.margin_percent, 1),
        },
    ]
}

/// Formats a value as Brazilian reais: `R$ 1.234,56`.
///
/// Rounds half away from zero; negative values get a leading `-`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::calculations::format_brl;
///
/// assert_eq!(format_brl(dec!(1234.565), 2), "R$ 1.234,57");
/// assert_eq!(format_brl(dec!(-18.75), 2), "-R$ 18,75");
/// ```
pub fn format_brl(
    value: Decimal,
    decimals: u32,
) -> String {
    let rounded = round_half_up(value, decimals);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let mut out = format!("{sign}R$ {}", group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Formats a percentage with a dot decimal: `51.3%`.
pub fn format_pct(
    value: Decimal,
    decimals: u32,
) -> String {
    let rounded = round_half_up(value, decimals);
    format!("{:.*}%", decimals as usize, rounded)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::compute_audit;
    use crate::models::AuditInput;

    fn sample_result() -> AuditResult {
        compute_audit(&AuditInput {
            fixed_cost_monthly: Some(dec!(3000)),
            open_hours_monthly: Some(dec!(160)),
            procedure_name: "Botox".to_string(),
            procedure_price: Some(dec!(200)),
            procedure_minutes: Some(90),
            taxes_percent: Some(dec!(10)),
            commission_percent: Some(dec!(10)),
            cmv_value: Some(dec!(20)),
        })
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(MarginStatus::classify(dec!(51.25)), MarginStatus::Healthy);
        assert_eq!(MarginStatus::classify(dec!(25)), MarginStatus::Healthy);
        assert_eq!(MarginStatus::classify(dec!(24.99)), MarginStatus::Tight);
        assert_eq!(MarginStatus::classify(dec!(10)), MarginStatus::Tight);
        assert_eq!(MarginStatus::classify(dec!(9.9)), MarginStatus::Loss);
        assert_eq!(MarginStatus::classify(dec!(-40)), MarginStatus::Loss);
    }

    #[test]
    fn slices_share_revenue() {
        let slices = breakdown_slices(&sample_result());

        let shares: Vec<_> = slices
            .iter()
            .map(|s| (s.kind, s.percent_of_revenue))
            .collect();

        assert_eq!(
            shares,
            vec![
                (SliceKind::Taxes, dec!(10)),
                (SliceKind::Cmv, dec!(10)),
                (SliceKind::Commission, dec!(10)),
                (SliceKind::Room, dec!(18.75)),
                (SliceKind::Profit, dec!(51.25)),
            ]
        );
    }

    #[test]
    fn slices_are_zero_share_without_price() {
        let result = compute_audit(&AuditInput::default());

        assert!(
            breakdown_slices(&result)
                .iter()
                .all(|s| s.percent_of_revenue.is_zero())
        );
    }

    #[test]
    fn statement_lists_deductions_with_minus() {
        let lines = income_statement(&sample_result());

        let rendered: Vec<_> = lines
            .iter()
            .map(|l| format!("{}: {}", l.label, l.amount))
            .collect();

        assert_eq!(
            rendered,
            vec![
                "Receita: R$ 200,00",
                "Impostos/Taxas: -R$ 20,00",
                "Materiais (CMV): -R$ 20,00",
                "Comissão: -R$ 20,00",
                "Margem de contribuição: R$ 140,00",
                "Custo da sala: -R$ 37,50",
                "Lucro líquido: R$ 102,50",
                "Margem líquida: 51.3%",
            ]
        );
    }

    #[test]
    fn brl_groups_thousands() {
        assert_eq!(format_brl(dec!(0), 2), "R$ 0,00");
        assert_eq!(format_brl(dec!(999), 2), "R$ 999,00");
        assert_eq!(format_brl(dec!(1000), 2), "R$ 1.000,00");
        assert_eq!(format_brl(dec!(1234567.891), 2), "R$ 1.234.567,89");
    }

    #[test]
    fn brl_without_decimals() {
        assert_eq!(format_brl(dec!(3000.4), 0), "R$ 3.000");
    }

    #[test]
    fn brl_negative_zero_has_no_sign() {
        assert_eq!(format_brl(dec!(-0.001), 2), "R$ 0,00");
    }

    #[test]
    fn pct_uses_dot_decimal() {
        assert_eq!(format_pct(dec!(51.25), 1), "51.3%");
        assert_eq!(format_pct(dec!(0), 1), "0.0%");
        assert_eq!(format_pct(dec!(-12.34), 1), "-12.3%");
    }
}
