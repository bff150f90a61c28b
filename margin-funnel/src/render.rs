//! Plain-text rendering of funnel state.

use std::fmt::Write;

use margin_core::calculations::{
    MarginStatus, breakdown_slices, format_brl, format_pct, income_statement,
};
use margin_core::models::{
    AuditInput, AuditResult, ContactValidity, QualificationInput, StepIndicator, StepState, View,
    ViewChange, YesNo,
};
use margin_core::wizard::{AuditSnapshot, ContactGate, QualificationSnapshot};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::funnel::{Funnel, Update};

const BAR_WIDTH: usize = 30;

pub fn render_update(
    funnel: &Funnel,
    update: &Update,
) -> String {
    match update {
        Update::View(change) => render_view(funnel, change),
        Update::Audit(transition) => {
            let mut out = String::new();
            if !transition.accepted {
                out.push_str("(etapa incompleta)\n");
            }
            out.push_str(&render_audit(&transition.snapshot, funnel.audit().input()));
            out
        }
        Update::Gate(_) => render_gate(funnel.gate()),
        Update::Qualification(transition) => {
            let mut out = String::new();
            if !transition.accepted {
                out.push_str("(etapa incompleta)\n");
            }
            out.push_str(&render_qualification(
                &transition.snapshot,
                funnel.qualification().input(),
            ));
            out
        }
        Update::Closed => "(fechado)\n".to_string(),
        Update::Ignored => String::new(),
    }
}

pub fn render_view(
    funnel: &Funnel,
    change: &ViewChange,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== {} ===", view_title(change.view));
    if let Some(indicator) = &change.indicator {
        let _ = writeln!(out, "{}", render_indicator(indicator));
    }

    match change.view {
        View::Home => out.push_str(
            "Descubra quanto cada procedimento realmente deixa no seu caixa.\n\
             Digite `start` para começar a auditoria.\n",
        ),
        View::Audit => out.push_str(&render_audit(&funnel.audit().snapshot(), funnel.audit().input())),
        View::Await => out.push_str("Calculando sua margem...\n"),
        View::Result => match funnel.result() {
            Some(result) => out.push_str(&render_result(result)),
            None => out.push_str("(sem resultado)\n"),
        },
        View::SpecialistThanks => out.push_str(
            "Obrigado! Um especialista vai falar com você em breve.\n",
        ),
    }
    out
}

fn view_title(view: View) -> &'static str {
    match view {
        View::Home => "Auditoria de Margem",
        View::Audit => "Auditoria",
        View::Await => "Aguarde",
        View::Result => "Seu Diagnóstico",
        View::SpecialistThanks => "Tudo certo",
    }
}

/// `[✓]──[✓]──(3)──[4]  67%`
pub fn render_indicator(indicator: &StepIndicator) -> String {
    let markers: Vec<String> = indicator
        .markers()
        .into_iter()
        .map(|marker| match marker.state {
            StepState::Current => format!("({})", marker.label),
            _ => format!("[{}]", marker.label),
        })
        .collect();

    format!(
        "{}  {}",
        markers.join("──"),
        format_pct(indicator.fill_percent(), 0)
    )
}

pub fn render_audit(
    snapshot: &AuditSnapshot,
    input: &AuditInput,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_indicator(&snapshot.indicator));
    let _ = writeln!(out, "Etapa {}: {}", snapshot.step, snapshot.header.title);
    let _ = writeln!(out, "{}", snapshot.header.description);

    let money = |v: Option<Decimal>| v.map(|v| format_brl(v, 2)).unwrap_or_else(|| "-".to_string());
    let pct = |v: Option<Decimal>| v.map(|v| format_pct(v, 0)).unwrap_or_else(|| "-".to_string());

    match snapshot.step {
        1 => {
            let _ = writeln!(out, "  fixed_cost      {}", money(input.fixed_cost_monthly));
            let hours = input
                .open_hours_monthly
                .map(|h| format!("{h} h/mês"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  open_hours      {hours}");
        }
        2 => {
            let name = if input.procedure_name.is_empty() {
                "-"
            } else {
                input.procedure_name.as_str()
            };
            let minutes = input
                .procedure_minutes
                .map(|m| format!("{m} min"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  procedure_name    {name}");
            let _ = writeln!(out, "  procedure_price   {}", money(input.procedure_price));
            let _ = writeln!(out, "  procedure_minutes {minutes}");
        }
        _ => {
            let _ = writeln!(out, "  taxes_percent      {}", pct(input.taxes_percent));
            let _ = writeln!(out, "  commission_percent {}", pct(input.commission_percent));
            let _ = writeln!(out, "  materials_cost     {}", money(input.cmv_value));
        }
    }

    if let Some(hours) = snapshot.open_hours_preview {
        let _ = writeln!(out, "  > {hours} horas abertas por mês");
    }
    if let Some(cost) = &snapshot.hourly_cost_preview {
        let _ = writeln!(out, "  > Sua clínica custa {cost} por hora aberta.");
    }
    if let Some(hours) = snapshot.rounded_hours_preview {
        let plural = if hours == 1 { "hora" } else { "horas" };
        let _ = writeln!(out, "  > A sala fica ocupada por {hours} {plural} cheias.");
    }
    if snapshot.callout_visible(3) {
        out.push_str("  > Tudo pronto. Digite `unlock` para liberar o resultado.\n");
    }

    let _ = writeln!(out, "  foco: {}", snapshot.focus.key());
    out
}

pub fn render_gate(gate: &ContactGate) -> String {
    let contact = gate.contact();
    let validity = gate.validity();
    let mut out = String::from("\n--- Libere seu resultado ---\n");
    let _ = writeln!(out, "  {} name   {}", mark(validity.name), contact.name);
    let _ = writeln!(out, "  {} phone  {}", mark(validity.phone), contact.phone);
    let _ = writeln!(out, "  {} email  {}", mark(validity.email), contact.email);
    if gate.is_ready() {
        out.push_str("  Digite `submit` para ver o resultado.\n");
    }
    out
}

pub fn render_qualification(
    snapshot: &QualificationSnapshot,
    input: &QualificationInput,
) -> String {
    let mut out = String::from("\n--- Fale com um especialista ---\n");
    let _ = writeln!(out, "{}", render_indicator(&snapshot.indicator));

    let answer = |v: YesNo| match v {
        YesNo::Yes => "Sim",
        YesNo::No => "Não",
        YesNo::Unanswered => "-",
    };
    let text = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    match snapshot.step {
        1 => {
            let _ = writeln!(out, "  challenge    {}", text(&input.challenge));
            let _ = writeln!(out, "  team         {}", text(&input.team_size));
            let _ = writeln!(out, "  uses_system  {}", answer(input.uses_system));
        }
        2 => {
            let _ = writeln!(out, "  area         {}", text(&input.area));
            let _ = writeln!(out, "  subscriber   {}", answer(input.is_subscriber));
            let _ = writeln!(out, "  investment   {}", answer(input.investment_ok));
        }
        _ => out.push_str(&render_contact(&input.contact, snapshot.contact_validity)),
    }

    let _ = writeln!(out, "  foco: {}", snapshot.focus.key());
    out
}

fn render_contact(
    contact: &margin_core::models::Contact,
    validity: ContactValidity,
) -> String {
    format!(
        "  {} name   {}\n  {} phone  {}\n  {} email  {}\n",
        mark(validity.name),
        contact.name,
        mark(validity.phone),
        contact.phone,
        mark(validity.email),
        contact.email,
    )
}

fn mark(ok: bool) -> &'static str {
    if ok { "[x]" } else { "[ ]" }
}

/// Status, income statement and a bar per chart slice.
pub fn render_result(result: &AuditResult) -> String {
    let status = MarginStatus::classify(result.margin_percent);
    let mut out = String::new();

    let _ = writeln!(out, "{}: {}", result.procedure_name, status.title());
    let _ = writeln!(out, "{}\n", status.advice());

    for line in income_statement(result) {
        let _ = writeln!(out, "  {:<24}{:>16}", line.label, line.amount);
    }
    out.push('\n');

    for slice in breakdown_slices(result) {
        let filled = bar_len(slice.percent_of_revenue);
        let _ = writeln!(
            out,
            "  {:<16}{}{} {}",
            slice.kind.label(),
            "█".repeat(filled),
            "·".repeat(BAR_WIDTH - filled),
            format_pct(slice.percent_of_revenue, 1)
        );
    }
    out
}

fn bar_len(percent: Decimal) -> usize {
    let scaled = (percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED) * Decimal::from(BAR_WIDTH)
        / Decimal::ONE_HUNDRED)
        .round();
    scaled.to_usize().unwrap_or(0).min(BAR_WIDTH)
}
