use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level screens of the funnel. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Home,
    Audit,
    Await,
    Result,
    SpecialistThanks,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Audit => "audit",
            View::Await => "await",
            View::Result => "result",
            View::SpecialistThanks => "specialistThanks",
        }
    }
}

/// Display state of one marker in a step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Complete,
    Current,
    Upcoming,
}

/// One marker of a step indicator: completed steps show a check mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMarker {
    pub index: u8,
    pub state: StepState,
    pub label: String,
}

/// Progress indicator ("stepper") shared by both wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIndicator {
    pub active: u8,
    pub total: u8,
}

impl StepIndicator {
    pub fn new(
        active: u8,
        total: u8,
    ) -> Self {
        Self { active, total }
    }

    /// Width of the fill bar in percent: `(active - 1) / (total - 1) * 100`.
    ///
    /// `active` is clamped into `1..=total` first.
    pub fn fill_percent(&self) -> Decimal {
        if self.total <= 1 {
            return Decimal::ONE_HUNDRED;
        }
        let active = self.active.clamp(1, self.total);
        Decimal::from(active - 1) / Decimal::from(self.total - 1) * Decimal::ONE_HUNDRED
    }

    pub fn state_of(
        &self,
        index: u8,
    ) -> StepState {
        match index.cmp(&self.active) {
            std::cmp::Ordering::Less => StepState::Complete,
            std::cmp::Ordering::Equal => StepState::Current,
            std::cmp::Ordering::Greater => StepState::Upcoming,
        }
    }

    pub fn markers(&self) -> Vec<StepMarker> {
        (1..=self.total)
            .map(|index| {
                let state = self.state_of(index);
                let label = match state {
                    StepState::Complete => "✓".to_string(),
                    _ => index.to_string(),
                };
                StepMarker {
                    index,
                    state,
                    label,
                }
            })
            .collect()
    }
}

/// What the rendering layer must do after a view switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChange {
    pub view: View,
    /// Always set: every switch scrolls back to the top.
    pub scroll_to_top: bool,
    /// Resynchronized audit indicator, for `Audit` and `Result` only.
    pub indicator: Option<StepIndicator>,
}
