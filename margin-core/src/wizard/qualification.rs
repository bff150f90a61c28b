//! The "talk to a specialist" qualification wizard.
//!
//! Three data steps map one-to-one onto the progress indicator:
//! challenge, clinic profile, contact. Opening the wizard always clears the
//! answers; the contact is kept and topped up from the lead cache by the
//! caller (see [`QualificationWizard::prefill`]).

use tracing::debug;

use crate::models::{
    Contact, ContactField, ContactValidity, QualificationField, QualificationInput, StepIndicator,
    YesNo,
};

use super::Transition;

pub const QUALIFICATION_STEPS: u8 = 3;

/// Cumulative validity of the qualification steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualificationValidity {
    pub ok1: bool,
    pub ok2: bool,
    pub ok3: bool,
}

impl QualificationValidity {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationSnapshot {
    pub step: u8,
    pub indicator: StepIndicator,
    pub validity: QualificationValidity,
    pub contact_validity: ContactValidity,
    pub focus: QualificationField,
}

/// Outcome of submitting the wizard form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form moved to (or stayed on) a step that still needs input.
    Step(QualificationSnapshot),
    /// Every step is complete; the lead can be sent.
    Submitted,
}

#[derive(Debug, Clone)]
pub struct QualificationWizard {
    input: QualificationInput,
    step: u8,
}

impl Default for QualificationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QualificationWizard {
    pub fn new() -> Self {
        Self {
            input: QualificationInput::default(),
            step: 1,
        }
    }

    pub fn input(&self) -> &QualificationInput {
        &self.input
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn contact(&self) -> &Contact {
        &self.input.contact
    }

    /// Clears every answer (the contact survives) and enters step 1.
    pub fn open(&mut self) -> QualificationSnapshot {
        self.input.clear_answers();
        self.set_step(1)
    }

    /// Fills empty contact fields from a cached contact.
    pub fn prefill(
        &mut self,
        cached: &Contact,
    ) {
        self.input.contact.fill_from(cached, false);
    }

    pub fn set_field(
        &mut self,
        field: QualificationField,
        raw: &str,
    ) -> QualificationSnapshot {
        let input = &mut self.input;
        match field {
            QualificationField::Challenge => input.challenge = raw.trim().to_string(),
            QualificationField::TeamSize => input.team_size = raw.trim().to_string(),
            QualificationField::UsesSystem => input.uses_system = YesNo::parse(raw),
            QualificationField::Area => input.area = raw.trim().to_string(),
            QualificationField::IsSubscriber => input.is_subscriber = YesNo::parse(raw),
            QualificationField::InvestmentOk => input.investment_ok = YesNo::parse(raw),
            QualificationField::Name => input.contact.set(ContactField::Name, raw),
            QualificationField::Phone => input.contact.set(ContactField::Phone, raw),
            QualificationField::Email => input.contact.set(ContactField::Email, raw),
        }
        self.snapshot()
    }

    pub fn validate(&self) -> QualificationValidity {
        validate(&self.input)
    }

    /// Enters step `n` (clamped into `1..=3`) unconditionally.
    pub fn set_step(
        &mut self,
        n: u8,
    ) -> QualificationSnapshot {
        self.step = n.clamp(1, QUALIFICATION_STEPS);
        debug!(step = self.step, "qualification step entered");
        self.snapshot()
    }

    /// Moves forward when every step up to the current one is complete.
    pub fn next(&mut self) -> Transition<QualificationSnapshot> {
        if self.step >= QUALIFICATION_STEPS || !self.validate().step(self.step) {
            return Transition::refused(self.snapshot());
        }
        Transition::accepted(self.set_step(self.step + 1))
    }

    pub fn back(&mut self) -> Transition<QualificationSnapshot> {
        if self.step <= 1 {
            return Transition::refused(self.snapshot());
        }
        Transition::accepted(self.set_step(self.step - 1))
    }

    /// Submits the form: walks to the first incomplete step, or reports
    /// [`SubmitOutcome::Submitted`] once all three are complete.
    ///
    /// Like a browser form submit on a multi-step wizard, submitting from
    /// an earlier step advances one step instead of sending the lead.
    pub fn submit(&mut self) -> SubmitOutcome {
        let validity = self.validate();

        if !validity.ok1 {
            return SubmitOutcome::Step(self.set_step(1));
        }
        if self.step == 1 {
            return SubmitOutcome::Step(self.set_step(2));
        }
        if !validity.ok2 {
            return SubmitOutcome::Step(self.set_step(2));
        }
        if self.step == 2 {
            return SubmitOutcome::Step(self.set_step(3));
        }
        if !validity.ok3 {
            return SubmitOutcome::Step(self.set_step(3));
        }
        SubmitOutcome::Submitted
    }

    pub fn snapshot(&self) -> QualificationSnapshot {
        QualificationSnapshot {
            step: self.step,
            indicator: StepIndicator::new(self.step, QUALIFICATION_STEPS),
            validity: self.validate(),
            contact_validity: self.input.contact.validity(),
            focus: focus_field(self.step),
        }
    }
}

/// Cumulative validation of the qualification answers.
pub fn validate(input: &QualificationInput) -> QualificationValidity {
    let ok1 = !input.challenge.is_empty()
        && input.team_size.chars().count() >= 2
        && input.uses_system.is_answered();

    let ok2 = ok1
        && input.area.chars().count() >= 2
        && input.is_subscriber.is_answered()
        && input.investment_ok.is_answered();

    let ok3 = ok2 && input.contact.validity().all();

    QualificationValidity { ok1, ok2, ok3 }
}

fn focus_field(step: u8) -> QualificationField {
    match step {
        2 => QualificationField::Area,
        3 => QualificationField::Name,
        _ => QualificationField::Challenge,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn answer_step1(wizard: &mut QualificationWizard) {
        wizard.set_field(QualificationField::Challenge, "Precificação");
        wizard.set_field(QualificationField::TeamSize, "De 3 a 5 pessoas");
        wizard.set_field(QualificationField::UsesSystem, "Não");
    }

    fn answer_step2(wizard: &mut QualificationWizard) {
        wizard.set_field(QualificationField::Area, "Estética");
        wizard.set_field(QualificationField::IsSubscriber, "Sim");
        wizard.set_field(QualificationField::InvestmentOk, "Sim");
    }

    fn answer_step3(wizard: &mut QualificationWizard) {
        wizard.set_field(QualificationField::Name, "Ana Souza");
        wizard.set_field(QualificationField::Phone, "(11) 98765-4321");
        wizard.set_field(QualificationField::Email, "ana@clinica.com");
    }

    #[test]
    fn next_requires_current_step() {
        let mut wizard = QualificationWizard::new();
        assert!(!wizard.next().accepted);

        answer_step1(&mut wizard);
        let transition = wizard.next();

        assert!(transition.accepted);
        assert_eq!(transition.snapshot.step, 2);
        assert_eq!(transition.snapshot.focus, QualificationField::Area);
    }

    #[test]
    fn step_two_requires_step_one() {
        let mut wizard = QualificationWizard::new();
        answer_step2(&mut wizard);
        answer_step3(&mut wizard);

        let validity = wizard.validate();

        assert!(!validity.ok1);
        assert!(!validity.ok2);
        assert!(!validity.ok3);
    }

    #[test]
    fn unanswered_flag_blocks_step() {
        let mut wizard = QualificationWizard::new();
        wizard.set_field(QualificationField::Challenge, "Agenda");
        wizard.set_field(QualificationField::TeamSize, "Somente eu");
        wizard.set_field(QualificationField::UsesSystem, "");

        assert!(!wizard.validate().ok1);
    }

    #[test]
    fn team_size_needs_two_characters() {
        let mut wizard = QualificationWizard::new();
        answer_step1(&mut wizard);
        wizard.set_field(QualificationField::TeamSize, "1");

        assert!(!wizard.validate().ok1);
    }

    #[test]
    fn full_walk_reaches_contact_step() {
        let mut wizard = QualificationWizard::new();
        answer_step1(&mut wizard);
        wizard.next();
        answer_step2(&mut wizard);
        let transition = wizard.next();

        assert_eq!(transition.snapshot.step, 3);
        assert_eq!(transition.snapshot.focus, QualificationField::Name);
        assert!(!transition.snapshot.validity.ok3);

        answer_step3(&mut wizard);
        assert!(wizard.validate().ok3);
        assert!(!wizard.next().accepted);
    }

    #[test]
    fn submit_walks_steps_before_submitting() {
        let mut wizard = QualificationWizard::new();
        answer_step1(&mut wizard);
        answer_step2(&mut wizard);
        answer_step3(&mut wizard);

        match wizard.submit() {
            SubmitOutcome::Step(snapshot) => assert_eq!(snapshot.step, 2),
            other => panic!("expected step 2, got {other:?}"),
        }
        match wizard.submit() {
            SubmitOutcome::Step(snapshot) => assert_eq!(snapshot.step, 3),
            other => panic!("expected step 3, got {other:?}"),
        }
        assert_eq!(wizard.submit(), SubmitOutcome::Submitted);
    }

    #[test]
    fn submit_returns_to_first_incomplete_step() {
        let mut wizard = QualificationWizard::new();
        answer_step1(&mut wizard);
        wizard.set_step(3);

        match wizard.submit() {
            SubmitOutcome::Step(snapshot) => assert_eq!(snapshot.step, 2),
            other => panic!("expected step 2, got {other:?}"),
        }
    }

    #[test]
    fn open_clears_answers_but_keeps_contact() {
        let mut wizard = QualificationWizard::new();
        answer_step1(&mut wizard);
        answer_step2(&mut wizard);
        answer_step3(&mut wizard);
        wizard.set_step(3);

        let snapshot = wizard.open();

        assert_eq!(snapshot.step, 1);
        assert_eq!(wizard.input().challenge, "");
        assert_eq!(wizard.input().area, "");
        assert_eq!(wizard.input().uses_system, YesNo::Unanswered);
        assert_eq!(wizard.contact().name, "Ana Souza");
    }

    #[test]
    fn prefill_only_fills_empty_contact_fields() {
        let mut wizard = QualificationWizard::new();
        wizard.set_field(QualificationField::Email, "typed@x.com");

        wizard.prefill(&Contact::from_raw("Cached", "11987654321", "cached@x.com"));

        assert_eq!(wizard.contact().name, "Cached");
        assert_eq!(wizard.contact().phone, "11987654321");
        assert_eq!(wizard.contact().email, "typed@x.com");
    }

    #[test]
    fn indicator_has_three_steps() {
        let mut wizard = QualificationWizard::new();
        let snapshot = wizard.set_step(3);

        assert_eq!(snapshot.indicator.total, 3);
        assert_eq!(snapshot.indicator.markers().len(), 3);
    }
}
