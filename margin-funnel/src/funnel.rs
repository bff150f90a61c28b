//! The funnel controller.
//!
//! Owns the active view, both wizards and the contact gate. Every operation
//! returns an [`Update`] describing what changed; the await delay is the
//! only asynchronous transition and arrives back through
//! [`Funnel::handle`] as a [`FunnelEvent`].

use std::time::Duration;

use margin_core::lead::LeadCache;
use margin_core::models::{
    AuditField, AuditResult, ContactField, ContactValidity, OpenSchedule, QualificationField,
    StepIndicator, View, ViewChange,
};
use margin_core::tracking::{BrowserContext, LeadPayload, QualificationPayload};
use margin_core::wizard::{
    AUDIT_TOTAL_STEPS, AuditSnapshot, AuditWizard, ContactGate, QualificationSnapshot,
    QualificationWizard, SubmitOutcome, Transition,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::timer::ResultTimer;
use crate::webhook::WebhookSubmitter;

/// Asynchronous input to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunnelEvent {
    /// The await delay armed with `generation` elapsed.
    ShowResult { generation: u64 },
}

/// What an operation changed, for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    View(ViewChange),
    Audit(Transition<AuditSnapshot>),
    Gate(ContactValidity),
    Qualification(Transition<QualificationSnapshot>),
    /// A modal was closed.
    Closed,
    /// The operation was ignored in the current state.
    Ignored,
}

pub struct Funnel {
    view: View,
    audit: AuditWizard,
    gate: ContactGate,
    qualification: QualificationWizard,
    qualification_open: bool,
    result: Option<AuditResult>,

    cache: LeadCache,
    webhook: WebhookSubmitter,
    context: BrowserContext,

    timer: ResultTimer,
    await_delay: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<FunnelEvent>,
}

impl Funnel {
    /// Creates the controller on the home view, plus the receiver its
    /// delayed events arrive on.
    pub fn new(
        cache: LeadCache,
        webhook: WebhookSubmitter,
        context: BrowserContext,
        await_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<FunnelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let funnel = Self {
            view: View::Home,
            audit: AuditWizard::new(),
            gate: ContactGate::new(),
            qualification: QualificationWizard::new(),
            qualification_open: false,
            result: None,
            cache,
            webhook,
            context,
            timer: ResultTimer::new(),
            await_delay,
            generation: 0,
            events,
        };
        (funnel, receiver)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn audit(&self) -> &AuditWizard {
        &self.audit
    }

    pub fn gate(&self) -> &ContactGate {
        &self.gate
    }

    pub fn qualification(&self) -> &QualificationWizard {
        &self.qualification
    }

    pub fn is_qualification_open(&self) -> bool {
        self.qualification_open
    }

    /// The result computed when the await delay elapsed.
    pub fn result(&self) -> Option<&AuditResult> {
        self.result.as_ref()
    }

    /// Whether the result transition is still outstanding.
    pub fn is_awaiting(&self) -> bool {
        self.view == View::Await
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Activates `view`. `Audit` re-enters the current audit step and
    /// `Result` shows the final indicator step.
    pub fn set_view(
        &mut self,
        view: View,
    ) -> ViewChange {
        self.view = view;
        info!(view = view.as_str(), "view changed");

        let indicator = match view {
            View::Audit => {
                let step = self.audit.step();
                self.audit.set_step(step);
                Some(StepIndicator::new(step, AUDIT_TOTAL_STEPS))
            }
            View::Result => Some(StepIndicator::new(AUDIT_TOTAL_STEPS, AUDIT_TOTAL_STEPS)),
            _ => None,
        };

        ViewChange {
            view,
            scroll_to_top: true,
            indicator,
        }
    }

    /// Starts (or restarts) the audit with an empty form.
    pub fn start_audit(&mut self) -> Update {
        self.timer.cancel();
        self.gate.close();
        self.qualification_open = false;
        self.result = None;
        self.audit.reset();
        Update::View(self.set_view(View::Audit))
    }

    // =========================================================================
    // Audit wizard
    // =========================================================================

    /// The audit form only takes input while no modal covers it.
    fn audit_editable(&self) -> bool {
        self.view == View::Audit && !self.gate.is_open()
    }

    pub fn set_audit_field(
        &mut self,
        field: AuditField,
        raw: &str,
    ) -> Update {
        if !self.audit_editable() {
            return Update::Ignored;
        }
        Update::Audit(Transition::accepted(self.audit.set_field(field, raw)))
    }

    pub fn set_schedule(
        &mut self,
        schedule: OpenSchedule,
    ) -> Update {
        if !self.audit_editable() {
            return Update::Ignored;
        }
        Update::Audit(Transition::accepted(self.audit.set_schedule(schedule)))
    }

    pub fn audit_next(&mut self) -> Update {
        if !self.audit_editable() {
            return Update::Ignored;
        }
        Update::Audit(self.audit.next())
    }

    pub fn audit_back(&mut self) -> Update {
        if !self.audit_editable() {
            return Update::Ignored;
        }
        Update::Audit(self.audit.back())
    }

    // =========================================================================
    // Contact gate
    // =========================================================================

    /// Opens the gate once every audit step is complete, prefilling empty
    /// fields from the lead cache.
    pub async fn open_gate(&mut self) -> Update {
        if self.view != View::Audit || !self.audit.request_unlock() {
            debug!("gate refused, audit incomplete");
            return Update::Ignored;
        }

        self.gate.open();
        self.cache.load(self.gate.contact_mut(), false).await;
        Update::Gate(self.gate.validity())
    }

    pub fn set_gate_field(
        &mut self,
        field: ContactField,
        raw: &str,
    ) -> Update {
        if !self.gate.is_open() {
            return Update::Ignored;
        }
        Update::Gate(self.gate.set_field(field, raw))
    }

    /// Caches the contact, sends the lead and switches to the await view.
    pub async fn submit_gate(&mut self) -> Update {
        if !self.gate.is_ready() {
            return Update::Ignored;
        }
        if !self.audit.request_unlock() {
            debug!("audit incomplete, gate closed without submitting");
            self.gate.close();
            return Update::Closed;
        }

        let contact = self.gate.contact().clone();
        self.cache.save(&contact).await;
        self.webhook.submit(&LeadPayload::from_contact(&contact));
        info!("result unlocked");

        self.gate.close();
        Update::View(self.start_await())
    }

    fn start_await(&mut self) -> ViewChange {
        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        self.timer.arm(self.await_delay, move || {
            let _ = events.send(FunnelEvent::ShowResult { generation });
        });
        self.set_view(View::Await)
    }

    /// Applies a delayed event. Events from a superseded arm are ignored.
    pub fn handle(
        &mut self,
        event: FunnelEvent,
    ) -> Update {
        match event {
            FunnelEvent::ShowResult { generation } => {
                if generation != self.generation || self.view != View::Await {
                    debug!(generation, current = self.generation, "stale result event");
                    return Update::Ignored;
                }
                self.result = Some(self.audit.result());
                Update::View(self.set_view(View::Result))
            }
        }
    }

    // =========================================================================
    // Qualification wizard
    // =========================================================================

    /// Opens the specialist wizard with cleared answers. The contact is
    /// topped up from the gate and the lead cache.
    pub async fn open_qualification(&mut self) -> Update {
        if self.view != View::Result {
            return Update::Ignored;
        }

        self.qualification_open = true;
        self.qualification.open();
        self.qualification.prefill(self.gate.contact());
        self.prefill_qualification_from_cache().await;
        Update::Qualification(Transition::accepted(self.qualification.snapshot()))
    }

    pub fn set_qualification_field(
        &mut self,
        field: QualificationField,
        raw: &str,
    ) -> Update {
        if !self.qualification_open {
            return Update::Ignored;
        }
        Update::Qualification(Transition::accepted(self.qualification.set_field(field, raw)))
    }

    pub async fn qualification_next(&mut self) -> Update {
        if !self.qualification_open {
            return Update::Ignored;
        }
        let mut transition = self.qualification.next();
        if transition.accepted && transition.snapshot.step == 3 {
            transition.snapshot = self.prefill_qualification_from_cache().await;
        }
        Update::Qualification(transition)
    }

    pub fn qualification_back(&mut self) -> Update {
        if !self.qualification_open {
            return Update::Ignored;
        }
        Update::Qualification(self.qualification.back())
    }

    /// Submits the specialist form: walks to the next incomplete step, or
    /// sends the enriched lead and shows the thank-you view.
    pub async fn submit_qualification(&mut self) -> Update {
        if !self.qualification_open {
            return Update::Ignored;
        }

        let from = self.qualification.step();
        match self.qualification.submit() {
            SubmitOutcome::Step(mut snapshot) => {
                if snapshot.step == 3 && from != 3 {
                    snapshot = self.prefill_qualification_from_cache().await;
                }
                Update::Qualification(Transition {
                    accepted: snapshot.step != from,
                    snapshot,
                })
            }
            SubmitOutcome::Submitted => {
                let contact = self.qualification.contact().clone();
                self.cache.save(&contact).await;

                let event_id = self.cache.event_id().await;
                let payload =
                    QualificationPayload::build(self.qualification.input(), event_id, &self.context);
                self.webhook.submit(&payload);
                info!(area = %payload.area, "qualification submitted");

                self.qualification_open = false;
                Update::View(self.set_view(View::SpecialistThanks))
            }
        }
    }

    async fn prefill_qualification_from_cache(&mut self) -> QualificationSnapshot {
        if let Some(cached) = self.cache.cached().await {
            self.qualification.prefill(&cached);
        }
        self.qualification.snapshot()
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Closes the topmost modal: the specialist wizard, then the gate.
    pub fn escape(&mut self) -> Update {
        if self.qualification_open {
            self.qualification_open = false;
            Update::Closed
        } else if self.gate.is_open() {
            self.gate.close();
            Update::Closed
        } else {
            Update::Ignored
        }
    }

    /// Advances whatever is focused when its current step is complete.
    pub async fn enter(&mut self) -> Update {
        if self.qualification_open {
            let validity = self.qualification.validate();
            return match self.qualification.step() {
                1 | 2 if validity.step(self.qualification.step()) => {
                    self.qualification_next().await
                }
                3 if validity.ok3 => self.submit_qualification().await,
                _ => Update::Ignored,
            };
        }

        if self.gate.is_open() {
            return self.submit_gate().await;
        }

        if self.view != View::Audit {
            return Update::Ignored;
        }

        let validity = self.audit.validate();
        match self.audit.step() {
            1 | 2 if validity.step(self.audit.step()) => self.audit_next(),
            3 if validity.ok3 => self.open_gate().await,
            _ => Update::Ignored,
        }
    }
}
