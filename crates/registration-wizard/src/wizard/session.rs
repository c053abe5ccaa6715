//! One user's wizard: the store, the mounted step controller, background effects and
//! the deferred event queue, driven by discrete user events.
//!
//! Deferred work never runs on a wall clock. Each queued event is due a number of
//! ticks after it was scheduled and fires, in scheduling order, when [`WizardSession::tick`]
//! reaches it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use super::controller::{
    mount_step, ControllerError, FieldIssue, ResetProgress, StepFormView, StepHandle, StepIntent,
    SyncOutcome,
};
use super::domain::{FederativeUnit, WizardStep, FEDERATIVE_UNITS};
use super::effects::{next_request_token, WizardEffects};
use super::navigation::{decide, NavigationDecision};
use super::store::{AsyncResourceState, FormAction, FormState, FormStore};
use super::summary::{ExportError, ExportedDocument, Exporter, PartialSnapshot, SummaryView};
use crate::config::ProviderConfig;

const REVERT_DELAY: u64 = 1;
const SETTLE_DELAY: u64 = 1;
const ARM_DELAY: u64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("step {0} has no form")]
    NoForm(WizardStep),
    #[error("action '{action}' is not available on step {step}")]
    Unavailable {
        action: &'static str,
        step: WizardStep,
    },
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredEvent {
    Revert(WizardStep),
    SettleReset { epoch: u64 },
    ArmReset { epoch: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Advanced { step: WizardStep },
    Rejected { issues: Vec<FieldIssue> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub current_step: WizardStep,
    /// Step the stepper shows; differs from `current_step` while a refused move flashes.
    pub displayed_step: WizardStep,
    pub validity: [bool; WizardStep::COUNT],
    pub resources: AsyncResourceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<StepFormView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_options: Option<&'static [FederativeUnit]>,
    pub pending_effects: usize,
    pub pending_ticks: usize,
}

#[derive(Debug)]
pub struct WizardSession {
    store: FormStore,
    effects: WizardEffects,
    completions: mpsc::UnboundedReceiver<FormAction>,
    in_flight: usize,
    mounted: Option<Box<dyn StepHandle>>,
    displayed_step: WizardStep,
    reset_epoch: u64,
    clock: u64,
    sequence: u64,
    deferred: BTreeMap<(u64, u64), DeferredEvent>,
    exporter: Exporter,
}

impl WizardSession {
    pub fn new(effects: WizardEffects, completions: mpsc::UnboundedReceiver<FormAction>) -> Self {
        let mut session = Self {
            store: FormStore::new(),
            effects,
            completions,
            in_flight: 0,
            mounted: None,
            displayed_step: WizardStep::default(),
            reset_epoch: 0,
            clock: 0,
            sequence: 0,
            deferred: BTreeMap::new(),
            exporter: Exporter::text(),
        };
        session.remount(WizardStep::default());
        session
    }

    /// Session backed by the canned address and profession providers.
    pub fn mocked(config: &ProviderConfig) -> Self {
        let (effects, completions) = WizardEffects::mocked(config);
        Self::new(effects, completions)
    }

    pub fn state(&self) -> &Arc<FormState> {
        self.store.state()
    }

    pub fn current_step(&self) -> WizardStep {
        self.store.state().snapshot.current_step
    }

    pub fn displayed_step(&self) -> WizardStep {
        self.displayed_step
    }

    pub fn pending_ticks(&self) -> usize {
        self.deferred.len()
    }

    pub fn pending_effects(&self) -> usize {
        self.in_flight
    }

    fn dispatch(&mut self, action: FormAction) {
        if self.effects.handle(&action) {
            self.in_flight += 1;
        }
        if self.store.dispatch(&action) {
            self.reconcile();
        }
    }

    /// Align the mounted controller with the store after a change.
    fn reconcile(&mut self) {
        let current = self.current_step();
        self.displayed_step = current;

        let mounted_step = self.mounted.as_ref().map(|handle| handle.step());
        let on_summary = self.mounted.is_none() && current == WizardStep::Summary;
        if mounted_step != Some(current) && !on_summary {
            self.remount(current);
            return;
        }

        let outcome = self.mounted.as_mut().and_then(|handle| handle.observe_store());
        if outcome == Some(SyncOutcome::SoftResetStarted) {
            self.schedule_soft_reset();
        }
    }

    fn remount(&mut self, step: WizardStep) {
        // Unmount first so the old subscription is released before the new one registers.
        self.mounted = None;
        self.reset_epoch += 1;
        self.displayed_step = step;

        let Some(mounted) = mount_step(step, &self.store) else {
            debug!(%step, "summary mounted");
            return;
        };
        debug!(%step, outcome = ?mounted.outcome, "step controller mounted");

        self.mounted = Some(mounted.handle);
        if mounted.outcome == SyncOutcome::SoftResetStarted {
            self.schedule_soft_reset();
        }
        if let Some(intent) = mounted.intent {
            self.run_intent(intent);
        }
    }

    fn schedule(&mut self, delay: u64, event: DeferredEvent) {
        self.sequence += 1;
        self.deferred
            .insert((self.clock + delay, self.sequence), event);
    }

    fn schedule_soft_reset(&mut self) {
        self.reset_epoch += 1;
        let epoch = self.reset_epoch;
        self.schedule(SETTLE_DELAY, DeferredEvent::SettleReset { epoch });
        self.schedule(ARM_DELAY, DeferredEvent::ArmReset { epoch });
    }

    fn run_intent(&mut self, intent: StepIntent) {
        match intent {
            StepIntent::LoadProfessions => {
                self.dispatch(FormAction::RequestProfessions {
                    token: next_request_token(),
                });
            }
            StepIntent::PersistAndLookup { postal_code } => {
                if let Some(update) = self.mounted.as_ref().map(|handle| handle.draft_update()) {
                    self.dispatch(update);
                }
                self.dispatch(FormAction::RequestAddressLookup {
                    postal_code,
                    token: next_request_token(),
                });
            }
        }
    }

    fn form_mut(&mut self) -> Result<&mut Box<dyn StepHandle>, SessionError> {
        let step = self.current_step();
        self.mounted.as_mut().ok_or(SessionError::NoForm(step))
    }

    pub fn edit(&mut self, field: &str, raw: &str) -> Result<(), SessionError> {
        self.form_mut()?.edit_field(field, raw)?;
        Ok(())
    }

    pub fn focus(&mut self, field: &str) -> Result<(), SessionError> {
        self.form_mut()?.focus_field(field)?;
        Ok(())
    }

    pub fn blur(&mut self, field: &str) -> Result<(), SessionError> {
        if let Some(intent) = self.form_mut()?.blur_field(field)? {
            self.run_intent(intent);
        }
        Ok(())
    }

    /// Commit the mounted draft, mark its step validated and advance; a failing draft
    /// changes nothing in the store.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let step = self.current_step();
        let update = match self.form_mut()?.submit_update() {
            Ok(update) => update,
            Err(issues) => {
                debug!(%step, issues = issues.len(), "submit rejected");
                return Ok(SubmitOutcome::Rejected { issues });
            }
        };

        self.dispatch(update);
        self.dispatch(FormAction::SetStepValidated { step, valid: true });
        let next = step.next().unwrap_or(step);
        self.dispatch(FormAction::SetCurrentStep(next));
        Ok(SubmitOutcome::Advanced { step: next })
    }

    /// Stepper click: goes through the navigation gate.
    pub fn request_step(&mut self, target: WizardStep) -> NavigationDecision {
        let previous = self.current_step();
        let decision = decide(previous, target, &self.store.state().validity);

        match decision {
            NavigationDecision::Ignore => {}
            NavigationDecision::Allow(step) => self.dispatch(FormAction::SetCurrentStep(step)),
            NavigationDecision::Revert(step) => {
                debug!(%previous, %target, "navigation refused, reverting");
                self.displayed_step = target;
                self.schedule(REVERT_DELAY, DeferredEvent::Revert(step));
            }
        }
        decision
    }

    /// Previous button of the professional and residential steps; bypasses the gate.
    pub fn go_back(&mut self) -> Result<WizardStep, SessionError> {
        let step = self.current_step();
        match step {
            WizardStep::ResidentialInfo | WizardStep::ProfessionalInfo => {
                let previous = step.previous().unwrap_or(step);
                self.dispatch(FormAction::SetCurrentStep(previous));
                Ok(previous)
            }
            _ => Err(SessionError::Unavailable {
                action: "previous",
                step,
            }),
        }
    }

    fn require_summary(&self, action: &'static str) -> Result<(), SessionError> {
        let step = self.current_step();
        if step == WizardStep::Summary {
            Ok(())
        } else {
            Err(SessionError::Unavailable { action, step })
        }
    }

    pub fn summary_edit(&mut self) -> Result<(), SessionError> {
        self.require_summary("edit")?;
        self.dispatch(FormAction::SetCurrentStep(WizardStep::PersonalData));
        Ok(())
    }

    pub fn new_form(&mut self) -> Result<(), SessionError> {
        self.require_summary("new_form")?;
        self.dispatch(FormAction::Reset);
        Ok(())
    }

    pub fn export(&self) -> Result<Option<ExportedDocument>, SessionError> {
        self.require_summary("export")?;
        let snapshot = &self.store.state().snapshot;
        Ok(self.exporter.export(PartialSnapshot::from(snapshot))?)
    }

    /// Advance the deferred clock by one tick and fire every event now due. Returns the
    /// number of events fired.
    pub fn tick(&mut self) -> usize {
        self.clock += 1;
        let mut fired = 0;

        while let Some(entry) = self.deferred.first_entry() {
            if entry.key().0 > self.clock {
                break;
            }
            let event = entry.remove();
            self.fire(event);
            fired += 1;
        }
        fired
    }

    /// Tick until nothing is scheduled.
    pub fn flush_deferred(&mut self) -> usize {
        let mut fired = 0;
        while !self.deferred.is_empty() {
            fired += self.tick();
        }
        fired
    }

    fn fire(&mut self, event: DeferredEvent) {
        match event {
            DeferredEvent::Revert(step) => {
                if self.current_step() != step {
                    debug!(%step, "stale revert dropped");
                    return;
                }
                self.displayed_step = step;
                self.dispatch(FormAction::SetCurrentStep(step));
            }
            DeferredEvent::SettleReset { epoch } | DeferredEvent::ArmReset { epoch } => {
                if epoch != self.reset_epoch {
                    debug!(epoch, current = self.reset_epoch, "stale reset event dropped");
                    return;
                }
                let progress = match self.mounted.as_mut() {
                    Some(handle) => handle.advance_reset(),
                    None => return,
                };
                if let ResetProgress::Armed(Some(intent)) = progress {
                    self.run_intent(intent);
                }
            }
        }
    }

    fn apply_completion(&mut self, action: FormAction) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let applied = self.store.dispatch(&action);
        if applied {
            self.reconcile();
        } else {
            debug!(action = action.label(), "stale effect completion ignored");
        }
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.completions.try_recv() {
            self.apply_completion(action);
            applied += 1;
        }
        applied
    }

    /// Wait for every in-flight effect to complete.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.completions.recv().await {
                Some(action) => self.apply_completion(action),
                None => {
                    self.in_flight = 0;
                    break;
                }
            }
        }
    }

    /// Drain effects and deferred events until both are quiet.
    pub async fn run_until_idle(&mut self) {
        loop {
            self.settle().await;
            if self.deferred.is_empty() {
                break;
            }
            self.flush_deferred();
        }
    }

    pub fn view(&self) -> SessionView {
        let state = self.store.state();
        let current_step = state.snapshot.current_step;
        let summary = (current_step == WizardStep::Summary).then(|| {
            SummaryView::build(
                &state.snapshot.personal_data,
                &state.snapshot.residential_info,
                &state.snapshot.professional_info,
            )
        });
        let state_options = (current_step == WizardStep::ResidentialInfo)
            .then_some(&FEDERATIVE_UNITS[..]);

        SessionView {
            current_step,
            displayed_step: self.displayed_step,
            validity: state.validity.flags(),
            resources: state.resources.clone(),
            form: self.mounted.as_ref().map(|handle| handle.form_view()),
            summary,
            state_options,
            pending_effects: self.in_flight,
            pending_ticks: self.deferred.len(),
        }
    }
}
