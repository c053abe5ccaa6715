//! Step form controllers.
//!
//! Each data step owns a local draft seeded from its snapshot slice. When the slice
//! arrives empty (fresh form or reset) the controller runs a soft reset:
//!
//! ```text
//! Pending  --settle-->  Settling  --arm-->  Armed
//!    \______________ user interaction ________/
//! ```
//!
//! `Pending` suppresses error display, `settle` clears field marks and detaches the
//! rules, `arm` reattaches them. Error display stays off until the first user
//! interaction, whichever phase that lands in.

mod personal;
mod professional;
mod residential;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::domain::{FormSnapshot, PersonalData, ProfessionalInfo, ResidentialInfo, WizardStep};
use super::store::{FormAction, FormStore, StoreSubscription};
use super::validators::{first_failure, FieldError, FieldValue, Rule};

pub use personal::PersonalField;
pub use professional::ProfessionalField;
pub use residential::ResidentialField;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("step {step} has no field named '{field}'")]
    UnknownField { step: WizardStep, field: String },
}

/// Side effects a controller asks the session to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepIntent {
    LoadProfessions,
    /// Persist the draft into the store, then look the postal code up.
    PersistAndLookup { postal_code: String },
}

/// Binds a snapshot slice to its editable form.
pub trait StepForm: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Field: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static;

    const STEP: WizardStep;

    fn fields() -> &'static [Self::Field];
    fn field_key(field: Self::Field) -> &'static str;
    fn field_label(field: Self::Field) -> &'static str;
    fn rules(field: Self::Field) -> &'static [Rule];

    fn slice(snapshot: &FormSnapshot) -> &Self;
    fn value(&self, field: Self::Field) -> FieldValue<'_>;
    fn set_value(&mut self, field: Self::Field, raw: &str);
    fn is_blank(&self) -> bool;
    fn into_update(self) -> FormAction;

    /// Last chance to reshape the draft before it is committed.
    fn prepare_commit(self) -> Self {
        self
    }

    fn mount_intent() -> Option<StepIntent> {
        None
    }

    fn on_rearm(&mut self) -> Option<StepIntent> {
        None
    }

    fn blur_intent(&self, _field: Self::Field) -> Option<StepIntent> {
        None
    }

    fn find_field(key: &str) -> Option<Self::Field> {
        Self::fields()
            .iter()
            .copied()
            .find(|field| Self::field_key(*field) == key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldMarks {
    pub touched: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPhase {
    Armed,
    Pending,
    Settling,
}

/// What a slice synchronisation did to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Patched,
    SoftResetStarted,
}

/// Result of one deferred reset event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetProgress {
    Settled,
    Armed(Option<StepIntent>),
    Idle,
}

/// A field that blocked a submit, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub error: FieldError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub touched: bool,
    pub dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFormView {
    pub step: WizardStep,
    pub reset_mode: bool,
    pub phase: ResetPhase,
    pub can_submit: bool,
    pub fields: Vec<FieldView>,
}

/// Controller for one data step; lives exactly as long as the step is mounted.
#[derive(Debug)]
pub struct StepController<F: StepForm> {
    draft: F,
    marks: BTreeMap<F::Field, FieldMarks>,
    phase: ResetPhase,
    rules_attached: bool,
    reset_mode: bool,
    synced: Option<F>,
    subscription: StoreSubscription,
}

impl<F: StepForm> StepController<F> {
    /// Mount against the store, seeding the draft from the current slice.
    pub fn mount(store: &FormStore) -> (Self, SyncOutcome) {
        let mut subscription = store.subscribe();
        let state = subscription
            .changed_state()
            .unwrap_or_else(|| subscription.current());

        let mut controller = Self {
            draft: F::default(),
            marks: BTreeMap::new(),
            phase: ResetPhase::Armed,
            rules_attached: true,
            reset_mode: false,
            synced: None,
            subscription,
        };
        let outcome = controller.sync(F::slice(&state.snapshot));
        (controller, outcome)
    }

    /// Pick up an external change of this step's slice, if one was published.
    pub fn observe(&mut self) -> Option<SyncOutcome> {
        let state = self.subscription.changed_state()?;
        let slice = F::slice(&state.snapshot);
        if self.synced.as_ref() == Some(slice) {
            return None;
        }
        Some(self.sync(slice))
    }

    fn sync(&mut self, slice: &F) -> SyncOutcome {
        self.draft = slice.clone();
        self.synced = Some(slice.clone());

        if slice.is_blank() {
            self.reset_mode = true;
            self.phase = ResetPhase::Pending;
            SyncOutcome::SoftResetStarted
        } else {
            self.reset_mode = false;
            self.phase = ResetPhase::Armed;
            self.rules_attached = true;
            SyncOutcome::Patched
        }
    }

    /// Advance the soft-reset phase machine by one deferred event.
    pub fn advance_reset(&mut self) -> ResetProgress {
        match self.phase {
            ResetPhase::Pending => {
                self.marks.clear();
                self.rules_attached = false;
                self.phase = ResetPhase::Settling;
                ResetProgress::Settled
            }
            ResetPhase::Settling => {
                self.rules_attached = true;
                self.phase = ResetPhase::Armed;
                ResetProgress::Armed(self.draft.on_rearm())
            }
            ResetPhase::Armed => ResetProgress::Idle,
        }
    }

    fn register_interaction(&mut self) {
        if self.reset_mode {
            self.reset_mode = false;
        }
        if self.phase != ResetPhase::Armed {
            self.phase = ResetPhase::Armed;
            self.rules_attached = true;
        }
    }

    fn marks_mut(&mut self, field: F::Field) -> &mut FieldMarks {
        self.marks.entry(field).or_default()
    }

    pub fn edit(&mut self, field: F::Field, raw: &str) {
        self.draft.set_value(field, raw);
        self.marks_mut(field).dirty = true;
        self.register_interaction();
    }

    pub fn focus(&mut self, _field: F::Field) {
        self.register_interaction();
    }

    pub fn blur(&mut self, field: F::Field) -> Option<StepIntent> {
        self.marks_mut(field).touched = true;
        self.register_interaction();
        self.draft.blur_intent(field)
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    pub fn reset_mode(&self) -> bool {
        self.reset_mode
    }

    pub fn marks(&self, field: F::Field) -> FieldMarks {
        self.marks.get(&field).copied().unwrap_or_default()
    }

    /// Failure under the currently attached rules.
    pub fn field_error(&self, field: F::Field) -> Option<FieldError> {
        if !self.rules_attached {
            return None;
        }
        first_failure(F::rules(field), self.draft.value(field))
    }

    /// Error text shown inline next to the field.
    pub fn visible_error(&self, field: F::Field) -> Option<FieldError> {
        let marks = self.marks(field);
        if self.reset_mode || !(marks.touched || marks.dirty) {
            return None;
        }
        self.field_error(field)
    }

    fn issues(&self) -> Vec<FieldIssue> {
        F::fields()
            .iter()
            .filter_map(|field| {
                first_failure(F::rules(*field), self.draft.value(*field)).map(|error| {
                    FieldIssue {
                        field: F::field_key(*field),
                        error,
                    }
                })
            })
            .collect()
    }

    /// Whether Next/Finish is enabled: the draft passes the step's full rule set.
    pub fn can_submit(&self) -> bool {
        self.issues().is_empty()
    }

    /// Produce the value to commit, or every blocking issue. A rejected submit marks
    /// all fields touched so their errors become visible.
    pub fn submit(&mut self) -> Result<F, Vec<FieldIssue>> {
        let issues = self.issues();
        if issues.is_empty() {
            return Ok(self.draft.clone().prepare_commit());
        }

        for field in F::fields() {
            self.marks_mut(*field).touched = true;
        }
        self.register_interaction();
        Err(issues)
    }

    pub fn view(&self) -> StepFormView {
        let fields = F::fields()
            .iter()
            .map(|field| {
                let marks = self.marks(*field);
                FieldView {
                    name: F::field_key(*field),
                    label: F::field_label(*field),
                    value: match self.draft.value(*field) {
                        FieldValue::Text(text) => text.to_string(),
                        FieldValue::Salary(salary) => salary.to_string(),
                    },
                    touched: marks.touched,
                    dirty: marks.dirty,
                    error: self.visible_error(*field),
                }
            })
            .collect();

        StepFormView {
            step: F::STEP,
            reset_mode: self.reset_mode,
            phase: self.phase,
            can_submit: self.can_submit(),
            fields,
        }
    }
}

impl<F: StepForm> StepController<F> {
    fn resolve(&self, key: &str) -> Result<F::Field, ControllerError> {
        F::find_field(key).ok_or_else(|| ControllerError::UnknownField {
            step: F::STEP,
            field: key.to_string(),
        })
    }
}

/// Step-agnostic view of the mounted controller, addressed by field name.
pub trait StepHandle: fmt::Debug + Send {
    fn step(&self) -> WizardStep;
    fn edit_field(&mut self, field: &str, raw: &str) -> Result<(), ControllerError>;
    fn focus_field(&mut self, field: &str) -> Result<(), ControllerError>;
    fn blur_field(&mut self, field: &str) -> Result<Option<StepIntent>, ControllerError>;
    /// The slice update to dispatch, or the issues that block it.
    fn submit_update(&mut self) -> Result<FormAction, Vec<FieldIssue>>;
    /// The uncommitted draft as a slice update.
    fn draft_update(&self) -> FormAction;
    fn observe_store(&mut self) -> Option<SyncOutcome>;
    fn advance_reset(&mut self) -> ResetProgress;
    fn form_view(&self) -> StepFormView;
}

impl<F: StepForm> StepHandle for StepController<F> {
    fn step(&self) -> WizardStep {
        F::STEP
    }

    fn edit_field(&mut self, field: &str, raw: &str) -> Result<(), ControllerError> {
        let field = self.resolve(field)?;
        self.edit(field, raw);
        Ok(())
    }

    fn focus_field(&mut self, field: &str) -> Result<(), ControllerError> {
        let field = self.resolve(field)?;
        self.focus(field);
        Ok(())
    }

    fn blur_field(&mut self, field: &str) -> Result<Option<StepIntent>, ControllerError> {
        let field = self.resolve(field)?;
        Ok(self.blur(field))
    }

    fn submit_update(&mut self) -> Result<FormAction, Vec<FieldIssue>> {
        self.submit().map(F::into_update)
    }

    fn draft_update(&self) -> FormAction {
        self.draft.clone().into_update()
    }

    fn observe_store(&mut self) -> Option<SyncOutcome> {
        self.observe()
    }

    fn advance_reset(&mut self) -> ResetProgress {
        StepController::<F>::advance_reset(self)
    }

    fn form_view(&self) -> StepFormView {
        self.view()
    }
}

/// A freshly mounted controller with what mounting asked for.
#[derive(Debug)]
pub struct Mounted {
    pub handle: Box<dyn StepHandle>,
    pub outcome: SyncOutcome,
    pub intent: Option<StepIntent>,
}

fn mount_form<F: StepForm>(store: &FormStore) -> Mounted {
    let (controller, outcome) = StepController::<F>::mount(store);
    Mounted {
        handle: Box::new(controller),
        outcome,
        intent: F::mount_intent(),
    }
}

/// Mount the controller for a data step. The summary has none.
pub fn mount_step(step: WizardStep, store: &FormStore) -> Option<Mounted> {
    match step {
        WizardStep::PersonalData => Some(mount_form::<PersonalData>(store)),
        WizardStep::ResidentialInfo => Some(mount_form::<ResidentialInfo>(store)),
        WizardStep::ProfessionalInfo => Some(mount_form::<ProfessionalInfo>(store)),
        WizardStep::Summary => None,
    }
}
