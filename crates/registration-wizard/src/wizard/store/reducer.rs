use std::sync::Arc;

use serde::Serialize;

use super::actions::{FormAction, RequestToken};
use crate::wizard::domain::{FormSnapshot, Profession, ValidityVector};

/// Loading/error flags shared by both background resources plus the profession list.
///
/// The profession list is kept while a new request is in flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AsyncResourceState {
    pub loading: bool,
    pub error: Option<String>,
    pub professions: Vec<Profession>,
}

/// Complete store state. Only [`reduce`] produces new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub snapshot: FormSnapshot,
    pub validity: ValidityVector,
    pub resources: AsyncResourceState,
    #[serde(skip)]
    pending_lookup: Option<RequestToken>,
    #[serde(skip)]
    pending_professions: Option<RequestToken>,
}

impl FormState {
    pub fn pristine() -> Self {
        Self::default()
    }

    /// Token of the address lookup whose completion will be applied, if any.
    pub fn pending_lookup(&self) -> Option<RequestToken> {
        self.pending_lookup
    }

    pub fn pending_professions(&self) -> Option<RequestToken> {
        self.pending_professions
    }
}

/// Apply one action. Transitions that leave the state unchanged hand back the same
/// `Arc`, so `Arc::ptr_eq` is a valid change test.
pub fn reduce(state: &Arc<FormState>, action: &FormAction) -> Arc<FormState> {
    match transition(state, action) {
        Some(next) if next != **state => Arc::new(next),
        _ => Arc::clone(state),
    }
}

fn transition(state: &FormState, action: &FormAction) -> Option<FormState> {
    let mut next = state.clone();

    match action {
        FormAction::UpdatePersonalData(personal_data) => {
            next.snapshot.personal_data = personal_data.clone();
        }
        FormAction::UpdateResidentialInfo(residential_info) => {
            next.snapshot.residential_info = residential_info.clone();
        }
        FormAction::UpdateProfessionalInfo(professional_info) => {
            next.snapshot.professional_info = professional_info.clone();
        }
        FormAction::SetCurrentStep(step) => {
            next.snapshot.current_step = *step;
        }
        FormAction::SetStepValidated { step, valid } => {
            next.validity.set(*step, *valid);
        }
        FormAction::Reset => {
            next = FormState::pristine();
        }
        FormAction::RequestAddressLookup { token, .. } => {
            next.resources.loading = true;
            next.resources.error = None;
            next.pending_lookup = Some(*token);
        }
        FormAction::AddressLookupSucceeded { token, address } => {
            if state.pending_lookup != Some(*token) {
                return None;
            }
            next.resources.loading = false;
            next.pending_lookup = None;
            next.snapshot.residential_info.merge_lookup(address);
        }
        FormAction::AddressLookupFailed { token, reason } => {
            if state.pending_lookup != Some(*token) {
                return None;
            }
            next.resources.loading = false;
            next.resources.error = Some(reason.clone());
            next.pending_lookup = None;
        }
        FormAction::RequestProfessions { token } => {
            next.resources.loading = true;
            next.resources.error = None;
            next.pending_professions = Some(*token);
        }
        FormAction::ProfessionsSucceeded { token, professions } => {
            if state.pending_professions != Some(*token) {
                return None;
            }
            next.resources.loading = false;
            next.resources.professions = professions.clone();
            next.pending_professions = None;
        }
        FormAction::ProfessionsFailed { token, reason } => {
            if state.pending_professions != Some(*token) {
                return None;
            }
            next.resources.loading = false;
            next.resources.error = Some(reason.clone());
            next.pending_professions = None;
        }
    }

    Some(next)
}
