use std::fmt;

use serde::{Deserialize, Serialize};

use crate::wizard::domain::{
    AddressLookup, PersonalData, Profession, ProfessionalInfo, ResidentialInfo, WizardStep,
};

/// Identifies one async request so superseded completions can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{:06}", self.0)
    }
}

/// The closed set of transitions accepted by the form store.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    UpdatePersonalData(PersonalData),
    UpdateResidentialInfo(ResidentialInfo),
    UpdateProfessionalInfo(ProfessionalInfo),
    SetCurrentStep(WizardStep),
    SetStepValidated {
        step: WizardStep,
        valid: bool,
    },
    Reset,
    RequestAddressLookup {
        postal_code: String,
        token: RequestToken,
    },
    AddressLookupSucceeded {
        token: RequestToken,
        address: AddressLookup,
    },
    AddressLookupFailed {
        token: RequestToken,
        reason: String,
    },
    RequestProfessions {
        token: RequestToken,
    },
    ProfessionsSucceeded {
        token: RequestToken,
        professions: Vec<Profession>,
    },
    ProfessionsFailed {
        token: RequestToken,
        reason: String,
    },
}

impl FormAction {
    pub const fn label(&self) -> &'static str {
        match self {
            FormAction::UpdatePersonalData(_) => "[Form] Update Personal Data",
            FormAction::UpdateResidentialInfo(_) => "[Form] Update Residential Info",
            FormAction::UpdateProfessionalInfo(_) => "[Form] Update Professional Info",
            FormAction::SetCurrentStep(_) => "[Form] Set Current Step",
            FormAction::SetStepValidated { .. } => "[Form] Set Step Validated",
            FormAction::Reset => "[Form] Reset Form",
            FormAction::RequestAddressLookup { .. } => "[Address] Lookup",
            FormAction::AddressLookupSucceeded { .. } => "[Address] Lookup Success",
            FormAction::AddressLookupFailed { .. } => "[Address] Lookup Failure",
            FormAction::RequestProfessions { .. } => "[Profession] Load",
            FormAction::ProfessionsSucceeded { .. } => "[Profession] Load Success",
            FormAction::ProfessionsFailed { .. } => "[Profession] Load Failure",
        }
    }
}
