//! Four-step registration wizard: personal data, residential info, professional info
//! and a read-only summary with document export.

pub mod controller;
pub mod domain;
pub mod effects;
pub mod navigation;
pub mod router;
pub mod salary;
pub mod service;
pub mod session;
pub mod store;
pub mod summary;
pub mod validators;

#[cfg(test)]
mod tests;

pub use controller::{StepController, StepForm};
pub use domain::{
    FormSnapshot, PersonalData, ProfessionalInfo, ResidentialInfo, Salary, ValidityVector,
    WizardStep,
};
pub use navigation::{decide, NavigationDecision};
pub use router::wizard_router;
pub use service::{SessionId, SessionRegistry, WizardService, WizardServiceError};
pub use session::{SessionError, SessionView, SubmitOutcome, WizardSession};
pub use store::{FormAction, FormState, FormStore};
