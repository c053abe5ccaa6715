use serde::{Deserialize, Serialize};

use super::{StepForm, StepIntent};
use crate::wizard::domain::{FormSnapshot, ProfessionalInfo, Salary, WizardStep};
use crate::wizard::salary;
use crate::wizard::store::FormAction;
use crate::wizard::validators::{FieldValue, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalField {
    Profession,
    Employer,
    Salary,
}

const FIELDS: [ProfessionalField; 3] = [
    ProfessionalField::Profession,
    ProfessionalField::Employer,
    ProfessionalField::Salary,
];

impl StepForm for ProfessionalInfo {
    type Field = ProfessionalField;

    const STEP: WizardStep = WizardStep::ProfessionalInfo;

    fn fields() -> &'static [ProfessionalField] {
        &FIELDS
    }

    fn field_key(field: ProfessionalField) -> &'static str {
        match field {
            ProfessionalField::Profession => "profession",
            ProfessionalField::Employer => "employer",
            ProfessionalField::Salary => "salary",
        }
    }

    fn field_label(field: ProfessionalField) -> &'static str {
        match field {
            ProfessionalField::Profession => "Profissão",
            ProfessionalField::Employer => "Empresa",
            ProfessionalField::Salary => "Salário",
        }
    }

    fn rules(field: ProfessionalField) -> &'static [Rule] {
        match field {
            ProfessionalField::Profession => &[Rule::Required, Rule::MinLength(2)],
            ProfessionalField::Employer => &[Rule::Required, Rule::MinLength(2)],
            ProfessionalField::Salary => &[Rule::Required, Rule::Salary],
        }
    }

    fn slice(snapshot: &FormSnapshot) -> &Self {
        &snapshot.professional_info
    }

    fn value(&self, field: ProfessionalField) -> FieldValue<'_> {
        match field {
            ProfessionalField::Profession => FieldValue::Text(&self.profession),
            ProfessionalField::Employer => FieldValue::Text(&self.employer),
            ProfessionalField::Salary => FieldValue::Salary(&self.salary),
        }
    }

    fn set_value(&mut self, field: ProfessionalField, raw: &str) {
        match field {
            ProfessionalField::Profession => self.profession = raw.to_string(),
            ProfessionalField::Employer => self.employer = raw.to_string(),
            ProfessionalField::Salary => self.salary = Salary::RawText(raw.to_string()),
        }
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn into_update(self) -> FormAction {
        FormAction::UpdateProfessionalInfo(self)
    }

    /// Committed salaries are stored as numbers whenever the text parses.
    fn prepare_commit(mut self) -> Self {
        self.salary = salary::normalize(&self.salary);
        self
    }

    fn mount_intent() -> Option<StepIntent> {
        Some(StepIntent::LoadProfessions)
    }

    /// A re-armed form starts without a profession and with a fresh catalogue.
    fn on_rearm(&mut self) -> Option<StepIntent> {
        self.profession.clear();
        Some(StepIntent::LoadProfessions)
    }
}
