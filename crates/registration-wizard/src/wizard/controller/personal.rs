use serde::{Deserialize, Serialize};

use super::StepForm;
use crate::wizard::domain::{FormSnapshot, PersonalData, WizardStep};
use crate::wizard::store::FormAction;
use crate::wizard::validators::{FieldValue, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FullName,
    BirthDate,
    NationalId,
    Phone,
}

const FIELDS: [PersonalField; 4] = [
    PersonalField::FullName,
    PersonalField::BirthDate,
    PersonalField::NationalId,
    PersonalField::Phone,
];

impl StepForm for PersonalData {
    type Field = PersonalField;

    const STEP: WizardStep = WizardStep::PersonalData;

    fn fields() -> &'static [PersonalField] {
        &FIELDS
    }

    fn field_key(field: PersonalField) -> &'static str {
        match field {
            PersonalField::FullName => "full_name",
            PersonalField::BirthDate => "birth_date",
            PersonalField::NationalId => "national_id",
            PersonalField::Phone => "phone",
        }
    }

    fn field_label(field: PersonalField) -> &'static str {
        match field {
            PersonalField::FullName => "Nome completo",
            PersonalField::BirthDate => "Data de nascimento",
            PersonalField::NationalId => "CPF",
            PersonalField::Phone => "Telefone",
        }
    }

    fn rules(field: PersonalField) -> &'static [Rule] {
        match field {
            PersonalField::FullName => &[Rule::Required, Rule::MinLength(3)],
            PersonalField::BirthDate => &[Rule::Required, Rule::BirthDate],
            PersonalField::NationalId => &[Rule::Required, Rule::NationalId],
            PersonalField::Phone => &[Rule::Required, Rule::Phone],
        }
    }

    fn slice(snapshot: &FormSnapshot) -> &Self {
        &snapshot.personal_data
    }

    fn value(&self, field: PersonalField) -> FieldValue<'_> {
        FieldValue::Text(match field {
            PersonalField::FullName => &self.full_name,
            PersonalField::BirthDate => &self.birth_date,
            PersonalField::NationalId => &self.national_id,
            PersonalField::Phone => &self.phone,
        })
    }

    fn set_value(&mut self, field: PersonalField, raw: &str) {
        let slot = match field {
            PersonalField::FullName => &mut self.full_name,
            PersonalField::BirthDate => &mut self.birth_date,
            PersonalField::NationalId => &mut self.national_id,
            PersonalField::Phone => &mut self.phone,
        };
        *slot = raw.to_string();
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn into_update(self) -> FormAction {
        FormAction::UpdatePersonalData(self)
    }
}
