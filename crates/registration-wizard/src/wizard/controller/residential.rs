use serde::{Deserialize, Serialize};

use super::{StepForm, StepIntent};
use crate::wizard::domain::{FormSnapshot, ResidentialInfo, WizardStep};
use crate::wizard::store::FormAction;
use crate::wizard::validators::{digits_only, FieldValue, Rule};

const POSTAL_CODE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentialField {
    PostalCode,
    Street,
    District,
    City,
    StateCode,
}

const FIELDS: [ResidentialField; 5] = [
    ResidentialField::PostalCode,
    ResidentialField::Street,
    ResidentialField::District,
    ResidentialField::City,
    ResidentialField::StateCode,
];

impl StepForm for ResidentialInfo {
    type Field = ResidentialField;

    const STEP: WizardStep = WizardStep::ResidentialInfo;

    fn fields() -> &'static [ResidentialField] {
        &FIELDS
    }

    fn field_key(field: ResidentialField) -> &'static str {
        match field {
            ResidentialField::PostalCode => "postal_code",
            ResidentialField::Street => "street",
            ResidentialField::District => "district",
            ResidentialField::City => "city",
            ResidentialField::StateCode => "state_code",
        }
    }

    fn field_label(field: ResidentialField) -> &'static str {
        match field {
            ResidentialField::PostalCode => "CEP",
            ResidentialField::Street => "Logradouro",
            ResidentialField::District => "Bairro",
            ResidentialField::City => "Cidade",
            ResidentialField::StateCode => "Estado",
        }
    }

    fn rules(field: ResidentialField) -> &'static [Rule] {
        match field {
            ResidentialField::PostalCode => &[Rule::Required, Rule::PostalCode],
            _ => &[Rule::Required],
        }
    }

    fn slice(snapshot: &FormSnapshot) -> &Self {
        &snapshot.residential_info
    }

    fn value(&self, field: ResidentialField) -> FieldValue<'_> {
        FieldValue::Text(match field {
            ResidentialField::PostalCode => &self.postal_code,
            ResidentialField::Street => &self.street,
            ResidentialField::District => &self.district,
            ResidentialField::City => &self.city,
            ResidentialField::StateCode => &self.state_code,
        })
    }

    fn set_value(&mut self, field: ResidentialField, raw: &str) {
        let slot = match field {
            ResidentialField::PostalCode => &mut self.postal_code,
            ResidentialField::Street => &mut self.street,
            ResidentialField::District => &mut self.district,
            ResidentialField::City => &mut self.city,
            ResidentialField::StateCode => &mut self.state_code,
        };
        *slot = raw.to_string();
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn into_update(self) -> FormAction {
        FormAction::UpdateResidentialInfo(self)
    }

    /// Leaving a complete postal code triggers the address lookup.
    fn blur_intent(&self, field: ResidentialField) -> Option<StepIntent> {
        if field != ResidentialField::PostalCode {
            return None;
        }
        (digits_only(&self.postal_code).len() == POSTAL_CODE_DIGITS).then(|| {
            StepIntent::PersistAndLookup {
                postal_code: self.postal_code.clone(),
            }
        })
    }
}
