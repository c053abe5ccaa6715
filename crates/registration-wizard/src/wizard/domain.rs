use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered wizard steps; the discriminant is the step index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalData,
    ResidentialInfo,
    ProfessionalInfo,
    Summary,
}

impl WizardStep {
    pub const COUNT: usize = 4;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::PersonalData,
            Self::ResidentialInfo,
            Self::ProfessionalInfo,
            Self::Summary,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::PersonalData => 0,
            Self::ResidentialInfo => 1,
            Self::ProfessionalInfo => 2,
            Self::Summary => 3,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::PersonalData),
            1 => Some(Self::ResidentialInfo),
            2 => Some(Self::ProfessionalInfo),
            3 => Some(Self::Summary),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::PersonalData => None,
            Self::ResidentialInfo => Some(Self::PersonalData),
            Self::ProfessionalInfo => Some(Self::ResidentialInfo),
            Self::Summary => Some(Self::ProfessionalInfo),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalData => "Dados Pessoais",
            Self::ResidentialInfo => "Informações Residenciais",
            Self::ProfessionalInfo => "Informações Profissionais",
            Self::Summary => "Resumo",
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::PersonalData
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    pub full_name: String,
    pub birth_date: String,
    pub national_id: String,
    pub phone: String,
}

impl PersonalData {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.birth_date.is_empty()
            && self.national_id.is_empty()
            && self.phone.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentialInfo {
    pub postal_code: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state_code: String,
}

impl ResidentialInfo {
    pub fn is_empty(&self) -> bool {
        self.postal_code.is_empty()
            && self.street.is_empty()
            && self.district.is_empty()
            && self.city.is_empty()
            && self.state_code.is_empty()
    }

    /// Merge a lookup result, keeping the postal code exactly as the user typed it.
    pub fn merge_lookup(&mut self, address: &AddressLookup) {
        self.street = address.street.clone();
        self.district = address.district.clone();
        self.city = address.city.clone();
        self.state_code = address.state_code.clone();
    }
}

/// Salary as typed (masked currency text) or as a normalised amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Salary {
    Number(f64),
    RawText(String),
}

impl Salary {
    /// Zero and blank text both count as "no salary entered".
    pub fn is_empty(&self) -> bool {
        match self {
            Salary::Number(value) => *value == 0.0,
            Salary::RawText(text) => text.is_empty(),
        }
    }
}

impl Default for Salary {
    fn default() -> Self {
        Salary::RawText(String::new())
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Salary::Number(value) => write!(f, "{value}"),
            Salary::RawText(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalInfo {
    pub profession: String,
    pub employer: String,
    pub salary: Salary,
}

impl ProfessionalInfo {
    pub fn is_empty(&self) -> bool {
        self.profession.is_empty() && self.employer.is_empty() && self.salary.is_empty()
    }
}

/// Aggregate of every step's data plus the visible step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub personal_data: PersonalData,
    pub residential_info: ResidentialInfo,
    pub professional_info: ProfessionalInfo,
    pub current_step: WizardStep,
}

/// One flag per step, set only by an explicit valid submit of that step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidityVector([bool; WizardStep::COUNT]);

impl ValidityVector {
    pub const fn from_flags(flags: [bool; WizardStep::COUNT]) -> Self {
        Self(flags)
    }

    pub fn get(&self, step: WizardStep) -> bool {
        self.0[step.index()]
    }

    pub fn set(&mut self, step: WizardStep, valid: bool) {
        self.0[step.index()] = valid;
    }

    pub fn none_validated(&self) -> bool {
        self.0.iter().all(|validated| !validated)
    }

    pub fn flags(&self) -> [bool; WizardStep::COUNT] {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
    pub id: String,
    pub display_name: String,
}

/// Address fields returned by a postal-code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLookup {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state_code: String,
}

/// Federative unit offered by the residential step's state selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FederativeUnit {
    pub code: &'static str,
    pub name: &'static str,
}

pub const FEDERATIVE_UNITS: [FederativeUnit; 27] = [
    FederativeUnit { code: "AC", name: "Acre" },
    FederativeUnit { code: "AL", name: "Alagoas" },
    FederativeUnit { code: "AP", name: "Amapá" },
    FederativeUnit { code: "AM", name: "Amazonas" },
    FederativeUnit { code: "BA", name: "Bahia" },
    FederativeUnit { code: "CE", name: "Ceará" },
    FederativeUnit { code: "DF", name: "Distrito Federal" },
    FederativeUnit { code: "ES", name: "Espírito Santo" },
    FederativeUnit { code: "GO", name: "Goiás" },
    FederativeUnit { code: "MA", name: "Maranhão" },
    FederativeUnit { code: "MT", name: "Mato Grosso" },
    FederativeUnit { code: "MS", name: "Mato Grosso do Sul" },
    FederativeUnit { code: "MG", name: "Minas Gerais" },
    FederativeUnit { code: "PA", name: "Pará" },
    FederativeUnit { code: "PB", name: "Paraíba" },
    FederativeUnit { code: "PR", name: "Paraná" },
    FederativeUnit { code: "PE", name: "Pernambuco" },
    FederativeUnit { code: "PI", name: "Piauí" },
    FederativeUnit { code: "RJ", name: "Rio de Janeiro" },
    FederativeUnit { code: "RN", name: "Rio Grande do Norte" },
    FederativeUnit { code: "RS", name: "Rio Grande do Sul" },
    FederativeUnit { code: "RO", name: "Rondônia" },
    FederativeUnit { code: "RR", name: "Roraima" },
    FederativeUnit { code: "SC", name: "Santa Catarina" },
    FederativeUnit { code: "SP", name: "São Paulo" },
    FederativeUnit { code: "SE", name: "Sergipe" },
    FederativeUnit { code: "TO", name: "Tocantins" },
];
