//! Read-only summary of a finished form and its document export.

mod export;
pub mod format;

use serde::Serialize;

use super::domain::{PersonalData, ProfessionalInfo, ResidentialInfo};
use format::{
    format_birth_date, format_national_id, format_phone, format_postal_code, format_salary_brl,
};

pub use export::{
    DocumentRenderer, ExportError, ExportedDocument, Exporter, PartialSnapshot,
    TextDocumentRenderer, EXPORT_FILE_NAME,
};

pub const SUMMARY_TITLE: &str = "Resumo do Formulário";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub title: &'static str,
    pub items: Vec<SummaryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub title: &'static str,
    pub sections: Vec<SummarySection>,
}

fn item(label: &'static str, value: impl Into<String>) -> SummaryItem {
    SummaryItem {
        label,
        value: value.into(),
    }
}

impl SummaryView {
    pub fn build(
        personal: &PersonalData,
        residential: &ResidentialInfo,
        professional: &ProfessionalInfo,
    ) -> Self {
        let sections = vec![
            SummarySection {
                title: "Dados Pessoais",
                items: vec![
                    item("Nome Completo", personal.full_name.as_str()),
                    item("Data de Nascimento", format_birth_date(&personal.birth_date)),
                    item("CPF", format_national_id(&personal.national_id)),
                    item("Telefone", format_phone(&personal.phone)),
                ],
            },
            SummarySection {
                title: "Informações Residenciais",
                items: vec![
                    item("CEP", format_postal_code(&residential.postal_code)),
                    item("Endereço", residential.street.as_str()),
                    item("Bairro", residential.district.as_str()),
                    item("Cidade", residential.city.as_str()),
                    item("Estado", residential.state_code.as_str()),
                ],
            },
            SummarySection {
                title: "Informações Profissionais",
                items: vec![
                    item("Profissão", professional.profession.as_str()),
                    item("Empresa", professional.employer.as_str()),
                    item("Salário", format_salary_brl(&professional.salary)),
                ],
            },
        ];

        Self {
            title: SUMMARY_TITLE,
            sections,
        }
    }
}
