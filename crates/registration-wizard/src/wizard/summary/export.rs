use std::fmt::Write as _;

use mime::Mime;
use tracing::{debug, info};

use super::SummaryView;
use crate::wizard::domain::{FormSnapshot, PersonalData, ProfessionalInfo, ResidentialInfo};

pub const EXPORT_FILE_NAME: &str = "formulario-dados.txt";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to lay out summary document")]
    Layout(#[from] std::fmt::Error),
    #[error("document renderer failed: {0}")]
    Renderer(String),
}

/// Turns a summary into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn file_name(&self) -> &str;
    fn content_type(&self) -> Mime;
    fn render(&self, summary: &SummaryView) -> Result<Vec<u8>, ExportError>;
}

/// Plain UTF-8 text layout: title, then one headed block per section.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDocumentRenderer;

impl DocumentRenderer for TextDocumentRenderer {
    fn file_name(&self) -> &str {
        EXPORT_FILE_NAME
    }

    fn content_type(&self) -> Mime {
        mime::TEXT_PLAIN_UTF_8
    }

    fn render(&self, summary: &SummaryView) -> Result<Vec<u8>, ExportError> {
        let mut document = String::new();
        writeln!(document, "{}", summary.title)?;
        writeln!(document, "{}", "=".repeat(summary.title.chars().count()))?;

        for section in &summary.sections {
            writeln!(document)?;
            writeln!(document, "{}", section.title)?;
            writeln!(document, "{}", "-".repeat(section.title.chars().count()))?;
            for item in &section.items {
                writeln!(document, "{}: {}", item.label, item.value)?;
            }
        }

        Ok(document.into_bytes())
    }
}

/// Snapshot as received by the export action; any slice may be missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialSnapshot<'a> {
    pub personal_data: Option<&'a PersonalData>,
    pub residential_info: Option<&'a ResidentialInfo>,
    pub professional_info: Option<&'a ProfessionalInfo>,
}

impl<'a> From<&'a FormSnapshot> for PartialSnapshot<'a> {
    fn from(snapshot: &'a FormSnapshot) -> Self {
        Self {
            personal_data: Some(&snapshot.personal_data),
            residential_info: Some(&snapshot.residential_info),
            professional_info: Some(&snapshot.professional_info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Exporter<R = TextDocumentRenderer> {
    renderer: R,
}

impl Exporter<TextDocumentRenderer> {
    pub fn text() -> Self {
        Self::new(TextDocumentRenderer)
    }
}

impl<R: DocumentRenderer> Exporter<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Render the document, or `Ok(None)` without touching the renderer when a slice
    /// is missing.
    pub fn export(
        &self,
        snapshot: PartialSnapshot<'_>,
    ) -> Result<Option<ExportedDocument>, ExportError> {
        let (Some(personal), Some(residential), Some(professional)) = (
            snapshot.personal_data,
            snapshot.residential_info,
            snapshot.professional_info,
        ) else {
            debug!("export skipped: snapshot is incomplete");
            return Ok(None);
        };

        let summary = SummaryView::build(personal, residential, professional);
        let bytes = self.renderer.render(&summary)?;
        info!(
            file_name = self.renderer.file_name(),
            size = bytes.len(),
            "summary document exported"
        );

        Ok(Some(ExportedDocument {
            file_name: self.renderer.file_name().to_string(),
            content_type: self.renderer.content_type(),
            bytes,
        }))
    }
}
