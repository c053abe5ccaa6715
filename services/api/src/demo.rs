use clap::Args;
use registration_wizard::config::{AppConfig, ProviderConfig};
use registration_wizard::error::AppError;
use registration_wizard::wizard::summary::EXPORT_FILE_NAME;
use registration_wizard::wizard::{NavigationDecision, SubmitOutcome, WizardSession, WizardStep};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Where to write the exported document. Defaults to the export file name in the
    /// current directory.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Use the configured provider latencies instead of immediate answers.
    #[arg(long)]
    pub(crate) realtime: bool,
}

const PERSONAL: [(&str, &str); 4] = [
    ("full_name", "Maria Silva"),
    ("birth_date", "15081990"),
    ("national_id", "12345678909"),
    ("phone", "11987654321"),
];

const PROFESSIONAL: [(&str, &str); 3] = [
    ("profession", "Arquiteto de Software"),
    ("employer", "Acme Ltda"),
    ("salary", "R$ 1.500.000"),
];

const POSTAL_CODE: &str = "03140071";

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { output, realtime } = args;

    let providers = if realtime {
        AppConfig::load()?.providers
    } else {
        ProviderConfig::immediate()
    };

    println!("Registration wizard demo");
    let mut session = WizardSession::mocked(&providers);
    session.run_until_idle().await;

    match session.request_step(WizardStep::Summary) {
        NavigationDecision::Revert(step) => {
            println!(
                "- Jump to the summary refused; stepper flashes back to {}",
                step
            );
        }
        other => println!("- Jump to the summary answered with {other:?}"),
    }
    session.flush_deferred();

    fill(&mut session, &PERSONAL)?;
    report_submit(&mut session)?;

    session.edit("postal_code", POSTAL_CODE)?;
    session.blur("postal_code")?;
    session.run_until_idle().await;
    let address = &session.state().snapshot.residential_info;
    println!(
        "- Postal code {} resolved to {}, {} - {}",
        POSTAL_CODE, address.street, address.city, address.state_code
    );
    report_submit(&mut session)?;
    session.run_until_idle().await;

    fill(&mut session, &PROFESSIONAL)?;
    report_submit(&mut session)?;
    session.run_until_idle().await;

    if let Some(summary) = session.view().summary {
        println!("\n{}", summary.title);
        for section in &summary.sections {
            println!("{}", section.title);
            for item in &section.items {
                println!("  - {}: {}", item.label, item.value);
            }
        }
    }

    match session.export()? {
        Some(document) => {
            let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            tokio::fs::write(&path, &document.bytes).await?;
            println!(
                "\nExported {} ({}, {} bytes) to {}",
                document.file_name,
                document.content_type,
                document.bytes.len(),
                path.display()
            );
        }
        None => println!("\nExport skipped: form data incomplete"),
    }

    Ok(())
}

fn fill(session: &mut WizardSession, fields: &[(&str, &str)]) -> Result<(), AppError> {
    for (field, value) in fields {
        session.edit(field, value)?;
    }
    Ok(())
}

fn report_submit(session: &mut WizardSession) -> Result<(), AppError> {
    let step = session.current_step();
    match session.submit()? {
        SubmitOutcome::Advanced { step: next } => {
            println!("- {} submitted, moving to {}", step.label(), next.label());
        }
        SubmitOutcome::Rejected { issues } => {
            println!("- {} rejected:", step.label());
            for issue in issues {
                println!("    {}: {}", issue.field, issue.error);
            }
        }
    }
    session.flush_deferred();
    Ok(())
}
