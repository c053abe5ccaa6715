use registration_wizard::config::ProviderConfig;
use registration_wizard::wizard::summary::EXPORT_FILE_NAME;
use registration_wizard::wizard::{
    NavigationDecision, Salary, SubmitOutcome, WizardSession, WizardStep,
};

fn edit_all(session: &mut WizardSession, fields: &[(&str, &str)]) {
    for (field, value) in fields {
        session.edit(field, value).expect("field belongs to mounted step");
    }
}

#[test]
fn first_step_submit_then_jump_ahead_is_reverted() {
    let mut session = WizardSession::mocked(&ProviderConfig::immediate());
    edit_all(
        &mut session,
        &[
            ("full_name", "João Pereira"),
            ("birth_date", "01/02/1985"),
            ("national_id", "987.654.321-00"),
            ("phone", "(21) 3333-4444"),
        ],
    );
    assert!(session.view().form.expect("form").can_submit);

    let outcome = session.submit().expect("form mounted");
    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            step: WizardStep::ResidentialInfo
        }
    );
    assert!(session.state().validity.get(WizardStep::PersonalData));
    assert_eq!(session.current_step(), WizardStep::ResidentialInfo);

    assert_eq!(
        session.request_step(WizardStep::Summary),
        NavigationDecision::Revert(WizardStep::ResidentialInfo)
    );
    session.tick();
    assert_eq!(session.current_step(), WizardStep::ResidentialInfo);
    assert_eq!(session.displayed_step(), WizardStep::ResidentialInfo);
}

#[tokio::test]
async fn complete_registration_produces_summary_document() {
    let mut session = WizardSession::mocked(&ProviderConfig::immediate());
    session.run_until_idle().await;

    edit_all(
        &mut session,
        &[
            ("full_name", "João Pereira"),
            ("birth_date", "01/02/1985"),
            ("national_id", "98765432100"),
            ("phone", "2133334444"),
        ],
    );
    session.submit().expect("personal");

    session.edit("postal_code", "03140071").expect("postal code");
    session.blur("postal_code").expect("postal code");
    session.run_until_idle().await;
    let residential = &session.state().snapshot.residential_info;
    assert_eq!(residential.city, "Belo Horizonte");
    assert_eq!(residential.state_code, "MG");
    session.submit().expect("residential");

    session.run_until_idle().await;
    assert_eq!(session.state().resources.professions.len(), 10);
    edit_all(
        &mut session,
        &[
            ("profession", "Arquiteto de Software"),
            ("employer", "Construtora Horizonte"),
            ("salary", "R$ 1.500.000"),
        ],
    );
    session.submit().expect("professional");

    assert_eq!(session.current_step(), WizardStep::Summary);
    assert_eq!(
        session.state().snapshot.professional_info.salary,
        Salary::Number(1_500_000.0)
    );

    let document = session
        .export()
        .expect("export")
        .expect("complete snapshot");
    assert_eq!(document.file_name, EXPORT_FILE_NAME);
    let text = String::from_utf8(document.bytes).expect("utf-8");
    assert!(text.contains("CPF: 987.654.321-00"));
    assert!(text.contains("Telefone: (21) 3333-4444"));
    assert!(text.contains("CEP: 03140-071"));
    assert!(text.contains("Salário: R$ 1.500.000,00"));
}
