use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::wizard::service::{RegistryError, SessionId, SessionRegistry, SharedSession};
use crate::wizard::{wizard_router, WizardService, WizardSession};

pub(super) const POSTAL_CODE: &str = "01310-100";

pub(super) fn session() -> WizardSession {
    WizardSession::mocked(&ProviderConfig::immediate())
}

pub(super) fn fill_personal(session: &mut WizardSession) {
    for (field, value) in [
        ("full_name", "Maria Silva"),
        ("birth_date", "15/08/1990"),
        ("national_id", "123.456.789-09"),
        ("phone", "(11) 98765-4321"),
    ] {
        session.edit(field, value).expect("personal field exists");
    }
}

pub(super) fn fill_residential(session: &mut WizardSession) {
    for (field, value) in [
        ("postal_code", POSTAL_CODE),
        ("street", "Avenida Paulista"),
        ("district", "Bela Vista"),
        ("city", "São Paulo"),
        ("state_code", "SP"),
    ] {
        session.edit(field, value).expect("residential field exists");
    }
}

pub(super) fn fill_professional(session: &mut WizardSession) {
    for (field, value) in [
        ("profession", "Tech Lead"),
        ("employer", "Acme Ltda"),
        ("salary", "R$ 5.000,00"),
    ] {
        session.edit(field, value).expect("professional field exists");
    }
}

/// Walk a fresh session through every data step up to the summary.
pub(super) async fn session_on_summary() -> WizardSession {
    let mut session = session();
    session.flush_deferred();
    fill_personal(&mut session);
    session.submit().expect("personal submit");
    fill_residential(&mut session);
    session.submit().expect("residential submit");
    session.run_until_idle().await;
    fill_professional(&mut session);
    session.submit().expect("professional submit");
    session.run_until_idle().await;
    session
}

#[derive(Default, Clone)]
pub(super) struct MemoryRegistry {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, SharedSession>>>,
}

impl SessionRegistry for MemoryRegistry {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), RegistryError> {
        let mut guard = self.sessions.lock().expect("registry mutex poisoned");
        if guard.contains_key(&id) {
            return Err(RegistryError::Conflict);
        }
        guard.insert(id, session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        let guard = self.sessions.lock().expect("registry mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        let mut guard = self.sessions.lock().expect("registry mutex poisoned");
        Ok(guard.remove(id))
    }
}

pub(super) struct UnavailableRegistry;

impl SessionRegistry for UnavailableRegistry {
    fn insert(&self, _id: SessionId, _session: SharedSession) -> Result<(), RegistryError> {
        Err(RegistryError::Unavailable("maintenance".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        Err(RegistryError::Unavailable("maintenance".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        Err(RegistryError::Unavailable("maintenance".to_string()))
    }
}

pub(super) fn build_service() -> Arc<WizardService<MemoryRegistry>> {
    Arc::new(WizardService::new(
        Arc::new(MemoryRegistry::default()),
        ProviderConfig::immediate(),
    ))
}

pub(super) fn router_with_service<R>(service: Arc<WizardService<R>>) -> axum::Router
where
    R: SessionRegistry + 'static,
{
    wizard_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
