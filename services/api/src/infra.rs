use metrics_exporter_prometheus::PrometheusHandle;
use registration_wizard::wizard::service::{
    RegistryError, SessionId, SessionRegistry, SharedSession,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store; sessions live until the server stops.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, SharedSession>>>,
}

fn poisoned<T>(_: T) -> RegistryError {
    RegistryError::Unavailable("session registry lock poisoned".to_string())
}

impl SessionRegistry for InMemorySessionRegistry {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), RegistryError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        if guard.contains_key(&id) {
            return Err(RegistryError::Conflict);
        }
        guard.insert(id, session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.remove(id))
    }
}
