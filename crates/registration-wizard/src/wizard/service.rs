use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use super::domain::WizardStep;
use super::navigation::NavigationDecision;
use super::session::{SessionError, SessionView, SubmitOutcome, WizardSession};
use super::summary::ExportedDocument;
use crate::config::ProviderConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type SharedSession = Arc<Mutex<WizardSession>>;

/// Storage abstraction for live sessions so the service can be exercised in isolation.
pub trait SessionRegistry: Send + Sync {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), RegistryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError>;
    fn remove(&self, id: &SessionId) -> Result<Option<SharedSession>, RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session already exists")]
    Conflict,
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WizardServiceError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionEnvelope {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub view: SessionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub session: SessionEnvelope,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationResponse {
    pub navigation: NavigationDecision,
    pub session: SessionEnvelope,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("wiz-{id:06}"))
}

/// Facade running wizard events against registered sessions.
///
/// Every command first applies effect completions that already arrived, then runs the
/// command, then drains the deferred queue so responses reflect the settled state.
pub struct WizardService<R> {
    registry: Arc<R>,
    providers: ProviderConfig,
}

impl<R> WizardService<R>
where
    R: SessionRegistry + 'static,
{
    pub fn new(registry: Arc<R>, providers: ProviderConfig) -> Self {
        Self {
            registry,
            providers,
        }
    }

    pub async fn create(&self) -> Result<SessionEnvelope, WizardServiceError> {
        let id = next_session_id();
        let mut session = WizardSession::mocked(&self.providers);
        session.flush_deferred();
        let view = session.view();

        self.registry
            .insert(id.clone(), Arc::new(Mutex::new(session)))?;
        info!(session_id = %id, "wizard session created");

        Ok(SessionEnvelope {
            session_id: id,
            view,
        })
    }

    /// Drop a session from the registry. In-flight effects finish into a closed channel.
    pub async fn close(&self, id: &SessionId) -> Result<(), WizardServiceError> {
        self.registry
            .remove(id)?
            .ok_or_else(|| WizardServiceError::NotFound(id.clone()))?;
        info!(session_id = %id, "wizard session closed");
        Ok(())
    }

    fn session(&self, id: &SessionId) -> Result<SharedSession, WizardServiceError> {
        self.registry
            .fetch(id)?
            .ok_or_else(|| WizardServiceError::NotFound(id.clone()))
    }

    async fn run<T, F>(
        &self,
        id: &SessionId,
        command: F,
    ) -> Result<(T, SessionEnvelope), WizardServiceError>
    where
        F: FnOnce(&mut WizardSession) -> Result<T, SessionError>,
    {
        let session = self.session(id)?;
        let mut session = session.lock().await;
        session.pump();
        let value = command(&mut *session)?;
        session.flush_deferred();
        session.pump();

        let envelope = SessionEnvelope {
            session_id: id.clone(),
            view: session.view(),
        };
        Ok((value, envelope))
    }

    pub async fn view(&self, id: &SessionId) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, |_| Ok(())).await?;
        Ok(envelope)
    }

    pub async fn edit(
        &self,
        id: &SessionId,
        field: &str,
        value: &str,
    ) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, |session| session.edit(field, value)).await?;
        Ok(envelope)
    }

    pub async fn focus(
        &self,
        id: &SessionId,
        field: &str,
    ) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, |session| session.focus(field)).await?;
        Ok(envelope)
    }

    pub async fn blur(
        &self,
        id: &SessionId,
        field: &str,
    ) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, |session| session.blur(field)).await?;
        Ok(envelope)
    }

    pub async fn submit(&self, id: &SessionId) -> Result<SubmitResponse, WizardServiceError> {
        let (outcome, session) = self.run(id, WizardSession::submit).await?;
        Ok(SubmitResponse { outcome, session })
    }

    pub async fn navigate(
        &self,
        id: &SessionId,
        target: WizardStep,
    ) -> Result<NavigationResponse, WizardServiceError> {
        let (navigation, session) = self
            .run(id, |session| Ok(session.request_step(target)))
            .await?;
        Ok(NavigationResponse {
            navigation,
            session,
        })
    }

    pub async fn previous(&self, id: &SessionId) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, WizardSession::go_back).await?;
        Ok(envelope)
    }

    pub async fn summary_edit(
        &self,
        id: &SessionId,
    ) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, WizardSession::summary_edit).await?;
        Ok(envelope)
    }

    pub async fn new_form(
        &self,
        id: &SessionId,
    ) -> Result<SessionEnvelope, WizardServiceError> {
        let (_, envelope) = self.run(id, WizardSession::new_form).await?;
        Ok(envelope)
    }

    pub async fn export(
        &self,
        id: &SessionId,
    ) -> Result<Option<ExportedDocument>, WizardServiceError> {
        let (document, _) = self.run(id, |session| session.export()).await?;
        Ok(document)
    }

    /// Wait for the session's in-flight effects and deferred events to finish.
    pub async fn settle(&self, id: &SessionId) -> Result<SessionEnvelope, WizardServiceError> {
        let session = self.session(id)?;
        let mut session = session.lock().await;
        session.run_until_idle().await;
        Ok(SessionEnvelope {
            session_id: id.clone(),
            view: session.view(),
        })
    }
}
