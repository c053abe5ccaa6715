//! Background effects: request intents become provider calls whose outcome is fed back
//! into the store as success or failure actions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::domain::{AddressLookup, Profession};
use super::store::{FormAction, RequestToken};
use super::validators::digits_only;
use crate::config::ProviderConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("postal code '{0}' has no digits to look up")]
    InvalidPostalCode(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AddressProvider: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<AddressLookup, ProviderError>;
}

#[async_trait]
pub trait ProfessionProvider: Send + Sync {
    async fn professions(&self) -> Result<Vec<Profession>, ProviderError>;
}

/// Canned address lookup keyed by the first two postal-code digits.
#[derive(Debug, Clone, Default)]
pub struct MockAddressProvider {
    latency: Duration,
}

impl MockAddressProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn resolve(postal_code: &str) -> Result<AddressLookup, ProviderError> {
        let digits = digits_only(postal_code);
        if digits.is_empty() {
            return Err(ProviderError::InvalidPostalCode(postal_code.to_string()));
        }

        let prefix = digits.get(..2).unwrap_or(digits.as_str());
        let district = digits.get(2..4).unwrap_or("");
        let (city, state_code) = match prefix {
            "01" => ("São Paulo", "SP"),
            "02" => ("Rio de Janeiro", "RJ"),
            "03" => ("Belo Horizonte", "MG"),
            "04" => ("Porto Alegre", "RS"),
            _ => ("Curitiba", "PR"),
        };

        Ok(AddressLookup {
            street: format!("Rua Exemplo {prefix}"),
            district: format!("Bairro {district}"),
            city: city.to_string(),
            state_code: state_code.to_string(),
        })
    }
}

#[async_trait]
impl AddressProvider for MockAddressProvider {
    async fn lookup(&self, postal_code: &str) -> Result<AddressLookup, ProviderError> {
        tokio::time::sleep(self.latency).await;
        Self::resolve(postal_code)
    }
}

/// Fixed profession catalogue.
#[derive(Debug, Clone, Default)]
pub struct StaticProfessionProvider {
    latency: Duration,
}

impl StaticProfessionProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn catalogue() -> Vec<Profession> {
        [
            "Desenvolvedor Front-end",
            "Desenvolvedor Back-end",
            "Analista de Sistemas",
            "Gerente de Projetos",
            "Designer UX/UI",
            "Analista de Dados",
            "Arquiteto de Software",
            "DevOps Engineer",
            "Product Manager",
            "Tech Lead",
        ]
        .into_iter()
        .enumerate()
        .map(|(position, name)| Profession {
            id: (position + 1).to_string(),
            display_name: name.to_string(),
        })
        .collect()
    }
}

#[async_trait]
impl ProfessionProvider for StaticProfessionProvider {
    async fn professions(&self) -> Result<Vec<Profession>, ProviderError> {
        tokio::time::sleep(self.latency).await;
        Ok(Self::catalogue())
    }
}

const NO_RUNTIME: &str = "no async runtime available";

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub fn next_request_token() -> RequestToken {
    RequestToken(REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Runs provider calls on the tokio runtime and reports completions on a channel.
///
/// In-flight calls are never cancelled; the reducer drops completions whose token is no
/// longer the pending one.
#[derive(Clone)]
pub struct WizardEffects {
    address: Arc<dyn AddressProvider>,
    professions: Arc<dyn ProfessionProvider>,
    outbox: mpsc::UnboundedSender<FormAction>,
}

impl WizardEffects {
    pub fn new(
        address: Arc<dyn AddressProvider>,
        professions: Arc<dyn ProfessionProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<FormAction>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (
            Self {
                address,
                professions,
                outbox,
            },
            inbox,
        )
    }

    pub fn mocked(config: &ProviderConfig) -> (Self, mpsc::UnboundedReceiver<FormAction>) {
        Self::new(
            Arc::new(MockAddressProvider::new(config.lookup_latency)),
            Arc::new(StaticProfessionProvider::new(config.professions_latency)),
        )
    }

    /// Start the background work for a request action. Returns `false` for any other
    /// action.
    pub fn handle(&self, action: &FormAction) -> bool {
        match action {
            FormAction::RequestAddressLookup { postal_code, token } => {
                self.spawn_lookup(postal_code.clone(), *token);
                true
            }
            FormAction::RequestProfessions { token } => {
                self.spawn_professions(*token);
                true
            }
            _ => false,
        }
    }

    fn spawn_lookup(&self, postal_code: String, token: RequestToken) {
        let provider = Arc::clone(&self.address);
        let outbox = self.outbox.clone();
        debug!(%token, postal_code = %postal_code, "address lookup started");

        let Some(runtime) = self.runtime(&FormAction::AddressLookupFailed {
            token,
            reason: NO_RUNTIME.to_string(),
        }) else {
            return;
        };

        runtime.spawn(async move {
            let action = match provider.lookup(&postal_code).await {
                Ok(address) => FormAction::AddressLookupSucceeded { token, address },
                Err(err) => {
                    warn!(%token, error = %err, "address lookup failed");
                    FormAction::AddressLookupFailed {
                        token,
                        reason: err.to_string(),
                    }
                }
            };
            if outbox.send(action).is_err() {
                debug!(%token, "session closed before address lookup completed");
            }
        });
    }

    fn spawn_professions(&self, token: RequestToken) {
        let provider = Arc::clone(&self.professions);
        let outbox = self.outbox.clone();
        debug!(%token, "profession list requested");

        let Some(runtime) = self.runtime(&FormAction::ProfessionsFailed {
            token,
            reason: NO_RUNTIME.to_string(),
        }) else {
            return;
        };

        runtime.spawn(async move {
            let action = match provider.professions().await {
                Ok(professions) => FormAction::ProfessionsSucceeded { token, professions },
                Err(err) => {
                    warn!(%token, error = %err, "profession list failed");
                    FormAction::ProfessionsFailed {
                        token,
                        reason: err.to_string(),
                    }
                }
            };
            if outbox.send(action).is_err() {
                debug!(%token, "session closed before profession list completed");
            }
        });
    }

    /// Current tokio runtime, or `None` after reporting `failure` on the outbox so the
    /// request still completes.
    fn runtime(&self, failure: &FormAction) -> Option<Handle> {
        match Handle::try_current() {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, action = failure.label(), "effect started outside a runtime");
                if self.outbox.send(failure.clone()).is_err() {
                    debug!("session closed before effect failure was reported");
                }
                None
            }
        }
    }
}

impl std::fmt::Debug for WizardEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardEffects").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl AddressProvider for FailingProvider {
        async fn lookup(&self, _postal_code: &str) -> Result<AddressLookup, ProviderError> {
            Err(ProviderError::Unavailable("lookup offline".to_string()))
        }
    }

    #[test]
    fn mock_lookup_maps_known_prefixes() {
        let address = MockAddressProvider::resolve("01310-100").expect("resolves");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state_code, "SP");
        assert_eq!(address.street, "Rua Exemplo 01");
        assert_eq!(address.district, "Bairro 31");

        let fallback = MockAddressProvider::resolve("80010-000").expect("resolves");
        assert_eq!(fallback.city, "Curitiba");
        assert_eq!(fallback.state_code, "PR");
    }

    #[test]
    fn catalogue_has_ten_ordered_entries() {
        let professions = StaticProfessionProvider::catalogue();
        assert_eq!(professions.len(), 10);
        assert_eq!(professions[0].id, "1");
        assert_eq!(professions[9].display_name, "Tech Lead");
    }

    #[tokio::test]
    async fn lookup_success_is_reported_with_its_token() {
        let (effects, mut inbox) = WizardEffects::mocked(&ProviderConfig::immediate());
        let token = RequestToken(42);
        assert!(effects.handle(&FormAction::RequestAddressLookup {
            postal_code: "02040-020".to_string(),
            token,
        }));

        match inbox.recv().await.expect("completion delivered") {
            FormAction::AddressLookupSucceeded { token: seen, address } => {
                assert_eq!(seen, token);
                assert_eq!(address.city, "Rio de Janeiro");
            }
            other => panic!("unexpected completion {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_becomes_failure_action() {
        let (effects, mut inbox) = WizardEffects::new(
            Arc::new(FailingProvider),
            Arc::new(StaticProfessionProvider::default()),
        );
        effects.handle(&FormAction::RequestAddressLookup {
            postal_code: "01310100".to_string(),
            token: RequestToken(7),
        });

        match inbox.recv().await.expect("completion delivered") {
            FormAction::AddressLookupFailed { token, reason } => {
                assert_eq!(token, RequestToken(7));
                assert!(reason.contains("lookup offline"));
            }
            other => panic!("unexpected completion {other:?}"),
        }
    }

    #[test]
    fn non_request_actions_are_not_handled() {
        let (effects, _inbox) = WizardEffects::mocked(&ProviderConfig::immediate());
        assert!(!effects.handle(&FormAction::Reset));
    }

    #[test]
    fn requests_outside_a_runtime_complete_as_failures() {
        let (effects, mut inbox) = WizardEffects::mocked(&ProviderConfig::immediate());
        assert!(effects.handle(&FormAction::RequestAddressLookup {
            postal_code: "01310-100".to_string(),
            token: RequestToken(3),
        }));
        assert!(effects.handle(&FormAction::RequestProfessions {
            token: RequestToken(4),
        }));

        match inbox.try_recv().expect("lookup failure queued") {
            FormAction::AddressLookupFailed { token, reason } => {
                assert_eq!(token, RequestToken(3));
                assert_eq!(reason, NO_RUNTIME);
            }
            other => panic!("unexpected completion {other:?}"),
        }
        assert!(matches!(
            inbox.try_recv().expect("profession failure queued"),
            FormAction::ProfessionsFailed {
                token: RequestToken(4),
                ..
            }
        ));
    }
}
