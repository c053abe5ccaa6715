//! Single source of truth for the wizard: a pure reducer behind a single-owner holder.

mod actions;
mod reducer;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

pub use actions::{FormAction, RequestToken};
pub use reducer::{reduce, AsyncResourceState, FormState};

/// Owns the current state and publishes every change to its subscribers.
#[derive(Debug)]
pub struct FormStore {
    state: Arc<FormState>,
    publisher: watch::Sender<Arc<FormState>>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::with_state(FormState::pristine())
    }

    pub fn with_state(state: FormState) -> Self {
        let state = Arc::new(state);
        let (publisher, _) = watch::channel(Arc::clone(&state));
        Self { state, publisher }
    }

    pub fn state(&self) -> &Arc<FormState> {
        &self.state
    }

    /// Apply an action in dispatch order. Returns whether the state changed.
    pub fn dispatch(&mut self, action: &FormAction) -> bool {
        let next = reduce(&self.state, action);
        let changed = !Arc::ptr_eq(&next, &self.state);
        debug!(action = action.label(), changed, "form action dispatched");

        if changed {
            self.state = next;
            self.publisher.send_replace(Arc::clone(&self.state));
        }
        changed
    }

    /// Register an observer. Dropping the returned handle unregisters it.
    pub fn subscribe(&self) -> StoreSubscription {
        StoreSubscription {
            receiver: self.publisher.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.receiver_count()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped store observer tied to the lifetime of its owner.
#[derive(Debug)]
pub struct StoreSubscription {
    receiver: watch::Receiver<Arc<FormState>>,
}

impl StoreSubscription {
    /// The latest published state, if it changed since the last call.
    pub fn changed_state(&mut self) -> Option<Arc<FormState>> {
        match self.receiver.has_changed() {
            Ok(true) => Some(Arc::clone(&self.receiver.borrow_and_update())),
            _ => None,
        }
    }

    pub fn current(&self) -> Arc<FormState> {
        Arc::clone(&self.receiver.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::domain::WizardStep;

    #[test]
    fn dispatch_notifies_subscribers_only_on_change() {
        let mut store = FormStore::new();
        let mut subscription = store.subscribe();
        assert!(subscription.changed_state().is_none());

        assert!(!store.dispatch(&FormAction::SetCurrentStep(WizardStep::PersonalData)));
        assert!(subscription.changed_state().is_none());

        assert!(store.dispatch(&FormAction::SetCurrentStep(WizardStep::ResidentialInfo)));
        let seen = subscription.changed_state().expect("change published");
        assert_eq!(seen.snapshot.current_step, WizardStep::ResidentialInfo);
        assert!(subscription.changed_state().is_none());
    }

    #[test]
    fn dropping_subscription_unregisters_it() {
        let store = FormStore::new();
        let first = store.subscribe();
        let second = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(first);
        assert_eq!(store.subscriber_count(), 1);
        drop(second);
        assert_eq!(store.subscriber_count(), 0);
    }
}
