//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::{PearRepository, PearStore};
use crate::services::PearService;
use crate::slack::{ChatApi, SignatureVerifier, SlackClient};

/// State for the production server.
pub type BotState = AppState<PearRepository, SlackClient>;

/// Application state shared across all handlers.
///
/// Generic over the store and chat client so tests can swap in fakes.
pub struct AppState<S, C> {
    inner: Arc<AppStateInner<S, C>>,
}

struct AppStateInner<S, C> {
    service: PearService<S, C>,
    verifier: SignatureVerifier,
}

// Manual impl: cloning the Arc must not require S: Clone or C: Clone.
impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PearStore, C: ChatApi> AppState<S, C> {
    /// Create a new application state.
    #[must_use]
    pub fn new(service: PearService<S, C>, verifier: SignatureVerifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner { service, verifier }),
        }
    }

    /// Get the pear service.
    #[must_use]
    pub fn service(&self) -> &PearService<S, C> {
        &self.inner.service
    }

    /// Get the webhook signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }
}
