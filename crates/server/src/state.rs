//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AppConfig, GenerationPolicy};
use crate::generation::{Orchestrator, RequestValidator};
use crate::hosting::ImageHost;
use crate::provider::Provider;
use crate::services::auth::AuthService;
use crate::services::ledger::CreditLedger;
use crate::store::{GenerationStore, ImageStore, MemoryStore, Stores, TenantStore, UserStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The provider and image host
/// are chosen once, when the state is built, and never change afterwards.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    orchestrator: Orchestrator,
    host: ImageHost,
    policy: GenerationPolicy,
}

impl AppState {
    /// Wire the generation workflow over the given stores.
    #[must_use]
    pub fn new(
        stores: Stores,
        provider: Provider,
        host: ImageHost,
        policy: GenerationPolicy,
    ) -> Self {
        let validator = RequestValidator::new(stores.tenants.clone(), stores.images.clone());
        let ledger = CreditLedger::new(stores.tenants.clone());
        let orchestrator = Orchestrator::new(
            validator,
            ledger,
            provider,
            stores.generations.clone(),
            policy.refund_on_failure,
        );

        Self {
            inner: Arc::new(AppStateInner {
                stores,
                orchestrator,
                host,
                policy,
            }),
        }
    }

    /// Production state: `PostgreSQL` stores, backends chosen from `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig, pool: &PgPool) -> Self {
        let state = Self::new(
            Stores::postgres(pool),
            Provider::select(&config.provider),
            ImageHost::select(config.imgbb.as_ref()),
            config.generation,
        );
        state.log_backends();
        state
    }

    fn log_backends(&self) {
        tracing::info!(
            provider = self.orchestrator().provider().name(),
            image_host = self.host().name(),
            "Backends selected"
        );
    }

    /// State over a [`MemoryStore`] with inline image hosting.
    #[must_use]
    pub fn in_memory(store: &MemoryStore, provider: Provider, policy: GenerationPolicy) -> Self {
        Self::new(Stores::in_memory(store), provider, ImageHost::Inline, policy)
    }

    #[must_use]
    pub fn tenants(&self) -> &dyn TenantStore {
        self.inner.stores.tenants.as_ref()
    }

    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.stores.images.as_ref()
    }

    #[must_use]
    pub fn generations(&self) -> &dyn GenerationStore {
        self.inner.stores.generations.as_ref()
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.stores.users.as_ref()
    }

    /// Authentication service over this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tenants())
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    #[must_use]
    pub fn host(&self) -> &ImageHost {
        &self.inner.host
    }

    #[must_use]
    pub fn policy(&self) -> GenerationPolicy {
        self.inner.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_state_uses_given_backends() {
        let state = AppState::in_memory(
            &MemoryStore::new(),
            Provider::stub(),
            GenerationPolicy::default(),
        );
        state.log_backends();
        assert_eq!(state.orchestrator().provider().name(), "stub");
        assert_eq!(state.host().name(), "inline");
        assert_eq!(state.policy(), GenerationPolicy::default());
    }
}
