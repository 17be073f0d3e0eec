use std::sync::Arc;

use shelfplan_infra::{InMemoryLayoutStore, LayoutConfig, LayoutMutationService, LayoutQueries, LayoutStore};

/// Write and read services sharing one store.
#[derive(Debug)]
pub struct AppServices<S> {
    pub mutations: LayoutMutationService<S>,
    pub queries: LayoutQueries<S>,
}

impl<S> AppServices<S>
where
    S: LayoutStore + Clone,
{
    pub fn new(store: S, config: LayoutConfig) -> Self {
        Self {
            mutations: LayoutMutationService::with_config(store.clone(), config),
            queries: LayoutQueries::new(store),
        }
    }
}

/// Wire the services over a fresh in-memory store.
pub fn build_services(config: LayoutConfig) -> AppServices<Arc<InMemoryLayoutStore>> {
    tracing::info!(
        max_commit_attempts = config.max_commit_attempts,
        "layout services ready (in-memory store)"
    );
    AppServices::new(Arc::new(InMemoryLayoutStore::new()), config)
}
