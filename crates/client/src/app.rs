//! Composition root: wires configuration, the remote store, the extractor and
//! the session gate into one client.

use std::sync::Arc;

use stocktrack_ai::ExtractionGateway;
use stocktrack_core::DomainResult;
use stocktrack_infra::{InMemoryRemoteStore, RemoteStore};
use stocktrack_inventory::{CategoryFilter, CategoryRegistry, InventoryItem};

use crate::config::ClientConfig;
use crate::ingestion::IngestionWorkflow;
use crate::session::{SessionGate, SessionProvider};
use crate::store::{InventoryStore, StoreError};

pub struct ClientApp<G> {
    config: ClientConfig,
    store: Arc<InventoryStore>,
    categories: CategoryRegistry,
    ingestion: IngestionWorkflow<G>,
}

impl<G> ClientApp<G>
where
    G: ExtractionGateway,
{
    pub fn new(
        config: ClientConfig,
        remote: Arc<dyn RemoteStore>,
        extractor: G,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let store = Arc::new(InventoryStore::new(remote, SessionGate::new(session)));
        let categories = config.category_registry();
        let ingestion = IngestionWorkflow::new(extractor, store.clone());

        Self {
            config,
            store,
            categories,
            ingestion,
        }
    }

    /// Client backed by an [`InMemoryRemoteStore`] named after the configured
    /// collection. Returns the store too, so callers can seed or inspect it.
    pub fn in_memory(
        config: ClientConfig,
        extractor: G,
        session: Arc<dyn SessionProvider>,
    ) -> (Self, InMemoryRemoteStore) {
        let remote = InMemoryRemoteStore::for_collection(config.store.collection.clone());
        let app = Self::new(config, Arc::new(remote.clone()), extractor, session);
        (app, remote)
    }

    /// Install logging per config, then open the live subscription.
    pub async fn start(&self) -> Result<(), StoreError> {
        stocktrack_observability::tracing::init(&self.config.log_settings());
        tracing::info!(collection = %self.config.store.collection, "starting inventory client");
        self.store.mount().await
    }

    pub fn shutdown(&self) {
        tracing::info!("shutting down inventory client");
        self.store.unmount();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    pub fn ingestion(&self) -> &IngestionWorkflow<G> {
        &self.ingestion
    }

    pub fn ingestion_mut(&mut self) -> &mut IngestionWorkflow<G> {
        &mut self.ingestion
    }

    // Categories are client-local; items are never touched by these.

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn add_category(&mut self, label: &str) -> DomainResult<bool> {
        let added = self.categories.add(label)?;
        if added {
            tracing::debug!(category = label.trim(), "category added");
        }
        Ok(added)
    }

    pub fn remove_category(&mut self, label: &str) -> bool {
        let removed = self.categories.remove(label);
        if removed {
            tracing::debug!(category = label, "category removed");
        }
        removed
    }

    pub fn select_category(&mut self, filter: CategoryFilter) -> DomainResult<()> {
        self.categories.set_filter(filter)
    }

    /// Items under the active category filter whose name contains `query`.
    pub fn visible_items(&self, query: &str) -> Vec<InventoryItem> {
        self.store.visible_items(self.categories.active_filter(), query)
    }
}

impl<G> core::fmt::Debug for ClientApp<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientApp")
            .field("store", &self.store)
            .field("categories", &self.categories)
            .field("ingestion", &self.ingestion)
            .finish()
    }
}
