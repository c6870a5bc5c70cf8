use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;

use stocktrack_core::ItemId;
use stocktrack_inventory::{InventoryItem, ItemDraft, ItemPatch};

use super::document::ItemDocument;
use super::r#trait::{GatewayError, RemoteStore, SnapshotListener, SubscriptionHandle};
use super::INVENTORY_COLLECTION;

/// A write accepted by the in-memory store (in arrival order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Create(ItemDraft),
    Update(ItemId, ItemPatch),
    Remove(ItemId),
    AdjustQuantity(ItemId, i64),
}

#[derive(Default)]
struct Inner {
    /// Documents in creation order.
    docs: Vec<(ItemId, ItemDocument)>,
    listeners: Vec<(u64, Arc<dyn SnapshotListener>)>,
    next_listener_id: u64,
    /// Failures to return from the next calls, one per call.
    injected: VecDeque<GatewayError>,
    writes: Vec<WriteOp>,
}

impl Inner {
    fn snapshot(&self) -> Vec<InventoryItem> {
        self.docs
            .iter()
            .map(|(id, doc)| doc.clone().into_item(id.clone()))
            .collect()
    }

    fn listeners(&self) -> Vec<Arc<dyn SnapshotListener>> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }

    fn doc_mut(&mut self, id: &ItemId) -> Result<&mut ItemDocument, GatewayError> {
        self.docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, doc)| doc)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }
}

/// In-memory document store with live snapshot fan-out.
///
/// Intended for tests/dev. Listeners are invoked synchronously after each
/// successful write, outside the internal lock, so a listener may call back
/// into the store.
#[derive(Clone)]
pub struct InMemoryRemoteStore {
    collection: String,
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::for_collection(INVENTORY_COLLECTION)
    }

    pub fn for_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Store pre-populated with `drafts`, without recording them as writes.
    pub fn seeded<'a>(drafts: impl IntoIterator<Item = &'a ItemDraft>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            for draft in drafts {
                inner.docs.push((ItemId::generate(), ItemDocument::from(draft)));
            }
        }
        store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Current contents, as a subscriber would see them.
    pub fn snapshot(&self) -> Vec<InventoryItem> {
        self.inner.lock().map(|i| i.snapshot()).unwrap_or_default()
    }

    /// Every accepted write so far.
    pub fn writes(&self) -> Vec<WriteOp> {
        self.inner.lock().map(|i| i.writes.clone()).unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|i| i.listeners.len()).unwrap_or(0)
    }

    /// Make the next call (subscribe or write) fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.injected.push_back(error);
        }
    }

    /// Simulate the backend dropping every live subscription.
    ///
    /// Each listener receives `on_error` once and is then detached.
    pub fn break_subscriptions(&self, error: GatewayError) {
        let listeners = match self.inner.lock() {
            Ok(mut inner) => {
                let listeners = inner.listeners();
                inner.listeners.clear();
                listeners
            }
            Err(_) => return,
        };

        tracing::warn!(
            collection = %self.collection,
            listeners = listeners.len(),
            error = %error,
            "dropping live subscriptions"
        );

        for listener in listeners {
            listener.on_error(error.clone());
        }
    }

    /// Run `mutate` under the lock, then push the resulting snapshot.
    fn write<F>(&self, op: WriteOp, mutate: F) -> Result<(), GatewayError>
    where
        F: FnOnce(&mut Inner) -> Result<(), GatewayError>,
    {
        let (snapshot, listeners) = {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| GatewayError::transport("lock poisoned"))?;

            if let Some(err) = inner.injected.pop_front() {
                return Err(err);
            }

            mutate(&mut inner)?;
            inner.writes.push(op);
            (inner.snapshot(), inner.listeners())
        };

        for listener in listeners {
            listener.on_change(snapshot.clone());
        }
        Ok(())
    }
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryRemoteStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryRemoteStore")
            .field("collection", &self.collection)
            .field("documents", &self.snapshot().len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn subscribe(
        &self,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, GatewayError> {
        let (listener_id, snapshot) = {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| GatewayError::transport("lock poisoned"))?;

            if let Some(err) = inner.injected.pop_front() {
                return Err(err);
            }

            let listener_id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((listener_id, listener.clone()));
            (listener_id, inner.snapshot())
        };

        tracing::debug!(collection = %self.collection, listener_id, "listener attached");

        // Initial snapshot, like a realtime store's first push.
        listener.on_change(snapshot);

        let registry: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Ok(SubscriptionHandle::new(move || {
            if let Some(inner) = registry.upgrade() {
                if let Ok(mut inner) = inner.lock() {
                    inner.listeners.retain(|(id, _)| *id != listener_id);
                }
            }
        }))
    }

    async fn create(&self, draft: &ItemDraft) -> Result<(), GatewayError> {
        self.write(WriteOp::Create(draft.clone()), |inner| {
            inner.docs.push((ItemId::generate(), ItemDocument::from(draft)));
            Ok(())
        })
    }

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<(), GatewayError> {
        self.write(WriteOp::Update(id.clone(), patch.clone()), |inner| {
            inner.doc_mut(id)?.merge(patch);
            Ok(())
        })
    }

    async fn remove(&self, id: &ItemId) -> Result<(), GatewayError> {
        self.write(WriteOp::Remove(id.clone()), |inner| {
            let before = inner.docs.len();
            inner.docs.retain(|(doc_id, _)| doc_id != id);
            if inner.docs.len() == before {
                return Err(GatewayError::NotFound(id.clone()));
            }
            Ok(())
        })
    }

    async fn adjust_quantity(&self, id: &ItemId, delta: i64) -> Result<(), GatewayError> {
        self.write(WriteOp::AdjustQuantity(id.clone(), delta), |inner| {
            inner.doc_mut(id)?.increment_quantity(delta);
            Ok(())
        })
    }
}
