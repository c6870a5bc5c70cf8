//! Live inventory mirror.
//!
//! `InventoryStore` keeps the latest snapshot pushed by the remote store and
//! translates user intents into gateway calls. It never edits its item list
//! by hand: writes go to the gateway and the list changes only when the
//! gateway echoes a new full snapshot back.
//!
//! ## Lifecycle
//!
//! ```text
//! Unsubscribed --mount--> Loading --first snapshot--> Live --snapshot--> Live
//!                            |                          |
//!                            +-------on_error-----------+--> Errored --mount--> Loading
//! any state --unmount--> Closed (terminal)
//! ```
//!
//! Snapshots that arrive for an older mount (or after unmount) are ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use stocktrack_core::{DomainError, ItemId};
use stocktrack_infra::{GatewayError, RemoteStore, SnapshotListener, SubscriptionHandle};
use stocktrack_inventory::{clamp_quantity, selectors, CategoryFilter, InventoryItem, ItemDraft, ItemPatch};

use crate::session::SessionGate;

/// Subscription state of the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Unsubscribed,
    Loading,
    Live,
    Errored,
    Closed,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Unsubscribed => "unsubscribed",
            SyncState::Loading => "loading",
            SyncState::Live => "live",
            SyncState::Errored => "errored",
            SyncState::Closed => "closed",
        }
    }
}

/// What the view layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreView {
    pub state: SyncState,
    /// Last gateway-confirmed snapshot. Empty unless `state` is `Live`.
    pub items: Vec<InventoryItem>,
    /// Pending user-facing message (toast/alert), if any.
    pub alert: Option<String>,
    pub last_snapshot_at: Option<DateTime<Utc>>,
}

impl StoreView {
    pub fn total_count(&self) -> usize {
        selectors::count_total(&self.items)
    }

    pub fn low_stock_count(&self) -> usize {
        selectors::count_low_stock(&self.items)
    }

    pub fn visible_items(&self, filter: &CategoryFilter, query: &str) -> Vec<&InventoryItem> {
        selectors::visible_items(&self.items, filter, query)
    }

    pub fn find(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == *id)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("inventory store is closed")]
    Closed,

    #[error("item {0} is not in the live inventory")]
    UnknownItem(ItemId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl StoreError {
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Unauthenticated => "Please sign in first.".to_string(),
            StoreError::Closed => "The inventory view was closed.".to_string(),
            StoreError::UnknownItem(_) => "That item is no longer in the list.".to_string(),
            StoreError::Domain(DomainError::Validation(msg)) => format!("Please check the form: {msg}."),
            StoreError::Domain(e) => e.to_string(),
            StoreError::Gateway(e) => e.user_message(),
        }
    }
}

/// Destructive-action guard for `delete_item`.
pub trait DeleteConfirmation {
    fn confirm_delete(&self, item: &InventoryItem) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&InventoryItem) -> bool,
{
    fn confirm_delete(&self, item: &InventoryItem) -> bool {
        self(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; the gateway was not called.
    Cancelled,
}

/// State shared with the snapshot listener.
#[derive(Debug)]
struct Shared {
    view: watch::Sender<StoreView>,
    /// Bumped on every mount/unmount; listeners carry the value they were
    /// created with.
    generation: AtomicU64,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn apply_snapshot(&self, generation: u64, items: Vec<InventoryItem>) {
        if !self.is_current(generation) {
            tracing::debug!(generation, "ignoring snapshot from stale subscription");
            return;
        }

        let count = items.len();
        let applied = self.view.send_if_modified(|view| match view.state {
            SyncState::Loading | SyncState::Live => {
                let was_live = view.state == SyncState::Live;
                view.state = SyncState::Live;
                view.last_snapshot_at = Some(Utc::now());
                if was_live && view.items == items {
                    return false;
                }
                view.items = items;
                true
            }
            _ => false,
        });

        if applied {
            tracing::debug!(items = count, "inventory snapshot applied");
        }
    }

    fn apply_subscription_error(&self, generation: u64, error: GatewayError) {
        if !self.is_current(generation) {
            return;
        }

        tracing::error!(error = %error, "inventory subscription failed");
        self.view.send_if_modified(|view| match view.state {
            SyncState::Loading | SyncState::Live => {
                view.state = SyncState::Errored;
                // Unavailable, not stale: never show outdated data as current.
                view.items.clear();
                view.alert = Some(error.user_message());
                true
            }
            _ => false,
        });
    }
}

struct StoreListener {
    shared: Weak<Shared>,
    generation: u64,
}

impl SnapshotListener for StoreListener {
    fn on_change(&self, items: Vec<InventoryItem>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.apply_snapshot(self.generation, items);
        }
    }

    fn on_error(&self, error: GatewayError) {
        if let Some(shared) = self.shared.upgrade() {
            shared.apply_subscription_error(self.generation, error);
        }
    }
}

/// Observable, gateway-backed inventory mirror.
///
/// Build one at the application root and share it (`Arc<InventoryStore>`).
pub struct InventoryStore {
    remote: Arc<dyn RemoteStore>,
    session: SessionGate,
    shared: Arc<Shared>,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl InventoryStore {
    pub fn new(remote: Arc<dyn RemoteStore>, session: SessionGate) -> Self {
        let (view, _rx) = watch::channel(StoreView::default());
        Self {
            remote,
            session,
            shared: Arc::new(Shared {
                view,
                generation: AtomicU64::new(0),
            }),
            subscription: Mutex::new(None),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Open the live subscription.
    ///
    /// Accepted from `Unsubscribed` and from `Errored` (a user-initiated
    /// reconnect). A no-op while already `Loading`/`Live`.
    pub async fn mount(&self) -> Result<(), StoreError> {
        if !self.session.is_signed_in() {
            return Err(self.surface(StoreError::Unauthenticated));
        }

        match self.state() {
            SyncState::Closed => return Err(StoreError::Closed),
            SyncState::Loading | SyncState::Live => {
                tracing::debug!("mount ignored: already subscribed");
                return Ok(());
            }
            SyncState::Unsubscribed | SyncState::Errored => {}
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.view.send_modify(|view| {
            view.state = SyncState::Loading;
            view.items.clear();
            view.alert = None;
        });
        tracing::info!(generation, "subscribing to inventory");

        let listener = Arc::new(StoreListener {
            shared: Arc::downgrade(&self.shared),
            generation,
        });

        let handle = match self.remote.subscribe(listener).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(error = %err, "inventory subscribe failed");
                if self.shared.is_current(generation) {
                    self.shared.view.send_modify(|view| view.state = SyncState::Errored);
                }
                return Err(self.surface(StoreError::Gateway(err)));
            }
        };

        // Unmounted while the subscribe call was in flight: dropping the
        // handle cancels the new subscription.
        if !self.shared.is_current(generation) {
            return Err(StoreError::Closed);
        }

        if let Ok(mut slot) = self.subscription.lock() {
            *slot = Some(handle);
        }
        Ok(())
    }

    /// Cancel the subscription. Terminal.
    pub fn unmount(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(mut handle) = slot.take() {
                handle.unsubscribe();
            }
        }
        self.shared.view.send_modify(|view| {
            view.state = SyncState::Closed;
            view.items.clear();
        });
        tracing::info!("inventory store closed");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Subscribe to view changes (observable side of the store).
    pub fn watch(&self) -> watch::Receiver<StoreView> {
        self.shared.view.subscribe()
    }

    pub fn view(&self) -> StoreView {
        self.shared.view.borrow().clone()
    }

    pub fn state(&self) -> SyncState {
        self.shared.view.borrow().state
    }

    pub fn items(&self) -> Vec<InventoryItem> {
        self.shared.view.borrow().items.clone()
    }

    pub fn item(&self, id: &ItemId) -> Option<InventoryItem> {
        self.shared.view.borrow().find(id).cloned()
    }

    pub fn total_count(&self) -> usize {
        self.shared.view.borrow().total_count()
    }

    pub fn low_stock_count(&self) -> usize {
        self.shared.view.borrow().low_stock_count()
    }

    pub fn visible_items(&self, filter: &CategoryFilter, query: &str) -> Vec<InventoryItem> {
        self.shared
            .view
            .borrow()
            .visible_items(filter, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn alert(&self) -> Option<String> {
        self.shared.view.borrow().alert.clone()
    }

    pub fn dismiss_alert(&self) {
        self.shared.view.send_if_modified(|view| view.alert.take().is_some());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Intents
    // ─────────────────────────────────────────────────────────────────────

    /// Create an item. The new item (with its id) shows up with the next snapshot.
    pub async fn add_item(&self, draft: ItemDraft) -> Result<(), StoreError> {
        self.require_open()?;
        let draft = draft.normalized();
        draft.validate().map_err(|e| self.surface(e.into()))?;

        tracing::info!(name = %draft.name, category = %draft.category, "creating item");
        self.remote
            .create(&draft)
            .await
            .map_err(|e| self.surface(e.into()))
    }

    pub async fn update_item(&self, id: &ItemId, patch: ItemPatch) -> Result<(), StoreError> {
        self.require_open()?;
        patch.validate().map_err(|e| self.surface(e.into()))?;

        tracing::info!(item_id = %id, "updating item");
        self.remote
            .update(id, &patch)
            .await
            .map_err(|e| self.surface(e.into()))
    }

    /// Delete an item after `confirm` approves it.
    pub async fn delete_item(
        &self,
        id: &ItemId,
        confirm: impl DeleteConfirmation,
    ) -> Result<DeleteOutcome, StoreError> {
        self.require_open()?;
        let item = self
            .item(id)
            .ok_or_else(|| self.surface(StoreError::UnknownItem(id.clone())))?;

        if !confirm.confirm_delete(&item) {
            tracing::debug!(item_id = %id, "delete cancelled by user");
            return Ok(DeleteOutcome::Cancelled);
        }

        tracing::info!(item_id = %id, name = %item.name, "deleting item");
        self.remote
            .remove(id)
            .await
            .map_err(|e| self.surface(e.into()))?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Apply a signed stock delta, clamped at zero.
    ///
    /// The item must be in the live list. The write itself is a store-side
    /// atomic increment, so two adjustments issued before the next snapshot
    /// both take effect. A zero delta changes nothing and skips the gateway.
    pub async fn adjust_stock(&self, id: &ItemId, delta: i64) -> Result<(), StoreError> {
        self.require_open()?;
        if delta == 0 {
            tracing::debug!(item_id = %id, "zero stock delta ignored");
            return Ok(());
        }

        let item = self
            .item(id)
            .ok_or_else(|| self.surface(StoreError::UnknownItem(id.clone())))?;

        tracing::info!(
            item_id = %id,
            delta,
            from = item.quantity,
            expected = clamp_quantity(item.quantity, delta),
            "adjusting stock"
        );

        self.remote
            .adjust_quantity(id, delta)
            .await
            .map_err(|e| self.surface(e.into()))
    }

    fn require_open(&self) -> Result<(), StoreError> {
        if self.state() == SyncState::Closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Log `err` and publish its user-facing message as the current alert.
    fn surface(&self, err: StoreError) -> StoreError {
        tracing::warn!(error = %err, "inventory intent failed");
        let message = err.user_message();
        self.shared.view.send_modify(|view| view.alert = Some(message));
        err
    }
}

impl core::fmt::Debug for InventoryStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryStore")
            .field("state", &self.state())
            .field("items", &self.total_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionSlot};
    use stocktrack_infra::{InMemoryRemoteStore, WriteOp};

    fn signed_in() -> SessionGate {
        SessionGate::new(Arc::new(SessionSlot::signed_in(Session::new("u-1", "admin@toko.id"))))
    }

    fn draft(name: &str, category: &str, quantity: u32, min_stock: u32) -> ItemDraft {
        ItemDraft::new(name, category)
            .with_quantity(quantity)
            .with_unit("Pcs")
            .with_min_stock(min_stock)
    }

    fn item(id: &str, name: &str, quantity: u32, min_stock: u32) -> InventoryItem {
        InventoryItem::from_draft(ItemId::from(id), draft(name, "ATK", quantity, min_stock))
    }

    async fn mounted(remote: &InMemoryRemoteStore) -> InventoryStore {
        let store = InventoryStore::new(Arc::new(remote.clone()), signed_in());
        store.mount().await.unwrap();
        store
    }

    /// Drive the listener directly, as a transport would.
    fn listener_for(store: &InventoryStore) -> StoreListener {
        StoreListener {
            shared: Arc::downgrade(&store.shared),
            generation: store.shared.generation.load(Ordering::SeqCst),
        }
    }

    #[tokio::test]
    async fn starts_unsubscribed_and_goes_live_on_first_snapshot() {
        let remote = InMemoryRemoteStore::seeded([&draft("Kertas A4", "ATK", 10, 5)]);
        let store = InventoryStore::new(Arc::new(remote.clone()), signed_in());
        assert_eq!(store.state(), SyncState::Unsubscribed);

        store.mount().await.unwrap();

        assert_eq!(store.state(), SyncState::Live);
        assert_eq!(store.total_count(), 1);
        assert!(store.view().last_snapshot_at.is_some());
    }

    #[tokio::test]
    async fn mount_requires_session() {
        let remote = InMemoryRemoteStore::new();
        let store = InventoryStore::new(
            Arc::new(remote.clone()),
            SessionGate::new(Arc::new(SessionSlot::new())),
        );

        assert_eq!(store.mount().await.unwrap_err(), StoreError::Unauthenticated);
        assert_eq!(store.state(), SyncState::Unsubscribed);
        assert_eq!(remote.listener_count(), 0);
    }

    #[tokio::test]
    async fn stays_loading_until_first_push() {
        let remote = InMemoryRemoteStore::new();
        let store = InventoryStore::new(Arc::new(remote), signed_in());
        store.shared.generation.store(1, Ordering::SeqCst);
        store.shared.view.send_modify(|v| v.state = SyncState::Loading);

        assert_eq!(store.state(), SyncState::Loading);
        listener_for(&store).on_change(vec![item("a", "Pulpen", 1, 1)]);
        assert_eq!(store.state(), SyncState::Live);
    }

    #[tokio::test]
    async fn own_writes_arrive_through_snapshot() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;

        store.add_item(draft("Kertas A4", "ATK", 10, 5)).await.unwrap();

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Kertas A4");
        assert_eq!(remote.writes().len(), 1);
    }

    #[tokio::test]
    async fn scenario_a_decrement_clamps_to_zero() {
        let remote = InMemoryRemoteStore::seeded([&draft("Kertas A4", "ATK", 3, 5)]);
        let store = mounted(&remote).await;
        let id = store.items()[0].id.clone();
        assert!(store.items()[0].is_low_stock());

        store.adjust_stock(&id, -5).await.unwrap();

        assert_eq!(store.item(&id).map(|i| i.quantity), Some(0));
        assert_eq!(remote.snapshot()[0].quantity, 0);
    }

    #[tokio::test]
    async fn rapid_adjustments_both_take_effect() {
        let remote = InMemoryRemoteStore::seeded([&draft("Kertas A4", "ATK", 10, 5)]);
        let store = mounted(&remote).await;
        let id = store.items()[0].id.clone();

        let (a, b) = tokio::join!(store.adjust_stock(&id, -3), store.adjust_stock(&id, -4));
        a.unwrap();
        b.unwrap();

        assert_eq!(store.item(&id).map(|i| i.quantity), Some(3));
    }

    #[tokio::test]
    async fn adjust_unknown_item_fails_without_write() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;

        let err = store.adjust_stock(&ItemId::from("ghost"), 1).await.unwrap_err();

        assert!(matches!(err, StoreError::UnknownItem(_)));
        assert!(remote.writes().is_empty());
        assert!(store.alert().is_some());
    }

    #[tokio::test]
    async fn zero_delta_is_a_silent_no_op() {
        let remote = InMemoryRemoteStore::seeded([&draft("Pulpen", "ATK", 1, 1)]);
        let store = mounted(&remote).await;
        let id = store.items()[0].id.clone();

        store.adjust_stock(&id, 0).await.unwrap();

        assert!(remote.writes().is_empty());
        assert!(store.alert().is_none());
        assert_eq!(store.item(&id).map(|i| i.quantity), Some(1));
    }

    #[tokio::test]
    async fn low_stock_reflects_edits_immediately() {
        let remote = InMemoryRemoteStore::seeded([&draft("Pulpen", "ATK", 10, 5)]);
        let store = mounted(&remote).await;
        let id = store.items()[0].id.clone();
        assert_eq!(store.low_stock_count(), 0);

        store.update_item(&id, ItemPatch::min_stock(10)).await.unwrap();
        assert_eq!(store.low_stock_count(), 1);

        store.update_item(&id, ItemPatch::quantity(11)).await.unwrap();
        assert_eq!(store.low_stock_count(), 0);
    }

    #[tokio::test]
    async fn invalid_manual_entry_never_reaches_gateway() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;

        let err = store.add_item(draft("   ", "ATK", 1, 1)).await.unwrap_err();

        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
        assert!(remote.writes().is_empty());

        let err = store
            .update_item(&ItemId::from("x"), ItemPatch {
                name: Some(String::new()),
                ..ItemPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
        assert!(remote.writes().is_empty());
    }

    #[tokio::test]
    async fn add_failure_is_surfaced_as_alert() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;
        remote.fail_next(GatewayError::transport("quota"));

        let err = store.add_item(draft("Pulpen", "ATK", 1, 1)).await.unwrap_err();

        assert!(matches!(err, StoreError::Gateway(GatewayError::Transport(_))));
        assert!(store.alert().is_some());
        assert_eq!(store.total_count(), 0);

        store.dismiss_alert();
        assert!(store.alert().is_none());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let remote = InMemoryRemoteStore::seeded([&draft("Pulpen", "ATK", 1, 1)]);
        let store = mounted(&remote).await;
        let id = store.items()[0].id.clone();

        let outcome = store.delete_item(&id, |_: &InventoryItem| false).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(remote.writes().is_empty());
        assert_eq!(store.total_count(), 1);

        let outcome = store
            .delete_item(&id, |item: &InventoryItem| item.name == "Pulpen")
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(remote.writes(), vec![WriteOp::Remove(id)]);
        assert_eq!(store.total_count(), 0);
    }

    #[tokio::test]
    async fn same_snapshot_twice_leaves_selectors_unchanged() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;
        let listener = listener_for(&store);
        let snapshot = vec![item("a", "Kertas A4", 3, 5), item("b", "Spidol", 9, 2)];

        listener.on_change(snapshot.clone());
        let first = (
            store.total_count(),
            store.low_stock_count(),
            store.visible_items(&CategoryFilter::All, "kertas"),
        );

        let mut rx = store.watch();
        rx.mark_unchanged();
        listener.on_change(snapshot);
        let second = (
            store.total_count(),
            store.low_stock_count(),
            store.visible_items(&CategoryFilter::All, "kertas"),
        );

        assert_eq!(first, second);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn scenario_d_later_snapshot_wins_without_merge() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;
        let listener = listener_for(&store);

        let newer = vec![item("a", "Kertas A4", 7, 5)];
        let older = vec![item("a", "Kertas A4", 2, 5), item("b", "Spidol", 1, 1)];

        // Delivered out of order: the older state arrives first, the newer last.
        listener.on_change(older);
        listener.on_change(newer.clone());

        assert_eq!(store.items(), newer);
    }

    #[tokio::test]
    async fn subscription_error_empties_list_and_allows_manual_remount() {
        let remote = InMemoryRemoteStore::seeded([&draft("Pulpen", "ATK", 1, 1)]);
        let store = mounted(&remote).await;
        assert_eq!(store.total_count(), 1);

        remote.break_subscriptions(GatewayError::Unavailable("reset".to_string()));

        assert_eq!(store.state(), SyncState::Errored);
        assert!(store.items().is_empty());
        assert!(store.alert().is_some());

        store.mount().await.unwrap();
        assert_eq!(store.state(), SyncState::Live);
        assert_eq!(store.total_count(), 1);
    }

    #[tokio::test]
    async fn subscribe_failure_moves_to_errored() {
        let remote = InMemoryRemoteStore::new();
        remote.fail_next(GatewayError::PermissionDenied("rules".to_string()));
        let store = InventoryStore::new(Arc::new(remote), signed_in());

        let err = store.mount().await.unwrap_err();

        assert!(matches!(err, StoreError::Gateway(GatewayError::PermissionDenied(_))));
        assert_eq!(store.state(), SyncState::Errored);
    }

    #[tokio::test]
    async fn unmount_cancels_subscription_and_ignores_late_pushes() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;
        let stale = listener_for(&store);
        assert_eq!(remote.listener_count(), 1);

        store.unmount();

        assert_eq!(store.state(), SyncState::Closed);
        assert_eq!(remote.listener_count(), 0);

        stale.on_change(vec![item("a", "Pulpen", 1, 1)]);
        assert!(store.items().is_empty());
        assert_eq!(store.mount().await.unwrap_err(), StoreError::Closed);
        assert_eq!(
            store.add_item(draft("Pulpen", "ATK", 1, 1)).await.unwrap_err(),
            StoreError::Closed
        );
    }

    #[tokio::test]
    async fn watchers_are_notified_of_new_snapshots() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;
        let mut rx = store.watch();
        rx.mark_unchanged();

        store.add_item(draft("Pulpen", "ATK", 1, 1)).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().items.len(), 1);
    }

    #[tokio::test]
    async fn item_keeps_category_missing_from_registry() {
        let remote = InMemoryRemoteStore::new();
        let store = mounted(&remote).await;

        store.add_item(draft("Bor Listrik", "Perkakas", 1, 1)).await.unwrap();

        assert_eq!(store.items()[0].category, "Perkakas");
        assert_eq!(store.visible_items(&CategoryFilter::only("Perkakas"), "").len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: quantity never goes negative and ends at max(0, N - sum).
            #[test]
            fn adjust_stock_never_goes_negative(
                start in 0u32..1_000,
                deltas in proptest::collection::vec(-200i64..=-1, 1..20)
            ) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                rt.block_on(async {
                    let remote = InMemoryRemoteStore::seeded([&draft("Pulpen", "ATK", start, 1)]);
                    let store = mounted(&remote).await;
                    let id = store.items()[0].id.clone();

                    for d in &deltas {
                        store.adjust_stock(&id, *d).await.unwrap();
                        let quantity = store.item(&id).map(|i| i.quantity).unwrap_or_default();
                        assert!(i64::from(quantity) >= 0);
                    }

                    let expected = (i64::from(start) + deltas.iter().sum::<i64>()).max(0);
                    let quantity = store.item(&id).map(|i| i.quantity).unwrap_or_default();
                    assert_eq!(i64::from(quantity), expected);
                });
            }
        }
    }
}
