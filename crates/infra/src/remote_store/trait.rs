use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stocktrack_core::ItemId;
use stocktrack_inventory::{InventoryItem, ItemDraft, ItemPatch};

/// Failure reported by the remote store.
///
/// The gateway never retries; callers surface these to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or backend failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store's security rules refused the call.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The targeted document does not exist (any more).
    #[error("document not found: {0}")]
    NotFound(ItemId),

    /// The live subscription was torn down by the backend.
    #[error("subscription unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(_) => {
                "Could not reach the inventory server. Please try again.".to_string()
            }
            GatewayError::PermissionDenied(_) => {
                "You do not have permission to do that.".to_string()
            }
            GatewayError::NotFound(_) => "That item no longer exists.".to_string(),
            GatewayError::Unavailable(_) => {
                "Live inventory updates stopped. Reload to reconnect.".to_string()
            }
        }
    }
}

/// Receiver of live collection updates.
///
/// `on_change` always carries the full current item list, including changes
/// made by this same client.
pub trait SnapshotListener: Send + Sync {
    fn on_change(&self, items: Vec<InventoryItem>);

    fn on_error(&self, error: GatewayError);
}

/// Capability to cancel a live subscription.
///
/// Cancelling is idempotent and also happens on drop.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl core::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Gateway to the realtime document store.
///
/// ## Write visibility
///
/// None of the write operations return the resulting item. Their effect
/// (including the id assigned by `create`) becomes visible only through the
/// next `on_change` push.
///
/// ## Stock adjustments
///
/// `adjust_quantity` is an atomic, store-side increment that clamps at zero.
/// Concurrent adjustments to the same item compose instead of overwriting
/// each other, unlike a client-side read-modify-write through `update`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Register a live listener. Implementations push the current snapshot
    /// once the subscription is established.
    async fn subscribe(
        &self,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, GatewayError>;

    async fn create(&self, draft: &ItemDraft) -> Result<(), GatewayError>;

    /// Merge the set fields of `patch` into the document.
    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<(), GatewayError>;

    async fn remove(&self, id: &ItemId) -> Result<(), GatewayError>;

    /// Atomically apply `quantity = max(0, quantity + delta)`.
    async fn adjust_quantity(&self, id: &ItemId, delta: i64) -> Result<(), GatewayError>;
}

#[async_trait]
impl<S> RemoteStore for Arc<S>
where
    S: RemoteStore + ?Sized,
{
    async fn subscribe(
        &self,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, GatewayError> {
        (**self).subscribe(listener).await
    }

    async fn create(&self, draft: &ItemDraft) -> Result<(), GatewayError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<(), GatewayError> {
        (**self).update(id, patch).await
    }

    async fn remove(&self, id: &ItemId) -> Result<(), GatewayError> {
        (**self).remove(id).await
    }

    async fn adjust_quantity(&self, id: &ItemId, delta: i64) -> Result<(), GatewayError> {
        (**self).adjust_quantity(id, delta).await
    }
}
