//! Remote document store boundary.
//!
//! One logical collection ("inventory") of flat documents. Every mutation is
//! echoed back to live subscribers as a **full snapshot**, never a delta.

pub mod document;
pub mod in_memory;
pub mod r#trait;

pub use document::ItemDocument;
pub use in_memory::{InMemoryRemoteStore, WriteOp};
pub use r#trait::{GatewayError, RemoteStore, SnapshotListener, SubscriptionHandle};

/// Name of the single collection the gateway serves.
pub const INVENTORY_COLLECTION: &str = "inventory";
