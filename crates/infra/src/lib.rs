//! Infrastructure layer: gateways to external services.
//!
//! The realtime document store is reached only through [`remote_store::RemoteStore`];
//! the in-memory implementation backs tests and local development.

pub mod remote_store;

pub use remote_store::{
    GatewayError, InMemoryRemoteStore, ItemDocument, RemoteStore, SnapshotListener, SubscriptionHandle,
    WriteOp,
};
