//! `stocktrack-client`
//!
//! **Responsibility:** client-side inventory synchronization and AI-assisted ingestion.
//!
//! This crate provides:
//! - A live, gateway-confirmed mirror of the inventory collection (`InventoryStore`)
//! - The free text → preview → confirm ingestion flow (`IngestionWorkflow`)
//! - The session gate and static client configuration
//!
//! The remote store stays the authority: no optimistic writes, no offline queue.

pub mod app;
pub mod config;
pub mod ingestion;
pub mod session;
pub mod store;

pub use app::ClientApp;
pub use config::{AiConfig, ClientConfig, StoreConfig};
pub use ingestion::{IngestionPhase, IngestionWorkflow, WorkflowError};
pub use session::{Session, SessionGate, SessionProvider, SessionSlot};
pub use store::{DeleteConfirmation, DeleteOutcome, InventoryStore, StoreError, StoreView, SyncState};
