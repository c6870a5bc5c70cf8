//! `stocktrack-ai`
//!
//! **Responsibility:** AI-assisted item extraction boundary.
//!
//! This crate turns free text into an [`ItemDraft`](stocktrack_inventory::ItemDraft):
//! - It must not talk to the remote store.
//! - It must not commit anything; drafts are previewed and confirmed elsewhere.
//! - It checks syntactic validity only (JSON shape, required keys), never business meaning.

pub mod backend;
pub mod extractor;
pub mod prompt;
pub mod result;

pub use backend::{CompletionBackend, ScriptedBackend};
#[cfg(feature = "http")]
pub use backend::GeminiBackend;
pub use extractor::{parse_draft, strip_code_fence, ExtractionGateway, LlmExtractor};
pub use prompt::ExtractionPrompt;
pub use result::{BackendError, ExtractionError};
