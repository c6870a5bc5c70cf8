//! AI-assisted (and manual) item ingestion.
//!
//! ```text
//! Idle --submit--> Extracting --ok--> PreviewReady --confirm--> Committing --> Idle
//!                      |                   |
//!                      +--error--> Idle    +--discard--> Idle
//! ```
//!
//! One extraction attempt per `submit`. Recovery from a failed extraction is
//! always the user submitting again. Dropping an in-flight `submit` or
//! `confirm` (e.g. the dialog closes) leaves the workflow `Idle`.

use std::sync::Arc;

use thiserror::Error;

use stocktrack_ai::{ExtractionError, ExtractionGateway};
use stocktrack_core::DomainError;
use stocktrack_inventory::{ItemDraft, ItemPatch};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IngestionPhase {
    #[default]
    Idle,
    Extracting,
    PreviewReady(ItemDraft),
    Committing,
}

impl IngestionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            IngestionPhase::Idle => "idle",
            IngestionPhase::Extracting => "extracting",
            IngestionPhase::PreviewReady(_) => "preview_ready",
            IngestionPhase::Committing => "committing",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: &'static str,
    },

    #[error("input is empty")]
    EmptyInput,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Commit(#[from] StoreError),
}

impl WorkflowError {
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::InvalidState { .. } => "Please wait for the current step to finish.".to_string(),
            WorkflowError::EmptyInput => ExtractionError::EmptyInput.user_message(),
            WorkflowError::Extraction(e) => e.user_message(),
            WorkflowError::Validation(e) => StoreError::Domain(e.clone()).user_message(),
            WorkflowError::Commit(e) => e.user_message(),
        }
    }
}

/// Free text → previewed draft → committed item.
///
/// The draft never leaves this workflow except through `confirm`.
pub struct IngestionWorkflow<G> {
    extractor: G,
    store: Arc<InventoryStore>,
    phase: IngestionPhase,
    last_error: Option<String>,
}

impl<G> IngestionWorkflow<G>
where
    G: ExtractionGateway,
{
    pub fn new(extractor: G, store: Arc<InventoryStore>) -> Self {
        Self {
            extractor,
            store,
            phase: IngestionPhase::Idle,
            last_error: None,
        }
    }

    pub fn phase(&self) -> &IngestionPhase {
        &self.phase
    }

    pub fn draft(&self) -> Option<&ItemDraft> {
        match &self.phase {
            IngestionPhase::PreviewReady(draft) => Some(draft),
            _ => None,
        }
    }

    /// Inline error message for the ingestion dialog, if the last step failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Ask the extractor for a draft. On success the draft is held for preview.
    pub async fn submit(&mut self, free_text: &str) -> Result<ItemDraft, WorkflowError> {
        self.require_idle("submit")?;

        if free_text.trim().is_empty() {
            return Err(self.fail(WorkflowError::EmptyInput));
        }

        self.last_error = None;
        tracing::info!(chars = free_text.len(), "extracting item from free text");

        let outcome = {
            let step = InFlight::begin(&mut self.phase, IngestionPhase::Extracting);
            let outcome = self.extractor.extract(free_text).await;
            if let Ok(draft) = &outcome {
                step.finish(IngestionPhase::PreviewReady(draft.clone()));
            }
            outcome
        };

        match outcome {
            Ok(draft) => {
                tracing::info!(name = %draft.name, category = %draft.category, "draft ready for preview");
                Ok(draft)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Correct the previewed draft before confirming.
    ///
    /// A patch that blanks the name or category is rejected and the draft is
    /// left as it was.
    pub fn edit_draft(&mut self, patch: &ItemPatch) -> Result<(), WorkflowError> {
        if !matches!(self.phase, IngestionPhase::PreviewReady(_)) {
            return Err(WorkflowError::InvalidState {
                action: "edit the draft",
                phase: self.phase.name(),
            });
        }
        if patch.is_empty() {
            return Ok(());
        }
        if let Err(err) = patch.validate() {
            return Err(self.fail(err.into()));
        }

        if let IngestionPhase::PreviewReady(draft) = &mut self.phase {
            draft.apply_patch(patch);
        }
        self.last_error = None;
        Ok(())
    }

    /// Commit the previewed draft through the store and return to `Idle`.
    ///
    /// An invalid draft is rejected up front and stays in preview. Once the
    /// gateway call is made the draft is cleared whether or not the commit
    /// succeeds; a failed commit is reported here and as a store alert.
    pub async fn confirm(&mut self) -> Result<(), WorkflowError> {
        let checked = match &self.phase {
            IngestionPhase::PreviewReady(draft) => draft.validate(),
            other => {
                return Err(WorkflowError::InvalidState {
                    action: "confirm",
                    phase: other.name(),
                });
            }
        };
        if let Err(err) = checked {
            return Err(self.fail(err.into()));
        }

        let IngestionPhase::PreviewReady(draft) = std::mem::take(&mut self.phase) else {
            return Ok(());
        };

        let result = {
            let _step = InFlight::begin(&mut self.phase, IngestionPhase::Committing);
            self.store.add_item(draft).await
        };

        match result {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Drop the draft without committing.
    pub fn discard(&mut self) {
        if let IngestionPhase::PreviewReady(draft) = &self.phase {
            tracing::debug!(name = %draft.name, "draft discarded");
        }
        self.phase = IngestionPhase::Idle;
        self.last_error = None;
    }

    /// Manual-entry path: validate locally, then commit directly.
    pub async fn submit_manual(&mut self, draft: ItemDraft) -> Result<(), WorkflowError> {
        self.require_idle("submit")?;

        let draft = draft.normalized();
        if let Err(err) = draft.validate() {
            return Err(self.fail(err.into()));
        }

        let result = {
            let _step = InFlight::begin(&mut self.phase, IngestionPhase::Committing);
            self.store.add_item(draft).await
        };

        result.map_err(|err| self.fail(err.into()))
    }

    fn require_idle(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.phase != IngestionPhase::Idle {
            return Err(WorkflowError::InvalidState {
                action,
                phase: self.phase.name(),
            });
        }
        Ok(())
    }

    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        tracing::warn!(error = %err, phase = self.phase.name(), "ingestion step failed");
        self.last_error = Some(err.user_message());
        err
    }
}

/// Marks a step as in flight; dropping it puts an unfinished step back to `Idle`.
struct InFlight<'a> {
    phase: &'a mut IngestionPhase,
}

impl<'a> InFlight<'a> {
    fn begin(phase: &'a mut IngestionPhase, step: IngestionPhase) -> Self {
        *phase = step;
        Self { phase }
    }

    fn finish(self, next: IngestionPhase) {
        *self.phase = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if matches!(*self.phase, IngestionPhase::Extracting | IngestionPhase::Committing) {
            *self.phase = IngestionPhase::Idle;
        }
    }
}

impl<G> core::fmt::Debug for IngestionWorkflow<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IngestionWorkflow")
            .field("phase", &self.phase)
            .field("last_error", &self.last_error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionGate, SessionSlot};
    use std::time::Duration;

    use stocktrack_ai::{BackendError, CompletionBackend, LlmExtractor, ScriptedBackend};
    use stocktrack_infra::{InMemoryRemoteStore, WriteOp};

    /// Backend whose call never completes.
    struct Stalled;

    #[async_trait::async_trait]
    impl CompletionBackend for Stalled {
        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            std::future::pending().await
        }
    }

    const ATK_REPLY: &str = "```json\n{\"name\": \"Kertas A4\", \"category\": \"ATK\", \"quantity\": 10, \"unit\": \"rim\", \"minStock\": 5}\n```";

    async fn setup<B: CompletionBackend>(
        backend: B,
    ) -> (InMemoryRemoteStore, IngestionWorkflow<LlmExtractor<B>>) {
        let remote = InMemoryRemoteStore::new();
        let session = SessionGate::new(Arc::new(SessionSlot::signed_in(Session::new(
            "u-1",
            "admin@toko.id",
        ))));
        let store = Arc::new(InventoryStore::new(Arc::new(remote.clone()), session));
        store.mount().await.unwrap();
        (remote, IngestionWorkflow::new(LlmExtractor::new(backend), store))
    }

    #[tokio::test]
    async fn scenario_b_extract_preview_confirm_creates_once() {
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;

        let draft = flow
            .submit("tambahkan 10 rim kertas A4, kategori ATK")
            .await
            .unwrap();
        assert_eq!(draft.quantity, 10);
        assert!(draft.unit.contains("rim"));
        assert_eq!(draft.category, "ATK");
        assert_eq!(flow.draft(), Some(&draft));
        assert!(remote.writes().is_empty());

        flow.confirm().await.unwrap();

        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(flow.draft().is_none());
        assert_eq!(remote.writes(), vec![WriteOp::Create(draft)]);
    }

    #[tokio::test]
    async fn scenario_c_non_json_reply_never_creates() {
        let (remote, mut flow) = setup(
            ScriptedBackend::new().with_reply("Maaf, saya tidak mengerti permintaan Anda."),
        )
        .await;

        let err = flow.submit("sesuatu yang aneh").await.unwrap_err();

        assert!(matches!(err, WorkflowError::Extraction(ExtractionError::MalformedJson(_))));
        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(flow.last_error().is_some());
        assert!(remote.writes().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_returns_to_idle_and_allows_resubmit() {
        let backend = ScriptedBackend::new()
            .with_failure(BackendError::Quota)
            .with_reply(ATK_REPLY);
        let (_remote, mut flow) = setup(backend).await;

        assert!(flow.submit("10 rim kertas").await.is_err());
        assert_eq!(flow.phase(), &IngestionPhase::Idle);

        flow.submit("10 rim kertas").await.unwrap();
        assert!(flow.draft().is_some());
        assert!(flow.last_error().is_none());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_extraction() {
        let (_remote, mut flow) = setup(ScriptedBackend::new()).await;

        assert_eq!(flow.submit("  \n ").await.unwrap_err(), WorkflowError::EmptyInput);
        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(flow.last_error().is_some());
    }

    #[tokio::test]
    async fn discard_clears_draft_without_commit() {
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;
        flow.submit("10 rim kertas").await.unwrap();

        flow.discard();

        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(remote.writes().is_empty());
        assert!(matches!(
            flow.confirm().await,
            Err(WorkflowError::InvalidState { action: "confirm", phase: "idle" })
        ));
    }

    #[tokio::test]
    async fn submit_while_preview_ready_is_rejected() {
        let (_remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;
        flow.submit("10 rim kertas").await.unwrap();

        let err = flow.submit("lagi").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { phase: "preview_ready", .. }));
        assert!(flow.draft().is_some());
    }

    #[tokio::test]
    async fn edited_draft_is_what_gets_committed() {
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;
        flow.submit("10 rim kertas").await.unwrap();

        flow.edit_draft(&ItemPatch::quantity(12)).unwrap();
        flow.confirm().await.unwrap();

        match remote.writes().as_slice() {
            [WriteOp::Create(draft)] => assert_eq!(draft.quantity, 12),
            other => panic!("expected one create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_commit_still_resets_to_idle() {
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;
        flow.submit("10 rim kertas").await.unwrap();
        remote.fail_next(stocktrack_infra::GatewayError::transport("offline"));

        let err = flow.confirm().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Commit(StoreError::Gateway(_))));
        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(flow.draft().is_none());
        assert!(remote.snapshot().is_empty());
    }

    #[tokio::test]
    async fn manual_entry_validates_before_commit() {
        let (remote, mut flow) = setup(ScriptedBackend::new()).await;

        let err = flow.submit_manual(ItemDraft::new("", "ATK")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(remote.writes().is_empty());

        flow.submit_manual(ItemDraft::new(" Spidol ", "ATK").with_quantity(4))
            .await
            .unwrap();
        assert_eq!(remote.snapshot()[0].name, "Spidol");
        assert_eq!(flow.phase(), &IngestionPhase::Idle);
    }

    #[tokio::test]
    async fn blank_name_edit_is_rejected_and_preview_kept() {
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(ATK_REPLY)).await;
        let draft = flow.submit("10 rim kertas").await.unwrap();

        let err = flow
            .edit_draft(&ItemPatch {
                name: Some("   ".to_string()),
                ..ItemPatch::default()
            })
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(flow.draft(), Some(&draft));
        assert!(flow.last_error().is_some());

        flow.confirm().await.unwrap();
        assert_eq!(remote.writes(), vec![WriteOp::Create(draft)]);
    }

    #[tokio::test]
    async fn invalid_draft_is_not_taken_out_of_preview_by_confirm() {
        let reply = r#"{"name": "Kertas A4", "category": "ATK", "quantity": 10, "unit": "rim", "minStock": 5}"#;
        let (remote, mut flow) = setup(ScriptedBackend::new().with_reply(reply)).await;
        flow.submit("10 rim kertas").await.unwrap();
        if let IngestionPhase::PreviewReady(draft) = &mut flow.phase {
            draft.category = " ".to_string();
        }

        let err = flow.confirm().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(flow.draft().is_some());
        assert!(remote.writes().is_empty());
    }

    #[tokio::test]
    async fn dropped_submit_returns_to_idle() {
        let (_remote, mut flow) = setup(Stalled).await;

        let timed_out = tokio::time::timeout(Duration::from_millis(20), flow.submit("10 rim kertas")).await;

        assert!(timed_out.is_err());
        assert_eq!(flow.phase(), &IngestionPhase::Idle);
        assert!(matches!(
            flow.submit("   ").await,
            Err(WorkflowError::EmptyInput)
        ));
    }
}
