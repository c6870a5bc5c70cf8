use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use stocktrack_inventory::ItemDraft;

use crate::backend::CompletionBackend;
use crate::prompt::ExtractionPrompt;
use crate::result::ExtractionError;

/// Boundary for "parse free text into a structured item draft".
///
/// Exactly one backend call per `extract`; no retries.
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    async fn extract(&self, free_text: &str) -> Result<ItemDraft, ExtractionError>;
}

/// Extraction gateway backed by a language model.
#[derive(Debug)]
pub struct LlmExtractor<B> {
    backend: B,
    prompt: ExtractionPrompt,
}

impl<B> LlmExtractor<B>
where
    B: CompletionBackend,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            prompt: ExtractionPrompt::default(),
        }
    }

    pub fn with_prompt(mut self, prompt: ExtractionPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the closed category set advertised to the model.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prompt = self.prompt.with_categories(categories);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B> ExtractionGateway for LlmExtractor<B>
where
    B: CompletionBackend,
{
    async fn extract(&self, free_text: &str) -> Result<ItemDraft, ExtractionError> {
        if free_text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let prompt = self.prompt.render(free_text);
        let raw = self.backend.complete(&prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "extraction backend call failed");
            ExtractionError::from(e)
        })?;

        let draft = parse_draft(&raw).inspect_err(|e| {
            tracing::warn!(error = %e, response_len = raw.len(), "extraction response rejected");
        })?;

        tracing::debug!(name = %draft.name, category = %draft.category, "extracted item draft");
        Ok(draft)
    }
}

/// Remove a surrounding triple-backtick fence (and its info string, e.g.
/// `json`) if the model added one. Unfenced text is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(start) = text.find("```") else {
        return text;
    };

    let after = &text[start + 3..];
    let inner = match after.find("```") {
        Some(end) => &after[..end],
        None => after,
    };

    let body = match inner.split_once('\n') {
        Some((info, body)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => inner.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim()
}

/// Parse a model response into a draft.
///
/// Only shape is checked: a single JSON object with the five draft keys,
/// non-blank `name` and `category`, and non-negative integer counts. Whether
/// the category is a known one is left to the caller.
pub fn parse_draft(raw: &str) -> Result<ItemDraft, ExtractionError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let value: JsonValue =
        serde_json::from_str(body).map_err(|e| ExtractionError::MalformedJson(e.to_string()))?;

    let JsonValue::Object(obj) = value else {
        return Err(ExtractionError::MalformedJson(
            "expected a single JSON object".to_string(),
        ));
    };

    let name = required_text(&obj, "name")?;
    if name.is_empty() {
        return Err(invalid("name", "must not be blank"));
    }
    let category = required_text(&obj, "category")?;
    if category.is_empty() {
        return Err(invalid("category", "must not be blank"));
    }

    Ok(ItemDraft {
        name,
        category,
        quantity: required_count(&obj, "quantity")?,
        unit: required_text(&obj, "unit")?,
        min_stock: required_count(&obj, "minStock")?,
    })
}

fn required<'a>(
    obj: &'a Map<String, JsonValue>,
    field: &'static str,
) -> Result<&'a JsonValue, ExtractionError> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Err(ExtractionError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn required_text(obj: &Map<String, JsonValue>, field: &'static str) -> Result<String, ExtractionError> {
    match required(obj, field)? {
        JsonValue::String(s) => Ok(s.trim().to_string()),
        other => Err(invalid(field, format!("expected a string, got {other}"))),
    }
}

/// Accepts integers, integral floats (`10.0`) and integer strings (`"10"`).
fn required_count(obj: &Map<String, JsonValue>, field: &'static str) -> Result<u32, ExtractionError> {
    let value = required(obj, field)?;

    let n: i64 = match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).map_err(|_| invalid(field, "out of range"))?
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
                    _ => return Err(invalid(field, format!("expected an integer, got {n}"))),
                }
            }
        }
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(field, format!("expected an integer, got {s:?}")))?,
        other => return Err(invalid(field, format!("expected an integer, got {other}"))),
    };

    if n < 0 {
        return Err(invalid(field, "must not be negative"));
    }
    u32::try_from(n).map_err(|_| invalid(field, "out of range"))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ExtractionError {
    ExtractionError::InvalidField {
        field,
        reason: reason.into(),
    }
}
