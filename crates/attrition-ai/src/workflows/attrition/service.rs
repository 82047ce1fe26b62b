use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::backend::{CompletionBackend, CompletionRequest, NarrativeError};
use super::domain::NarrativeResult;
use super::prompt::{NarrativePrompt, ToneStyle};
use super::request::PredictionRequest;
use crate::config::NarrativeConfig;

/// Model parameters applied to every completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeSettings {
    pub model: String,
    pub temperature: f32,
    pub tone: ToneStyle,
}

impl From<&NarrativeConfig> for NarrativeSettings {
    fn from(config: &NarrativeConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            tone: config.tone,
        }
    }
}

/// Builds the prompt, calls the completion backend once, and validates the
/// reply. Backend problems never escape: callers always get a narrative.
pub struct NarrativeService<B: ?Sized> {
    backend: Arc<B>,
    settings: NarrativeSettings,
}

impl<B> NarrativeService<B>
where
    B: CompletionBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, settings: NarrativeSettings) -> Self {
        Self { backend, settings }
    }

    /// Single attempt; any failure yields [`NarrativeResult::fallback`].
    pub async fn narrate(&self, request: &PredictionRequest) -> NarrativeResult {
        match self.try_narrate(request).await {
            Ok(result) => result,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "narrative generation failed; serving fallback");
                NarrativeResult::fallback()
            }
        }
    }

    pub async fn try_narrate(
        &self,
        request: &PredictionRequest,
    ) -> Result<NarrativeResult, NarrativeError> {
        let prompt = NarrativePrompt::build(request, self.settings.tone);
        debug!(register = ?prompt.register, model = %self.settings.model, "requesting narrative");

        let completion = CompletionRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            system: prompt.system,
            user: prompt.user,
        };

        let raw = self.backend.complete(&completion).await?;
        parse_completion(&raw)
    }
}

/// Validate the provider's JSON text into a [`NarrativeResult`].
pub fn parse_completion(raw: &str) -> Result<NarrativeResult, NarrativeError> {
    if raw.trim().is_empty() {
        return Err(NarrativeError::MalformedBackendResponse(
            "empty completion content".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|err| NarrativeError::MalformedBackendResponse(err.to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        NarrativeError::MalformedBackendResponse("completion is not a JSON object".to_string())
    })?;

    let field = |name: &'static str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or(NarrativeError::IncompleteBackendPayload(name))
    };

    Ok(NarrativeResult {
        analysis: field("analysis")?,
        recommendation: field("recommendation")?,
    })
}
