use attrition_ai::config::NarrativeConfig;
use attrition_ai::workflows::attrition::{
    backend_from_config, CompletionBackend, NarrativeError, NarrativeService, NarrativeSettings,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type MetricsRenderer = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: MetricsRenderer,
}

pub(crate) type SharedNarrativeService = Arc<NarrativeService<dyn CompletionBackend>>;

/// Wire the completion backend described by configuration into a service.
pub(crate) fn narrative_service(
    config: &NarrativeConfig,
) -> Result<SharedNarrativeService, NarrativeError> {
    if config.api_key.is_none() {
        warn!("no completion API key configured; every prediction will use the fallback narrative");
    } else {
        info!(
            model = %config.model,
            base_url = %config.base_url,
            tone = %config.tone,
            "completion backend configured"
        );
    }

    let backend = backend_from_config(config)?;
    Ok(Arc::new(NarrativeService::new(
        backend,
        NarrativeSettings::from(config),
    )))
}
