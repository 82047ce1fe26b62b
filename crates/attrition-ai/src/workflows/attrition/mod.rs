//! Attrition risk scoring and LLM-backed narrative generation.
//!
//! The scorer is a fixed additive rubric evaluated on the caller's side; the
//! narrative service turns score plus inputs into a short HR commentary via an
//! external completion provider and absorbs every provider failure into a
//! canned reply.

pub mod assessment;
pub mod backend;
pub mod domain;
pub mod prompt;
pub mod request;
pub mod router;
pub mod scoring;
pub mod service;

pub use assessment::{
    local_fallback, Assessment, AssessmentClient, AssessmentError, NarrativeSource,
};
pub use backend::{
    backend_from_config, ChatCompletionsBackend, CompletionBackend, CompletionRequest,
    NarrativeError, UnconfiguredBackend,
};
pub use domain::{
    EmployeeProfile, HoursLevel, NarrativeResult, ProfileCorrection, ProfileError, RiskBand,
    RiskScore,
};
pub use prompt::{NarrativePrompt, NarrativeRegister, ToneStyle};
pub use request::{InvalidInput, PredictionRequest};
pub use router::{prediction_router, PREDICT_PATH};
pub use scoring::{score, score_breakdown, RiskRule, ScoreBreakdown, ScoreComponent};
pub use service::{parse_completion, NarrativeService, NarrativeSettings};
