//! Caller-side flow: validate the profile, score it locally, ask the
//! prediction endpoint for a narrative, and fall back to a score-banded local
//! narrative if the endpoint cannot be reached or answers with an error.

use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use super::domain::{EmployeeProfile, NarrativeResult, ProfileError, RiskBand, RiskScore};
use super::request::PredictionRequest;
use super::router::PREDICT_PATH;
use super::scoring::score;

/// Where the narrative of an [`Assessment`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Service,
    LocalFallback,
}

/// Score merged with its narrative, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub score: RiskScore,
    pub band: RiskBand,
    pub analysis: String,
    pub recommendation: String,
    pub source: NarrativeSource,
}

impl Assessment {
    fn new(score: RiskScore, narrative: NarrativeResult, source: NarrativeSource) -> Self {
        Self {
            score,
            band: score.band(),
            analysis: narrative.analysis,
            recommendation: narrative.recommendation,
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("failed to build prediction client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP client for a running prediction service.
#[derive(Debug, Clone)]
pub struct AssessmentClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AssessmentClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AssessmentError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PREDICT_PATH),
        })
    }

    /// Strictly validate raw form values, then assess.
    pub async fn assess_inputs(
        &self,
        tenure_years: u32,
        promotion_gap_years: u32,
        satisfaction: u8,
        monthly_hours: f64,
    ) -> Result<Assessment, AssessmentError> {
        let profile = EmployeeProfile::validate(
            tenure_years,
            promotion_gap_years,
            satisfaction,
            monthly_hours,
        )?;
        Ok(self.assess(&profile).await)
    }

    pub async fn assess(&self, profile: &EmployeeProfile) -> Assessment {
        let score = score(profile);
        match self.request_narrative(profile, score).await {
            Ok(narrative) => Assessment::new(score, narrative, NarrativeSource::Service),
            Err(error) => {
                warn!(%error, endpoint = %self.endpoint, "prediction service failed; using local narrative");
                Assessment::new(
                    score,
                    local_fallback(score, profile),
                    NarrativeSource::LocalFallback,
                )
            }
        }
    }

    async fn request_narrative(
        &self,
        profile: &EmployeeProfile,
        score: RiskScore,
    ) -> Result<NarrativeResult, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .json(&PredictionRequest::from_profile(profile, score))
            .send()
            .await?
            .error_for_status()?
            .json::<NarrativeResult>()
            .await
    }
}

/// Score-banded narrative used when the prediction service is unreachable.
pub fn local_fallback(score: RiskScore, profile: &EmployeeProfile) -> NarrativeResult {
    match score.band() {
        RiskBand::High => NarrativeResult {
            analysis: format!(
                "High risk: an employee with {} years of experience shows signs of burnout ({} hours/month) and career stagnation ({} years without promotion).",
                profile.tenure_years, profile.monthly_hours, profile.promotion_gap_years
            ),
            recommendation: "Schedule a one-on-one with the HR business partner and direct manager right away to review career path and workload.".to_string(),
        },
        RiskBand::Medium => NarrativeResult {
            analysis: format!(
                "Medium risk: the combination of satisfaction at {}/5 and {} hours/month of work needs monitoring.",
                profile.satisfaction, profile.monthly_hours
            ),
            recommendation: "Run a pulse survey and offer a mentoring program to lift engagement.".to_string(),
        },
        RiskBand::Low => NarrativeResult {
            analysis: format!(
                "Low risk: a stable employee with satisfaction at {}/5 and a reasonable workload of {} hours/month.",
                profile.satisfaction, profile.monthly_hours
            ),
            recommendation: "Retain them with a recognition program and keep the promotion path clear.".to_string(),
        },
    }
}
