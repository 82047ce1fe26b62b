use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest and highest satisfaction ratings accepted on the 1-5 scale.
pub const SATISFACTION_MIN: u8 = 1;
pub const SATISFACTION_MAX: u8 = 5;

/// The four employee metrics an assessment is built from.
///
/// Wire names follow the prediction payload (`tenure`, `promotion`,
/// `satisfaction`, `hours`). Construct through [`EmployeeProfile::validate`]
/// or [`EmployeeProfile::corrected`] so the promotion gap never exceeds tenure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmployeeProfile {
    #[serde(rename = "tenure")]
    pub tenure_years: u32,
    #[serde(rename = "promotion")]
    pub promotion_gap_years: u32,
    pub satisfaction: u8,
    #[serde(rename = "hours")]
    pub monthly_hours: f64,
}

impl EmployeeProfile {
    /// Strict constructor: rejects any profile that breaks a field invariant.
    pub fn validate(
        tenure_years: u32,
        promotion_gap_years: u32,
        satisfaction: u8,
        monthly_hours: f64,
    ) -> Result<Self, ProfileError> {
        if promotion_gap_years > tenure_years {
            return Err(ProfileError::PromotionExceedsTenure {
                promotion_gap_years,
                tenure_years,
            });
        }
        Self::checked(tenure_years, promotion_gap_years, satisfaction, monthly_hours)
    }

    /// Lenient constructor mirroring the form behavior: a promotion gap longer
    /// than tenure is pulled down to tenure and the adjustment is reported.
    pub fn corrected(
        tenure_years: u32,
        promotion_gap_years: u32,
        satisfaction: u8,
        monthly_hours: f64,
    ) -> Result<(Self, Option<ProfileCorrection>), ProfileError> {
        let correction = (promotion_gap_years > tenure_years).then_some(ProfileCorrection {
            requested_promotion_gap_years: promotion_gap_years,
            applied_promotion_gap_years: tenure_years,
        });
        let promotion_gap_years = promotion_gap_years.min(tenure_years);
        let profile =
            Self::checked(tenure_years, promotion_gap_years, satisfaction, monthly_hours)?;
        Ok((profile, correction))
    }

    fn checked(
        tenure_years: u32,
        promotion_gap_years: u32,
        satisfaction: u8,
        monthly_hours: f64,
    ) -> Result<Self, ProfileError> {
        if !(SATISFACTION_MIN..=SATISFACTION_MAX).contains(&satisfaction) {
            return Err(ProfileError::SatisfactionOutOfRange(satisfaction));
        }
        if !monthly_hours.is_finite() || monthly_hours <= 0.0 {
            return Err(ProfileError::InvalidMonthlyHours(monthly_hours));
        }

        Ok(Self {
            tenure_years,
            promotion_gap_years,
            satisfaction,
            monthly_hours,
        })
    }

    pub fn hours_level(&self) -> HoursLevel {
        HoursLevel::classify(self.monthly_hours)
    }

    pub fn satisfaction_note(&self) -> &'static str {
        match self.satisfaction {
            0..=2 => "Low satisfaction: intervene soon to prevent turnover",
            3 => "Moderate satisfaction: room to improve engagement",
            4 => "Good satisfaction: employee tends to stay loyal",
            _ => "Very high satisfaction: employee is highly engaged",
        }
    }
}

/// Record of the promotion-gap clamp applied by [`EmployeeProfile::corrected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileCorrection {
    pub requested_promotion_gap_years: u32,
    pub applied_promotion_gap_years: u32,
}

impl fmt::Display for ProfileCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "promotion gap lowered from {} to {} years to match tenure",
            self.requested_promotion_gap_years, self.applied_promotion_gap_years
        )
    }
}

/// Field-level problems with a caller-supplied profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error(
        "promotion gap ({promotion_gap_years} years) must not exceed tenure ({tenure_years} years)"
    )]
    PromotionExceedsTenure {
        promotion_gap_years: u32,
        tenure_years: u32,
    },
    #[error("satisfaction must be between 1 and 5, got {0}")]
    SatisfactionOutOfRange(u8),
    #[error("monthly hours must be a positive number, got {0}")]
    InvalidMonthlyHours(f64),
}

/// Resignation risk percentage, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MIN: RiskScore = RiskScore(0);
    pub const MAX: RiskScore = RiskScore(100);

    /// Clamp an unbounded rule total into the percentage range.
    pub fn from_raw(raw: i32) -> Self {
        Self(raw.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn band(self) -> RiskBand {
        RiskBand::from_score(self)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Display bands used when presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            70.. => Self::High,
            40..=69 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
        }
    }
}

/// Workload classification relative to the 140-180 hour/month norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursLevel {
    BelowNormal,
    Normal,
    Overtime,
    Excessive,
}

impl HoursLevel {
    pub fn classify(monthly_hours: f64) -> Self {
        if monthly_hours < 140.0 {
            Self::BelowNormal
        } else if monthly_hours <= 180.0 {
            Self::Normal
        } else if monthly_hours <= 200.0 {
            Self::Overtime
        } else {
            Self::Excessive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BelowNormal => "Below normal",
            Self::Normal => "Normal",
            Self::Overtime => "Overtime",
            Self::Excessive => "Excessive overtime",
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::BelowNormal => {
                "Hours are below the 140-180 standard; review productivity and allocation."
            }
            Self::Normal => "Hours sit in the industry-standard range; work-life balance holds.",
            Self::Overtime => "Workload is slightly high; monitor to prevent burnout.",
            Self::Excessive => "Workload is very high; burnout and resignation risk rise sharply.",
        }
    }
}

/// Two-field narrative returned by the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeResult {
    pub analysis: String,
    pub recommendation: String,
}

impl NarrativeResult {
    pub const FALLBACK_ANALYSIS: &'static str = "Their career looks stuck in place while expectations keep rising. The combination of a stalled promotion track, heavy workload, and weakening satisfaction makes resignation risk hard to avoid.";
    pub const FALLBACK_RECOMMENDATION: &'static str = "Propose a role adjustment or a milestone-based promotion within the next evaluation cycle.";

    /// Canned narrative served whenever the completion backend cannot be used.
    pub fn fallback() -> Self {
        Self {
            analysis: Self::FALLBACK_ANALYSIS.to_string(),
            recommendation: Self::FALLBACK_RECOMMENDATION.to_string(),
        }
    }
}
