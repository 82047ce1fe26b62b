use super::domain::{EmployeeProfile, RiskScore};
use serde::Serialize;

/// Identifies one row of the additive risk rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRule {
    ExcessiveHours,
    LongPromotionGap,
    LowSatisfaction,
    SeniorStagnation,
    HighSatisfaction,
    RecentPromotion,
    IdealHours,
}

impl RiskRule {
    pub const ALL: [RiskRule; 7] = [
        RiskRule::ExcessiveHours,
        RiskRule::LongPromotionGap,
        RiskRule::LowSatisfaction,
        RiskRule::SeniorStagnation,
        RiskRule::HighSatisfaction,
        RiskRule::RecentPromotion,
        RiskRule::IdealHours,
    ];

    pub fn points(self) -> i32 {
        match self {
            RiskRule::ExcessiveHours => 35,
            RiskRule::LongPromotionGap => 25,
            RiskRule::LowSatisfaction => 30,
            RiskRule::SeniorStagnation => 10,
            RiskRule::HighSatisfaction => -20,
            RiskRule::RecentPromotion => -15,
            RiskRule::IdealHours => -10,
        }
    }

    /// Every rule reads the unmodified profile; rules may overlap.
    pub fn applies(self, profile: &EmployeeProfile) -> bool {
        match self {
            RiskRule::ExcessiveHours => profile.monthly_hours > 200.0,
            RiskRule::LongPromotionGap => profile.promotion_gap_years > 3,
            RiskRule::LowSatisfaction => profile.satisfaction <= 2,
            RiskRule::SeniorStagnation => {
                profile.tenure_years > 4 && profile.promotion_gap_years > 2
            }
            RiskRule::HighSatisfaction => profile.satisfaction >= 4,
            RiskRule::RecentPromotion => profile.promotion_gap_years <= 1,
            RiskRule::IdealHours => (140.0..=180.0).contains(&profile.monthly_hours),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            RiskRule::ExcessiveHours => "more than 200 hours per month",
            RiskRule::LongPromotionGap => "over 3 years since last promotion",
            RiskRule::LowSatisfaction => "satisfaction at 2 or below",
            RiskRule::SeniorStagnation => "over 4 years tenure with a promotion gap above 2 years",
            RiskRule::HighSatisfaction => "satisfaction at 4 or above",
            RiskRule::RecentPromotion => "promoted within the last year",
            RiskRule::IdealHours => "hours within the 140-180 ideal range",
        }
    }
}

/// Contribution of one fired rule, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub rule: RiskRule,
    pub points: i32,
    pub note: &'static str,
}

/// Fired rules, unclamped total, and the final clamped score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
    pub raw_total: i32,
    pub score: RiskScore,
}

/// Deterministic resignation-risk heuristic. Pure and total.
pub fn score(profile: &EmployeeProfile) -> RiskScore {
    let raw_total = RiskRule::ALL
        .iter()
        .filter(|rule| rule.applies(profile))
        .map(|rule| rule.points())
        .sum();
    RiskScore::from_raw(raw_total)
}

pub fn score_breakdown(profile: &EmployeeProfile) -> ScoreBreakdown {
    let components: Vec<ScoreComponent> = RiskRule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.applies(profile))
        .map(|rule| ScoreComponent {
            rule,
            points: rule.points(),
            note: rule.describe(),
        })
        .collect();
    let raw_total = components.iter().map(|component| component.points).sum();

    ScoreBreakdown {
        components,
        raw_total,
        score: RiskScore::from_raw(raw_total),
    }
}
