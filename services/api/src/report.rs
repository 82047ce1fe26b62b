use attrition_ai::error::AppError;
use attrition_ai::workflows::attrition::{
    score_breakdown, Assessment, AssessmentClient, EmployeeProfile, NarrativeSource,
    ScoreBreakdown,
};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub(crate) struct ProfileArgs {
    /// Years at the company
    #[arg(long)]
    pub(crate) tenure: u32,
    /// Years since the last promotion (must not exceed tenure)
    #[arg(long)]
    pub(crate) promotion: u32,
    /// Job satisfaction on a 1-5 scale
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub(crate) satisfaction: u8,
    /// Working hours per month
    #[arg(long)]
    pub(crate) hours: f64,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Lower a promotion gap longer than tenure instead of rejecting it
    #[arg(long)]
    pub(crate) clamp_promotion: bool,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Base URL of a running prediction service
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub(crate) endpoint: String,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub(crate) timeout_secs: u64,
}

fn build_profile(args: &ProfileArgs, clamp_promotion: bool) -> Result<EmployeeProfile, AppError> {
    if clamp_promotion {
        let (profile, correction) =
            EmployeeProfile::corrected(args.tenure, args.promotion, args.satisfaction, args.hours)?;
        if let Some(correction) = correction {
            println!("Note: {correction}");
        }
        Ok(profile)
    } else {
        Ok(EmployeeProfile::validate(
            args.tenure,
            args.promotion,
            args.satisfaction,
            args.hours,
        )?)
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let profile = build_profile(&args.profile, args.clamp_promotion)?;
    let breakdown = score_breakdown(&profile);

    if args.json {
        let payload = serde_json::json!({
            "profile": profile,
            "breakdown": breakdown,
            "band": breakdown.score.band(),
            "hours_level": profile.hours_level(),
        });
        println!("{payload:#}");
    } else {
        render_breakdown(&profile, &breakdown);
    }

    Ok(())
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let profile = build_profile(&args.profile, false)?;
    let client = AssessmentClient::new(&args.endpoint, Some(Duration::from_secs(args.timeout_secs)))?;
    let assessment = client.assess(&profile).await;
    render_assessment(&assessment);
    Ok(())
}

fn render_breakdown(profile: &EmployeeProfile, breakdown: &ScoreBreakdown) {
    println!("Attrition risk score");
    println!(
        "  Profile: {} years tenure, {} years since promotion, satisfaction {}/5, {} hours/month",
        profile.tenure_years,
        profile.promotion_gap_years,
        profile.satisfaction,
        profile.monthly_hours
    );
    println!(
        "  Score: {} ({})",
        breakdown.score,
        breakdown.score.band().label()
    );

    if breakdown.components.is_empty() {
        println!("  Rules fired: none");
    } else {
        println!("  Rules fired:");
        for component in &breakdown.components {
            println!("    {:+4}  {}", component.points, component.note);
        }
    }
    if breakdown.raw_total != i32::from(breakdown.score.value()) {
        println!("  Raw total {} clamped to {}", breakdown.raw_total, breakdown.score);
    }

    let level = profile.hours_level();
    println!("  Workload: {} - {}", level.label(), level.note());
    println!("  Satisfaction: {}", profile.satisfaction_note());
}

fn render_assessment(assessment: &Assessment) {
    println!(
        "Risk: {} ({})",
        assessment.score,
        assessment.band.label()
    );
    println!("Analysis: {}", assessment.analysis);
    println!("Recommendation: {}", assessment.recommendation);
    if assessment.source == NarrativeSource::LocalFallback {
        println!("(prediction service unavailable; showing local narrative)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_ai::workflows::attrition::ProfileError;

    fn args(tenure: u32, promotion: u32) -> ProfileArgs {
        ProfileArgs {
            tenure,
            promotion,
            satisfaction: 3,
            hours: 160.0,
        }
    }

    #[test]
    fn strict_profile_rejects_promotion_gap_beyond_tenure() {
        let err = build_profile(&args(2, 4), false).unwrap_err();
        assert!(matches!(
            err,
            AppError::Profile(ProfileError::PromotionExceedsTenure { .. })
        ));
    }

    #[test]
    fn clamped_profile_lowers_promotion_gap() {
        let profile = build_profile(&args(2, 4), true).expect("clamps");
        assert_eq!(profile.promotion_gap_years, 2);
    }

    #[test]
    fn score_command_runs_for_valid_profile() {
        let result = run_score(ScoreArgs {
            profile: args(2, 1),
            clamp_promotion: false,
            json: true,
        });
        assert!(result.is_ok());
    }
}
