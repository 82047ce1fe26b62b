use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::request::PredictionRequest;

/// Narrative register chosen from the score before the prompt is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeRegister {
    Thriving,
    Steady,
    Strained,
    Critical,
}

impl NarrativeRegister {
    pub fn from_score(calculated_score: f64) -> Self {
        if calculated_score >= 70.0 {
            Self::Critical
        } else if calculated_score >= 40.0 {
            Self::Strained
        } else if calculated_score >= 20.0 {
            Self::Steady
        } else {
            Self::Thriving
        }
    }
}

/// Voice presets for the narrative instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneStyle {
    #[default]
    Witty,
    Professional,
    Candid,
}

impl ToneStyle {
    fn persona(self) -> &'static str {
        match self {
            ToneStyle::Witty => "a legendary senior HR analyst who has seen every corporate drama and can smell a resignation letter a mile away",
            ToneStyle::Professional => "a senior HR business partner writing for a leadership retention review",
            ToneStyle::Candid => "a blunt senior HR analyst who says plainly what the data shows",
        }
    }

    fn system_voice(self) -> &'static str {
        match self {
            ToneStyle::Witty => "You are a senior HR analyst who speaks like a storyteller, cynical yet sharp, and you answer only in valid JSON.",
            ToneStyle::Professional => "You are a senior HR analyst who writes concise, consultative commentary and answers only in valid JSON.",
            ToneStyle::Candid => "You are a senior HR analyst who writes direct, no-nonsense commentary and answers only in valid JSON.",
        }
    }

    fn register_guidance(self, register: NarrativeRegister) -> &'static str {
        match (self, register) {
            (ToneStyle::Witty, NarrativeRegister::Thriving) => "Use outrageous hyperbole. Treat them as a national treasure or joke that they might be the boss's kid.",
            (ToneStyle::Witty, NarrativeRegister::Steady) => "Give warm, quirky praise, calling them the dream employee or a pillar holding up the office.",
            (ToneStyle::Witty, NarrativeRegister::Strained) => "Use sharp sarcasm about endless overtime and LinkedIn notifications that are more exciting than internal meetings.",
            (ToneStyle::Witty, NarrativeRegister::Critical) => "Be very dramatic. You may quote a heartbroken farewell song lyric and describe them as standing at the edge of the exit.",
            (ToneStyle::Professional, NarrativeRegister::Thriving) => "Acknowledge a strong retention profile and the practices sustaining it.",
            (ToneStyle::Professional, NarrativeRegister::Steady) => "Note a stable profile with minor signals worth watching.",
            (ToneStyle::Professional, NarrativeRegister::Strained) => "Flag emerging disengagement signals with measured concern.",
            (ToneStyle::Professional, NarrativeRegister::Critical) => "Convey urgency and a material flight risk without alarmism.",
            (ToneStyle::Candid, NarrativeRegister::Thriving) => "Say plainly that this employee is in great shape and should be kept that way.",
            (ToneStyle::Candid, NarrativeRegister::Steady) => "Say plainly that things are fine but not guaranteed.",
            (ToneStyle::Candid, NarrativeRegister::Strained) => "Say plainly that the warning lights are on.",
            (ToneStyle::Candid, NarrativeRegister::Critical) => "Say plainly that this employee is likely halfway out the door.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToneStyle::Witty => "witty",
            ToneStyle::Professional => "professional",
            ToneStyle::Candid => "candid",
        }
    }
}

impl fmt::Display for ToneStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToneStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "witty" | "playful" => Ok(ToneStyle::Witty),
            "professional" | "formal" => Ok(ToneStyle::Professional),
            "candid" | "blunt" => Ok(ToneStyle::Candid),
            other => Err(format!("unknown narrative tone '{other}'")),
        }
    }
}

/// Rendered system and user messages for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativePrompt {
    pub register: NarrativeRegister,
    pub system: String,
    pub user: String,
}

impl NarrativePrompt {
    pub fn build(request: &PredictionRequest, tone: ToneStyle) -> Self {
        let register = NarrativeRegister::from_score(request.calculated_score);
        let score = request.calculated_score;

        let user = format!(
            "Act as {persona}.\n\
             \n\
             Analyze this employee profile:\n\
             - Tenure: {tenure} years\n\
             - Time since last promotion: {promotion} years\n\
             - Job satisfaction: {satisfaction}/5\n\
             - Working hours: {hours} hours/month\n\
             - Resignation risk: {score}%\n\
             \n\
             Tone for this profile (mandatory): {guidance}\n\
             \n\
             JSON output rules (mandatory):\n\
             - \"analysis\": exactly 2 sentences.\n\
             \x20 * Sentence 1: an observation about the employee's situation and mindset in the tone above.\n\
             \x20 * Sentence 2: a strategic HR inference connecting workload, tenure, promotion gap, satisfaction and the {score}% risk.\n\
             - \"recommendation\": one concrete, actionable suggestion that makes business sense.\n\
             \n\
             Respond with a JSON object containing exactly these two string fields:\n\
             {{\n\
             \x20 \"analysis\": \"...\",\n\
             \x20 \"recommendation\": \"...\"\n\
             }}",
            persona = tone.persona(),
            tenure = request.tenure,
            promotion = request.promotion,
            satisfaction = request.satisfaction,
            hours = request.hours,
            guidance = tone.register_guidance(register),
        );

        Self {
            register,
            system: tone.system_voice().to_string(),
            user,
        }
    }
}
