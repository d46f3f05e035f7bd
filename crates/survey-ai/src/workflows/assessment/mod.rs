mod extract;
mod profile;
mod prompts;
mod scorer;

pub use extract::extract_object;
pub use profile::SurveyProfile;
pub use scorer::{
    derive_recommendations, score_profile, RiskFactorKind, RiskLevel, RiskScore, ScoreComponent,
};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::clients::{TextModel, UpstreamError};

/// Response caps, applied by truncation in insertion order.
pub const MAX_FACTORS: usize = 6;
pub const MAX_RECOMMENDATIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorReport {
    pub factors: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLevelReport {
    pub risk_level: RiskLevel,
    pub score: u8,
    pub rationale: Vec<String>,
}

/// Orchestrates the model-backed assessments with deterministic local
/// substitutes wherever the reply fails its shape check.
pub struct RiskAssessor {
    model: Box<dyn TextModel>,
}

impl RiskAssessor {
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Advice + recommendations. Never fails: an unusable or missing
    /// reply is replaced by the deterministic rubric.
    pub async fn recommendations(&self, profile: &SurveyProfile) -> RecommendationReport {
        match self.model.generate(&prompts::recommendation_prompt(profile)).await {
            Ok(reply) => {
                if let Some(report) = shape_recommendations(&reply) {
                    return report;
                }
                warn!("model reply failed recommendation shape check, using rubric");
            }
            Err(err) => warn!(error = %err, "model call failed, using rubric"),
        }
        fallback_recommendations(profile)
    }

    /// Factor/confidence view. This one has no deterministic substitute:
    /// upstream failure propagates to the caller.
    pub async fn risk_factors(&self, profile: &SurveyProfile) -> Result<FactorReport, UpstreamError> {
        let reply = self.model.generate(&prompts::factor_prompt(profile)).await?;
        Ok(shape_factors(&reply))
    }

    /// Level + score + rationale. Never fails; same substitution policy
    /// as `recommendations`.
    pub async fn risk_level(&self, profile: &SurveyProfile) -> RiskLevelReport {
        match self.model.generate(&prompts::risk_level_prompt(profile)).await {
            Ok(reply) => {
                if let Some(report) = shape_risk_level(&reply) {
                    return report;
                }
                warn!("model reply failed risk-level shape check, using rubric");
            }
            Err(err) => warn!(error = %err, "model call failed, using rubric"),
        }
        fallback_risk_level(profile)
    }
}

/// Map loose level spellings onto the three bands; unrecognized input is
/// rejected rather than guessed.
pub fn normalize_level(raw: &str) -> Option<RiskLevel> {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        _ if lower.contains("med") => Some(RiskLevel::Medium),
        _ if lower.contains("hi") => Some(RiskLevel::High),
        _ if lower.contains("lo") => Some(RiskLevel::Low),
        _ => None,
    }
}

fn shape_recommendations(reply: &str) -> Option<RecommendationReport> {
    let parsed = extract_object(reply)?;
    let risk_level = parsed
        .get("risk_level")
        .and_then(Value::as_str)
        .and_then(normalize_level)?;
    let factors = string_items(parsed.get("factors"));
    let recommendations = string_items(parsed.get("recommendations"));
    let status = parsed
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if factors.is_empty() || recommendations.is_empty() || !status.eq_ignore_ascii_case("ok") {
        return None;
    }

    Some(RecommendationReport {
        risk_level,
        factors: truncated(factors, MAX_FACTORS),
        recommendations: truncated(recommendations, MAX_RECOMMENDATIONS),
        status: "ok".to_string(),
    })
}

fn shape_factors(reply: &str) -> FactorReport {
    let parsed = extract_object(reply).unwrap_or(Value::Null);
    FactorReport {
        factors: string_items(parsed.get("factors")),
        confidence: loose_number(parsed.get("confidence")).unwrap_or(0.0),
    }
}

fn shape_risk_level(reply: &str) -> Option<RiskLevelReport> {
    let parsed = extract_object(reply)?;
    let risk_level = parsed
        .get("risk_level")
        .and_then(Value::as_str)
        .and_then(normalize_level)?;
    let score = loose_number(parsed.get("score")).map(f64::round)?;
    if !(0.0..=100.0).contains(&score) {
        return None;
    }
    let rationale = string_items(parsed.get("rationale"));
    if rationale.is_empty() {
        return None;
    }

    Some(RiskLevelReport {
        risk_level,
        score: score as u8,
        rationale: truncated(rationale, MAX_FACTORS),
    })
}

fn fallback_recommendations(profile: &SurveyProfile) -> RecommendationReport {
    let (smoker, exercise, diet) = (
        profile.is_smoker(),
        profile.exercise_text(),
        profile.diet_text(),
    );
    let risk = score_profile(profile.age_years(), smoker, &exercise, &diet);
    let factors = risk
        .components
        .iter()
        .map(|component| component.kind.recommendation_label().to_string())
        .collect();

    RecommendationReport {
        risk_level: risk.level,
        factors: truncated(factors, MAX_FACTORS),
        recommendations: truncated(
            derive_recommendations(smoker, &exercise, &diet),
            MAX_RECOMMENDATIONS,
        ),
        status: "ok".to_string(),
    }
}

fn fallback_risk_level(profile: &SurveyProfile) -> RiskLevelReport {
    let risk = score_profile(
        profile.age_years(),
        profile.is_smoker(),
        &profile.exercise_text(),
        &profile.diet_text(),
    );
    let rationale = risk
        .components
        .iter()
        .map(|component| component.kind.rationale_label().to_string())
        .collect();

    RiskLevelReport {
        risk_level: risk.level,
        score: risk.score,
        rationale: truncated(rationale, MAX_FACTORS),
    }
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn loose_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn truncated(mut items: Vec<String>, cap: usize) -> Vec<String> {
    items.truncate(cap);
    items
}
