use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Non-diagnostic risk band derived from the additive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual contribution recognized by the rubric. Wording differs by
/// consumer, so components carry the kind rather than a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactorKind {
    OlderAge,
    MiddleAge,
    Smoking,
    LowActivity,
    ModerateActivity,
    PoorDiet,
    AverageDiet,
}

impl RiskFactorKind {
    /// Wording used when shaping recommendation responses.
    pub fn recommendation_label(self) -> &'static str {
        match self {
            RiskFactorKind::OlderAge => "older age",
            RiskFactorKind::MiddleAge => "middle age",
            RiskFactorKind::Smoking => "smoking",
            RiskFactorKind::LowActivity => "low exercise",
            RiskFactorKind::ModerateActivity => "moderate activity",
            RiskFactorKind::PoorDiet => "poor diet",
            RiskFactorKind::AverageDiet => "average diet",
        }
    }

    /// Wording used when shaping risk-level rationales.
    pub fn rationale_label(self) -> &'static str {
        match self {
            RiskFactorKind::LowActivity => "low activity",
            RiskFactorKind::PoorDiet => "high sugar diet",
            other => other.recommendation_label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreComponent {
    pub kind: RiskFactorKind,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskScore {
    pub score: u8,
    pub level: RiskLevel,
    pub components: Vec<ScoreComponent>,
}

/// Additive rubric over the four survey fields.
///
/// Each rule contributes independently; age, activity, and diet tiers are
/// first-match-wins. The total is clamped to 0..=100.
pub fn score_profile(age: u32, smoker: bool, exercise: &str, diet: &str) -> RiskScore {
    let mut components = Vec::new();

    if age >= 60 {
        components.push(ScoreComponent {
            kind: RiskFactorKind::OlderAge,
            points: 30,
        });
    } else if age >= 45 {
        components.push(ScoreComponent {
            kind: RiskFactorKind::MiddleAge,
            points: 20,
        });
    }

    if smoker {
        components.push(ScoreComponent {
            kind: RiskFactorKind::Smoking,
            points: 30,
        });
    }

    if low_activity_re().is_match(exercise) {
        components.push(ScoreComponent {
            kind: RiskFactorKind::LowActivity,
            points: 20,
        });
    } else if moderate_activity_re().is_match(exercise) {
        components.push(ScoreComponent {
            kind: RiskFactorKind::ModerateActivity,
            points: 10,
        });
    }

    if poor_diet_re().is_match(diet) {
        components.push(ScoreComponent {
            kind: RiskFactorKind::PoorDiet,
            points: 20,
        });
    } else if average_diet_re().is_match(diet) {
        components.push(ScoreComponent {
            kind: RiskFactorKind::AverageDiet,
            points: 10,
        });
    }

    let total: u32 = components.iter().map(|c| u32::from(c.points)).sum();
    let score = total.min(100) as u8;

    RiskScore {
        score,
        level: RiskLevel::from_score(score),
        components,
    }
}

/// Actionable phrases for the recommendation fallback, insertion order
/// preserved. The two generic suggestions always close the list.
pub fn derive_recommendations(smoker: bool, exercise: &str, diet: &str) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();

    if smoker {
        recommendations.push("Quit smoking".to_string());
    }
    if poor_diet_re().is_match(diet) {
        recommendations.push("Reduce sugar".to_string());
    }
    if low_activity_re().is_match(exercise) {
        recommendations.push("Walk 30 mins daily".to_string());
    }
    for staple in ["Aim for 150 mins weekly activity", "Add fruits and vegetables"] {
        if !recommendations.iter().any(|r| r == staple) {
            recommendations.push(staple.to_string());
        }
    }

    recommendations
}

pub(crate) fn smoker_flag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(true|yes|1)$").expect("valid smoker pattern"))
}

fn low_activity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(sedentary|low|rare|none|0x|inactive)").expect("valid activity pattern")
    })
}

fn moderate_activity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(moderate|sometimes|1-2x)").expect("valid moderate pattern")
    })
}

fn poor_diet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(high\s*sugar|junk|processed|unhealthy|sweets|soda|fast\s*food)")
            .expect("valid diet pattern")
    })
}

fn average_diet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(mixed|average)").expect("valid average diet pattern"))
}
