use async_trait::async_trait;
use serde_json::json;
use survey_ai::clients::{TextModel, UpstreamError};
use survey_ai::workflows::assessment::{RiskAssessor, RiskLevel, SurveyProfile};

struct ScriptedModel {
    reply: String,
}

impl ScriptedModel {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, UpstreamError> {
        Ok(self.reply.clone())
    }
}

struct OfflineModel;

#[async_trait]
impl TextModel for OfflineModel {
    async fn generate(&self, _prompt: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::Envelope("model offline".to_string()))
    }
}

fn risky_profile() -> SurveyProfile {
    serde_json::from_value(json!({
        "age": 65,
        "smoker": "yes",
        "exercise": "sedentary",
        "diet": "junk food"
    }))
    .expect("profile deserializes")
}

#[tokio::test]
async fn recommendations_pass_through_well_formed_replies() {
    let reply = json!({
        "risk_level": "medium",
        "factors": ["smoking history"],
        "recommendations": ["Schedule a checkup"],
        "status": "ok"
    })
    .to_string();
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(reply)));

    let report = assessor.recommendations(&risky_profile()).await;
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert_eq!(report.factors, vec!["smoking history"]);
    assert_eq!(report.recommendations, vec!["Schedule a checkup"]);
    assert_eq!(report.status, "ok");
}

#[tokio::test]
async fn recommendations_fall_back_when_reply_is_prose() {
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(
        "I'm sorry, I can only help with recipes.",
    )));

    let report = assessor.recommendations(&risky_profile()).await;
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(
        report.factors,
        vec!["older age", "smoking", "low exercise", "poor diet"]
    );
    assert!(report.recommendations.contains(&"Quit smoking".to_string()));
    assert_eq!(report.status, "ok");
}

#[tokio::test]
async fn recommendations_fall_back_when_model_is_down() {
    let assessor = RiskAssessor::new(Box::new(OfflineModel));

    let report = assessor.recommendations(&risky_profile()).await;
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.status, "ok");
}

#[tokio::test]
async fn fenced_reply_missing_required_keys_uses_rubric() {
    // The extractor recovers {"risk_level":"HIGH"}, but score and
    // rationale are absent, so the deterministic rubric answers instead.
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(
        "Sure! ```json\n{\"risk_level\":\"HIGH\"}\n```",
    )));

    let report = assessor.risk_level(&risky_profile()).await;
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.score, 100);
    assert_eq!(
        report.rationale,
        vec!["older age", "smoking", "low activity", "high sugar diet"]
    );
}

#[tokio::test]
async fn risk_level_passes_through_well_formed_replies() {
    let reply = json!({
        "risk_level": "Medium",
        "score": 55,
        "rationale": ["light smoker", "decent diet"]
    })
    .to_string();
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(reply)));

    let report = assessor.risk_level(&risky_profile()).await;
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert_eq!(report.score, 55);
    assert_eq!(report.rationale.len(), 2);
}

#[tokio::test]
async fn risk_level_rejects_out_of_range_score() {
    let reply = json!({
        "risk_level": "low",
        "score": -5,
        "rationale": ["fine"]
    })
    .to_string();
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(reply)));

    let report = assessor.risk_level(&risky_profile()).await;
    // Rubric output, not the malformed reply.
    assert_eq!(report.score, 100);
    assert_eq!(report.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn risk_factors_shape_unusable_reply_into_empty_report() {
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new("no json here")));

    let report = assessor
        .risk_factors(&risky_profile())
        .await
        .expect("call succeeds even when reply is unusable");
    assert!(report.factors.is_empty());
    assert_eq!(report.confidence, 0.0);
}

#[tokio::test]
async fn risk_factors_pass_through_fenced_json() {
    let assessor = RiskAssessor::new(Box::new(ScriptedModel::new(
        "```json\n{\"factors\":[\"age\",\"smoking\"],\"confidence\":0.72}\n```",
    )));

    let report = assessor
        .risk_factors(&risky_profile())
        .await
        .expect("call succeeds");
    assert_eq!(report.factors, vec!["age", "smoking"]);
    assert_eq!(report.confidence, 0.72);
}

#[tokio::test]
async fn risk_factors_propagate_upstream_failure() {
    let assessor = RiskAssessor::new(Box::new(OfflineModel));

    let err = assessor
        .risk_factors(&risky_profile())
        .await
        .expect_err("no deterministic substitute exists for this view");
    assert!(matches!(err, UpstreamError::Envelope(_)));
}
