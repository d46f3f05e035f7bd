use serde_json::Value;

use super::profile::SurveyProfile;

pub(crate) fn recommendation_prompt(profile: &SurveyProfile) -> String {
    format!(
        "You are a health assistant.\n\
         Return ONLY valid JSON. No code fences. Use exactly these keys:\n\
         risk_level (\"low\"|\"medium\"|\"high\"), factors (array of short strings), \
         recommendations (array of short actionable phrases), status (always \"ok\").\n\
         Keep guidance non-diagnostic, practical, and concise.\n\
         {}",
        inputs_line(profile)
    )
}

pub(crate) fn factor_prompt(profile: &SurveyProfile) -> String {
    format!(
        "You are a health risk profiler.\n\
         Return ONLY valid JSON. No code fences. Use keys exactly: \
         factors (array of strings), confidence (number 0..1).\n\
         {}",
        inputs_line(profile)
    )
}

pub(crate) fn risk_level_prompt(profile: &SurveyProfile) -> String {
    format!(
        "You are a health risk profiler.\n\
         Return ONLY valid JSON. No code fences. Keys exactly: \
         risk_level (one of: low, medium, high), score (integer 0..100), \
         rationale (array of short strings).\n\
         Use a simple, non-diagnostic scoring based on inputs. Be concise.\n\
         {}",
        inputs_line(profile)
    )
}

/// Raw, unvalidated field renderings; the model sees exactly what the
/// caller sent.
fn inputs_line(profile: &SurveyProfile) -> String {
    format!(
        "Inputs: age: {}, smoker: {}, exercise: {}, diet: {}",
        raw_display(&profile.age),
        raw_display(&profile.smoker),
        raw_display(&profile.exercise),
        raw_display(&profile.diet)
    )
}

fn raw_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
