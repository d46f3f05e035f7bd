use serde::{Deserialize, Serialize};

use super::fields::{FieldMap, FieldValue};

/// Survey schema, in response order. Missing-field lists always follow
/// this order regardless of how the transcript was laid out.
pub const REQUIRED_FIELDS: [&str; 4] = ["age", "smoker", "exercise", "diet"];

/// Normalized survey record. Every field is present after validation,
/// defaulted when the transcript did not provide it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub age: u32,
    pub smoker: bool,
    pub exercise: String,
    pub diet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub answers: SurveyAnswers,
    pub missing_fields: Vec<String>,
    pub confidence: f64,
}

/// Enforce the four-field schema over a loosely typed field map.
///
/// Never fails: `None` (extraction produced nothing) simply reports every
/// field missing. Confidence is `1 - missing/4`, rounded to two decimals.
pub fn validate_answers(fields: Option<&FieldMap>) -> ValidationResult {
    let mut answers = SurveyAnswers::default();
    let mut missing_fields = Vec::new();

    for field in REQUIRED_FIELDS {
        match fields.and_then(|map| map.get(field)).filter(|v| !is_blank(v)) {
            Some(value) => assign(&mut answers, field, value),
            None => missing_fields.push(field.to_string()),
        }
    }

    let filled = REQUIRED_FIELDS.len() - missing_fields.len();
    let confidence = (filled as f64 / REQUIRED_FIELDS.len() as f64 * 100.0).round() / 100.0;

    ValidationResult {
        answers,
        missing_fields,
        confidence,
    }
}

fn is_blank(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Text(text) if text.is_empty())
}

fn assign(answers: &mut SurveyAnswers, field: &str, value: &FieldValue) {
    match field {
        "age" => answers.age = coerce_age(value),
        "smoker" => answers.smoker = coerce_smoker(value),
        "exercise" => answers.exercise = coerce_text(value),
        "diet" => answers.diet = coerce_text(value),
        _ => {}
    }
}

fn coerce_age(value: &FieldValue) -> u32 {
    match value {
        FieldValue::Number(number) if *number >= 0.0 => *number as u32,
        FieldValue::Number(_) | FieldValue::Bool(_) => 0,
        FieldValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(|n| n as u32)
            .unwrap_or(0),
    }
}

fn coerce_smoker(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(flag) => *flag,
        FieldValue::Number(number) => *number != 0.0,
        FieldValue::Text(text) => {
            text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes")
        }
    }
}

fn coerce_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Bool(flag) => flag.to_string(),
        FieldValue::Number(number) if number.fract() == 0.0 => (*number as i64).to_string(),
        FieldValue::Number(number) => number.to_string(),
    }
}
