use serde::Deserialize;
use serde_json::Value;

use super::scorer::smoker_flag_re;

/// Raw assessment request body. Callers send whatever their form layer
/// produced, so every field tolerates strings, numbers, booleans, or
/// nothing at all; typed views are derived on demand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyProfile {
    #[serde(default)]
    pub age: Value,
    #[serde(default)]
    pub smoker: Value,
    #[serde(default)]
    pub exercise: Value,
    #[serde(default)]
    pub diet: Value,
}

impl SurveyProfile {
    pub fn age_years(&self) -> u32 {
        match &self.age {
            Value::Number(number) => number
                .as_f64()
                .filter(|n| *n >= 0.0)
                .map(|n| n as u32)
                .unwrap_or(0),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| *n >= 0.0)
                .map(|n| n as u32)
                .unwrap_or(0),
            Value::Bool(flag) => u32::from(*flag),
            _ => 0,
        }
    }

    pub fn is_smoker(&self) -> bool {
        match &self.smoker {
            Value::Bool(flag) => *flag,
            Value::String(text) => smoker_flag_re().is_match(text),
            Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
            _ => false,
        }
    }

    pub fn exercise_text(&self) -> String {
        loose_text(&self.exercise)
    }

    pub fn diet_text(&self) -> String {
        loose_text(&self.diet)
    }
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
