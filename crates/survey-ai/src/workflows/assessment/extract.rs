use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Pull a JSON value out of a model reply that may be fenced or quoted.
///
/// Narrower than the survey parser on purpose: model output is expected
/// to be JSON or near-JSON, so there is no per-line rescue here. `None`
/// means nothing parseable was found.
pub fn extract_object(raw: &str) -> Option<Value> {
    let unfenced = fence_open_re().replace(raw, "");
    let unfenced = fence_close_re().replace(&unfenced, "");
    let candidate = strip_outer_quotes(&unfenced);

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }

    // Prose-wrapped object: take everything from the first brace to the
    // last one, mirroring a greedy /\{[\s\S]*\}/ match.
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&candidate[start..=end]).ok()
}

fn strip_outer_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[a-zA-Z]*\n?").expect("valid fence opener pattern"))
}

fn fence_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```\s*$").expect("valid fence closer pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_clean_json() {
        let value = extract_object(r#"{"risk_level":"low","score":10}"#).expect("parses");
        assert_eq!(value, json!({"risk_level":"low","score":10}));
    }

    #[test]
    fn strips_code_fences_with_language_tag() {
        let value = extract_object("```json\n{\"factors\":[\"smoking\"]}\n```").expect("parses");
        assert_eq!(value["factors"][0], "smoking");
    }

    #[test]
    fn strips_accidental_outer_quotes() {
        let value = extract_object("'{\"confidence\": 0.8}'").expect("parses");
        assert_eq!(value["confidence"], 0.8);
    }

    #[test]
    fn recovers_object_embedded_in_prose() {
        let value = extract_object("Sure! Here you go: {\"risk_level\": \"high\"} Hope it helps.")
            .expect("parses");
        assert_eq!(value["risk_level"], "high");
    }

    #[test]
    fn fenced_object_with_prose_preamble() {
        let value =
            extract_object("Sure! ```json\n{\"risk_level\":\"HIGH\"}\n```").expect("parses");
        assert_eq!(value["risk_level"], "HIGH");
    }

    #[test]
    fn unparseable_reply_returns_none() {
        assert!(extract_object("I cannot answer that.").is_none());
        assert!(extract_object("").is_none());
    }
}
