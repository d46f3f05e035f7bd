use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::fields::{FieldMap, FieldValue};

/// Input accepted by the lenient parser. Upstream steps that already hold
/// structured fields pass them through untouched instead of re-serializing.
#[derive(Debug, Clone)]
pub enum ParserInput {
    Text(String),
    Parsed(FieldMap),
}

/// Recover a field map from an arbitrary transcript.
///
/// `None` means total extraction failure. An empty map is a valid "zero
/// fields recognized" outcome and is distinct from failure.
pub fn parse_fields(input: ParserInput) -> Option<FieldMap> {
    match input {
        ParserInput::Parsed(fields) => Some(fields),
        ParserInput::Text(text) => parse_transcript(&text),
    }
}

fn parse_transcript(text: &str) -> Option<FieldMap> {
    if text.is_empty() {
        return None;
    }

    let relaxed = relax(text);

    // OCR and model output frequently drop the outer braces while keeping
    // quoted keys; when the remainder still looks like the interior of a
    // JSON object, try a strict parse before degrading to per-line rescue.
    if relaxed.starts_with('"') || relaxed.contains("\":") {
        if let Some(fields) = parse_as_object_interior(&relaxed) {
            return Some(fields);
        }
    }

    Some(parse_lines(&relaxed))
}

/// Trim wrapping braces/brackets, normalize line endings, and drop the
/// comma artifacts OCR leaves at line breaks.
fn relax(text: &str) -> String {
    let raw = text
        .trim_start_matches(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .trim_end_matches(|c: char| c.is_whitespace() || c == '}' || c == ']')
        .replace("\r\n", "\n");

    let no_line_commas = line_comma_re().replace_all(&raw, "\n");
    let relaxed = trailing_comma_re().replace(&no_line_commas, "");
    relaxed.trim().to_string()
}

fn parse_as_object_interior(relaxed: &str) -> Option<FieldMap> {
    let attempt = format!("{{{relaxed}}}");
    let fixed = single_quoted_key_re().replace_all(&attempt, "$1\"$2\":");
    let fixed = single_quoted_value_re().replace_all(&fixed, ":\"$1\"");
    let fixed = comma_before_brace_re().replace_all(&fixed, "}");

    match serde_json::from_str::<Value>(&fixed) {
        Ok(Value::Object(entries)) => {
            let mut fields = FieldMap::new();
            for (key, value) in &entries {
                if let Some(value) = FieldValue::from_json(value) {
                    fields.insert(key.trim().to_lowercase(), value);
                }
            }
            Some(fields)
        }
        _ => None,
    }
}

fn parse_lines(relaxed: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for line in relaxed.split('\n') {
        let line = line.trim().trim_end_matches(|c: char| c == ',').trim();
        if line.is_empty() {
            continue;
        }

        let Some(captures) = line_re().captures(line) else {
            continue;
        };

        let key = captures[1]
            .replace(['"', '\''], "")
            .trim()
            .to_lowercase();
        let value = clean_value(&captures[2]);
        fields.insert(key, classify(&value));
    }

    fields
}

/// Strip a trailing comma and one symmetric pair of wrapping quotes.
fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = value_comma_re().replace(trimmed, "");
    let trimmed = trimmed.trim();

    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

fn classify(value: &str) -> FieldValue {
    let lower = value.to_lowercase();
    if lower == "yes" || lower == "true" {
        return FieldValue::Bool(true);
    }
    if lower == "no" || lower == "false" {
        return FieldValue::Bool(false);
    }
    if numeric_re().is_match(value) {
        if let Ok(number) = value.parse::<f64>() {
            return FieldValue::Number(number);
        }
    }
    FieldValue::Text(value.to_string())
}

fn line_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\n").expect("valid line comma pattern"))
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)\s+,\s*$").expect("valid trailing comma pattern"))
}

fn single_quoted_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([,{\s])'([^']+?)'\s*:").expect("valid quoted key pattern"))
}

fn single_quoted_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\s*'([^']+?)'").expect("valid quoted value pattern"))
}

fn comma_before_brace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\}").expect("valid brace comma pattern"))
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*["']?\s*([^:"']+?)\s*["']?\s*:\s*(.+)$"#).expect("valid line pattern")
    })
}

fn value_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*$").expect("valid value comma pattern"))
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("valid numeric pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::fields::to_canonical_json;

    fn parse(text: &str) -> Option<FieldMap> {
        parse_fields(ParserInput::Text(text.to_string()))
    }

    #[test]
    fn recovers_plain_key_value_lines() {
        let fields = parse("age: 65\nsmoker: yes\nexercise: sedentary\ndiet: junk food")
            .expect("transcript parses");

        assert_eq!(fields.get("age"), Some(&FieldValue::Number(65.0)));
        assert_eq!(fields.get("smoker"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            fields.get("exercise"),
            Some(&FieldValue::Text("sedentary".to_string()))
        );
        assert_eq!(
            fields.get("diet"),
            Some(&FieldValue::Text("junk food".to_string()))
        );
    }

    #[test]
    fn parses_braced_json_with_trailing_commas() {
        let fields = parse("{\n\"age\": 65,\n\"smoker\": true,\n\"exercise\": \"daily\",\n\"diet\": \"mixed\",\n}")
            .expect("json-ish transcript parses");

        assert_eq!(fields.get("age"), Some(&FieldValue::Number(65.0)));
        assert_eq!(fields.get("smoker"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            fields.get("diet"),
            Some(&FieldValue::Text("mixed".to_string()))
        );
    }

    #[test]
    fn rewrites_single_quotes_when_mixed_with_json_keys() {
        let fields =
            parse("\"age\": 65, 'diet': 'junk food'").expect("mixed-quote transcript parses");

        assert_eq!(fields.get("age"), Some(&FieldValue::Number(65.0)));
        assert_eq!(
            fields.get("diet"),
            Some(&FieldValue::Text("junk food".to_string()))
        );
    }

    #[test]
    fn single_quoted_lines_fall_back_to_line_parsing() {
        let fields = parse("{'age': '41',\n'smoker': 'no'}").expect("single-quoted lines parse");

        assert_eq!(fields.get("age"), Some(&FieldValue::Number(41.0)));
        assert_eq!(fields.get("smoker"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn lowercases_keys_and_keeps_last_duplicate() {
        let fields = parse("AGE: 30\nAge: 31").expect("duplicate keys parse");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("age"), Some(&FieldValue::Number(31.0)));
    }

    #[test]
    fn strips_stray_quotes_around_keys_and_values() {
        // Quote stripping happens before classification, so a quoted
        // number still comes out numeric.
        let fields = parse("\"age\": \"65\",\n'diet': 'junk'").expect("quoted lines parse");
        assert_eq!(fields.get("age"), Some(&FieldValue::Number(65.0)));
        assert_eq!(
            fields.get("diet"),
            Some(&FieldValue::Text("junk".to_string()))
        );
    }

    #[test]
    fn skips_unmatched_lines_without_aborting() {
        let fields = parse("HEALTH SURVEY FORM\nage: 50\n-----\ndiet: mixed")
            .expect("partially matching transcript parses");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("age"), Some(&FieldValue::Number(50.0)));
    }

    #[test]
    fn classifies_booleans_numbers_and_text() {
        let fields = parse("smoker: No\nweight: 82.5\nexercise: 3x week").expect("lines parse");
        assert_eq!(fields.get("smoker"), Some(&FieldValue::Bool(false)));
        assert_eq!(fields.get("weight"), Some(&FieldValue::Number(82.5)));
        assert_eq!(
            fields.get("exercise"),
            Some(&FieldValue::Text("3x week".to_string()))
        );
    }

    #[test]
    fn empty_input_is_total_failure() {
        assert!(parse("").is_none());
    }

    #[test]
    fn unrecognized_prose_yields_empty_map_not_failure() {
        let fields = parse("nothing here resembles a survey").expect("prose still parses");
        assert!(fields.is_empty());
    }

    #[test]
    fn pre_parsed_input_passes_through() {
        let mut fields = FieldMap::new();
        fields.insert("age".to_string(), FieldValue::Number(22.0));
        let passed =
            parse_fields(ParserInput::Parsed(fields.clone())).expect("pre-parsed passes through");
        assert_eq!(passed, fields);
    }

    #[test]
    fn canonical_serialization_round_trips() {
        let fields = parse("age: 65\nsmoker: yes\nexercise: sedentary\ndiet: junk food")
            .expect("transcript parses");
        let canonical = serde_json::to_string(&to_canonical_json(&fields)).expect("serializes");
        let reparsed = parse(&canonical).expect("canonical form parses");
        assert_eq!(reparsed, fields);
    }
}
