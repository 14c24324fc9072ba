//! Recover a people count from an untrusted model completion
//!
//! Recovery runs in four steps, each exposed for testing:
//! locate JSON object candidates, repair known escape glitches, parse, and
//! validate the `number_of_people` field.

use crate::error::ParseError;
use headcount_domain::ExtractionRecord;
use serde_json::Value;
use tracing::debug;

/// Field holding the count in the model's JSON answer
pub const COUNT_FIELD: &str = "number_of_people";

/// Alternate spelling some models produce
const COUNT_FIELD_ALIAS: &str = "numberOfPeople";

/// Parse a completion into a record for `filename`
///
/// The caller's filename is always used; whatever filename the model echoes
/// back is ignored. Balanced candidates are tried in order of appearance and
/// the first valid one wins. When none is valid, every `{` in the response is
/// tried as the start of an object, so a stray brace in surrounding prose
/// cannot hide the answer. When nothing is valid, the first error is returned.
pub fn parse_response(response: &str, filename: &str) -> Result<ExtractionRecord, ParseError> {
    if response.trim().is_empty() {
        return Err(ParseError::MalformedJson("Empty response".to_string()));
    }

    let mut first_error = None;
    for candidate in locate_json_candidates(response) {
        match parse_candidate(candidate) {
            Ok(count) => return Ok(ExtractionRecord::extracted(filename, count)),
            Err(e) => {
                debug!("Rejected JSON candidate for {}: {}", filename, e);
                first_error.get_or_insert(e);
            }
        }
    }

    let repaired = repair_json(response);
    for (start, _) in repaired.match_indices('{') {
        match parse_object_at(&repaired[start..]) {
            Ok(count) => return Ok(ExtractionRecord::extracted(filename, count)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error
        .unwrap_or_else(|| ParseError::MalformedJson("No JSON object found in response".to_string())))
}

/// Find top-level `{...}` spans in `text`, in order of appearance
///
/// Braces inside JSON strings are ignored. If no balanced span exists, the
/// span from the first `{` to the last `}` is returned as the only candidate.
pub fn locate_json_candidates(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        spans.push(&text[begin..=idx]);
                    }
                }
            }
            _ => {}
        }
    }

    if spans.is_empty() {
        if let (Some(begin), Some(end)) = (text.find('{'), text.rfind('}')) {
            if begin < end {
                spans.push(&text[begin..=end]);
            }
        }
    }

    spans
}

/// Fix escape sequences that break strict JSON parsing
///
/// - `\_` (markdown-escaped underscore) becomes `_`
/// - literal `\n` sequences are removed
pub fn repair_json(candidate: &str) -> String {
    candidate.replace("\\_", "_").replace("\\n", "")
}

/// Repair, parse and validate one candidate, returning the count
fn parse_candidate(candidate: &str) -> Result<u32, ParseError> {
    let repaired = repair_json(candidate);
    let json: Value = serde_json::from_str(&repaired)
        .map_err(|e| ParseError::MalformedJson(format!("JSON parse error: {}", e)))?;
    validate_count(&json)
}

/// Parse the single JSON value at the start of `text`, ignoring what follows
fn parse_object_at(text: &str) -> Result<u32, ParseError> {
    let json = serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| ParseError::MalformedJson("No JSON object found in response".to_string()))?
        .map_err(|e| ParseError::MalformedJson(format!("JSON parse error: {}", e)))?;
    validate_count(&json)
}

/// Check that `json` is an object carrying a non-negative integer count
pub fn validate_count(json: &Value) -> Result<u32, ParseError> {
    let obj = json
        .as_object()
        .ok_or_else(|| ParseError::SchemaViolation("Expected a JSON object".to_string()))?;

    let value = obj
        .get(COUNT_FIELD)
        .or_else(|| obj.get(COUNT_FIELD_ALIAS))
        .ok_or_else(|| ParseError::SchemaViolation(format!("Missing '{}'", COUNT_FIELD)))?;

    coerce_count(value)
}

/// Accept integers, integral floats, and strings holding either
fn coerce_count(value: &Value) -> Result<u32, ParseError> {
    let invalid = || ParseError::SchemaViolation(format!("Invalid '{}': {}", COUNT_FIELD, value));

    let number = match value {
        Value::Number(n) => match n.as_u64() {
            Some(int) => return u32::try_from(int).map_err(|_| invalid()),
            None => n.as_f64().ok_or_else(invalid)?,
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(int) = s.parse::<u32>() {
                return Ok(int);
            }
            s.parse::<f64>().map_err(|_| invalid())?
        }
        _ => return Err(invalid()),
    };

    if number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= u32::MAX as f64 {
        Ok(number as u32)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_plain_json() {
        let record = parse_response(r#"{"filename": "a.txt", "number_of_people": 4}"#, "a.txt").unwrap();
        assert_eq!(record.number_of_people, 4);
        assert_eq!(record.filename, "a.txt");
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let response = r#"Sure! Here is the answer:
{"filename": "a.txt", "number_of_people": 3}
I counted the writer and two friends."#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 3);
    }

    #[test]
    fn test_parse_markdown_fenced() {
        let response = "```json\n{\n    \"filename\": \"a.txt\",\n    \"number_of_people\": 2\n}\n```";
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 2);
    }

    #[test]
    fn test_caller_filename_wins_over_echo() {
        let record = parse_response(r#"{"filename": "other.txt", "number_of_people": 5}"#, "a.txt").unwrap();
        assert_eq!(record.filename, "a.txt");
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = parse_response("There were three of us.", "a.txt").unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)));
    }

    #[test]
    fn test_empty_response_is_malformed() {
        assert!(matches!(
            parse_response("   \n", "a.txt").unwrap_err(),
            ParseError::MalformedJson(_)
        ));
    }

    #[test]
    fn test_unparseable_object_is_malformed() {
        let err = parse_response(r#"{"filename": "a.txt", "number_of_people": ___}"#, "a.txt").unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)));
    }

    #[test]
    fn test_missing_field_is_schema_violation() {
        let err = parse_response(r#"{"filename": "a.txt", "people": 3}"#, "a.txt").unwrap_err();
        assert!(matches!(err, ParseError::SchemaViolation(_)));
    }

    #[test]
    fn test_negative_or_fractional_is_schema_violation() {
        for body in [
            r#"{"number_of_people": -1}"#,
            r#"{"number_of_people": 3.5}"#,
            r#"{"number_of_people": "3-4"}"#,
            r#"{"number_of_people": null}"#,
        ] {
            let err = parse_response(body, "a.txt").unwrap_err();
            assert!(matches!(err, ParseError::SchemaViolation(_)), "{}", body);
        }
    }

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(parse_response(r#"{"number_of_people": 4.0}"#, "a").unwrap().number_of_people, 4);
        assert_eq!(parse_response(r#"{"number_of_people": " 6 "}"#, "a").unwrap().number_of_people, 6);
        assert_eq!(parse_response(r#"{"numberOfPeople": 7}"#, "a").unwrap().number_of_people, 7);
    }

    #[test]
    fn test_zero_is_a_valid_answer() {
        let record = parse_response(r#"{"number_of_people": 0}"#, "a.txt").unwrap();
        assert_eq!(record.number_of_people, 0);
        assert!(!record.is_fallback());
    }

    #[test]
    fn test_repairs_escaped_underscore() {
        let response = r#"{"filename": "a.txt", "number\_of\_people": 3}"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 3);
    }

    #[test]
    fn test_repairs_literal_newline_sequences() {
        let response = r#"{\n"filename": "a.txt",\n"number_of_people": 2\n}"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 2);
    }

    #[test]
    fn test_template_echo_then_answer() {
        let response = r#"The format is {"filename": "a.txt", "number_of_people": ___}.
My answer: {"filename": "a.txt", "number_of_people": 6}"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 6);
    }

    #[test]
    fn test_nested_object_is_one_candidate() {
        let response = r#"{"number_of_people": 3, "details": {"named": ["Ana", "Luc"]}}"#;
        let candidates = locate_json_candidates(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(parse_response(response, "a").unwrap().number_of_people, 3);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let response = r#"{"note": "a } inside", "number_of_people": 2}"#;
        assert_eq!(locate_json_candidates(response), vec![response]);
    }

    #[test]
    fn test_locate_multiple_objects() {
        let candidates = locate_json_candidates(r#"x {"a": 1} y {"b": {"c": 2}} z"#);
        assert_eq!(candidates, vec![r#"{"a": 1}"#, r#"{"b": {"c": 2}}"#]);
    }

    #[test]
    fn test_locate_unbalanced_falls_back_to_outer_span() {
        let candidates = locate_json_candidates(r#"{"a": {"number_of_people": 1}"#);
        assert_eq!(candidates, vec![r#"{"a": {"number_of_people": 1}"#]);

        let candidates = locate_json_candidates(r#"{{"number_of_people": 1}"#);
        assert_eq!(candidates, vec![r#"{{"number_of_people": 1}"#]);
    }

    #[test]
    fn test_reversed_braces_yield_nothing() {
        assert!(locate_json_candidates("} nothing {").is_empty());
    }

    #[test]
    fn test_first_error_reported_when_all_fail() {
        let err = parse_response(r#"{"people": 1} {"number_of_people": "many"}"#, "a").unwrap_err();
        assert_eq!(err, ParseError::SchemaViolation(format!("Missing '{}'", COUNT_FIELD)));
    }

    #[test]
    fn test_stray_brace_in_prose_does_not_hide_answer() {
        let response = r#"Using rule {5 the answer is {"filename": "a.txt", "number_of_people": 3}"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 3);

        let response = r#"{"filename": "a.txt", "number_of_people": 4} and one more } here"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 4);
    }

    #[test]
    fn test_inner_object_recovered_from_unbalanced_outer() {
        let response = r#"{"a": {"number_of_people": 1}"#;
        assert_eq!(parse_response(response, "a.txt").unwrap().number_of_people, 1);
    }

    proptest! {
        #[test]
        fn prop_embedded_count_round_trips(
            count in 0u32..10_000,
            before in r#"[a-zA-Z0-9 .,:;!?'"{}\n-]{0,80}"#,
            after in r#"[a-zA-Z0-9 .,:;!?'"{}\n-]{0,80}"#,
        ) {
            let response = format!(
                "{}{{\"filename\": \"doc.txt\", \"number_of_people\": {}}}{}",
                before, count, after
            );
            let record = parse_response(&response, "doc.txt").unwrap();
            prop_assert_eq!(record.number_of_people, count);
        }

        #[test]
        fn prop_unbalanced_prefix_round_trips(
            count in 0u32..10_000,
            before in "[a-zA-Z0-9 .,:;!?'\n-]{0,80}",
        ) {
            let response = format!(
                "{{{}{{\"filename\": \"doc.txt\", \"number_of_people\": {}}}",
                before, count
            );
            let record = parse_response(&response, "doc.txt").unwrap();
            prop_assert_eq!(record.number_of_people, count);
        }

        #[test]
        fn prop_never_panics(input in ".{0,200}") {
            let _ = parse_response(&input, "doc.txt");
        }
    }
}
