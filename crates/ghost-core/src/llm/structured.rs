//! Structured-output gate: every generative response is parsed into a typed value and
//! checked against its declared constraints before anything downstream sees it.

use crate::error::{GhostError, GhostResult};
use serde::de::DeserializeOwned;

/// A typed contract for a generative-model response.
pub trait StructuredOutput: DeserializeOwned {
    /// Schema name sent with the request (`response_format.json_schema.name`).
    const SCHEMA_NAME: &'static str;

    /// JSON schema declared to the model.
    fn json_schema() -> serde_json::Value;

    /// Constraints serde cannot express (lengths, ranges, ordering).
    fn check(&self) -> Result<(), String>;
}

/// Parses `raw` as `T` and runs its checks. Any mismatch is a hard
/// [`GhostError::Validation`]; nothing is coerced or defaulted.
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> GhostResult<T> {
    let body = strip_code_fence(raw);
    let value: T = serde_json::from_str(body).map_err(|e| {
        GhostError::Validation(format!("{} does not match schema: {}", T::SCHEMA_NAME, e))
    })?;
    value
        .check()
        .map_err(|msg| GhostError::Validation(format!("{}: {}", T::SCHEMA_NAME, msg)))?;
    Ok(value)
}

// Some OpenAI-compatible providers wrap JSON mode output in a ```json fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Pair {
        a: u8,
        b: u8,
    }

    impl StructuredOutput for Pair {
        const SCHEMA_NAME: &'static str = "pair";
        fn json_schema() -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn check(&self) -> Result<(), String> {
            if self.a > self.b {
                return Err("a must not exceed b".into());
            }
            Ok(())
        }
    }

    #[test]
    fn accepts_conforming_output() {
        let p: Pair = parse_structured(r#"{"a": 1, "b": 2}"#).unwrap();
        assert_eq!((p.a, p.b), (1, 2));
    }

    #[test]
    fn accepts_fenced_output() {
        let p: Pair = parse_structured("```json\n{\"a\": 0, \"b\": 0}\n```").unwrap();
        assert_eq!(p.b, 0);
    }

    #[test]
    fn rejects_shape_and_constraint_violations() {
        for raw in [
            r#"{"a": 1}"#,
            r#"{"a": 1, "b": 2, "c": 3}"#,
            r#"{"a": "1", "b": 2}"#,
            r#"{"a": 3, "b": 2}"#,
            "not json",
        ] {
            assert!(
                matches!(parse_structured::<Pair>(raw), Err(GhostError::Validation(_))),
                "accepted {raw}"
            );
        }
    }
}
