//! Presence checks built on [`get_value_from_json`].

use serde_json::Value;

use crate::editor::get_value_from_json;
use crate::error::{JsonLibraryError, Result};

/// Fail unless `path` matches at least one value.
pub fn should_have_value_in_json(doc: &Value, path: &str) -> Result<()> {
    match get_value_from_json(doc, path, true) {
        Ok(_) => Ok(()),
        Err(JsonLibraryError::EmptyResult { .. }) => Err(JsonLibraryError::EmptyResult { path: path.to_string() }),
        Err(e) => Err(e),
    }
}

/// Fail if `path` matches anything; the error carries what was found.
pub fn should_not_have_value_in_json(doc: &Value, path: &str) -> Result<()> {
    let values = get_value_from_json(doc, path, false)?;
    if values.is_empty() {
        Ok(())
    } else {
        Err(JsonLibraryError::ValueFound { path: path.to_string(), values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_and_absence() {
        let doc = json!({"a": {"id": 1}, "b": [{"id": 2}]});
        assert!(should_have_value_in_json(&doc, "$..id").is_ok());
        assert!(should_not_have_value_in_json(&doc, "$..card").is_ok());

        let err = should_have_value_in_json(&doc, "$..card").unwrap_err();
        assert_eq!(err.to_string(), "No value found for path $..card");

        let err = should_not_have_value_in_json(&doc, "$..id").unwrap_err();
        assert_eq!(err.to_string(), "Match found for parent $..id: [1, 2]");
    }

    #[test]
    fn falsy_values_still_count_as_present() {
        let doc = json!({"flag": false, "none": null, "zero": 0});
        for path in ["$.flag", "$.none", "$.zero"] {
            assert!(should_have_value_in_json(&doc, path).is_ok(), "{path}");
            assert!(should_not_have_value_in_json(&doc, path).is_err(), "{path}");
        }
    }

    #[test]
    fn syntax_errors_are_not_assertion_failures() {
        let doc = json!({});
        assert!(matches!(should_have_value_in_json(&doc, "$.[").unwrap_err(), JsonLibraryError::PathSyntax { .. }));
        assert!(matches!(
            should_not_have_value_in_json(&doc, "a.b").unwrap_err(),
            JsonLibraryError::PathSyntax { .. }
        ));
    }
}
