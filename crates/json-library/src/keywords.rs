//! [`JsonLibrary`]: every keyword behind one value.

use std::path::Path;

use serde_json::Value;

use crate::editor::{EditorOptions, JsonEditor};
use crate::error::Result;
use crate::{assertions, io, schema, text};

/// The keyword set, sharing one [`JsonEditor`].
///
/// ```
/// use json_library::JsonLibrary;
/// use serde_json::json;
///
/// let lib = JsonLibrary::new();
/// let mut doc = json!({"address": {"city": "Nara"}});
/// let out = lib.add_object_to_json(&mut doc, "$.address", &json!({"zip": "630"})).unwrap();
/// assert_eq!(out, json!({"address": {"city": "Nara", "zip": "630"}}));
/// assert_eq!(doc, json!({"address": {"city": "Nara"}}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonLibrary {
    editor: JsonEditor,
}

impl JsonLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EditorOptions) -> Self {
        Self { editor: JsonEditor::new(options) }
    }

    pub fn options(&self) -> EditorOptions {
        self.editor.options()
    }

    pub fn load_json_from_file(&self, path: impl AsRef<Path>, encoding: Option<&str>) -> Result<Value> {
        io::load_json_from_file(path, encoding)
    }

    pub fn add_object_to_json(&self, doc: &mut Value, path: &str, value: &Value) -> Result<Value> {
        self.editor.add_object(doc, path, value)
    }

    pub fn get_value_from_json(&self, doc: &Value, path: &str, fail_on_empty: bool) -> Result<Vec<Value>> {
        self.editor.get_value(doc, path, fail_on_empty)
    }

    pub fn update_value_to_json(&self, doc: &mut Value, path: &str, new_value: &Value) -> Result<Value> {
        self.editor.update_value(doc, path, new_value)
    }

    pub fn delete_object_from_json(&self, doc: &mut Value, path: &str) -> Result<Value> {
        self.editor.delete_object(doc, path)
    }

    pub fn convert_json_to_string(&self, doc: &Value, indent: Option<usize>, ensure_ascii: bool) -> String {
        text::convert_json_to_string(doc, indent, ensure_ascii)
    }

    pub fn convert_string_to_json(&self, text: &str) -> Result<Value> {
        text::convert_string_to_json(text)
    }

    pub fn dump_json_to_file(&self, dest: impl AsRef<Path>, doc: &Value, encoding: Option<&str>) -> Result<String> {
        io::dump_json_to_file(dest, doc, encoding)
    }

    pub fn should_have_value_in_json(&self, doc: &Value, path: &str) -> Result<()> {
        assertions::should_have_value_in_json(doc, path)
    }

    pub fn should_not_have_value_in_json(&self, doc: &Value, path: &str) -> Result<()> {
        assertions::should_not_have_value_in_json(doc, path)
    }

    pub fn validate_json_by_schema(&self, doc: &Value, schema: &Value) -> Result<()> {
        schema::validate_json_by_schema(doc, schema)
    }

    pub fn validate_json_by_schema_file(
        &self,
        doc: &Value,
        schema_file: impl AsRef<Path>,
        encoding: Option<&str>,
    ) -> Result<()> {
        schema::validate_json_by_schema_file(doc, schema_file, encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_mode_leaves_input_alone() {
        let lib = JsonLibrary::new();
        assert!(!lib.options().mutate_in_place);
        let mut doc = json!({"a": [1, 2, 3]});
        let out = lib.delete_object_from_json(&mut doc, "$.a[1]").unwrap();
        assert_eq!(out, json!({"a": [1, 3]}));
        assert_eq!(doc, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn in_place_mode_edits_the_argument() {
        let lib = JsonLibrary::with_options(EditorOptions { mutate_in_place: true });
        let mut doc = json!({"a": 1});
        let out = lib.update_value_to_json(&mut doc, "$.a", &json!(2)).unwrap();
        assert_eq!(out, doc);
        assert_eq!(doc, json!({"a": 2}));
    }

    #[test]
    fn text_keywords_round_trip() {
        let lib = JsonLibrary::new();
        let doc = lib.convert_string_to_json(r#"{"b": 1, "a": [true]}"#).unwrap();
        assert_eq!(lib.convert_json_to_string(&doc, None, true), r#"{"b": 1, "a": [true]}"#);
    }
}
