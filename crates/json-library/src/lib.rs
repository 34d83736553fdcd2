//! JSONPath-driven editing of JSON documents.
//!
//! Query values, merge or append into matched containers, replace matched
//! values, delete them, and validate documents against JSON Schema. The
//! editing functions never touch their input unless the editor is built with
//! [`EditorOptions::mutate_in_place`].
//!
//! ```
//! use json_library::{delete_object_from_json, get_value_from_json};
//! use serde_json::json;
//!
//! let doc = json!({"phoneNumbers": [{"type": "iPhone"}, {"type": "home"}]});
//! let types = get_value_from_json(&doc, "$.phoneNumbers[*].type", false).unwrap();
//! assert_eq!(types, vec![json!("iPhone"), json!("home")]);
//!
//! let out = delete_object_from_json(&doc, "$.phoneNumbers[0]").unwrap();
//! assert_eq!(out, json!({"phoneNumbers": [{"type": "home"}]}));
//! ```

pub mod assertions;
pub mod cli;
pub mod editor;
pub mod error;
pub mod io;
pub mod keywords;
pub mod schema;
pub mod text;

pub use assertions::{should_have_value_in_json, should_not_have_value_in_json};
pub use editor::{
    add_object_to_json, delete_object_from_json, get_value_from_json, update_value_to_json, EditorOptions,
    JsonEditor,
};
pub use error::{JsonLibraryError, Result};
pub use io::{dump_json_to_file, load_json_from_file};
pub use keywords::JsonLibrary;
pub use schema::{validate_json_by_schema, validate_json_by_schema_file, SchemaValidator};
pub use text::{convert_json_to_string, convert_string_to_json};
