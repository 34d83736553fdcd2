//! Command logic for the `json-library` binary.
//!
//! ```text
//! json-library get [--strict] '<path>'
//! json-library add '<path>' '<json>'
//! json-library update '<path>' '<json>'
//! json-library delete '<path>'
//! json-library validate <schema-file>
//! ```
//!
//! The document is read from stdin; the result is written to stdout as
//! indented JSON.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::JsonLibraryError;
use crate::keywords::JsonLibrary;

pub const USAGE: &str = "usage: json-library <get [--strict] PATH | add PATH JSON | update PATH JSON | delete PATH | validate SCHEMA_FILE>";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("Invalid JSON argument: {0}")]
    Argument(serde_json::Error),
    #[error(transparent)]
    Library(#[from] JsonLibraryError),
}

/// One parsed invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get { path: String, strict: bool },
    Add { path: String, value: Value },
    Update { path: String, value: Value },
    Delete { path: String },
    Validate { schema_file: String },
}

impl Command {
    /// Parse the arguments that follow the program name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| CliError::Usage("First argument must be a command.".to_string()))?;
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        let cmd = match (name.as_str(), rest.as_slice()) {
            ("get", ["--strict", path]) | ("get", [path, "--strict"]) => {
                Command::Get { path: path.to_string(), strict: true }
            }
            ("get", [path]) => Command::Get { path: path.to_string(), strict: false },
            ("add", [path, value]) => Command::Add { path: path.to_string(), value: json_arg(value)? },
            ("update", [path, value]) => Command::Update { path: path.to_string(), value: json_arg(value)? },
            ("delete", [path]) => Command::Delete { path: path.to_string() },
            ("validate", [schema_file]) => Command::Validate { schema_file: schema_file.to_string() },
            (name @ ("get" | "add" | "update" | "delete" | "validate"), _) => {
                return Err(CliError::Usage(format!("Wrong number of arguments for '{name}'.")))
            }
            (other, _) => return Err(CliError::Usage(format!("Unknown command '{other}'."))),
        };
        Ok(cmd)
    }
}

fn json_arg(text: &str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(CliError::Argument)
}

/// Run `cmd` against the document text `input` and render the result.
pub fn run(cmd: &Command, input: &str) -> Result<String, CliError> {
    let lib = JsonLibrary::new();
    let mut doc = lib.convert_string_to_json(input.trim())?;
    debug!(?cmd, "running command");
    let result = match cmd {
        Command::Get { path, strict } => Value::Array(lib.get_value_from_json(&doc, path, *strict)?),
        Command::Add { path, value } => lib.add_object_to_json(&mut doc, path, value)?,
        Command::Update { path, value } => lib.update_value_to_json(&mut doc, path, value)?,
        Command::Delete { path } => lib.delete_object_from_json(&mut doc, path)?,
        Command::Validate { schema_file } => {
            lib.validate_json_by_schema_file(&doc, schema_file, None)?;
            Value::Bool(true)
        }
    };
    Ok(lib.convert_json_to_string(&result, Some(2), false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run_args(items: &[&str], input: &str) -> Result<Value, CliError> {
        let cmd = Command::parse(&args(items))?;
        let out = run(&cmd, input)?;
        Ok(serde_json::from_str(&out).unwrap())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse(&args(&["get", "--strict", "$.a"])).unwrap(),
            Command::Get { path: "$.a".into(), strict: true }
        );
        assert_eq!(
            Command::parse(&args(&["add", "$.a", "[1]"])).unwrap(),
            Command::Add { path: "$.a".into(), value: json!([1]) }
        );
        assert!(matches!(Command::parse(&args(&[])), Err(CliError::Usage(_))));
        assert!(matches!(Command::parse(&args(&["get"])), Err(CliError::Usage(_))));
        assert!(matches!(Command::parse(&args(&["frobnicate", "$"])), Err(CliError::Usage(_))));
        assert!(matches!(Command::parse(&args(&["update", "$.a", "{oops"])), Err(CliError::Argument(_))));
    }

    #[test]
    fn runs_editing_commands() {
        let input = r#"{"a": [1, 2, 3], "b": {"c": 1}}"#;
        assert_eq!(run_args(&["get", "$.a[*]"], input).unwrap(), json!([1, 2, 3]));
        assert_eq!(run_args(&["get", "$.zzz"], input).unwrap(), json!([]));
        assert_eq!(
            run_args(&["add", "$.b", r#"{"d": 2}"#], input).unwrap(),
            json!({"a": [1, 2, 3], "b": {"c": 1, "d": 2}})
        );
        assert_eq!(
            run_args(&["update", "$.a[0]", "9"], input).unwrap(),
            json!({"a": [9, 2, 3], "b": {"c": 1}})
        );
        assert_eq!(run_args(&["delete", "$.b"], input).unwrap(), json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn reports_library_errors() {
        let err = run_args(&["get", "--strict", "$.zzz"], "{}").unwrap_err();
        assert_eq!(err.to_string(), "No value found for path $.zzz");
        assert!(matches!(
            run_args(&["get", "$.a"], "not json").unwrap_err(),
            CliError::Library(JsonLibraryError::Json(_))
        ));
    }

    #[test]
    fn validates_against_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        std::fs::write(&schema, r#"{"type": "object", "required": ["a"]}"#).unwrap();
        let schema = schema.display().to_string();
        assert_eq!(run_args(&["validate", &schema], r#"{"a": 1}"#).unwrap(), json!(true));
        let err = run_args(&["validate", &schema], "{}").unwrap_err();
        assert_eq!(err.to_string(), "'a' is a required property, Schema path: required");
    }
}
