#![allow(dead_code)]

use std::path::{Path, PathBuf};

use json_library::load_json_from_file;
use serde_json::Value;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn load_fixture(name: &str) -> Value {
    let path = fixture_path(name);
    load_json_from_file(&path, None).unwrap_or_else(|e| panic!("failed to load {:?}: {e}", path))
}

/// The person document most tests start from.
pub fn example() -> Value {
    load_fixture("example.json")
}
