//! Loading documents from and dumping them to files.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{JsonLibraryError, Result};
use crate::text::convert_json_to_string;

/// Read and parse the document stored at `path`.
///
/// `encoding` is any WHATWG label (`"utf-8"`, `"latin1"`, `"utf-16le"`, ...);
/// UTF-8 when absent. A byte order mark overrides the label.
pub fn load_json_from_file(path: impl AsRef<Path>, encoding: Option<&str>) -> Result<Value> {
    let path = path.as_ref();
    debug!(path = %path.display(), "check if file exists");
    if !path.is_file() {
        error!("JSON file: {} not found", path.display());
        return Err(JsonLibraryError::FileNotFound { path: path.display().to_string() });
    }
    let encoding = lookup(encoding)?;
    let bytes = fs::read(path)?;
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not valid {}", path.display(), used.name()),
        )
        .into());
    }
    Ok(serde_json::from_str(&text)?)
}

/// Write `doc` as compact text to `dest` and return the destination path.
pub fn dump_json_to_file(dest: impl AsRef<Path>, doc: &Value, encoding: Option<&str>) -> Result<String> {
    let dest = dest.as_ref();
    let encoding = lookup(encoding)?;
    let text = convert_json_to_string(doc, None, true);
    fs::write(dest, encode(&text, encoding)?)?;
    debug!(path = %dest.display(), encoding = encoding.name(), "dumped document");
    Ok(dest.display().to_string())
}

fn lookup(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        None => Ok(UTF_8),
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| JsonLibraryError::UnknownEncoding { label: label.to_string() }),
    }
}

/// `Encoding::encode` writes UTF-8 for UTF-16 targets, so those are
/// produced by hand, little- or big-endian with a byte order mark.
fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let little = encoding == UTF_16LE;
        let mut out = Vec::with_capacity(2 + text.len() * 2);
        for unit in std::iter::once(0xFEFF).chain(text.encode_utf16()) {
            out.extend_from_slice(&if little { unit.to_le_bytes() } else { unit.to_be_bytes() });
        }
        return Ok(out);
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("text cannot be encoded as {}", encoding.name()),
        )
        .into());
    }
    Ok(bytes.into_owned())
}
