//! Ad-hoc splitter for the map service's multipart response.
//!
//! This is not a conformant multipart grammar. It assumes the producer's fixed
//! layout: the first line is an ASCII boundary, boundaries are never nested or
//! escaped, and every part is text (the image is base64 encoded).

use crate::domain::model::{Extracted, MapPayload};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

const PNG_FIELD: &str = "name=\"png\"";
const YAML_FIELD: &str = "name=\"yaml\"";

static PNG_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="png"\s*\n([a-zA-Z0-9+/=\r\n]+)"#).expect("png payload pattern")
});

static YAML_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)name="yaml"\s*\n(.+)"#).expect("yaml payload pattern")
});

/// Splits `body` into parts and pulls out the PNG bytes and YAML text.
///
/// Either field may be missing; neither case is an error. A part with an empty
/// payload counts as missing. When a field occurs
/// in more than one part the last occurrence wins.
pub fn extract_map_parts(body: &str) -> MapPayload {
    let boundary = body.lines().next().unwrap_or_default().trim();

    let parts: Vec<&str> = if boundary.is_empty() {
        vec![body]
    } else {
        body.split(boundary).collect()
    };
    tracing::debug!(
        "Split multipart body on boundary '{}' into {} parts",
        boundary,
        parts.len()
    );

    let mut image = Extracted::Missing;
    let mut yaml = Extracted::Missing;

    for part in parts {
        if part.contains(PNG_FIELD) {
            if let Some(found) = extract_png(part) {
                image = found;
            }
        } else if part.contains(YAML_FIELD) {
            if let Some(found) = extract_yaml(part) {
                yaml = found;
            }
        }
    }

    MapPayload { image, yaml }
}

fn extract_png(part: &str) -> Option<Extracted<Vec<u8>>> {
    let captures = PNG_PAYLOAD.captures(part)?;
    let encoded: String = captures[1]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Some(match BASE64.decode(encoded.as_bytes()) {
        Ok(bytes) if bytes.is_empty() => Extracted::Missing,
        Ok(bytes) => Extracted::Found(bytes),
        Err(e) => {
            tracing::warn!("⚠️ png part is not valid base64: {}", e);
            Extracted::Invalid(format!("invalid base64 image payload: {}", e))
        }
    })
}

fn extract_yaml(part: &str) -> Option<Extracted<String>> {
    let captures = YAML_PAYLOAD.captures(part)?;
    let text = captures[1].trim();
    if text.is_empty() {
        return Some(Extracted::Missing);
    }
    Some(Extracted::Found(text.to_string()))
}
