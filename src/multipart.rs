use serde::{Deserialize, Serialize};

use crate::error::PocketError;

pub const DEFAULT_CONTENT_TYPE: &str = "multipart/form-data";

const HEADER_SEPARATOR: &str = "\r\n\r\n";
const LINE_BREAK: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMarkers {
    pub grasp: String,
    pub p2rank: String,
    pub structure: String,
}

impl Default for PartMarkers {
    fn default() -> Self {
        Self {
            grasp: "grasp.csv".to_string(),
            p2rank: "p2rank.csv".to_string(),
            structure: "protein.pdb".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part<'a> {
    pub headers: &'a str,
    pub payload: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseParts {
    pub grasp_csv: Option<String>,
    pub p2rank_csv: Option<String>,
    pub structure: Option<String>,
}

impl ResponseParts {
    // markers are matched against headers only; a later duplicate wins
    pub fn identify(parts: &[Part<'_>], markers: &PartMarkers) -> Self {
        let mut identified = Self::default();
        for part in parts {
            let slot = if part.headers.contains(markers.grasp.as_str()) {
                &mut identified.grasp_csv
            } else if part.headers.contains(markers.p2rank.as_str()) {
                &mut identified.p2rank_csv
            } else if part.headers.contains(markers.structure.as_str()) {
                &mut identified.structure
            } else {
                tracing::debug!(headers = part.headers.trim(), "ignoring unrecognised part");
                continue;
            };
            *slot = Some(part.payload.to_string());
        }
        identified
    }
}

/// The media type is checked before the boundary, so a non-multipart response
/// is `UnexpectedFormat` even when it has no boundary either.
pub fn boundary_from_content_type(
    content_type: &str,
    expected_kind: &str,
) -> Result<String, PocketError> {
    if !content_type
        .to_ascii_lowercase()
        .contains(&expected_kind.to_ascii_lowercase())
    {
        return Err(PocketError::UnexpectedFormat(content_type.to_string()));
    }
    let (_, rest) = content_type
        .split_once("boundary=")
        .ok_or(PocketError::MissingBoundary)?;
    let boundary = rest
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');
    if boundary.is_empty() {
        return Err(PocketError::MissingBoundary);
    }
    Ok(boundary.to_string())
}

pub fn split_parts<'a>(body: &'a str, boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{boundary}");
    body.split(delimiter.as_str())
        .skip(1)
        .filter(|segment| !segment.trim().is_empty() && !segment.starts_with("--"))
        .filter_map(|segment| {
            let Some((headers, payload)) = segment.split_once(HEADER_SEPARATOR) else {
                tracing::debug!("skipping part without header separator");
                return None;
            };
            let payload = payload.strip_suffix(LINE_BREAK).unwrap_or(payload);
            Some(Part { headers, payload })
        })
        .collect()
}

pub fn extract_parts(
    content_type: &str,
    body: &[u8],
    expected_kind: &str,
    markers: &PartMarkers,
) -> Result<ResponseParts, PocketError> {
    let boundary = boundary_from_content_type(content_type, expected_kind)?;
    let text = String::from_utf8_lossy(body);
    let parts = split_parts(&text, &boundary);
    tracing::debug!(parts = parts.len(), %boundary, "split multipart body");
    Ok(ResponseParts::identify(&parts, markers))
}
