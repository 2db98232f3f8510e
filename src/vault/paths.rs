//! Vault path policy.
//!
//! Every path that reaches the upstream adapter goes through
//! [`normalize`] first: traversal segments, absolute paths, NUL bytes and
//! backslashes are rejected before any I/O happens. [`encode`] produces the
//! URL form, percent-encoding each segment independently so the `/`
//! separators stay literal.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{VaultError, VaultResult};

/// RFC 3986 unreserved characters stay literal; everything else in a
/// segment is percent-encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Validate and canonicalize a vault-relative path.
///
/// Collapses duplicate slashes, strips a leading `./` and surrounding
/// slashes or whitespace. Rejects empty results, `..` segments, NUL, and
/// backslashes.
pub fn normalize(path: &str) -> VaultResult<String> {
    let trimmed = path.trim().trim_matches('/');

    if trimmed.contains('\0') {
        return Err(VaultError::InvalidPath("path contains NUL byte".into()));
    }
    if trimmed.contains('\\') {
        return Err(VaultError::InvalidPath(format!(
            "backslashes are not allowed: {trimmed}"
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            // collapsed duplicate slash or stripped self-reference
            "" | "." => continue,
            ".." => {
                return Err(VaultError::InvalidPath(format!(
                    "traversal segments are not allowed: {path}"
                )))
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(VaultError::InvalidPath("path is empty".into()));
    }

    Ok(segments.join("/"))
}

/// Normalize a note path and require the `.md` suffix, appending it when
/// the caller left it off.
pub fn normalize_note(path: &str) -> VaultResult<String> {
    let normalized = normalize(path)?;
    if normalized.ends_with(".md") {
        Ok(normalized)
    } else {
        Ok(format!("{normalized}.md"))
    }
}

/// Normalize an optional folder filter. Empty input means "whole vault".
pub fn normalize_folder(folder: &str) -> VaultResult<Option<String>> {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    normalize(trimmed).map(Some)
}

/// Percent-encode a normalized path for use in an upstream URL. Separators
/// are never encoded; each segment is encoded on its own.
pub fn encode(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
