//! Share ids inside location paths.
//!
//! A shared snapshot lives at `/elementum/<id>/`. An id is exactly 22
//! characters of `[A-Za-z0-9_-]` sitting right before the trailing slash.

use regex::Regex;
use std::sync::OnceLock;

static SHARE_ID_REGEX: OnceLock<Regex> = OnceLock::new();

pub fn share_path(id: &str) -> String {
    format!("/elementum/{id}/")
}

/// Extracts the share id from a location path.
pub fn share_id(path: &str) -> Option<&str> {
    let re = SHARE_ID_REGEX.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z0-9_\-])([A-Za-z0-9_\-]{22})/$").expect("Invalid share id regex")
    });
    re.captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Accepts a full path, or a bare id as typed on the command line.
pub fn id_from_arg(arg: &str) -> Option<&str> {
    let trimmed = arg.trim();
    if trimmed.len() == 22 && !trimmed.ends_with('/') {
        let with_slash = format!("{trimmed}/");
        return share_id(&with_slash).map(|_| trimmed);
    }
    share_id(trimmed)
}
