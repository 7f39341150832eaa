use once_cell::sync::Lazy;
use regex::Regex;

static FRAGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z0-9_.-]+$").expect("fragment pattern"));

/// Sanitize an untrusted relative path before it is exposed to the UI or
/// turned into a file URL.
///
/// A trailing `#fragment` is kept only when it matches the fragment pattern;
/// an invalid fragment is dropped while the base path is still returned.
/// Scheme prefixes, network paths, and drive letters are rejected outright,
/// and a `..` that would climb above the resolved root invalidates the whole
/// path rather than being clamped.
#[must_use]
pub fn sanitize_relative_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (path_part, fragment) = match trimmed.find('#') {
        Some(idx) => (&trimmed[..idx], Some(trimmed[idx + 1..].trim())),
        None => (trimmed, None),
    };

    let normalized = path_part.replace('\\', "/");
    if normalized.starts_with("//") {
        return None;
    }
    let normalized = normalized.strip_prefix('/').unwrap_or(&normalized);
    // Covers scheme prefixes (qrc:, file:, ...) and drive letters alike.
    if normalized.contains(':') {
        return None;
    }

    let mut safe: Vec<&str> = Vec::new();
    for part in normalized.split('/').filter(|p| !p.is_empty()) {
        match part {
            "." => {}
            ".." => {
                if safe.pop().is_none() {
                    return None;
                }
            }
            _ => safe.push(part),
        }
    }
    if safe.is_empty() {
        return None;
    }

    let mut result = safe.join("/");
    if let Some(frag) = fragment {
        if !frag.is_empty() && FRAGMENT_PATTERN.is_match(frag) {
            result.push('#');
            result.push_str(frag);
        }
    }
    Some(result)
}

/// Split a sanitized path into its path part and optional fragment.
#[must_use]
pub fn split_fragment(path: &str) -> (&str, Option<&str>) {
    match path.find('#') {
        Some(idx) => (&path[..idx], Some(&path[idx + 1..])),
        None => (path, None),
    }
}
