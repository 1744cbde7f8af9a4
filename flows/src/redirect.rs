//! Post-success redirect planning.
//!
//! The requested redirect comes from an untrusted query parameter, so it
//! is only honored when it is a same-origin relative path. Absolute URLs
//! (which cannot begin with a single `/`) and protocol-relative prefixes
//! fall back to `/`.

/// Compute the navigation target after a successful flow.
///
/// Returns `requested` unchanged only if it begins with a single `/`;
/// otherwise returns `/`. Unrooted values such as `dashboard` carry no
/// scheme but are still rejected: they would resolve relative to the
/// current path, so the planned target could differ per entry page.
#[must_use]
pub fn plan(requested: Option<&str>) -> String {
    match requested {
        Some(path) if is_safe_relative_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_safe_relative_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}
