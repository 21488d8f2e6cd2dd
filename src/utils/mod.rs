//! Path helpers shared by every request translator.

/// Normalizes a configured base path.
///
/// The result always starts with `/` and never ends with `/`. Blank input, or a base path
/// of just `/`, normalizes to the empty string, which disables stripping.
///
/// # Arguments
///
/// * `base_path` - The base path as configured, e.g. `app1`, `/app1/` or `  `
///
/// # Returns
///
/// The normalized base path, e.g. `/app1`.
#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Removes a normalized base path from the front of `path`.
///
/// Matching is a plain prefix match: when `base_path` is empty or is not a prefix of
/// `path`, the path is returned untouched.
#[must_use]
pub fn strip_base_path<'a>(path: &'a str, base_path: &str) -> &'a str {
    if base_path.is_empty() {
        return path;
    }
    path.strip_prefix(base_path).unwrap_or(path)
}

/// Guarantees a leading `/`.
#[must_use]
pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("app1"), "/app1");
        assert_eq!(normalize_base_path("/app1/"), "/app1");
        assert_eq!(normalize_base_path(" /app1 "), "/app1");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("   "), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn test_strip_base_path() {
        assert_eq!(strip_base_path("/app1/orders", "/app1"), "/orders");
        assert_eq!(strip_base_path("/app1", "/app1"), "");
        assert_eq!(strip_base_path("/other/orders", "/app1"), "/other/orders");
        assert_eq!(strip_base_path("/orders", ""), "/orders");
    }

    #[test]
    fn test_ensure_leading_slash() {
        assert_eq!(ensure_leading_slash(""), "/");
        assert_eq!(ensure_leading_slash("orders"), "/orders");
        assert_eq!(ensure_leading_slash("/orders"), "/orders");
    }
}
