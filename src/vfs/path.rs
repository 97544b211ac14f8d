//! Slash-path helpers
//!
//! Vfs paths are slash-separated and relative; `""` and `"."` both
//! name the filesystem root. These helpers never touch the OS path
//! separator, so behavior is identical on every platform.

/// Splits a path into its directory part (including the trailing
/// slash) and its base name. `split("a/b/c.css")` is `("a/b/", "c.css")`.
pub fn split(name: &str) -> (&str, &str) {
    match name.rfind('/') {
        Some(i) => (&name[..=i], &name[i + 1..]),
        None => ("", name),
    }
}

/// Returns the last path segment.
pub fn base(name: &str) -> &str {
    split(name).1
}

/// Joins a directory and a name with a slash, avoiding empty segments.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        return name.to_string();
    }
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Returns true if the path names the filesystem root.
pub fn is_root(name: &str) -> bool {
    name.is_empty() || name == "."
}
