//! Glob matching over a [`Vfs`] walk
//!
//! Matches full slash paths against a pattern where `*`, `?` and
//! `[..]` never cross a path separator, the semantics the decorators
//! expose through [`Vfs::glob`].

use glob::{MatchOptions, Pattern};

use crate::error::Result;

use super::{walk, Vfs};

/// Walks the whole tree and returns every path matching `pattern`.
///
/// An invalid pattern is an error; a pattern matching nothing is an
/// empty result. A missing root also yields an empty result, so
/// globbing an empty filesystem is not an error.
pub fn glob_walk(fsys: &dyn Vfs, pattern: &str) -> Result<Vec<String>> {
    let pattern = Pattern::new(pattern)?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    let mut matches = Vec::new();
    let result = walk(fsys, "", &mut |path, _| {
        if pattern.matches_with(path, options) {
            matches.push(path.to_string());
        }
        Ok(())
    });
    match result {
        Ok(()) => Ok(matches),
        Err(err) if err.is_not_found() => Ok(matches),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::vfs::LocalFs;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_glob_matches_within_segment() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/subdir")).unwrap();
        fs::write(dir.path().join("assets/main.css"), b"x").unwrap();
        fs::write(dir.path().join("assets/app.js"), b"y").unwrap();
        fs::write(dir.path().join("assets/subdir/deep.css"), b"z").unwrap();

        let fsys = LocalFs::new(dir.path());

        let got = glob_walk(&fsys, "assets/*").unwrap();
        assert_eq!(got, ["assets/app.js", "assets/main.css", "assets/subdir"]);

        // The wildcard does not cross separators.
        let got = glob_walk(&fsys, "assets/*.css").unwrap();
        assert_eq!(got, ["assets/main.css"]);
    }

    #[test]
    fn test_glob_no_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();

        let fsys = LocalFs::new(dir.path());
        assert!(glob_walk(&fsys, "*.css").unwrap().is_empty());
    }

    #[test]
    fn test_glob_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let fsys = LocalFs::new(dir.path().join("missing"));
        assert!(glob_walk(&fsys, "*").unwrap().is_empty());
    }

    #[test]
    fn test_glob_invalid_pattern() {
        let dir = tempdir().unwrap();
        let fsys = LocalFs::new(dir.path());
        assert!(matches!(
            glob_walk(&fsys, "a[").unwrap_err(),
            Error::Pattern(_)
        ));
    }
}
