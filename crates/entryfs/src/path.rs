//! Path segment helpers
//!
//! Paths are `/`-separated. These helpers work on string slices so that a
//! resolved location can point into the caller's path without copying.

use crate::error::{Error, Result};

pub const SEPARATOR: char = '/';
pub const DOT: &str = ".";
pub const DOT_DOT: &str = "..";

/// Skip leading separators and `.` segments.
pub fn reduce(path: &str) -> &str {
    let mut rest = path;
    loop {
        rest = rest.trim_start_matches(SEPARATOR);
        match rest.strip_prefix(DOT) {
            Some(after) if after.is_empty() || after.starts_with(SEPARATOR) => rest = after,
            _ => return rest,
        }
    }
}

/// Split a reduced path into its first segment and the (unreduced) rest.
pub fn split_first(path: &str) -> Option<(&str, &str)> {
    if path.is_empty() {
        return None;
    }
    Some(match path.split_once(SEPARATOR) {
        Some((seg, rest)) => (seg, rest),
        None => (path, ""),
    })
}

/// Iterate over the meaningful segments of a path (`.` and empty skipped).
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty() && *s != DOT)
}

/// Last meaningful segment, i.e. the name an operation targets.
pub fn last_segment(path: &str) -> Option<&str> {
    segments(path).last()
}

pub fn is_dot_dot(seg: &str) -> bool {
    seg == DOT_DOT
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Check a name about to be written into a directory.
pub fn validate_name(name: &str, max_len: usize) -> Result<()> {
    if name.is_empty()
        || name == DOT
        || name == DOT_DOT
        || name.len() > max_len
        || name.chars().any(|c| c == SEPARATOR || c.is_control())
    {
        return Err(Error::invalid_name(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce() {
        assert_eq!(reduce("/vol/a"), "vol/a");
        assert_eq!(reduce("./././a"), "a");
        assert_eq!(reduce("//./b/./c"), "b/./c");
        assert_eq!(reduce("."), "");
        assert_eq!(reduce("/"), "");
        assert_eq!(reduce("..//x"), "..//x");
        assert_eq!(reduce(".hidden"), ".hidden");
    }

    #[test]
    fn test_split_first() {
        assert_eq!(split_first("a/b/c"), Some(("a", "b/c")));
        assert_eq!(split_first("a"), Some(("a", "")));
        assert_eq!(split_first("a/"), Some(("a", "")));
        assert_eq!(split_first(""), None);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("/vol/dir/file.txt"), Some("file.txt"));
        assert_eq!(last_segment("/vol/dir/"), Some("dir"));
        assert_eq!(last_segment("a/."), Some("a"));
        assert_eq!(last_segment("/"), None);
        assert_eq!(last_segment("a/.."), Some(".."));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.txt", 255).is_ok());
        assert_eq!(validate_name("..", 255), Err(Error::invalid_name("..")));
        assert_eq!(validate_name("", 255), Err(Error::invalid_name("")));
        assert_eq!(validate_name("abcdef", 4), Err(Error::invalid_name("abcdef")));
        assert!(validate_name("bad\u{7}", 255).is_err());
    }
}
