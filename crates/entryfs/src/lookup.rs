use diagnostics::*;

use crate::driver::VolumeDriver;
use crate::error::Result;
use crate::path;
use crate::position::Position;

/// Result of walking a relative path on one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LookupOutcome {
    /// `Position::Void` when some segment is missing.
    pub entry: Position,
    /// Directory holding `entry`, or holding the missing leaf. `Void` when an
    /// intermediate directory is missing.
    pub parent: Position,
    /// Net segments walked: +1 per name, -1 per `..`. A missing leaf counts.
    pub rel_depth: i32,
}

impl LookupOutcome {
    pub(crate) fn found(&self) -> bool {
        !self.entry.is_void()
    }
}

/// Walk `rel_path` from `start` one segment at a time.
pub(crate) fn lookup(
    driver: &mut dyn VolumeDriver,
    start: Position,
    rel_path: &str,
) -> Result<LookupOutcome> {
    let mut entry = start;
    let mut prev = Position::Void;
    let mut via_dot_dot = false;
    let mut rel_depth = 0i32;
    let mut rest = path::reduce(rel_path);

    while let Some((seg, next)) = path::split_first(rest) {
        prev = entry;
        via_dot_dot = path::is_dot_dot(seg);
        rel_depth += if via_dot_dot { -1 } else { 1 };
        rest = path::reduce(next);

        entry = driver.entry_lookup(prev, seg)?;
        if entry.is_void() {
            let parent = if rest.is_empty() { prev } else { Position::Void };
            debug!("lookup {rel_path}: missing {seg}", rel_path: rel_path, seg: seg);
            return Ok(LookupOutcome {
                entry,
                parent,
                rel_depth,
            });
        }
    }

    let parent = if via_dot_dot || prev.is_void() {
        driver.entry_lookup(entry, path::DOT_DOT)?
    } else {
        prev
    };

    Ok(LookupOutcome {
        entry,
        parent,
        rel_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_type::EntryKind;
    use crate::memory::MemoryDriver;

    fn tree() -> (MemoryDriver, Position, Position) {
        let mut d = MemoryDriver::new();
        let a = d.entry_create(Position::Root, "a", EntryKind::Directory).unwrap();
        let b = d.entry_create(a, "b.txt", EntryKind::File).unwrap();
        (d, a, b)
    }

    #[test]
    fn test_found_parent_is_previous() {
        let (mut d, a, b) = tree();
        let out = lookup(&mut d, Position::Root, "a/b.txt").unwrap();
        assert_eq!(out, LookupOutcome { entry: b, parent: a, rel_depth: 2 });
    }

    #[test]
    fn test_start_position_asks_driver_for_parent() {
        let (mut d, a, _) = tree();
        let out = lookup(&mut d, a, "").unwrap();
        assert_eq!(out.entry, a);
        assert_eq!(out.parent, Position::Root);
        assert_eq!(out.rel_depth, 0);

        let root = lookup(&mut d, Position::Root, "./.").unwrap();
        assert_eq!(root.entry, Position::Root);
        assert_eq!(root.parent, Position::Root);
    }

    #[test]
    fn test_dot_dot_parent_is_looked_up() {
        let (mut d, a, _) = tree();
        let out = lookup(&mut d, a, "..").unwrap();
        assert_eq!(out.entry, Position::Root);
        assert_eq!(out.parent, Position::Root);
        assert_eq!(out.rel_depth, -1);

        let out = lookup(&mut d, Position::Root, "a/b.txt/..").unwrap();
        assert_eq!(out.entry, a);
        assert_eq!(out.parent, Position::Root);
        assert_eq!(out.rel_depth, 1);
    }

    #[test]
    fn test_missing_leaf_keeps_parent() {
        let (mut d, a, _) = tree();
        let out = lookup(&mut d, Position::Root, "a/new.txt").unwrap();
        assert!(!out.found());
        assert_eq!(out.parent, a);
        assert_eq!(out.rel_depth, 2);
    }

    #[test]
    fn test_missing_ancestor_has_no_parent() {
        let (mut d, _, _) = tree();
        let out = lookup(&mut d, Position::Root, "nope/new.txt").unwrap();
        assert!(!out.found());
        assert_eq!(out.parent, Position::Void);
    }
}
