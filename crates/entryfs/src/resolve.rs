use diagnostics::*;

use crate::config::MAX_DEPTH;
use crate::error::{Error, Result};
use crate::path;
use crate::position::Position;
use crate::volume::{VolumeHandle, VolumeTable};
use crate::wd::WorkingDir;

/// Where lookup of a path should start.
#[derive(Debug, Clone)]
pub(crate) struct EntryLocation<'p> {
    /// `None` is the virtual super-root above all volumes.
    pub volume: Option<VolumeHandle>,
    /// Remaining path to walk on the volume, already reduced.
    pub rel_path: &'p str,
    pub start: Position,
    pub start_depth: u16,
}

/// Turn `(base, path)` into the volume and relative path to look up.
///
/// A leading `/` makes the path absolute: the base is ignored and the first
/// segment names a volume. `..` above a volume root reaches the super-root.
pub(crate) fn resolve<'p>(
    volumes: &VolumeTable,
    base: Option<&WorkingDir>,
    full_path: &'p str,
) -> Result<EntryLocation<'p>> {
    let base = base.filter(|_| !path::is_absolute(full_path));

    let (mut depth, mut volume) = match base {
        Some(wd) => (u32::from(wd.depth()), Some(wd.volume().clone())),
        None => (0, None),
    };

    let mut crossing: Option<&'p str> = None;
    let mut rest = path::reduce(full_path);

    while let Some((seg, next)) = path::split_first(rest) {
        let dot_dot = path::is_dot_dot(seg);
        if dot_dot {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                volume = None;
            }
        } else {
            if depth == 0 {
                volume = Some(volumes.get(seg).ok_or_else(|| Error::not_found(full_path))?);
            }
            depth += 1;
        }

        rest = path::reduce(next);

        if (dot_dot && depth == 0) || (!dot_dot && depth == 1) {
            crossing = Some(rest);
        }
    }

    if depth > u32::from(MAX_DEPTH) {
        return Err(Error::max_depth(full_path));
    }

    let location = match (crossing, base) {
        (Some(rel_path), _) => {
            let start = if volume.is_some() { Position::Root } else { Position::Void };
            let start_depth = u16::from(volume.is_some());
            EntryLocation {
                volume,
                rel_path,
                start,
                start_depth,
            }
        }
        (None, Some(wd)) => EntryLocation {
            volume: Some(wd.volume().clone()),
            rel_path: path::reduce(full_path),
            start: wd.position(),
            start_depth: wd.depth(),
        },
        (None, None) => EntryLocation {
            volume: None,
            rel_path: path::reduce(full_path),
            start: Position::Void,
            start_depth: 0,
        },
    };

    let vol_name = location.volume.as_ref().map(|v| v.name().to_string()).unwrap_or_default();
    let rest = location.rel_path;
    let depth = location.start_depth;
    debug!("resolve {full_path}: volume {vol_name}, rest {rest}, depth {depth}",
           full_path: full_path, vol_name: vol_name, rest: rest, depth: depth);

    Ok(location)
}
