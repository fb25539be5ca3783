use std::sync::Arc;

use crate::fs::Core;
use crate::position::Position;
use crate::registry::EntryKey;
use crate::volume::VolumeHandle;

/// A directory used as the base for relative paths.
///
/// While a `WorkingDir` is alive its directory counts as open: it cannot be
/// deleted, renamed, or have its metadata changed.
pub struct WorkingDir {
    volume: VolumeHandle,
    pos: Position,
    depth: u16,
    core: Arc<Core>,
}

impl WorkingDir {
    pub(crate) fn new(core: Arc<Core>, volume: VolumeHandle, pos: Position, depth: u16) -> Self {
        let wd = Self {
            volume,
            pos,
            depth,
            core,
        };
        wd.core.registry.register_wd(wd.key());
        wd
    }

    pub(crate) fn key(&self) -> EntryKey {
        (self.volume.id(), self.pos)
    }

    pub(crate) fn volume(&self) -> &VolumeHandle {
        &self.volume
    }

    /// Segments below the super-root. A volume root is at depth 1.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn volume_name(&self) -> &str {
        self.volume.name()
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        self.core.registry.unregister_wd(self.key());
    }
}

impl std::fmt::Debug for WorkingDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingDir")
            .field("volume", &self.volume)
            .field("pos", &self.pos)
            .field("depth", &self.depth)
            .finish()
    }
}
