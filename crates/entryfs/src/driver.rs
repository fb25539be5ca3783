use crate::entry_type::{Attrib, EntryKind, TimeField};
use crate::error::Result;
use crate::metadata::EntryInfo;
use crate::node::NodeID;
use crate::position::Position;
use chrono::{DateTime, Utc};

/// On-disk implementation of one file-system format.
///
/// A volume owns its driver behind the volume operation lock, so every call
/// is serialized per volume and may take `&mut self`. Drivers never see
/// paths, only single names relative to a directory position.
pub trait VolumeDriver: Send {
    /// Find `name` inside directory `parent`. Must understand `..`, and
    /// `..` of the root directory is the root directory itself. Returns
    /// `Position::Void` when there is no such entry.
    fn entry_lookup(&mut self, parent: Position, name: &str) -> Result<Position>;

    fn entry_create(&mut self, parent: Position, name: &str, kind: EntryKind) -> Result<Position>;

    fn entry_delete(&mut self, pos: Position) -> Result<()>;

    /// Move `src` under `dst_parent` as `dst_name`. When `replace` is set,
    /// `dst` is an existing compatible entry that must be replaced;
    /// otherwise `dst` is `Position::Void`.
    fn entry_rename(
        &mut self,
        src: Position,
        dst: Position,
        dst_parent: Position,
        dst_name: &str,
        replace: bool,
    ) -> Result<()>;

    fn entry_query(&mut self, pos: Position) -> Result<EntryInfo>;

    /// Name of the entry at `pos` within its parent directory.
    fn entry_name(&mut self, pos: Position) -> Result<String>;

    fn entry_attrib_set(&mut self, pos: Position, attrib: Attrib) -> Result<()>;

    fn entry_time_set(&mut self, pos: Position, time: DateTime<Utc>, field: TimeField) -> Result<()>;

    fn dir_is_empty(&mut self, pos: Position) -> Result<bool>;

    fn file_truncate(&mut self, pos: Position, len: u64) -> Result<()>;

    /// Read file bytes starting at `offset`; returns the count read, 0 at end.
    fn file_read(&mut self, pos: Position, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Write file bytes at `offset`, extending the file as needed.
    fn file_write(&mut self, pos: Position, offset: u64, data: &[u8]) -> Result<()>;

    /// Commit cached state to the medium.
    fn sync(&mut self) -> Result<()>;

    /// Called when node `node` is allocated for the file at `pos`. A node
    /// that is still closing may share `pos` with its replacement, so
    /// per-node state is keyed by `node`.
    fn file_node_init(&mut self, _pos: Position, _node: NodeID) -> Result<()> {
        Ok(())
    }

    fn file_node_free(&mut self, _pos: Position, _node: NodeID) {}

    fn dir_node_init(&mut self, _pos: Position, _node: NodeID) -> Result<()> {
        Ok(())
    }

    fn dir_node_free(&mut self, _pos: Position, _node: NodeID) {}
}

/// Per-kind dispatch of the node hooks.
pub(crate) fn node_init(
    driver: &mut dyn VolumeDriver,
    kind: EntryKind,
    pos: Position,
    node: NodeID,
) -> Result<()> {
    match kind {
        EntryKind::File => driver.file_node_init(pos, node),
        EntryKind::Directory => driver.dir_node_init(pos, node),
    }
}

pub(crate) fn node_free(driver: &mut dyn VolumeDriver, kind: EntryKind, pos: Position, node: NodeID) {
    match kind {
        EntryKind::File => driver.file_node_free(pos, node),
        EntryKind::Directory => driver.dir_node_free(pos, node),
    }
}
