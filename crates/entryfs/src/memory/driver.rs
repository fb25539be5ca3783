use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::entry::MemoryEntry;
use crate::driver::VolumeDriver;
use crate::entry_type::{Attrib, EntryKind, TimeField};
use crate::error::{Error, Result};
use crate::metadata::EntryInfo;
use crate::node::NodeID;
use crate::path;
use crate::position::Position;

/// In-memory `VolumeDriver`. Clones share one tree.
#[derive(Clone)]
pub struct MemoryDriver(Arc<Mutex<State>>);

struct State {
    entries: HashMap<Position, MemoryEntry>,
    next_token: u64,
    syncs: usize,
    nodes: BTreeMap<NodeID, Position>,
    faults: Faults,
}

#[derive(Default)]
struct Faults {
    sync: bool,
    node_init: bool,
    write: bool,
}

impl Default for State {
    fn default() -> Self {
        let mut entries = HashMap::new();
        _ = entries.insert(Position::Root, MemoryEntry::root());
        Self {
            entries,
            next_token: 1,
            syncs: 0,
            nodes: BTreeMap::new(),
            faults: Faults::default(),
        }
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(State::default())))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of successful `sync` calls.
    pub fn sync_count(&self) -> usize {
        self.state().syncs
    }

    /// Node init calls not yet matched by a free.
    pub fn live_nodes(&self) -> usize {
        self.state().nodes.len()
    }

    /// Ids of the nodes that are initialized and not yet freed, ascending.
    pub fn live_node_ids(&self) -> Vec<NodeID> {
        self.state().nodes.keys().copied().collect()
    }

    /// Entries on the volume, root included.
    pub fn entry_count(&self) -> usize {
        self.state().entries.len()
    }

    pub fn fail_sync(&self, fail: bool) {
        self.state().faults.sync = fail;
    }

    pub fn fail_node_init(&self, fail: bool) {
        self.state().faults.node_init = fail;
    }

    pub fn fail_write(&self, fail: bool) {
        self.state().faults.write = fail;
    }

    /// Contents of the file at a volume-relative path.
    pub fn read_file(&self, rel_path: &str) -> Option<Vec<u8>> {
        let state = self.state();
        let pos = state.find(rel_path)?;
        state.entries.get(&pos).map(|e| e.data.clone())
    }

    /// Replace the contents of the file at a volume-relative path.
    pub fn write_file(&self, rel_path: &str, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        let pos = state.find(rel_path).ok_or_else(|| Error::not_found(rel_path))?;
        let entry = state.entry_mut(pos)?;
        entry.data = data.to_vec();
        entry.touch();
        Ok(())
    }
}

impl State {
    fn entry(&self, pos: Position) -> Result<&MemoryEntry> {
        self.entries
            .get(&pos)
            .ok_or_else(|| Error::volume_corrupted(format!("no entry at {pos}")))
    }

    fn entry_mut(&mut self, pos: Position) -> Result<&mut MemoryEntry> {
        self.entries
            .get_mut(&pos)
            .ok_or_else(|| Error::volume_corrupted(format!("no entry at {pos}")))
    }

    fn find(&self, rel_path: &str) -> Option<Position> {
        path::segments(rel_path).try_fold(Position::Root, |pos, seg| {
            self.entries.get(&pos)?.children.get(seg).copied()
        })
    }

    fn dir(&self, pos: Position) -> Result<&MemoryEntry> {
        let entry = self.entry(pos)?;
        if !entry.kind.is_dir() {
            return Err(Error::parent_not_dir(&entry.name));
        }
        Ok(entry)
    }

    fn unlink(&mut self, pos: Position) -> Result<MemoryEntry> {
        if pos.is_root() {
            return Err(Error::root_dir("/"));
        }
        let entry = self
            .entries
            .remove(&pos)
            .ok_or_else(|| Error::volume_corrupted(format!("no entry at {pos}")))?;
        let parent = self.entry_mut(entry.parent)?;
        _ = parent.children.remove(&entry.name);
        parent.touch();
        Ok(entry)
    }
}

impl VolumeDriver for MemoryDriver {
    fn entry_lookup(&mut self, parent: Position, name: &str) -> Result<Position> {
        let state = self.state();
        let entry = state.entry(parent)?;
        if path::is_dot_dot(name) {
            return Ok(entry.parent);
        }
        Ok(entry.children.get(name).copied().unwrap_or(Position::Void))
    }

    fn entry_create(&mut self, parent: Position, name: &str, kind: EntryKind) -> Result<Position> {
        let mut state = self.state();
        if state.dir(parent)?.children.contains_key(name) {
            return Err(Error::already_exists(name));
        }
        let pos = Position::At(state.next_token);
        state.next_token += 1;
        _ = state.entries.insert(pos, MemoryEntry::new(name, parent, kind));
        let dir = state.entry_mut(parent)?;
        _ = dir.children.insert(name.to_string(), pos);
        dir.touch();
        Ok(pos)
    }

    fn entry_delete(&mut self, pos: Position) -> Result<()> {
        let mut state = self.state();
        if !state.entry(pos)?.children.is_empty() {
            return Err(Error::dir_not_empty(&state.entry(pos)?.name));
        }
        _ = state.unlink(pos)?;
        Ok(())
    }

    fn entry_rename(
        &mut self,
        src: Position,
        dst: Position,
        dst_parent: Position,
        dst_name: &str,
        replace: bool,
    ) -> Result<()> {
        let mut state = self.state();
        _ = state.dir(dst_parent)?;

        let mut up = dst_parent;
        while !up.is_root() {
            if up == src {
                return Err(Error::invalid_argument(format!("{dst_name} inside its own source")));
            }
            up = state.entry(up)?.parent;
        }

        if replace {
            if !state.entry(dst)?.children.is_empty() {
                return Err(Error::dir_not_empty(dst_name));
            }
            _ = state.unlink(dst)?;
        } else if state.dir(dst_parent)?.children.contains_key(dst_name) {
            return Err(Error::already_exists(dst_name));
        }

        let mut entry = state.unlink(src)?;
        entry.name = dst_name.to_string();
        entry.parent = dst_parent;
        _ = state.entries.insert(src, entry);
        let dir = state.entry_mut(dst_parent)?;
        _ = dir.children.insert(dst_name.to_string(), src);
        dir.touch();
        Ok(())
    }

    fn entry_query(&mut self, pos: Position) -> Result<EntryInfo> {
        Ok(self.state().entry(pos)?.info())
    }

    fn entry_name(&mut self, pos: Position) -> Result<String> {
        Ok(self.state().entry(pos)?.name.clone())
    }

    fn entry_attrib_set(&mut self, pos: Position, attrib: Attrib) -> Result<()> {
        self.state().entry_mut(pos)?.set_attrib(attrib);
        Ok(())
    }

    fn entry_time_set(&mut self, pos: Position, time: DateTime<Utc>, field: TimeField) -> Result<()> {
        self.state().entry_mut(pos)?.set_time(time, field);
        Ok(())
    }

    fn dir_is_empty(&mut self, pos: Position) -> Result<bool> {
        Ok(self.state().dir(pos)?.children.is_empty())
    }

    fn file_truncate(&mut self, pos: Position, len: u64) -> Result<()> {
        let mut state = self.state();
        let entry = state.entry_mut(pos)?;
        if entry.kind.is_dir() {
            return Err(Error::invalid_type(&entry.name));
        }
        let len = usize::try_from(len).map_err(|_| Error::Io("length exceeds memory".into()))?;
        entry.data.resize(len, 0);
        entry.touch();
        Ok(())
    }

    fn file_read(&mut self, pos: Position, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let state = self.state();
        let data = &state.entry(pos)?.data;
        let start = usize::try_from(offset).map_or(data.len(), |o| o.min(data.len()));
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn file_write(&mut self, pos: Position, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.faults.write {
            return Err(Error::Io("injected write failure".into()));
        }
        let entry = state.entry_mut(pos)?;
        let start = usize::try_from(offset).map_err(|_| Error::Io("offset exceeds memory".into()))?;
        let end = start + bytes.len();
        if entry.data.len() < end {
            entry.data.resize(end, 0);
        }
        entry.data[start..end].copy_from_slice(bytes);
        entry.touch();
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        let mut state = self.state();
        if state.faults.sync {
            return Err(Error::Io("injected sync failure".into()));
        }
        state.syncs += 1;
        Ok(())
    }

    fn file_node_init(&mut self, pos: Position, node: NodeID) -> Result<()> {
        self.node_init(pos, node)
    }

    fn file_node_free(&mut self, _pos: Position, node: NodeID) {
        self.node_free(node);
    }

    fn dir_node_init(&mut self, pos: Position, node: NodeID) -> Result<()> {
        self.node_init(pos, node)
    }

    fn dir_node_free(&mut self, _pos: Position, node: NodeID) {
        self.node_free(node);
    }
}

impl MemoryDriver {
    fn node_init(&self, pos: Position, node: NodeID) -> Result<()> {
        let mut state = self.state();
        if state.faults.node_init {
            return Err(Error::Io(format!("injected node init failure at {pos}")));
        }
        _ = state.nodes.insert(node, pos);
        Ok(())
    }

    fn node_free(&self, node: NodeID) {
        _ = self.state().nodes.remove(&node);
    }
}
