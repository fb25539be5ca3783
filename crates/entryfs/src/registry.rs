//! Open-entry registry
//!
//! Tracks every open entry node and every live working directory by
//! `(volume, position)`. Queries take the read lock; insertion and removal
//! take the write lock. Nothing here touches a volume lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use diagnostics::*;

use crate::lock;
use crate::node::{NodeID, NodeShared};
use crate::position::Position;
use crate::volume::VolumeId;

pub(crate) type EntryKey = (VolumeId, Position);

#[derive(Default)]
pub(crate) struct OpenRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    nodes: HashMap<EntryKey, Arc<NodeShared>>,
    /// Working directories may be opened on the same entry several times.
    wds: HashMap<EntryKey, usize>,
}

impl OpenRegistry {
    pub(crate) fn find_node(&self, key: EntryKey) -> Option<Arc<NodeShared>> {
        lock::read(&self.state).nodes.get(&key).cloned()
    }

    /// Register `node`, replacing a node that is already closing.
    pub(crate) fn insert_node(&self, node: Arc<NodeShared>) {
        let key = node.key();
        if let Some(old) = lock::write(&self.state).nodes.insert(key, node) {
            let old_id = old.id().as_u64();
            debug!("registry: node {old_id} superseded while closing", old_id: old_id);
        }
    }

    /// Unlink the node at `key` if it is still `id`.
    pub(crate) fn remove_node(&self, key: EntryKey, id: NodeID) -> bool {
        let mut state = lock::write(&self.state);
        match state.nodes.get(&key) {
            Some(node) if node.id() == id => {
                _ = state.nodes.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn register_wd(&self, key: EntryKey) {
        *lock::write(&self.state).wds.entry(key).or_default() += 1;
    }

    pub(crate) fn unregister_wd(&self, key: EntryKey) {
        let mut state = lock::write(&self.state);
        if let Some(count) = state.wds.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                _ = state.wds.remove(&key);
            }
        }
    }

    pub(crate) fn is_node_open(&self, key: EntryKey) -> bool {
        lock::read(&self.state)
            .nodes
            .get(&key)
            .is_some_and(|node| node.is_live())
    }

    /// Open as a node or as a working directory.
    pub(crate) fn is_open(&self, key: EntryKey) -> bool {
        let state = lock::read(&self.state);
        state.wds.contains_key(&key) || state.nodes.get(&key).is_some_and(|node| node.is_live())
    }

    pub(crate) fn node_count(&self) -> usize {
        lock::read(&self.state)
            .nodes
            .values()
            .filter(|node| node.is_live())
            .count()
    }

    pub(crate) fn wd_count(&self) -> usize {
        lock::read(&self.state).wds.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VolumeConfig;
    use crate::entry_type::EntryKind;
    use crate::memory::MemoryDriver;
    use crate::volume::Volume;

    fn volume() -> Arc<Volume> {
        Arc::new(Volume::new(
            "ram",
            VolumeId::new(1),
            VolumeConfig::default(),
            Box::new(MemoryDriver::new()),
        ))
    }

    fn node(vol: &Arc<Volume>, id: u64, pos: Position) -> Arc<NodeShared> {
        Arc::new(NodeShared::new(
            NodeID::new(id),
            vol.handle(),
            pos,
            EntryKind::File,
            Position::Root,
            0,
        ))
    }

    #[test]
    fn test_remove_checks_identity() {
        let vol = volume();
        let reg = OpenRegistry::default();
        let key = (vol.id(), Position::At(1));

        reg.insert_node(node(&vol, 1, Position::At(1)));
        assert!(reg.is_node_open(key));

        reg.insert_node(node(&vol, 2, Position::At(1)));
        assert!(!reg.remove_node(key, NodeID::new(1)));
        assert_eq!(reg.node_count(), 1);
        assert!(reg.remove_node(key, NodeID::new(2)));
        assert!(reg.find_node(key).is_none());
    }

    #[test]
    fn test_closing_node_is_not_open() {
        let vol = volume();
        let reg = OpenRegistry::default();
        let n = node(&vol, 1, Position::At(5));
        reg.insert_node(n.clone());
        assert!(n.release());
        assert!(!reg.is_node_open(n.key()));
        assert!(!reg.is_open(n.key()));
        assert_eq!(reg.node_count(), 0);
    }

    #[test]
    fn test_working_dirs_are_counted() {
        let reg = OpenRegistry::default();
        let key = (VolumeId::new(1), Position::Root);
        reg.register_wd(key);
        reg.register_wd(key);
        reg.unregister_wd(key);
        assert!(reg.is_open(key));
        assert!(!reg.is_node_open(key));
        reg.unregister_wd(key);
        assert!(!reg.is_open(key));
        assert_eq!(reg.wd_count(), 0);
    }
}
