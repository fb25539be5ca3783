use std::sync::Arc;

use diagnostics::*;

use crate::driver::{VolumeDriver, node_free, node_init};
use crate::entry_type::{AccessMode, EntryKind};
use crate::error::{Error, Result};
use crate::fs::{Core, FileSystem, depth_after};
use crate::lock::OpCategory;
use crate::lookup::lookup;
use crate::node::{EntryNode, NodeID, NodeShared};
use crate::position::Position;
use crate::volume::Volume;
use crate::wd::WorkingDir;

impl FileSystem {
    /// Open a file or directory, creating it when `mode` has `CREATE`.
    ///
    /// Opening an entry that is already open shares its node. When the
    /// entry was created by this call and a later step fails, the entry is
    /// deleted again before the error is returned.
    pub fn open(
        &self,
        base: Option<&WorkingDir>,
        path: &str,
        mode: AccessMode,
        kind: EntryKind,
    ) -> Result<EntryNode> {
        if !mode.intersects(AccessMode::READ | AccessMode::WRITE) {
            return Err(Error::invalid_argument("open needs READ or WRITE access"));
        }
        if mode.contains(AccessMode::EXCL) && !mode.contains(AccessMode::CREATE) {
            return Err(Error::invalid_argument("EXCL requires CREATE"));
        }
        if mode.mutates() {
            self.core.check_mutable()?;
        }

        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::Open)?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if found.parent.is_void() {
            return Err(Error::not_found(path));
        }
        _ = depth_after(loc.start_depth, found.rel_depth, path)?;

        let created = if found.found() {
            if mode.contains(AccessMode::EXCL) {
                return Err(Error::already_exists(path));
            }
            None
        } else {
            if !mode.contains(AccessMode::CREATE) {
                return Err(Error::not_found(path));
            }
            volume.check_writable()?;
            let name = self.core.target_name(path)?;
            Some(driver.entry_create(found.parent, name, kind)?)
        };
        let pos = created.unwrap_or(found.entry);

        let shared =
            match self.acquire_node(&volume, &mut *driver, pos, found.parent, kind, mode, path) {
                Ok(shared) => shared,
                Err(e) => {
                    if let Some(pos) = created {
                        rollback_create(&mut *driver, pos, path);
                    }
                    return Err(e);
                }
            };

        if let Some(pos) = created {
            if let Err(e) = volume.auto_sync(&mut *driver) {
                self.core.discard_node(&mut *driver, &shared);
                rollback_create(&mut *driver, pos, path);
                return Err(e);
            }
        }
        drop(driver);

        // Built after the volume lock is released: dropping a node frees it
        // under that lock.
        let node = EntryNode::new(shared, self.core.clone());

        let id = node.id().as_u64();
        let refs = node.shared().refs();
        debug!("opened {path} as node {id}, {refs} refs", path: path, id: id, refs: refs);
        Ok(node)
    }

    /// Validate the entry against `mode` and take a reference on its node,
    /// allocating the node when the entry is not open yet.
    fn acquire_node(
        &self,
        volume: &Arc<Volume>,
        driver: &mut dyn VolumeDriver,
        pos: Position,
        parent: Position,
        kind: EntryKind,
        mode: AccessMode,
        path: &str,
    ) -> Result<Arc<NodeShared>> {
        let info = driver.entry_query(pos)?;
        if info.kind() != kind {
            return Err(Error::invalid_type(path));
        }
        if mode.contains(AccessMode::WRITE) {
            if kind == EntryKind::File && !info.is_writable() {
                return Err(Error::access_mode(path));
            }
            volume.check_writable()?;
        }

        let key = (volume.id(), pos);
        if let Some(node) = self.core.registry.find_node(key) {
            if node.try_acquire() {
                return Ok(node);
            }
            let id = node.id().as_u64();
            debug!("open {path}: node {id} is closing, allocating a new one", path: path, id: id);
        }

        let id = NodeID::new(self.core.next_node_id());
        node_init(driver, kind, pos, id)?;
        let node = Arc::new(NodeShared::new(
            id,
            volume.handle(),
            pos,
            kind,
            parent,
            info.size,
        ));
        self.core.registry.insert_node(node.clone());
        Ok(node)
    }
}

impl Core {
    /// Drop one reference. The final release unlinks the node and hands it
    /// back to the driver, unless the volume is gone.
    pub(crate) fn release_node(&self, node: &NodeShared) {
        if node.release() {
            self.free_node(node);
        }
    }

    /// Unlink a node whose last reference is gone and free it on its volume.
    pub(crate) fn free_node(&self, node: &NodeShared) {
        let id = node.id().as_u64();
        _ = self.registry.remove_node(node.key(), node.id());

        let freed = node.volume().acquire().and_then(|volume| {
            let mut driver = volume.lock(OpCategory::Close)?;
            node_free(&mut *driver, node.kind(), node.position(), node.id());
            Ok(())
        });
        match freed {
            Ok(()) => debug!("node {id} closed", id: id),
            Err(e) => {
                let error = e.to_string();
                debug!("node {id} closed without driver free: {error}", id: id, error: error);
            }
        }
    }

    /// Drop a reference while already holding the node's volume lock.
    fn discard_node(&self, driver: &mut dyn VolumeDriver, node: &NodeShared) {
        if node.release() {
            _ = self.registry.remove_node(node.key(), node.id());
            node_free(driver, node.kind(), node.position(), node.id());
        }
    }
}

fn rollback_create(driver: &mut dyn VolumeDriver, pos: Position, path: &str) {
    match driver.entry_delete(pos) {
        Ok(()) => info!("open {path} failed, removed the entry it created", path: path),
        Err(e) => {
            let error = e.to_string();
            warn!("open {path} failed and the entry it created could not be removed: {error}",
                  path: path, error: error);
        }
    }
}
