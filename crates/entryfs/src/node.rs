use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::entry_type::EntryKind;
use crate::error::{Error, Result};
use crate::fs::Core;
use crate::position::Position;
use crate::registry::EntryKey;
use crate::volume::VolumeHandle;

/// Unique identifier for an entry node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(u64);

impl NodeID {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// State shared by every handle on one open entry.
pub(crate) struct NodeShared {
    id: NodeID,
    volume: VolumeHandle,
    pos: Position,
    kind: EntryKind,
    /// Directory the file was opened in. `Void` for directory nodes.
    parent: Position,
    size: AtomicU64,
    refs: AtomicUsize,
    closing: AtomicBool,
}

impl NodeShared {
    /// New node holding the caller's first reference.
    pub(crate) fn new(
        id: NodeID,
        volume: VolumeHandle,
        pos: Position,
        kind: EntryKind,
        parent: Position,
        size: u64,
    ) -> Self {
        let parent = if kind.is_dir() { Position::Void } else { parent };
        Self {
            id,
            volume,
            pos,
            kind,
            parent,
            size: AtomicU64::new(size),
            refs: AtomicUsize::new(1),
            closing: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> NodeID {
        self.id
    }

    pub(crate) fn key(&self) -> EntryKey {
        (self.volume.id(), self.pos)
    }

    pub(crate) fn volume(&self) -> &VolumeHandle {
        &self.volume
    }

    pub(crate) fn position(&self) -> Position {
        self.pos
    }

    pub(crate) fn kind(&self) -> EntryKind {
        self.kind
    }

    pub(crate) fn parent(&self) -> Position {
        self.parent
    }

    pub(crate) fn refs(&self) -> usize {
        self.refs.load(Ordering::Acquire)
    }

    /// Open and not on its way out.
    pub(crate) fn is_live(&self) -> bool {
        !self.closing.load(Ordering::Acquire) && self.refs() > 0
    }

    /// Add a reference unless the count already reached zero.
    pub(crate) fn try_acquire(&self) -> bool {
        self.refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n > 0 && !self.closing.load(Ordering::Acquire)).then_some(n + 1)
            })
            .is_ok()
    }

    /// Drop a reference. True for exactly one caller: the one whose release
    /// reached zero and won the closing flag.
    pub(crate) fn release(&self) -> bool {
        let prev = self.refs.fetch_sub(1, Ordering::AcqRel);
        prev == 1
            && self
                .closing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }
}

/// A caller's reference to an open file or directory.
///
/// Every successful open returns its own handle. Dropping a handle closes
/// it; `close` does the same and reports a double close.
pub struct EntryNode {
    shared: Arc<NodeShared>,
    core: Arc<Core>,
    released: AtomicBool,
}

impl EntryNode {
    pub(crate) fn new(shared: Arc<NodeShared>, core: Arc<Core>) -> Self {
        Self {
            shared,
            core,
            released: AtomicBool::new(false),
        }
    }

    pub(crate) fn shared(&self) -> &Arc<NodeShared> {
        &self.shared
    }

    pub fn id(&self) -> NodeID {
        self.shared.id
    }

    pub fn kind(&self) -> EntryKind {
        self.shared.kind
    }

    pub fn position(&self) -> Position {
        self.shared.pos
    }

    /// Byte length recorded when the entry was opened.
    pub fn size(&self) -> u64 {
        self.shared.size.load(Ordering::Acquire)
    }

    pub fn volume_name(&self) -> &str {
        self.shared.volume.name()
    }

    pub fn is_closed(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Release this handle's reference. The last release frees the node.
    pub fn close(&self) -> Result<()> {
        // Pin the node so a concurrent final release cannot free it under us.
        if !self.shared.try_acquire() {
            return Err(Error::EntryClosed);
        }

        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.core.release_node(&self.shared);
            return Err(Error::EntryClosed);
        }

        self.core.release_node(&self.shared);
        self.core.release_node(&self.shared);
        Ok(())
    }
}

impl Drop for EntryNode {
    fn drop(&mut self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.core.release_node(&self.shared);
        }
    }
}

impl std::fmt::Debug for EntryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryNode")
            .field("id", &self.shared.id)
            .field("volume", &self.shared.volume)
            .field("pos", &self.shared.pos)
            .field("kind", &self.shared.kind)
            .field("released", &self.is_closed())
            .finish()
    }
}
