use crate::entry_type::{Attrib, EntryKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an entry returned by query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Size in bytes (0 for directories)
    pub size: u64,

    pub attrib: Attrib,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
}

impl EntryInfo {
    pub fn is_dir(&self) -> bool {
        self.attrib.contains(Attrib::DIRECTORY)
    }

    pub fn is_root_dir(&self) -> bool {
        self.attrib.contains(Attrib::ROOT_DIR)
    }

    pub fn is_readable(&self) -> bool {
        self.attrib.contains(Attrib::READ)
    }

    pub fn is_writable(&self) -> bool {
        self.attrib.contains(Attrib::WRITE)
    }

    pub fn is_hidden(&self) -> bool {
        self.attrib.contains(Attrib::HIDDEN)
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_is_dir(self.is_dir())
    }
}
