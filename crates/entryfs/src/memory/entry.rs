use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::entry_type::{Attrib, EntryKind, TimeField};
use crate::metadata::EntryInfo;
use crate::position::Position;

/// One file or directory held by a `MemoryDriver`.
#[derive(Debug, Clone)]
pub(super) struct MemoryEntry {
    pub name: String,
    pub parent: Position,
    pub kind: EntryKind,
    pub children: BTreeMap<String, Position>,
    pub data: Vec<u8>,
    pub attrib: Attrib,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(name: &str, parent: Position, kind: EntryKind) -> Self {
        let now = Utc::now();
        let mut attrib = Attrib::READ | Attrib::WRITE;
        if kind.is_dir() {
            attrib |= Attrib::DIRECTORY;
        }
        Self {
            name: name.to_string(),
            parent,
            kind,
            children: BTreeMap::new(),
            data: Vec::new(),
            attrib,
            created: now,
            modified: now,
            accessed: now,
        }
    }

    pub fn root() -> Self {
        let mut root = Self::new("", Position::Root, EntryKind::Directory);
        root.attrib |= Attrib::ROOT_DIR;
        root
    }

    pub fn info(&self) -> EntryInfo {
        EntryInfo {
            size: self.data.len() as u64,
            attrib: self.attrib,
            created: self.created,
            modified: self.modified,
            accessed: self.accessed,
        }
    }

    pub fn set_time(&mut self, time: DateTime<Utc>, field: TimeField) {
        match field {
            TimeField::Created => self.created = time,
            TimeField::Modified => self.modified = time,
            TimeField::Accessed => self.accessed = time,
            TimeField::All => {
                self.created = time;
                self.modified = time;
                self.accessed = time;
            }
        }
    }

    /// Replace the settable bits, keeping the type bits.
    pub fn set_attrib(&mut self, attrib: Attrib) {
        self.attrib = (self.attrib - Attrib::SETTABLE) | (attrib & Attrib::SETTABLE);
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}
