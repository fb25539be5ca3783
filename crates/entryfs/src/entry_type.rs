use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Kind of an entry on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }

    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }

    /// The kind matching a directory flag from an `EntryInfo`.
    pub fn from_is_dir(is_dir: bool) -> Self {
        if is_dir {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn mask(self) -> EntryTypeMask {
        match self {
            EntryKind::File => EntryTypeMask::FILE,
            EntryKind::Directory => EntryTypeMask::DIR,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

bitflags! {
    /// Kinds of entry an operation such as delete accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryTypeMask: u8 {
        const FILE = 0x01;
        const DIR = 0x02;
        const ANY = Self::FILE.bits() | Self::DIR.bits();
    }
}

impl EntryTypeMask {
    pub fn accepts(self, kind: EntryKind) -> bool {
        self.contains(kind.mask())
    }
}

bitflags! {
    /// Entry attributes. Only `READ`, `WRITE` and `HIDDEN` may be set by
    /// callers; `DIRECTORY` and `ROOT_DIR` are reported by drivers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Attrib: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        const HIDDEN = 0x04;
        const DIRECTORY = 0x08;
        const ROOT_DIR = 0x10;
    }
}

impl Attrib {
    /// Bits an attribute-set request may carry.
    pub const SETTABLE: Attrib = Attrib::READ.union(Attrib::WRITE).union(Attrib::HIDDEN);
}

bitflags! {
    /// Access requested when opening an entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMode: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        /// Create the entry when missing.
        const CREATE = 0x04;
        /// With `CREATE`, fail when the entry already exists.
        const EXCL = 0x08;
    }
}

impl AccessMode {
    /// Whether opening with this mode may modify the volume.
    pub fn mutates(self) -> bool {
        self.intersects(AccessMode::WRITE | AccessMode::CREATE)
    }
}

/// Timestamp(s) targeted by a time-set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    Created,
    Modified,
    Accessed,
    All,
}

impl TimeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeField::Created => "created",
            TimeField::Modified => "modified",
            TimeField::Accessed => "accessed",
            TimeField::All => "all",
        }
    }
}
