//! entryfs - entry management for an embedded file system
//!
//! Resolves `/volume/dir/name` paths across mounted volumes, creates,
//! deletes, renames and queries entries, and tracks open entries so that
//! concurrent callers cannot corrupt a volume. On-disk formats plug in
//! through the `VolumeDriver` trait.
//!
//! Set ENTRYFS_LOG to control logging:
//! - ENTRYFS_LOG=off (default) - silent
//! - ENTRYFS_LOG=info - mounts and entry mutations
//! - ENTRYFS_LOG=debug - lookups, lock traffic, node lifetimes

// Error types
mod error;
pub use error::{Error, Result};

// Value types shared with drivers
mod entry_type;
mod metadata;
mod position;
pub use entry_type::{AccessMode, Attrib, EntryKind, EntryTypeMask, TimeField};
pub use metadata::EntryInfo;
pub use position::Position;

// Configuration
mod config;
pub use config::{FsConfig, MAX_DEPTH, VolumeAccess, VolumeConfig};

// Driver interface and the in-memory driver
mod driver;
pub mod memory;
pub use driver::VolumeDriver;
pub use memory::MemoryDriver;

// Volumes and their operation locks
mod lock;
mod volume;
pub use lock::OpCategory;
pub use volume::VolumeId;

// Path resolution and lookup
pub mod path;
mod lookup;
mod resolve;

// Open entries and working directories
mod node;
mod registry;
mod wd;
pub use node::{EntryNode, NodeID};
pub use wd::WorkingDir;

// Operations
mod entry;
mod fs;
mod open;
mod reverse;
pub use fs::FileSystem;

pub use diagnostics::init_diagnostics;

#[cfg(test)]
mod tests;
