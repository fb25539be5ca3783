use crate::config::MAX_DEPTH;
use crate::entry_type::EntryKind;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::lock::OpCategory;
use crate::node::EntryNode;
use crate::path;

impl FileSystem {
    /// Absolute path of an open entry, written into `buf`.
    ///
    /// With `None` only the length is computed. Returns the path length in
    /// bytes; no terminator is written.
    pub fn get_path(&self, node: &EntryNode, buf: Option<&mut [u8]>) -> Result<usize> {
        let path = self.path_string(node)?;
        let needed = path.len();
        if let Some(buf) = buf {
            if buf.len() < needed {
                return Err(Error::WouldOverflow {
                    needed,
                    available: buf.len(),
                });
            }
            buf[..needed].copy_from_slice(path.as_bytes());
        }
        Ok(needed)
    }

    /// Absolute path of an open entry, `/volume/dir/.../name`.
    pub fn path_string(&self, node: &EntryNode) -> Result<String> {
        if node.is_closed() {
            return Err(Error::EntryClosed);
        }
        let shared = node.shared();
        let volume = shared.volume().acquire()?;
        let mut driver = volume.lock(OpCategory::DataAccess)?;

        let mut names = Vec::new();
        let mut pos = shared.position();
        while !pos.is_root() {
            if names.len() >= usize::from(MAX_DEPTH) {
                return Err(Error::volume_corrupted(format!(
                    "{}: no root above {}",
                    volume.name(),
                    shared.position()
                )));
            }
            names.push(driver.entry_name(pos)?);

            // A file's parent is known from when it was opened.
            let parent = if names.len() == 1 && shared.kind() == EntryKind::File {
                shared.parent()
            } else {
                driver.entry_lookup(pos, path::DOT_DOT)?
            };
            if parent.is_void() {
                return Err(Error::volume_corrupted(format!(
                    "{}: {pos} has no parent",
                    volume.name()
                )));
            }
            pos = parent;
        }

        let mut full = String::with_capacity(
            1 + volume.name().len() + names.iter().map(|n| n.len() + 1).sum::<usize>(),
        );
        full.push(path::SEPARATOR);
        full.push_str(volume.name());
        for name in names.iter().rev() {
            full.push(path::SEPARATOR);
            full.push_str(name);
        }
        Ok(full)
    }
}
