//! Entry lifecycle operations
//!
//! Every operation resolves its path, takes the owning volume's lock for
//! the whole operation, looks the entry up, validates, mutates through the
//! driver, then syncs volumes configured for auto-sync.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use diagnostics::*;

use crate::driver::VolumeDriver;
use crate::entry_type::{Attrib, EntryKind, EntryTypeMask, TimeField};
use crate::error::{Error, Result};
use crate::fs::{Core, FileSystem};
use crate::lock::OpCategory;
use crate::lookup::{LookupOutcome, lookup};
use crate::metadata::EntryInfo;
use crate::path;
use crate::position::Position;
use crate::resolve::EntryLocation;
use crate::volume::{Volume, VolumeId};
use crate::wd::WorkingDir;

impl Core {
    /// Name a new or renamed entry will get: the last segment of `path`.
    pub(crate) fn target_name<'p>(&self, path: &'p str) -> Result<&'p str> {
        let name = path::last_segment(path).ok_or_else(|| Error::invalid_name(path))?;
        path::validate_name(name, self.config.max_name_len)?;
        Ok(name)
    }

    /// Remove the entry at `pos` after the checks Delete makes.
    pub(crate) fn delete_entry(
        &self,
        volume: VolumeId,
        driver: &mut dyn VolumeDriver,
        pos: Position,
        mask: EntryTypeMask,
        path: &str,
    ) -> Result<()> {
        if pos.is_void() {
            return Err(Error::not_found(path));
        }
        if pos.is_root() {
            return Err(Error::root_dir(path));
        }
        self.check_not_open((volume, pos), path)?;

        let info = driver.entry_query(pos)?;
        if !mask.accepts(info.kind()) {
            return Err(Error::invalid_type(path));
        }
        if info.is_dir() && !driver.dir_is_empty(pos)? {
            return Err(Error::dir_not_empty(path));
        }
        driver.entry_delete(pos)
    }
}

impl FileSystem {
    /// Create a file or directory. An existing file is truncated unless
    /// `excl` is set; an existing directory is left alone.
    pub fn create(
        &self,
        base: Option<&WorkingDir>,
        path: &str,
        kind: EntryKind,
        excl: bool,
    ) -> Result<()> {
        self.core.check_mutable()?;
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::CreateDelete)?;
        volume.check_writable()?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if found.parent.is_void() {
            return Err(Error::not_found(path));
        }
        if found.entry.is_root() {
            return Err(Error::root_dir(path));
        }

        if found.found() {
            self.core.check_not_open((volume.id(), found.entry), path)?;
            if excl {
                return Err(Error::already_exists(path));
            }
            if driver.entry_query(found.entry)?.kind() != kind {
                return Err(Error::invalid_type(path));
            }
            if kind == EntryKind::File {
                driver.file_truncate(found.entry, 0)?;
                info!("truncated {path}", path: path);
            }
        } else {
            let name = self.core.target_name(path)?;
            let pos = driver.entry_create(found.parent, name, kind)?;
            let pos = pos.to_string();
            let kind = kind.as_str();
            info!("created {kind} {path} at {pos}", kind: kind, path: path, pos: pos);
        }

        volume.auto_sync(&mut *driver)
    }

    /// Remove an entry whose type is in `mask`. Directories must be empty.
    pub fn delete(&self, base: Option<&WorkingDir>, path: &str, mask: EntryTypeMask) -> Result<()> {
        if mask.is_empty() {
            return Err(Error::invalid_argument("empty entry type mask"));
        }
        self.core.check_mutable()?;
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::CreateDelete)?;
        volume.check_writable()?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        self.core
            .delete_entry(volume.id(), &mut *driver, found.entry, mask, path)?;
        info!("deleted {path}", path: path);

        volume.auto_sync(&mut *driver)
    }

    /// Move `src` to `dst`. Within one volume this is a driver rename; across
    /// volumes a file is copied then its source deleted.
    pub fn rename(
        &self,
        src_base: Option<&WorkingDir>,
        src: &str,
        dst_base: Option<&WorkingDir>,
        dst: &str,
        excl: bool,
    ) -> Result<()> {
        self.core.check_mutable()?;
        let (src_vol, src_loc) = self.core.locate(src_base, src)?;
        let (dst_vol, dst_loc) = self.core.locate(dst_base, dst)?;
        src_vol.check_writable()?;
        dst_vol.check_writable()?;

        if src_vol.id() == dst_vol.id() {
            self.rename_within(&src_vol, &src_loc, src, &dst_loc, dst, excl)
        } else {
            self.rename_across(&src_vol, &src_loc, src, &dst_vol, &dst_loc, dst, excl)
        }
    }

    fn rename_within(
        &self,
        volume: &Arc<Volume>,
        src_loc: &EntryLocation<'_>,
        src: &str,
        dst_loc: &EntryLocation<'_>,
        dst: &str,
        excl: bool,
    ) -> Result<()> {
        let mut driver = volume.lock(OpCategory::Rename)?;

        let from = lookup(&mut *driver, src_loc.start, src_loc.rel_path)?;
        if !from.found() {
            return Err(Error::not_found(src));
        }
        if from.entry.is_root() {
            return Err(Error::root_dir(src));
        }
        self.core.check_not_open((volume.id(), from.entry), src)?;
        let src_info = driver.entry_query(from.entry)?;

        let to = lookup(&mut *driver, dst_loc.start, dst_loc.rel_path)?;
        check_destination_parent(&mut *driver, &to, dst)?;

        let replace = to.found();
        if replace {
            if excl {
                return Err(Error::already_exists(dst));
            }
            if to.entry == from.entry {
                debug!("rename {src} -> {dst}: same entry", src: src, dst: dst);
                return Ok(());
            }
            let dst_info = driver.entry_query(to.entry)?;
            if dst_info.is_dir() != src_info.is_dir() {
                return Err(Error::invalid_type(dst));
            }
            if dst_info.is_root_dir() || to.entry.is_root() {
                return Err(Error::root_dir(dst));
            }
            self.core.check_not_open((volume.id(), to.entry), dst)?;
            if dst_info.is_dir() && !driver.dir_is_empty(to.entry)? {
                return Err(Error::dir_not_empty(dst));
            }
        }

        let name = self.core.target_name(dst)?;
        driver.entry_rename(from.entry, to.entry, to.parent, name, replace)?;
        info!("renamed {src} -> {dst}, replaced {replace}", src: src, dst: dst, replace: replace);

        volume.auto_sync(&mut *driver)
    }

    fn rename_across(
        &self,
        src_vol: &Arc<Volume>,
        src_loc: &EntryLocation<'_>,
        src: &str,
        dst_vol: &Arc<Volume>,
        dst_loc: &EntryLocation<'_>,
        dst: &str,
        excl: bool,
    ) -> Result<()> {
        if !self.core.config.file_copy {
            return Err(Error::FeatureUnavailable("rename across volumes"));
        }

        // Both locks for the whole rename, lower volume id first.
        let (mut src_drv, mut dst_drv) = if src_vol.id() < dst_vol.id() {
            let s = src_vol.lock(OpCategory::FileRead)?;
            let d = dst_vol.lock(OpCategory::FileWrite)?;
            (s, d)
        } else {
            let d = dst_vol.lock(OpCategory::FileWrite)?;
            let s = src_vol.lock(OpCategory::FileRead)?;
            (s, d)
        };

        let from = lookup(&mut *src_drv, src_loc.start, src_loc.rel_path)?;
        if !from.found() {
            return Err(Error::not_found(src));
        }
        if from.entry.is_root() {
            return Err(Error::root_dir(src));
        }
        self.core.check_not_open((src_vol.id(), from.entry), src)?;
        if src_drv.entry_query(from.entry)?.is_dir() {
            return Err(Error::FeatureUnavailable("moving directories across volumes"));
        }

        let to = lookup(&mut *dst_drv, dst_loc.start, dst_loc.rel_path)?;
        check_destination_parent(&mut *dst_drv, &to, dst)?;
        let name = self.core.target_name(dst)?;

        if to.found() {
            if excl {
                return Err(Error::already_exists(dst));
            }
            if to.entry.is_root() {
                return Err(Error::root_dir(dst));
            }
            self.core.check_not_open((dst_vol.id(), to.entry), dst)?;
            if dst_drv.entry_query(to.entry)?.is_dir() {
                return Err(Error::invalid_type(dst));
            }
            dst_drv.entry_delete(to.entry)?;
        }

        let copy = dst_drv.entry_create(to.parent, name, EntryKind::File)?;
        let copied = match copy_file(
            &mut *src_drv,
            from.entry,
            &mut *dst_drv,
            copy,
            self.core.config.copy_chunk_size,
        ) {
            Ok(n) => n,
            Err(e) => {
                if let Err(cleanup) = dst_drv.entry_delete(copy) {
                    let cleanup = cleanup.to_string();
                    warn!("rename {src} -> {dst}: could not remove partial copy: {cleanup}",
                          src: src, dst: dst, cleanup: cleanup);
                }
                return Err(e);
            }
        };

        self.core.delete_entry(
            src_vol.id(),
            &mut *src_drv,
            from.entry,
            EntryTypeMask::ANY,
            src,
        )?;
        info!("moved {src} -> {dst} across volumes, {copied} bytes", src: src, dst: dst, copied: copied);

        dst_vol.auto_sync(&mut *dst_drv)?;
        src_vol.auto_sync(&mut *src_drv)
    }

    /// Snapshot of an entry's size, attributes and timestamps.
    pub fn query(&self, base: Option<&WorkingDir>, path: &str) -> Result<EntryInfo> {
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::Query)?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if !found.found() {
            return Err(Error::not_found(path));
        }
        driver.entry_query(found.entry)
    }

    /// Set the READ, WRITE and HIDDEN bits of an entry.
    pub fn attrib_set(&self, base: Option<&WorkingDir>, path: &str, attrib: Attrib) -> Result<()> {
        if !Attrib::SETTABLE.contains(attrib) {
            return Err(Error::invalid_argument(format!(
                "attribute bits {:#04x} cannot be set",
                (attrib - Attrib::SETTABLE).bits()
            )));
        }
        self.core.check_mutable()?;
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::AttribSet)?;
        volume.check_writable()?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if !found.found() {
            return Err(Error::not_found(path));
        }
        if found.entry.is_root() {
            return Err(Error::root_dir(path));
        }
        self.core.check_not_open((volume.id(), found.entry), path)?;

        driver.entry_attrib_set(found.entry, attrib)?;
        let bits = attrib.bits();
        info!("set attributes of {path} to {bits}", path: path, bits: bits);

        volume.auto_sync(&mut *driver)
    }

    /// Set one or all timestamps of an entry.
    pub fn time_set(
        &self,
        base: Option<&WorkingDir>,
        path: &str,
        time: DateTime<Utc>,
        field: TimeField,
    ) -> Result<()> {
        self.core.check_mutable()?;
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::AttribSet)?;
        volume.check_writable()?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if !found.found() {
            return Err(Error::not_found(path));
        }
        if found.entry.is_root() {
            return Err(Error::root_dir(path));
        }
        self.core.check_not_open((volume.id(), found.entry), path)?;
        if driver.entry_query(found.entry)?.is_root_dir() {
            return Err(Error::root_dir(path));
        }

        driver.entry_time_set(found.entry, time, field)?;
        let when = time.to_rfc3339();
        let field = field.as_str();
        debug!("set {field} time of {path} to {when}", field: field, path: path, when: when);

        volume.auto_sync(&mut *driver)
    }

    /// Whether an entry node is open on `path`. A missing entry is not open.
    pub fn is_open(&self, base: Option<&WorkingDir>, path: &str) -> Result<bool> {
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::Query)?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        Ok(found.found() && self.core.registry.is_node_open((volume.id(), found.entry)))
    }
}

/// The destination's parent must exist and be a directory.
fn check_destination_parent(
    driver: &mut dyn VolumeDriver,
    to: &LookupOutcome,
    dst: &str,
) -> Result<()> {
    if to.parent.is_void() {
        return Err(Error::not_found(dst));
    }
    if !driver.entry_query(to.parent)?.is_dir() {
        return Err(Error::parent_not_dir(dst));
    }
    Ok(())
}

/// Copy file contents between drivers in `chunk`-sized pieces.
fn copy_file(
    src: &mut dyn VolumeDriver,
    from: Position,
    dst: &mut dyn VolumeDriver,
    to: Position,
    chunk: usize,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk.max(1)];
    let mut offset = 0u64;
    loop {
        let n = src.file_read(from, offset, &mut buf)?;
        if n == 0 {
            return Ok(offset);
        }
        dst.file_write(to, offset, &buf[..n])?;
        offset += n as u64;
    }
}
