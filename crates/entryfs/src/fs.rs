use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use diagnostics::*;

use crate::config::{FsConfig, MAX_DEPTH, VolumeConfig};
use crate::driver::VolumeDriver;
use crate::error::{Error, Result};
use crate::lock::OpCategory;
use crate::lookup::lookup;
use crate::path;
use crate::registry::{EntryKey, OpenRegistry};
use crate::resolve::{EntryLocation, resolve};
use crate::volume::{Volume, VolumeId, VolumeTable};
use crate::wd::WorkingDir;

/// State shared by a `FileSystem` and every node and working directory it
/// hands out.
pub(crate) struct Core {
    pub(crate) config: FsConfig,
    pub(crate) volumes: VolumeTable,
    pub(crate) registry: OpenRegistry,
    next_volume_id: AtomicU64,
    next_node_id: AtomicU64,
}

/// Entry-management layer over a set of mounted volumes.
///
/// Cloning is cheap; clones share volumes and open entries.
#[derive(Clone)]
pub struct FileSystem {
    pub(crate) core: Arc<Core>,
}

impl Core {
    pub(crate) fn next_node_id(&self) -> u64 {
        self.next_node_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Resolve `path` to a mounted volume. The super-root is not an entry.
    pub(crate) fn locate<'p>(
        &self,
        base: Option<&WorkingDir>,
        path: &'p str,
    ) -> Result<(Arc<Volume>, EntryLocation<'p>)> {
        let loc = resolve(&self.volumes, base, path)?;
        let volume = match &loc.volume {
            Some(handle) => handle.acquire()?,
            None => return Err(Error::invalid_argument(format!("{path} names no volume"))),
        };
        Ok((volume, loc))
    }

    pub(crate) fn check_mutable(&self) -> Result<()> {
        if self.config.read_only {
            return Err(Error::FeatureUnavailable("read-only file system"));
        }
        Ok(())
    }

    /// Fail with `EntryOpened` when a node or working directory holds `key`.
    pub(crate) fn check_not_open(&self, key: EntryKey, path: &str) -> Result<()> {
        if self.registry.is_open(key) {
            return Err(Error::entry_opened(path));
        }
        Ok(())
    }
}

/// Depth reached by walking `rel_depth` segments from `start_depth`.
pub(crate) fn depth_after(start_depth: u16, rel_depth: i32, path: &str) -> Result<u16> {
    let depth = i32::from(start_depth) + rel_depth;
    u16::try_from(depth)
        .ok()
        .filter(|d| *d <= MAX_DEPTH)
        .ok_or_else(|| Error::max_depth(path))
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(FsConfig::default())
    }
}

impl FileSystem {
    pub fn new(config: FsConfig) -> Self {
        diagnostics::init_diagnostics();
        Self {
            core: Arc::new(Core {
                config,
                volumes: VolumeTable::default(),
                registry: OpenRegistry::default(),
                next_volume_id: AtomicU64::new(1),
                next_node_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.core.config
    }

    /// Attach a volume under `name`, reachable as `/name`.
    pub fn mount<D: VolumeDriver + 'static>(
        &self,
        name: &str,
        driver: D,
        config: VolumeConfig,
    ) -> Result<VolumeId> {
        path::validate_name(name, self.core.config.max_volume_name_len)?;
        let id = VolumeId::new(self.core.next_volume_id.fetch_add(1, Ordering::Relaxed));
        let handle = self
            .core
            .volumes
            .insert(Volume::new(name, id, config, Box::new(driver)))?;
        let read_only = handle.acquire()?.config().is_read_only();
        let raw_id = id.as_u64();
        info!("mounted volume {name} as {id}, read-only {read_only}",
              name: name, id: raw_id, read_only: read_only);
        Ok(id)
    }

    /// Detach a volume and sync it. Nodes and working directories still on
    /// it fail with `VolumeClosed` from now on.
    pub fn unmount(&self, name: &str) -> Result<()> {
        let volume = self.core.volumes.remove(name)?;
        let mut driver = volume.lock(OpCategory::DataAccess)?;
        volume.mark_closed();
        let synced = driver.sync();
        if let Err(e) = &synced {
            let error = e.to_string();
            warn!("unmount {name}: sync failed: {error}", name: name, error: error);
        }
        info!("unmounted volume {name}", name: name);
        synced
    }

    pub fn volume_names(&self) -> Vec<String> {
        self.core.volumes.names()
    }

    /// Open the directory at `path` as a base for relative paths.
    pub fn working_dir(&self, base: Option<&WorkingDir>, path: &str) -> Result<WorkingDir> {
        let (volume, loc) = self.core.locate(base, path)?;
        let mut driver = volume.lock(OpCategory::Query)?;

        let found = lookup(&mut *driver, loc.start, loc.rel_path)?;
        if !found.found() {
            return Err(Error::not_found(path));
        }
        if !driver.entry_query(found.entry)?.is_dir() {
            return Err(Error::invalid_type(path));
        }
        let depth = depth_after(loc.start_depth, found.rel_depth, path)?;

        Ok(WorkingDir::new(
            self.core.clone(),
            volume.handle(),
            found.entry,
            depth,
        ))
    }

    /// Nodes currently open across all volumes.
    pub fn open_node_count(&self) -> usize {
        self.core.registry.node_count()
    }

    /// Working directories currently alive across all volumes.
    pub fn working_dir_count(&self) -> usize {
        self.core.registry.wd_count()
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("volumes", &self.volume_names())
            .field("open_nodes", &self.open_node_count())
            .finish()
    }
}
