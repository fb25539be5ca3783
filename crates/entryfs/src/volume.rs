use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use diagnostics::*;

use crate::config::VolumeConfig;
use crate::driver::VolumeDriver;
use crate::error::{Error, Result};
use crate::lock::{self, OpCategory, OpGuard, OpLock};

/// Identity of a mounted volume. Never reused within a `FileSystem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(u64);

impl VolumeId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A mounted file-system instance.
pub struct Volume {
    name: String,
    id: VolumeId,
    config: VolumeConfig,
    closed: AtomicBool,
    op_lock: OpLock,
}

/// Reference to a volume that detects unmounting instead of dangling.
#[derive(Clone)]
pub struct VolumeHandle {
    vol: Weak<Volume>,
    id: VolumeId,
    name: Arc<str>,
}

impl Volume {
    pub(crate) fn new(
        name: &str,
        id: VolumeId,
        config: VolumeConfig,
        driver: Box<dyn VolumeDriver>,
    ) -> Self {
        Self {
            name: name.to_string(),
            id,
            config,
            closed: AtomicBool::new(false),
            op_lock: OpLock::new(driver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> VolumeId {
        self.id
    }

    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn handle(self: &Arc<Self>) -> VolumeHandle {
        VolumeHandle {
            vol: Arc::downgrade(self),
            id: self.id,
            name: Arc::from(self.name.as_str()),
        }
    }

    /// Take the operation lock for the duration of one logical operation.
    /// Fails once the volume has been unmounted, including while waiting.
    pub(crate) fn lock(&self, category: OpCategory) -> Result<OpGuard<'_>> {
        if let Some(holder) = self.op_lock.holder() {
            let volume = self.name.as_str();
            let wanted = category.as_str();
            let holder = holder.as_str();
            debug!("{volume}: {wanted} waiting on {holder}", volume: volume, wanted: wanted, holder: holder);
        }
        let guard = self.op_lock.lock(category);
        if self.is_closed() {
            return Err(Error::volume_closed(&self.name));
        }
        Ok(guard)
    }

    pub(crate) fn check_writable(&self) -> Result<()> {
        if self.config.is_read_only() {
            return Err(Error::read_only(&self.name));
        }
        Ok(())
    }

    /// Commit the driver's cached state when the volume asks for it.
    pub(crate) fn auto_sync(&self, driver: &mut dyn VolumeDriver) -> Result<()> {
        if self.config.auto_sync {
            let volume = self.name.as_str();
            debug!("{volume}: auto-sync", volume: volume);
            driver.sync()?;
        }
        Ok(())
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl VolumeHandle {
    /// Upgrade to the live volume, failing once it has been unmounted.
    pub(crate) fn acquire(&self) -> Result<Arc<Volume>> {
        match self.vol.upgrade() {
            Some(vol) if vol.id == self.id && !vol.is_closed() => Ok(vol),
            _ => Err(Error::volume_closed(&*self.name)),
        }
    }

    pub fn id(&self) -> VolumeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for VolumeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VolumeHandle({}#{})", self.name, self.id.0)
    }
}

impl PartialEq for VolumeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Mounted volumes by name.
#[derive(Default)]
pub(crate) struct VolumeTable {
    volumes: RwLock<BTreeMap<String, Arc<Volume>>>,
}

impl VolumeTable {
    pub(crate) fn get(&self, name: &str) -> Option<VolumeHandle> {
        lock::read(&self.volumes).get(name).map(Volume::handle)
    }

    pub(crate) fn insert(&self, volume: Volume) -> Result<VolumeHandle> {
        let mut volumes = lock::write(&self.volumes);
        if volumes.contains_key(&volume.name) {
            return Err(Error::already_exists(&volume.name));
        }
        let volume = Arc::new(volume);
        let handle = volume.handle();
        _ = volumes.insert(volume.name.clone(), volume);
        Ok(handle)
    }

    pub(crate) fn remove(&self, name: &str) -> Result<Arc<Volume>> {
        lock::write(&self.volumes)
            .remove(name)
            .ok_or_else(|| Error::not_found(name))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        lock::read(&self.volumes).keys().cloned().collect()
    }
}
