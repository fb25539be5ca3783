use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::driver::VolumeDriver;

/// Category an operation declares when taking a volume lock.
///
/// The lock is exclusive whatever the category; the tag only shows up in
/// diagnostics and in `OpLock::holder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCategory {
    CreateDelete = 1,
    Rename,
    Query,
    AttribSet,
    Open,
    Close,
    FileRead,
    FileWrite,
    DataAccess,
}

impl OpCategory {
    fn from_u8(v: u8) -> Option<Self> {
        use OpCategory::*;
        [CreateDelete, Rename, Query, AttribSet, Open, Close, FileRead, FileWrite, DataAccess]
            .into_iter()
            .find(|c| *c as u8 == v)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpCategory::CreateDelete => "create-delete",
            OpCategory::Rename => "rename",
            OpCategory::Query => "query",
            OpCategory::AttribSet => "attrib-set",
            OpCategory::Open => "open",
            OpCategory::Close => "close",
            OpCategory::FileRead => "file-read",
            OpCategory::FileWrite => "file-write",
            OpCategory::DataAccess => "data-access",
        }
    }
}

/// Per-volume operation lock. Owns the driver, so holding the guard is the
/// only way to reach it.
pub(crate) struct OpLock {
    holder: AtomicU8,
    driver: Mutex<Box<dyn VolumeDriver>>,
}

pub(crate) struct OpGuard<'a> {
    lock: &'a OpLock,
    driver: MutexGuard<'a, Box<dyn VolumeDriver>>,
}

impl OpLock {
    pub(crate) fn new(driver: Box<dyn VolumeDriver>) -> Self {
        Self {
            holder: AtomicU8::new(0),
            driver: Mutex::new(driver),
        }
    }

    pub(crate) fn lock(&self, category: OpCategory) -> OpGuard<'_> {
        let driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        self.holder.store(category as u8, Ordering::Release);
        OpGuard { lock: self, driver }
    }

    /// Category of the operation currently holding the lock.
    pub(crate) fn holder(&self) -> Option<OpCategory> {
        OpCategory::from_u8(self.holder.load(Ordering::Acquire))
    }
}

impl Deref for OpGuard<'_> {
    type Target = dyn VolumeDriver;

    fn deref(&self) -> &Self::Target {
        &**self.driver
    }
}

impl DerefMut for OpGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.driver
    }
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.lock.holder.store(0, Ordering::Release);
    }
}

// Registry and volume-table state is consistent between statements, so a
// panic while holding these locks leaves nothing half-written.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDriver;

    #[test]
    fn test_holder_tracks_category() {
        let lock = OpLock::new(Box::new(MemoryDriver::new()));
        assert_eq!(lock.holder(), None);
        {
            let _guard = lock.lock(OpCategory::Rename);
            assert_eq!(lock.holder(), Some(OpCategory::Rename));
        }
        assert_eq!(lock.holder(), None);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(OpCategory::CreateDelete.as_str(), "create-delete");
        assert_eq!(OpCategory::from_u8(OpCategory::DataAccess as u8), Some(OpCategory::DataAccess));
        assert_eq!(OpCategory::from_u8(0), None);
    }
}
