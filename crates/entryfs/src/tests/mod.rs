mod rename;
mod reverse;

use crate::{FileSystem, FsConfig, MemoryDriver, VolumeConfig};

/// A file system with one empty memory volume mounted as `ram`.
pub(crate) fn new_fs() -> (FileSystem, MemoryDriver) {
    new_fs_with(FsConfig::default(), VolumeConfig::default())
}

pub(crate) fn new_fs_with(config: FsConfig, volume: VolumeConfig) -> (FileSystem, MemoryDriver) {
    let fs = FileSystem::new(config);
    let driver = MemoryDriver::new();
    _ = fs.mount("ram", driver.clone(), volume).unwrap();
    (fs, driver)
}

/// Mount a second empty memory volume.
pub(crate) fn mount_memory(fs: &FileSystem, name: &str) -> MemoryDriver {
    let driver = MemoryDriver::new();
    _ = fs.mount(name, driver.clone(), VolumeConfig::default()).unwrap();
    driver
}
