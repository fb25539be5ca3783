use super::{mount_memory, new_fs, new_fs_with};
use crate::{AccessMode, EntryKind, Error, FsConfig, VolumeConfig};

#[test]
fn test_rename_file() {
    let (fs, driver) = new_fs();
    fs.create(None, "/ram/a.txt", EntryKind::File, false).unwrap();
    driver.write_file("a.txt", b"abc").unwrap();

    fs.rename(None, "/ram/a.txt", None, "/ram/b.txt", false).unwrap();
    assert_eq!(fs.query(None, "/ram/a.txt"), Err(Error::not_found("/ram/a.txt")));
    assert_eq!(driver.read_file("b.txt").unwrap(), b"abc");
}

#[test]
fn test_rename_into_directory() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/d", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/e", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/d/f", EntryKind::File, false).unwrap();

    fs.rename(None, "/ram/d", None, "/ram/e/moved", false).unwrap();
    assert!(fs.query(None, "/ram/e/moved/f").is_ok());
    assert_eq!(fs.query(None, "/ram/d"), Err(Error::not_found("/ram/d")));
}

#[test]
fn test_rename_same_entry_is_noop() {
    let (fs, driver) = new_fs();
    fs.create(None, "/ram/a", EntryKind::Directory, false).unwrap();
    let before = driver.entry_count();

    fs.rename(None, "/ram/a", None, "/ram/./a", false).unwrap();
    fs.rename(None, "/ram/a", None, "/ram/a/../a", false).unwrap();
    assert_eq!(driver.entry_count(), before);
    assert!(fs.query(None, "/ram/a").unwrap().is_dir());
}

#[test]
fn test_rename_exclusive_onto_existing() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/a", EntryKind::File, false).unwrap();
    fs.create(None, "/ram/b", EntryKind::File, false).unwrap();
    assert_eq!(
        fs.rename(None, "/ram/a", None, "/ram/b", true),
        Err(Error::already_exists("/ram/b"))
    );
}

#[test]
fn test_rename_replaces_file() {
    let (fs, driver) = new_fs();
    fs.create(None, "/ram/a", EntryKind::File, false).unwrap();
    fs.create(None, "/ram/b", EntryKind::File, false).unwrap();
    driver.write_file("a", b"new").unwrap();
    driver.write_file("b", b"old contents").unwrap();
    let before = driver.entry_count();

    fs.rename(None, "/ram/a", None, "/ram/b", false).unwrap();
    assert_eq!(driver.read_file("b").unwrap(), b"new");
    assert_eq!(driver.entry_count(), before - 1);
}

#[test]
fn test_rename_onto_directory() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/src", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/full", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/full/f", EntryKind::File, false).unwrap();
    fs.create(None, "/ram/empty", EntryKind::Directory, false).unwrap();

    assert_eq!(
        fs.rename(None, "/ram/src", None, "/ram/full", false),
        Err(Error::dir_not_empty("/ram/full"))
    );
    fs.rename(None, "/ram/src", None, "/ram/empty", false).unwrap();
    assert_eq!(fs.query(None, "/ram/src"), Err(Error::not_found("/ram/src")));
    assert!(fs.query(None, "/ram/empty").unwrap().is_dir());
}

#[test]
fn test_rename_type_mismatch() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();
    fs.create(None, "/ram/d", EntryKind::Directory, false).unwrap();
    assert_eq!(
        fs.rename(None, "/ram/f", None, "/ram/d", false),
        Err(Error::invalid_type("/ram/d"))
    );
    assert_eq!(
        fs.rename(None, "/ram/d", None, "/ram/f", false),
        Err(Error::invalid_type("/ram/f"))
    );
}

#[test]
fn test_rename_destination_parent() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();
    fs.create(None, "/ram/g", EntryKind::File, false).unwrap();

    assert_eq!(
        fs.rename(None, "/ram/f", None, "/ram/none/x", false),
        Err(Error::not_found("/ram/none/x"))
    );
    assert_eq!(
        fs.rename(None, "/ram/f", None, "/ram/g/x", false),
        Err(Error::parent_not_dir("/ram/g/x"))
    );
    assert_eq!(
        fs.rename(None, "/ram/missing", None, "/ram/x", false),
        Err(Error::not_found("/ram/missing"))
    );
}

#[test]
fn test_rename_onto_root() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/d", EntryKind::Directory, false).unwrap();
    assert_eq!(
        fs.rename(None, "/ram/d", None, "/ram", false),
        Err(Error::root_dir("/ram"))
    );
}

#[test]
fn test_rename_open_destination() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/a", EntryKind::File, false).unwrap();
    let node = fs
        .open(None, "/ram/b", AccessMode::READ | AccessMode::CREATE, EntryKind::File)
        .unwrap();
    assert_eq!(
        fs.rename(None, "/ram/a", None, "/ram/b", false),
        Err(Error::entry_opened("/ram/b"))
    );
    node.close().unwrap();
    fs.rename(None, "/ram/a", None, "/ram/b", false).unwrap();
}

#[test]
fn test_rename_relative_to_working_dirs() {
    let (fs, _) = new_fs();
    fs.create(None, "/ram/src", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/dst", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/src/f", EntryKind::File, false).unwrap();

    let src = fs.working_dir(None, "/ram/src").unwrap();
    let dst = fs.working_dir(None, "/ram/dst").unwrap();
    fs.rename(Some(&src), "f", Some(&dst), "g", false).unwrap();
    assert!(fs.query(None, "/ram/dst/g").is_ok());
}

#[test]
fn test_rename_across_volumes() {
    let (fs, src) = new_fs();
    let dst = mount_memory(&fs, "sd");
    fs.create(None, "/ram/f.txt", EntryKind::File, false).unwrap();
    src.write_file("f.txt", b"payload crossing volumes").unwrap();

    fs.rename(None, "/ram/f.txt", None, "/sd/g.txt", false).unwrap();
    assert_eq!(fs.query(None, "/ram/f.txt"), Err(Error::not_found("/ram/f.txt")));
    assert_eq!(dst.read_file("g.txt").unwrap(), b"payload crossing volumes");
    assert_eq!(fs.query(None, "/sd/g.txt").unwrap().size, 24);
}

#[test]
fn test_rename_across_volumes_in_small_chunks() {
    let config = FsConfig {
        copy_chunk_size: 3,
        ..FsConfig::default()
    };
    let (fs, src) = new_fs_with(config, VolumeConfig::default());
    let dst = mount_memory(&fs, "sd");
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();
    src.write_file("f", b"0123456789").unwrap();

    fs.rename(None, "/ram/f", None, "/sd/f", false).unwrap();
    assert_eq!(dst.read_file("f").unwrap(), b"0123456789");
}

#[test]
fn test_rename_across_volumes_replaces_file() {
    let (fs, src) = new_fs();
    let dst = mount_memory(&fs, "sd");
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();
    fs.create(None, "/sd/f", EntryKind::File, false).unwrap();
    src.write_file("f", b"new").unwrap();
    dst.write_file("f", b"old and longer").unwrap();

    assert_eq!(
        fs.rename(None, "/ram/f", None, "/sd/f", true),
        Err(Error::already_exists("/sd/f"))
    );
    fs.rename(None, "/ram/f", None, "/sd/f", false).unwrap();
    assert_eq!(dst.read_file("f").unwrap(), b"new");
}

#[test]
fn test_rename_directory_across_volumes() {
    let (fs, _) = new_fs();
    let _sd = mount_memory(&fs, "sd");
    fs.create(None, "/ram/d", EntryKind::Directory, false).unwrap();

    assert!(matches!(
        fs.rename(None, "/ram/d", None, "/sd/d", false),
        Err(Error::FeatureUnavailable(_))
    ));
    assert!(fs.query(None, "/ram/d").is_ok());
    assert_eq!(fs.query(None, "/sd/d"), Err(Error::not_found("/sd/d")));
}

#[test]
fn test_rename_across_volumes_disabled() {
    let config = FsConfig {
        file_copy: false,
        ..FsConfig::default()
    };
    let (fs, _) = new_fs_with(config, VolumeConfig::default());
    let _sd = mount_memory(&fs, "sd");
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();

    assert!(matches!(
        fs.rename(None, "/ram/f", None, "/sd/f", false),
        Err(Error::FeatureUnavailable(_))
    ));
    // Same-volume renames are unaffected.
    fs.rename(None, "/ram/f", None, "/ram/g", false).unwrap();
}

#[test]
fn test_failed_copy_keeps_source() {
    let (fs, src) = new_fs();
    let dst = mount_memory(&fs, "sd");
    fs.create(None, "/ram/f", EntryKind::File, false).unwrap();
    src.write_file("f", b"precious").unwrap();
    dst.fail_write(true);

    assert_eq!(
        fs.rename(None, "/ram/f", None, "/sd/f", false),
        Err(Error::Io("injected write failure".into()))
    );
    assert_eq!(src.read_file("f").unwrap(), b"precious");
    assert_eq!(dst.read_file("f"), None);
}

#[test]
fn test_rename_across_volumes_checks_open_source() {
    let (fs, _) = new_fs();
    let _sd = mount_memory(&fs, "sd");
    let node = fs
        .open(None, "/ram/f", AccessMode::READ | AccessMode::CREATE, EntryKind::File)
        .unwrap();
    assert_eq!(
        fs.rename(None, "/ram/f", None, "/sd/f", false),
        Err(Error::entry_opened("/ram/f"))
    );
    drop(node);
}

#[test]
fn test_rename_across_volumes_syncs_both() {
    let fs = crate::FileSystem::default();
    let a = crate::MemoryDriver::new();
    let b = crate::MemoryDriver::new();
    _ = fs.mount("a", a.clone(), VolumeConfig::auto_sync()).unwrap();
    _ = fs.mount("b", b.clone(), VolumeConfig::auto_sync()).unwrap();
    fs.create(None, "/a/f", EntryKind::File, false).unwrap();
    assert_eq!(a.sync_count(), 1);

    fs.rename(None, "/a/f", None, "/b/f", false).unwrap();
    assert_eq!(a.sync_count(), 2);
    assert_eq!(b.sync_count(), 1);
}
