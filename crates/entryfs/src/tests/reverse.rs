use super::new_fs;
use crate::{AccessMode, EntryKind, Error};

fn tree(fs: &crate::FileSystem) {
    fs.create(None, "/ram/a", EntryKind::Directory, false).unwrap();
    fs.create(None, "/ram/a/b", EntryKind::Directory, false).unwrap();
}

#[test]
fn test_path_of_file() {
    let (fs, _) = new_fs();
    tree(&fs);
    let node = fs
        .open(None, "/ram/a/b/c.txt", AccessMode::WRITE | AccessMode::CREATE, EntryKind::File)
        .unwrap();

    assert_eq!(fs.path_string(&node).unwrap(), "/ram/a/b/c.txt");
    assert_eq!(fs.get_path(&node, None), Ok(14));

    let mut buf = [0u8; 32];
    let n = fs.get_path(&node, Some(&mut buf)).unwrap();
    assert_eq!(&buf[..n], b"/ram/a/b/c.txt");
}

#[test]
fn test_path_buffer_too_small() {
    let (fs, _) = new_fs();
    tree(&fs);
    let node = fs.open(None, "/ram/a/b", AccessMode::READ, EntryKind::Directory).unwrap();

    let mut small = [0u8; 4];
    assert_eq!(
        fs.get_path(&node, Some(&mut small)),
        Err(Error::WouldOverflow {
            needed: 8,
            available: 4
        })
    );
    let mut exact = [0u8; 8];
    assert_eq!(fs.get_path(&node, Some(&mut exact)), Ok(8));
}

#[test]
fn test_path_of_volume_root() {
    let (fs, _) = new_fs();
    let root = fs.open(None, "/ram/", AccessMode::READ, EntryKind::Directory).unwrap();
    assert_eq!(fs.path_string(&root).unwrap(), "/ram");
}

#[test]
fn test_path_round_trip() {
    let (fs, _) = new_fs();
    tree(&fs);
    fs.create(None, "/ram/a/b/f", EntryKind::File, false).unwrap();

    let wd = fs.working_dir(None, "/ram/a/b").unwrap();
    let opened_as = "./../b/./f";
    let node = fs.open(Some(&wd), opened_as, AccessMode::READ, EntryKind::File).unwrap();

    let path = fs.path_string(&node).unwrap();
    assert_eq!(path, "/ram/a/b/f");
    assert_eq!(fs.query(None, &path), fs.query(Some(&wd), opened_as));
}

#[test]
fn test_path_follows_renamed_parent() {
    let (fs, _) = new_fs();
    tree(&fs);
    let node = fs
        .open(None, "/ram/a/b/f", AccessMode::READ | AccessMode::CREATE, EntryKind::File)
        .unwrap();

    fs.rename(None, "/ram/a", None, "/ram/z", false).unwrap();
    assert_eq!(fs.path_string(&node).unwrap(), "/ram/z/b/f");
}

#[test]
fn test_path_of_closed_node() {
    let (fs, _) = new_fs();
    let node = fs.open(None, "/ram", AccessMode::READ, EntryKind::Directory).unwrap();
    node.close().unwrap();
    assert_eq!(fs.path_string(&node), Err(Error::EntryClosed));
}
