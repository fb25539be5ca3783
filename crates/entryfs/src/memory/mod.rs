//! Memory-based volume driver
//!
//! A complete `VolumeDriver` that keeps the directory tree and file contents
//! in memory. It is used by the test suite and as the reference for what a
//! driver must answer:
//! - `..` of the root directory is the root directory
//! - positions are never reused after a delete
//! - node init/free hooks are counted so tests can check they pair up
//!
//! `MemoryDriver` is cheaply cloneable; clones share state, so a test can
//! keep one clone to inspect or inject faults after mounting another.

mod driver;
mod entry;

pub use driver::MemoryDriver;
