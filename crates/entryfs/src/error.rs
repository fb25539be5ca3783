pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by entry operations.
///
/// Path-carrying variants hold the path as the caller supplied it. The
/// passthrough variants at the bottom are produced by volume drivers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Entry is opened: {0}")]
    EntryOpened(String),

    #[error("Entry node is closed")]
    EntryClosed,

    #[error("Entry is the root directory: {0}")]
    EntryIsRootDirectory(String),

    #[error("Parent is not a directory: {0}")]
    ParentNotADirectory(String),

    #[error("Entry has the wrong type: {0}")]
    InvalidType(String),

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Volume is read-only: {0}")]
    VolumeReadOnly(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Maximum path depth exceeded: {0}")]
    MaxDepthExceeded(String),

    #[error("Buffer too small: {needed} bytes needed, {available} available")]
    WouldOverflow { needed: usize, available: usize },

    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(&'static str),

    #[error("Access mode not permitted: {0}")]
    AccessModeInvalid(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Volume closed: {0}")]
    VolumeClosed(String),

    #[error("Volume corrupted: {0}")]
    VolumeCorrupted(String),

    #[error("Block device closed")]
    BlockDeviceClosed,

    #[error("Block device corrupted")]
    BlockDeviceCorrupted,
}

impl Error {
    pub fn not_found<P: AsRef<str>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<P: AsRef<str>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn entry_opened<P: AsRef<str>>(path: P) -> Self {
        Error::EntryOpened(path.as_ref().to_string())
    }

    pub fn root_dir<P: AsRef<str>>(path: P) -> Self {
        Error::EntryIsRootDirectory(path.as_ref().to_string())
    }

    pub fn parent_not_dir<P: AsRef<str>>(path: P) -> Self {
        Error::ParentNotADirectory(path.as_ref().to_string())
    }

    pub fn invalid_type<P: AsRef<str>>(path: P) -> Self {
        Error::InvalidType(path.as_ref().to_string())
    }

    pub fn dir_not_empty<P: AsRef<str>>(path: P) -> Self {
        Error::DirectoryNotEmpty(path.as_ref().to_string())
    }

    pub fn read_only<S: AsRef<str>>(volume: S) -> Self {
        Error::VolumeReadOnly(volume.as_ref().to_string())
    }

    pub fn invalid_name<S: AsRef<str>>(name: S) -> Self {
        Error::InvalidName(name.as_ref().to_string())
    }

    pub fn max_depth<P: AsRef<str>>(path: P) -> Self {
        Error::MaxDepthExceeded(path.as_ref().to_string())
    }

    pub fn access_mode<P: AsRef<str>>(path: P) -> Self {
        Error::AccessModeInvalid(path.as_ref().to_string())
    }

    pub fn invalid_argument<S: AsRef<str>>(what: S) -> Self {
        Error::InvalidArgument(what.as_ref().to_string())
    }

    pub fn volume_closed<S: AsRef<str>>(volume: S) -> Self {
        Error::VolumeClosed(volume.as_ref().to_string())
    }

    pub fn volume_corrupted<S: AsRef<str>>(volume: S) -> Self {
        Error::VolumeCorrupted(volume.as_ref().to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for Error {
    fn from(err: serde_yaml_ng::Error) -> Error {
        Error::Config(err.to_string())
    }
}
