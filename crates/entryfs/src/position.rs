/// Location of one entry within a volume.
///
/// Only the volume's driver produces and interprets `At` tokens. `Void`
/// and `Root` are the two sentinels every volume shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    /// No such entry.
    Void,
    /// The volume's root directory.
    Root,
    /// A driver-specific token.
    At(u64),
}

impl Position {
    pub fn is_void(self) -> bool {
        self == Position::Void
    }

    pub fn is_root(self) -> bool {
        self == Position::Root
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Void => write!(f, "void"),
            Position::Root => write!(f, "root"),
            Position::At(token) => write!(f, "{:08X}", token),
        }
    }
}
