use thiserror::Error;

#[derive(Debug, Error)]
pub enum VffError {
    #[error("Not a VFF image: {0}")]
    Format(String),

    #[error("Invalid VFF magic: {0:02x?}")]
    Magic([u8; 4]),

    #[error("Unsupported volume variant: {0}")]
    UnsupportedVariant(String),

    #[error("Invalid size: {0}")]
    Size(String),

    #[error("Broken cluster chain: {0}")]
    Chain(String),

    #[error("Out of bounds: {0}")]
    Bounds(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid path or entry: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Path {
        path: String,
        #[source]
        source: Box<VffError>,
    },
}

/// Error category, independent of how many path wrappers surround it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Magic,
    UnsupportedVariant,
    Size,
    Chain,
    Bounds,
    NotFound,
    Invalid,
    Io,
}

impl VffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VffError::Format(_) => ErrorKind::Format,
            VffError::Magic(_) => ErrorKind::Magic,
            VffError::UnsupportedVariant(_) => ErrorKind::UnsupportedVariant,
            VffError::Size(_) => ErrorKind::Size,
            VffError::Chain(_) => ErrorKind::Chain,
            VffError::Bounds(_) => ErrorKind::Bounds,
            VffError::NotFound(_) => ErrorKind::NotFound,
            VffError::Invalid(_) => ErrorKind::Invalid,
            VffError::IoError(_) => ErrorKind::Io,
            VffError::Path { source, .. } => source.kind(),
        }
    }

    /// Attach the path being resolved. An error that already carries a path keeps it.
    pub fn with_path(self, path: &str) -> Self {
        match self {
            VffError::Path { .. } => self,
            other => VffError::Path {
                path: path.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The path attached by the resolver, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            VffError::Path { path, .. } => Some(path),
            _ => None,
        }
    }
}
