//! Error types for gridio.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for image I/O operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No filename was given
    #[error("A file name must be specified")]
    EmptyPath,

    /// Open/read/write/close failure at the OS boundary
    #[error("I/O error while trying to {op} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Header missing, malformed, or not this backend's format
    #[error("Invalid image file {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// Descriptor dimensionality not supported by the backend
    #[error("Cannot handle {dimensions}-dimensional image {}: only 2 or 3 dimensions are supported", path.display())]
    Dimensionality { path: PathBuf, dimensions: usize },

    /// No registered backend claims the path
    #[error("No registered image format can handle {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Requested region is not contained in the image extent
    #[error("Region exceeds image extent on axis {axis}: offset {offset} + size {size} > {extent}")]
    Region {
        axis: usize,
        offset: usize,
        size: usize,
        extent: usize,
    },

    /// Descriptor violates one of its invariants
    #[error("Invalid image descriptor: {0}")]
    InvalidDescriptor(String),

    /// Pixel buffer length does not match the descriptor
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

impl Error {
    /// Create an I/O error tagged with the path and attempted operation.
    pub fn io(path: impl AsRef<Path>, op: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }

    /// Create a format error for the given path.
    pub fn format(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Path the failed operation was working on, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::Format { path, .. }
            | Self::Dimensionality { path, .. }
            | Self::UnsupportedFormat { path } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for gridio operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::Dimensionality {
            path: PathBuf::from("a.vtk"),
            dimensions: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("4-dimensional"));
        assert!(msg.contains("a.vtk"));

        let e = Error::Region { axis: 1, offset: 3, size: 2, extent: 4 };
        assert!(e.to_string().contains("axis 1"));
    }

    #[test]
    fn test_error_io_carries_path_and_op() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err = Error::io("missing.vtk", "open", io_err);
        assert!(matches!(err, Error::Io { op: "open", .. }));
        assert_eq!(err.path(), Some(Path::new("missing.vtk")));
        assert!(err.to_string().contains("open missing.vtk"));
    }

    #[test]
    fn test_error_path_absent() {
        assert!(Error::EmptyPath.path().is_none());
        assert!(Error::invalid("x").path().is_none());
    }
}
