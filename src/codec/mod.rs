//! Payload encoders and decoders.
//!
//! Converts between in-memory pixel buffers (host byte order, components
//! interleaved per pixel) and the on-disk payload of one component type:
//!
//! - [`ascii`] - whitespace separated decimal text
//! - [`binary`] - raw component bytes in an explicit byte order

pub mod ascii;
pub mod binary;

pub use ascii::{AsciiDecoder, AsciiEncoder};
pub use binary::{swap_in_place, BinaryDecoder, BinaryEncoder};

use std::path::Path;
use thiserror::Error;

use crate::util::{ComponentType, Error};

/// Failure while decoding a payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid {component_type} value {token:?} at component {index}")]
    Parse {
        index: usize,
        token: String,
        component_type: ComponentType,
    },

    #[error("payload ended after {count} components")]
    Truncated { count: usize },
}

impl DecodeError {
    /// Attach the file path, turning the failure into a crate error.
    pub fn into_error(self, path: &Path) -> Error {
        match self {
            Self::Io(e) => Error::io(path, "read", e),
            other => Error::format(path, other.to_string()),
        }
    }
}
