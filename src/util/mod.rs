//! Utility types used throughout the crate.
//!
//! - [`ComponentType`] - Enum of pixel component storage types
//! - [`ByteOrder`] / [`Encoding`] - Payload layout tags
//! - [`Error`] / [`Result`] - Error handling

mod component;
mod error;
mod layout;

pub use component::*;
pub use error::*;
pub use layout::*;
