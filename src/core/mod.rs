//! Format-independent I/O building blocks.
//!
//! - [`ImageDescriptor`] - geometry and pixel layout of a dataset
//! - [`ImageRegion`] - sub-rectangle for partial reads
//! - [`FileChannel`] - scoped ownership of one open file
//! - [`FormatBackend`] - the contract every file format implements
//! - [`FormatRegistry`] - backend selection by path

mod channel;
mod descriptor;
mod region;
mod registry;
mod traits;

pub use channel::*;
pub use descriptor::*;
pub use region::*;
pub use registry::*;
pub use traits::*;
