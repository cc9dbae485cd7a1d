//! # gridio
//!
//! Pluggable I/O for multi-dimensional raster images on regular grids.
//!
//! A format backend turns a file into an [`ImageDescriptor`](core::ImageDescriptor)
//! (extent, spacing, origin, pixel layout) plus a pixel buffer, and back.
//! Backends are chosen per path by a [`FormatRegistry`](core::FormatRegistry).
//! The built-in backend handles VTK legacy structured-points files.
//!
//! ## Modules
//!
//! - [`util`] - Component types, payload layout tags, errors
//! - [`core`] - Descriptor, region, file channel, backend trait and registry
//! - [`codec`] - ASCII and binary payload codecs
//! - [`vtk`] - VTK structured-points backend
//! - [`image`] - Path-based helpers over the global registry
//!
//! ## Example
//!
//! ```ignore
//! use gridio::prelude::*;
//!
//! let descriptor = ImageDescriptor::d2(2, 2, ComponentType::Uint8)?;
//! gridio::image::write("small.vtk", &descriptor, &[10, 20, 30, 40])?;
//!
//! let (info, pixels) = gridio::image::read("small.vtk", None)?;
//! assert_eq!(info.extent(), &[2, 2]);
//! ```

pub mod util;
pub mod core;
pub mod codec;
pub mod vtk;
pub mod image;

// Re-export commonly used types
pub use util::{ComponentType, Error, Result};
pub use vtk::VtkImageIO;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{ByteOrder, Component, ComponentType, Encoding, Error, Result};
    pub use crate::core::{FileChannel, FormatBackend, FormatRegistry, ImageDescriptor, ImageRegion, ResolveHint};
    pub use crate::vtk::{VtkImageIO, VtkOptions};
}
