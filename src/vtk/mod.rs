//! VTK legacy structured-points format.
//!
//! A text header describing a regular grid followed by one point-data
//! array, either as decimal text or as raw binary.
//!
//! ## File Structure
//!
//! ```text
//! +------------------------------+
//! | # vtk DataFile Version 3.0   |  signature
//! +------------------------------+
//! | title                        |  free text, one line
//! +------------------------------+
//! | ASCII | BINARY               |  payload encoding
//! +------------------------------+
//! | DATASET ... LOOKUP_TABLE     |  geometry and point data layout
//! +------------------------------+
//! | ... payload ...              |
//! +------------------------------+
//! ```
//!
//! The format does not record the byte order of binary payloads. Files
//! written here carry it in the title line; other files are assumed to be
//! big-endian unless [`VtkOptions::default_byte_order`] says otherwise.

pub mod format;
mod header;
mod image_io;
mod reader;
mod writer;

pub use header::*;
pub use image_io::*;
pub use writer::VtkStream;
