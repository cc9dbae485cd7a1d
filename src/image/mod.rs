//! Path-based entry points routed through the process-wide registry.
//!
//! ```ignore
//! use gridio::image;
//!
//! let (info, pixels) = image::read("scan.vtk", None)?;
//! image::write("copy.vtk", &info, &pixels)?;
//! ```

use std::path::Path;

use tracing::debug;

use crate::core::{FormatRegistry, ImageDescriptor, ImageRegion, ResolveHint};
use crate::util::{pixels_as, Component, Error, Result};

/// True when a registered backend can read `path`. Never fails.
pub fn can_read_file(path: impl AsRef<Path>) -> bool {
    FormatRegistry::global()
        .resolve(path, ResolveHint::Read)
        .is_ok()
}

/// True when a registered backend can write `path`. Never fails.
pub fn can_write_file(path: impl AsRef<Path>) -> bool {
    FormatRegistry::global()
        .resolve(path, ResolveHint::Write)
        .is_ok()
}

/// Read the metadata of `path` without touching pixel data.
pub fn read_image_information(path: impl AsRef<Path>) -> Result<ImageDescriptor> {
    let path = path.as_ref();
    let backend = FormatRegistry::global().resolve(path, ResolveHint::Read)?;
    backend.read_image_information(path)
}

/// Read `path`, or only `region` of it, returning the file's descriptor and
/// the pixels in host byte order.
pub fn read(path: impl AsRef<Path>, region: Option<&ImageRegion>) -> Result<(ImageDescriptor, Vec<u8>)> {
    let path = path.as_ref();
    let backend = FormatRegistry::global().resolve(path, ResolveHint::Read)?;
    let descriptor = backend.read_image_information(path)?;
    debug!(path = %path.display(), backend = backend.name(), %descriptor, "reading image");
    let pixels = backend.read(path, &descriptor, region)?;
    Ok((descriptor, pixels))
}

/// Like [`read`], converting the pixels to `T`.
///
/// Fails with [`Error::InvalidDescriptor`] when the file does not store `T`.
pub fn read_as<T: Component>(path: impl AsRef<Path>, region: Option<&ImageRegion>) -> Result<(ImageDescriptor, Vec<T>)> {
    let path = path.as_ref();
    let (descriptor, pixels) = read(path, region)?;
    if descriptor.component_type() != T::TYPE {
        return Err(Error::invalid(format!(
            "{} stores {} components, not {}",
            path.display(),
            descriptor.component_type(),
            T::TYPE
        )));
    }
    Ok((descriptor, pixels_as(&pixels)))
}

/// Write `buffer` to `path` with the backend that claims the path.
pub fn write(path: impl AsRef<Path>, descriptor: &ImageDescriptor, buffer: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let backend = FormatRegistry::global().resolve(path, ResolveHint::Write)?;
    debug!(path = %path.display(), backend = backend.name(), %descriptor, "writing image");
    backend.write(path, descriptor, buffer)
}
