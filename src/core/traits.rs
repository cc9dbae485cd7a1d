//! The per-format backend contract.
//!
//! Every on-disk format implements [`FormatBackend`]. Callers never special
//! case a format: they resolve a backend through the
//! [`FormatRegistry`](super::FormatRegistry) and talk to it through this
//! trait only.

use std::path::Path;

use super::{ImageDescriptor, ImageRegion};
use crate::util::{Error, Result};

/// Reader/writer interface for one image file format.
///
/// Implementations hold configuration only; no per-call state is kept
/// between operations, so a backend can be shared freely across threads.
pub trait FormatBackend: Send + Sync {
    /// Human readable format name.
    fn name(&self) -> &str;

    /// Canonical file suffixes, lowercase, without the dot.
    fn extensions(&self) -> &[&str];

    /// Whether this backend can read `path`.
    ///
    /// Never fails: any error opening or sniffing the file means `false`.
    fn can_read(&self, path: &Path) -> bool;

    /// Whether this backend would write `path`, judged by its extension.
    /// The file does not need to exist.
    fn can_write(&self, path: &Path) -> bool {
        has_extension(path, self.extensions())
    }

    /// Parse the file header into a descriptor without touching pixel data.
    fn read_image_information(&self, path: &Path) -> Result<ImageDescriptor>;

    /// Read the pixels covered by `region` into `buffer`.
    ///
    /// `descriptor` is usually the one returned by
    /// [`read_image_information`](Self::read_image_information); its byte
    /// order decides how binary payloads are interpreted. `buffer` must hold
    /// exactly `region.pixel_count() * descriptor.pixel_bytes()` bytes and is
    /// filled row-major (x fastest) with components interleaved, in host
    /// byte order.
    fn read_into(
        &self,
        path: &Path,
        descriptor: &ImageDescriptor,
        region: &ImageRegion,
        buffer: &mut [u8],
    ) -> Result<()>;

    /// Read the pixels covered by `region` (the whole image when `None`)
    /// into a new buffer.
    ///
    /// The region is checked before anything is allocated or opened.
    fn read(&self, path: &Path, descriptor: &ImageDescriptor, region: Option<&ImageRegion>) -> Result<Vec<u8>> {
        let full;
        let region = match region {
            Some(region) => region,
            None => {
                full = ImageRegion::full(descriptor);
                &full
            }
        };
        region.validate_against(descriptor)?;
        let mut buffer = vec![0u8; region.pixel_count() * descriptor.pixel_bytes()];
        self.read_into(path, descriptor, region, &mut buffer)?;
        Ok(buffer)
    }

    /// Write `buffer` (host byte order, whole image) as described by
    /// `descriptor`.
    ///
    /// If writing fails after the file was created, the partial file is
    /// left on disk; removing it is up to the caller.
    fn write(&self, path: &Path, descriptor: &ImageDescriptor, buffer: &[u8]) -> Result<()>;
}

/// True when the extension of `path` matches one of `extensions`,
/// ignoring ASCII case.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
}

/// Fail with [`Error::BufferSize`] unless `actual == expected`.
pub fn check_buffer_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::BufferSize { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("scan.vtk"), &["vtk"]));
        assert!(has_extension(Path::new("dir/SCAN.VTK"), &["vtk"]));
        assert!(!has_extension(Path::new("scan.vtk.gz"), &["vtk"]));
        assert!(!has_extension(Path::new("vtk"), &["vtk"]));
        assert!(!has_extension(Path::new("scan.unknownext"), &["vtk", "vti"]));
    }

    #[test]
    fn test_check_buffer_len() {
        assert!(check_buffer_len(4, 4).is_ok());
        assert!(matches!(
            check_buffer_len(4, 3),
            Err(Error::BufferSize { expected: 4, actual: 3 })
        ));
    }
}
