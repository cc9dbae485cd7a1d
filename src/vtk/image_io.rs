//! The structured-points [`FormatBackend`].

use std::path::Path;

use tracing::{debug, trace};

use super::format::{ASCII_VALUES_PER_LINE, DEFAULT_TITLE, EXTENSION};
use super::reader::read_payload;
use super::writer::VtkStream;
use super::VtkHeader;
use crate::core::{check_buffer_len, ChannelMode, FileChannel, FormatBackend, ImageDescriptor, ImageRegion};
use crate::util::{ByteOrder, Error, Result};

/// Settings for [`VtkImageIO`].
#[derive(Clone, Debug, PartialEq)]
pub struct VtkOptions {
    /// Title line text; the byte order marker is appended on write
    pub title: String,
    /// Values per line in ASCII payloads
    pub values_per_line: usize,
    /// Byte order assumed for binary files that do not record one.
    /// Legacy VTK files are big-endian.
    pub default_byte_order: ByteOrder,
    /// Memory-map files for reading (needs the `mmap` feature)
    pub use_mmap: bool,
}

impl Default for VtkOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            values_per_line: ASCII_VALUES_PER_LINE,
            default_byte_order: ByteOrder::BigEndian,
            use_mmap: cfg!(feature = "mmap"),
        }
    }
}

/// Reader/writer for VTK legacy `STRUCTURED_POINTS` files (`.vtk`).
#[derive(Clone, Debug, Default)]
pub struct VtkImageIO {
    options: VtkOptions,
}

impl VtkImageIO {
    /// Backend name reported by [`FormatBackend::name`].
    pub const NAME: &'static str = "VTK structured points";

    pub fn new(options: VtkOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &VtkOptions {
        &self.options
    }

    /// Open `path` and parse its header, leaving the channel open for the
    /// payload.
    fn open_header(&self, path: &Path, use_mmap: bool) -> Result<(FileChannel, VtkHeader)> {
        let mut channel = FileChannel::new();
        channel.open_opts(path, ChannelMode::Read, use_mmap)?;
        let header = VtkHeader::parse(&mut channel, path)?;
        trace!(path = %path.display(), encoding = ?header.encoding, payload_offset = header.payload_offset, "header parsed");
        Ok((channel, header))
    }

    /// Reads only ever produce 2-D or 3-D data, so any other requested
    /// layout cannot match the file.
    fn check_read_dimensions(path: &Path, dimensions: usize) -> Result<()> {
        if !(2..=3).contains(&dimensions) {
            return Err(Error::format(
                path,
                format!("cannot read {} dimensions, only 2 or 3 dimensions are supported", dimensions),
            ));
        }
        Ok(())
    }
}

impl FormatBackend for VtkImageIO {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extensions(&self) -> &[&str] {
        &[EXTENSION]
    }

    fn can_read(&self, path: &Path) -> bool {
        trace!(path = %path.display(), "probing capability");
        match self.open_header(path, false) {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "rejected as structured points");
                false
            }
        }
    }

    fn read_image_information(&self, path: &Path) -> Result<ImageDescriptor> {
        let (_channel, header) = self.open_header(path, false)?;
        header.to_descriptor(self.options.default_byte_order)
    }

    fn read_into(
        &self,
        path: &Path,
        descriptor: &ImageDescriptor,
        region: &ImageRegion,
        buffer: &mut [u8],
    ) -> Result<()> {
        Self::check_read_dimensions(path, descriptor.dimension_count())?;
        region.validate_against(descriptor)?;
        check_buffer_len(region.pixel_count() * descriptor.pixel_bytes(), buffer.len())?;

        let (mut channel, header) = self.open_header(path, self.options.use_mmap)?;
        let on_disk = header.to_descriptor(self.options.default_byte_order)?;
        if !on_disk.to_3d().matches_layout(&descriptor.to_3d()) {
            return Err(Error::format(
                path,
                format!("file holds {} but {} was requested", on_disk, descriptor),
            ));
        }

        read_payload(&mut channel, &header, descriptor, region, buffer)?;
        trace!(path = %path.display(), bytes = buffer.len(), "payload transferred");
        channel.close()
    }

    fn write(&self, path: &Path, descriptor: &ImageDescriptor, buffer: &[u8]) -> Result<()> {
        // Checked before the file is created, so a rejected write leaves nothing behind
        let header = VtkHeader::from_descriptor(path, descriptor, &self.options.title)?;
        check_buffer_len(descriptor.byte_size(), buffer.len())?;

        debug!(path = %path.display(), %descriptor, encoding = ?header.encoding, "writing structured points");
        let mut stream = VtkStream::create(path, header.encoding, self.options.values_per_line)?;
        stream.write_header(&header)?;
        stream.write_payload(&header, descriptor.byte_order(), buffer)?;
        stream.finish()?;
        trace!(path = %path.display(), bytes = buffer.len(), "payload transferred");
        Ok(())
    }
}
