//! Payload reading for structured-points files.

use tracing::trace;

use super::VtkHeader;
use crate::codec::{AsciiDecoder, BinaryDecoder};
use crate::core::{FileChannel, ImageDescriptor, ImageRegion};
use crate::util::{Encoding, Error, Result};

/// Fill `buffer` with the pixels of `region`.
///
/// `channel` must be open on the file `header` was parsed from. The region
/// and buffer size are already validated against `descriptor`.
pub fn read_payload(
    channel: &mut FileChannel,
    header: &VtkHeader,
    descriptor: &ImageDescriptor,
    region: &ImageRegion,
    buffer: &mut [u8],
) -> Result<()> {
    match header.encoding {
        Encoding::Binary => read_binary(channel, header, descriptor, region, buffer),
        Encoding::Ascii => read_ascii(channel, header, descriptor, region, buffer),
    }
}

fn read_binary(
    channel: &mut FileChannel,
    header: &VtkHeader,
    descriptor: &ImageDescriptor,
    region: &ImageRegion,
    buffer: &mut [u8],
) -> Result<()> {
    let start = header.payload_offset;
    let needed = header.payload_bytes() as u64;
    if channel.len() < start + needed {
        return Err(Error::format(
            channel.path(),
            format!(
                "binary payload truncated: expected {} bytes after the header, found {}",
                needed,
                channel.len().saturating_sub(start)
            ),
        ));
    }

    let pixel_bytes = descriptor.pixel_bytes() as u64;
    if region.is_full(descriptor) {
        trace!(bytes = buffer.len(), mapped = channel.is_mapped(), "reading whole binary payload");
        channel.read_at(start, buffer)?;
    } else {
        let run = region.size()[0] * descriptor.pixel_bytes();
        trace!(rows = region.rows(descriptor).len(), run, "reading binary region");
        for (row, pixel) in region.rows(descriptor).enumerate() {
            let out = &mut buffer[row * run..(row + 1) * run];
            channel.read_at(start + pixel as u64 * pixel_bytes, out)?;
        }
    }

    BinaryDecoder::new(descriptor.component_type(), descriptor.byte_order()).decode_in_place(buffer);
    Ok(())
}

fn read_ascii(
    channel: &mut FileChannel,
    header: &VtkHeader,
    descriptor: &ImageDescriptor,
    region: &ImageRegion,
    buffer: &mut [u8],
) -> Result<()> {
    let path = channel.path().to_path_buf();
    channel.seek_to(header.payload_offset)?;
    let mut decoder = AsciiDecoder::new(&mut *channel, descriptor.component_type());
    decoder
        .decode_region(descriptor, region, buffer)
        .map_err(|e| e.into_error(&path))?;
    trace!(components = decoder.position(), "decoded text payload");
    Ok(())
}
