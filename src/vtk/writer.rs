//! Structured-points output stream.

use std::io::Write;

use super::VtkHeader;
use crate::codec::{AsciiEncoder, BinaryEncoder};
use crate::core::{ChannelMode, FileChannel};
use crate::util::{ByteOrder, Encoding, Error, Result};

/// Output stream for one structured-points file.
///
/// Owns the channel for the duration of the write; the file is closed when
/// the stream is finished or dropped.
pub struct VtkStream {
    channel: FileChannel,
    values_per_line: usize,
}

impl VtkStream {
    /// Create (or truncate) the file at `path`, opened raw when the
    /// payload is binary.
    pub fn create(path: &std::path::Path, encoding: Encoding, values_per_line: usize) -> Result<Self> {
        let mode = match encoding {
            Encoding::Ascii => ChannelMode::WriteText,
            Encoding::Binary => ChannelMode::WriteBinary,
        };
        let mut channel = FileChannel::new();
        channel.open(path, mode)?;
        Ok(Self { channel, values_per_line })
    }

    /// Write the header block.
    pub fn write_header(&mut self, header: &VtkHeader) -> Result<()> {
        header
            .write_to(&mut self.channel)
            .map_err(|e| Error::io(self.channel.path(), "write", e))
    }

    /// Write `buffer` as the payload described by `header`.
    pub fn write_payload(&mut self, header: &VtkHeader, byte_order: ByteOrder, buffer: &[u8]) -> Result<()> {
        let result = match header.encoding {
            Encoding::Ascii => {
                AsciiEncoder::new(header.component_type, self.values_per_line).encode(&mut self.channel, buffer)
            }
            Encoding::Binary => BinaryEncoder::new(header.component_type, byte_order).encode(&mut self.channel, buffer),
        };
        result.map_err(|e| Error::io(self.channel.path(), "write", e))
    }

    /// Flush and close the file, reporting any error the OS returns.
    pub fn finish(mut self) -> Result<()> {
        self.channel
            .flush()
            .map_err(|e| Error::io(self.channel.path(), "flush", e))?;
        self.channel.close()
    }
}
