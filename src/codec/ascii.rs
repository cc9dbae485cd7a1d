//! Whitespace separated decimal text payloads.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use byteorder::{ByteOrder as _, NativeEndian};

use super::DecodeError;
use crate::core::{ImageDescriptor, ImageRegion};
use crate::util::ComponentType;

/// Writes host-order component buffers as decimal text.
#[derive(Clone, Copy, Debug)]
pub struct AsciiEncoder {
    component_type: ComponentType,
    values_per_line: usize,
}

impl AsciiEncoder {
    /// Create an encoder wrapping lines after `values_per_line` values
    /// (at least one value per line).
    pub fn new(component_type: ComponentType, values_per_line: usize) -> Self {
        Self {
            component_type,
            values_per_line: values_per_line.max(1),
        }
    }

    /// Write every component of `buffer`, space separated, one line per
    /// `values_per_line` values. The output always ends with a newline
    /// unless `buffer` is empty.
    pub fn encode<W: Write>(&self, writer: &mut W, buffer: &[u8]) -> io::Result<()> {
        let width = self.component_type.num_bytes();
        let mut line = String::with_capacity(self.values_per_line * 24);
        let mut on_line = 0;

        for component in buffer.chunks_exact(width) {
            if on_line > 0 {
                line.push(' ');
            }
            format_component(&mut line, self.component_type, component)
                .map_err(|_| io::Error::other("failed to format pixel value"))?;
            on_line += 1;
            if on_line == self.values_per_line {
                line.push('\n');
                writer.write_all(line.as_bytes())?;
                line.clear();
                on_line = 0;
            }
        }
        if on_line > 0 {
            line.push('\n');
            writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

fn format_component(out: &mut String, ty: ComponentType, c: &[u8]) -> std::fmt::Result {
    match ty {
        ComponentType::Uint8 => write!(out, "{}", c[0]),
        ComponentType::Int8 => write!(out, "{}", c[0] as i8),
        ComponentType::Uint16 => write!(out, "{}", NativeEndian::read_u16(c)),
        ComponentType::Int16 => write!(out, "{}", NativeEndian::read_i16(c)),
        ComponentType::Uint32 => write!(out, "{}", NativeEndian::read_u32(c)),
        ComponentType::Int32 => write!(out, "{}", NativeEndian::read_i32(c)),
        ComponentType::Uint64 => write!(out, "{}", NativeEndian::read_u64(c)),
        ComponentType::Int64 => write!(out, "{}", NativeEndian::read_i64(c)),
        // Display prints the shortest text that parses back to the same value
        ComponentType::Float32 => write!(out, "{}", NativeEndian::read_f32(c)),
        ComponentType::Float64 => write!(out, "{}", NativeEndian::read_f64(c)),
    }
}

fn parse_component(token: &str, ty: ComponentType, out: &mut [u8]) -> Option<()> {
    match ty {
        ComponentType::Uint8 => out[0] = token.parse::<u8>().ok()?,
        ComponentType::Int8 => out[0] = token.parse::<i8>().ok()? as u8,
        ComponentType::Uint16 => NativeEndian::write_u16(out, token.parse().ok()?),
        ComponentType::Int16 => NativeEndian::write_i16(out, token.parse().ok()?),
        ComponentType::Uint32 => NativeEndian::write_u32(out, token.parse().ok()?),
        ComponentType::Int32 => NativeEndian::write_i32(out, token.parse().ok()?),
        ComponentType::Uint64 => NativeEndian::write_u64(out, token.parse().ok()?),
        ComponentType::Int64 => NativeEndian::write_i64(out, token.parse().ok()?),
        ComponentType::Float32 => NativeEndian::write_f32(out, token.parse().ok()?),
        ComponentType::Float64 => NativeEndian::write_f64(out, token.parse().ok()?),
    }
    Some(())
}

/// Streams decimal components out of a text payload into host-order bytes.
pub struct AsciiDecoder<R> {
    reader: R,
    component_type: ComponentType,
    token: Vec<u8>,
    /// Components consumed so far
    position: usize,
}

impl<R: BufRead> AsciiDecoder<R> {
    /// Create a decoder reading from the first payload byte of `reader`.
    pub fn new(reader: R, component_type: ComponentType) -> Self {
        Self {
            reader,
            component_type,
            token: Vec::with_capacity(32),
            position: 0,
        }
    }

    /// Number of components consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Load the next whitespace delimited token. Returns false at end of input.
    fn next_token(&mut self) -> Result<bool, DecodeError> {
        self.token.clear();
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(!self.token.is_empty());
            }
            let mut used = 0;
            let mut complete = false;
            for &b in buf {
                used += 1;
                if b.is_ascii_whitespace() {
                    if !self.token.is_empty() {
                        complete = true;
                        break;
                    }
                } else {
                    self.token.push(b);
                }
            }
            self.reader.consume(used);
            if complete {
                return Ok(true);
            }
        }
    }

    /// Skip `count` components.
    pub fn skip(&mut self, count: usize) -> Result<(), DecodeError> {
        for _ in 0..count {
            if !self.next_token()? {
                return Err(DecodeError::Truncated { count: self.position });
            }
            self.position += 1;
        }
        Ok(())
    }

    /// Decode components until `out` is full.
    pub fn decode_into(&mut self, out: &mut [u8]) -> Result<(), DecodeError> {
        let width = self.component_type.num_bytes();
        for slot in out.chunks_exact_mut(width) {
            if !self.next_token()? {
                return Err(DecodeError::Truncated { count: self.position });
            }
            let parsed = std::str::from_utf8(&self.token)
                .ok()
                .and_then(|token| parse_component(token, self.component_type, slot));
            if parsed.is_none() {
                return Err(DecodeError::Parse {
                    index: self.position,
                    token: String::from_utf8_lossy(&self.token).into_owned(),
                    component_type: self.component_type,
                });
            }
            self.position += 1;
        }
        Ok(())
    }

    /// Decode the pixels of `region` into `out`, skipping everything else.
    ///
    /// The decoder must be positioned at the first payload component and
    /// `out` must hold exactly `region.pixel_count()` pixels.
    pub fn decode_region(
        &mut self,
        descriptor: &ImageDescriptor,
        region: &ImageRegion,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        let components = descriptor.component_count();
        let run_bytes = region.size()[0] * descriptor.pixel_bytes();
        let run_components = region.size()[0] * components;

        let mut written = 0;
        for start in region.rows(descriptor) {
            let first = start * components;
            self.skip(first - self.position)?;
            self.decode_into(&mut out[written..written + run_bytes])?;
            written += run_bytes;
            debug_assert_eq!(self.position, first + run_components);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{pixels_as, pixels_from};
    use std::io::Cursor;

    fn encode(ty: ComponentType, per_line: usize, buffer: &[u8]) -> String {
        let mut out = Vec::new();
        AsciiEncoder::new(ty, per_line).encode(&mut out, buffer).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_encode_wraps_lines() {
        let text = encode(ComponentType::Uint8, 3, &[1, 2, 3, 4, 5]);
        assert_eq!(text, "1 2 3\n4 5\n");

        let text = encode(ComponentType::Uint8, 6, &[10, 20, 30, 40]);
        assert_eq!(text, "10 20 30 40\n");

        assert_eq!(encode(ComponentType::Uint8, 6, &[]), "");
    }

    #[test]
    fn test_encode_signed_and_float() {
        let text = encode(ComponentType::Int8, 6, &[0xFF, 0x7F]);
        assert_eq!(text, "-1 127\n");

        let text = encode(ComponentType::Float32, 6, &pixels_from(&[0.1f32, -2.0, 1.5e-7]));
        assert_eq!(text, "0.1 -2 0.00000015\n");
    }

    #[test]
    fn test_decode_float_text() {
        let mut decoder = AsciiDecoder::new(Cursor::new("0.1\n -2\t1e3  \n"), ComponentType::Float64);
        let mut out = vec![0u8; 24];
        decoder.decode_into(&mut out).unwrap();
        assert_eq!(pixels_as::<f64>(&out), vec![0.1, -2.0, 1000.0]);
        assert_eq!(decoder.position(), 3);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut decoder = AsciiDecoder::new(Cursor::new("1 2 x3"), ComponentType::Uint16);
        let mut out = vec![0u8; 6];
        let err = decoder.decode_into(&mut out).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { index: 2, .. }));

        let mut decoder = AsciiDecoder::new(Cursor::new("300"), ComponentType::Uint8);
        assert!(matches!(
            decoder.decode_into(&mut [0u8; 1]),
            Err(DecodeError::Parse { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let mut decoder = AsciiDecoder::new(Cursor::new("1 2"), ComponentType::Int32);
        let mut out = vec![0u8; 12];
        assert!(matches!(
            decoder.decode_into(&mut out),
            Err(DecodeError::Truncated { count: 2 })
        ));
    }

    #[test]
    fn test_decode_region_two_components() {
        // 3 x 2 image, 2 components per pixel: pixel p holds (10p, 10p+1)
        let descriptor = ImageDescriptor::d2(3, 2, ComponentType::Uint8)
            .unwrap()
            .with_component_count(2)
            .unwrap();
        let text = "0 1 10 11 20 21\n30 31 40 41 50 51\n";
        let region = ImageRegion::new(&[1, 0], &[2, 2]).unwrap();

        let mut decoder = AsciiDecoder::new(Cursor::new(text), ComponentType::Uint8);
        let mut out = vec![0u8; 8];
        decoder.decode_region(&descriptor, &region, &mut out).unwrap();
        assert_eq!(out, vec![10, 11, 20, 21, 40, 41, 50, 51]);
    }
}
