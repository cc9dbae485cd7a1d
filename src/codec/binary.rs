//! Raw binary payloads in an explicit byte order.

use std::io::{self, Write};

use crate::util::{ByteOrder, ComponentType};

/// Components per chunk when a payload has to be swapped on the way out.
const SWAP_CHUNK_COMPONENTS: usize = 64 * 1024;

/// Reverse the bytes of every `width`-byte component in place.
///
/// Converts between host order and the opposite byte order.
pub fn swap_in_place(bytes: &mut [u8], width: usize) {
    if width <= 1 {
        return;
    }
    for component in bytes.chunks_exact_mut(width) {
        component.reverse();
    }
}

/// Writes host-order component buffers in a target byte order.
#[derive(Clone, Copy, Debug)]
pub struct BinaryEncoder {
    component_type: ComponentType,
    byte_order: ByteOrder,
}

impl BinaryEncoder {
    pub fn new(component_type: ComponentType, byte_order: ByteOrder) -> Self {
        Self { component_type, byte_order }
    }

    /// Write `buffer` (host order, whole components) with no padding.
    pub fn encode<W: Write>(&self, writer: &mut W, buffer: &[u8]) -> io::Result<()> {
        let width = self.component_type.num_bytes();
        if !self.byte_order.needs_swap() || width == 1 {
            return writer.write_all(buffer);
        }

        let mut scratch = Vec::with_capacity((SWAP_CHUNK_COMPONENTS * width).min(buffer.len()));
        for chunk in buffer.chunks(SWAP_CHUNK_COMPONENTS * width) {
            scratch.clear();
            scratch.extend_from_slice(chunk);
            swap_in_place(&mut scratch, width);
            writer.write_all(&scratch)?;
        }
        Ok(())
    }
}

/// Converts on-disk binary components to host order.
#[derive(Clone, Copy, Debug)]
pub struct BinaryDecoder {
    component_type: ComponentType,
    byte_order: ByteOrder,
}

impl BinaryDecoder {
    pub fn new(component_type: ComponentType, byte_order: ByteOrder) -> Self {
        Self { component_type, byte_order }
    }

    /// Convert raw file bytes already copied into `buffer` to host order.
    pub fn decode_in_place(&self, buffer: &mut [u8]) {
        if self.byte_order.needs_swap() {
            swap_in_place(buffer, self.component_type.num_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
    use std::io::Cursor;

    use crate::util::pixels_from;

    #[test]
    fn test_encode_big_endian() {
        let values = [1u16, 0x0203, 0xFFFE];
        let mut out = Vec::new();
        BinaryEncoder::new(ComponentType::Uint16, ByteOrder::BigEndian)
            .encode(&mut out, &pixels_from(&values))
            .unwrap();

        let mut cursor = Cursor::new(out);
        for v in values {
            assert_eq!(cursor.read_u16::<BigEndian>().unwrap(), v);
        }
    }

    #[test]
    fn test_encode_little_endian_f64() {
        let values = [1.5f64, -0.25, 1e300];
        let mut out = Vec::new();
        BinaryEncoder::new(ComponentType::Float64, ByteOrder::LittleEndian)
            .encode(&mut out, &pixels_from(&values))
            .unwrap();

        let mut cursor = Cursor::new(out);
        for v in values {
            assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), v);
        }
    }

    #[test]
    fn test_decode_restores_host_order() {
        let values = [0x01020304i32, -7, i32::MIN];
        let host = pixels_from(&values);
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let mut disk = Vec::new();
            BinaryEncoder::new(ComponentType::Int32, order)
                .encode(&mut disk, &host)
                .unwrap();
            BinaryDecoder::new(ComponentType::Int32, order).decode_in_place(&mut disk);
            assert_eq!(disk, host);
        }
    }

    #[test]
    fn test_bytes_never_swapped() {
        let mut data = vec![1u8, 2, 3];
        swap_in_place(&mut data, 1);
        assert_eq!(data, vec![1, 2, 3]);
    }
}
