//! Byte order and payload encoding tags.

use std::fmt;

/// Byte order of binary payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the host this code runs on.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::BigEndian
        } else {
            Self::LittleEndian
        }
    }

    /// True when data in this order must be swapped to reach host order.
    #[inline]
    pub fn needs_swap(self) -> bool {
        self != Self::native()
    }

    /// Hyphenated lowercase name ("little-endian" / "big-endian").
    pub const fn name(self) -> &'static str {
        match self {
            Self::LittleEndian => "little-endian",
            Self::BigEndian => "big-endian",
        }
    }

    /// Parse the name produced by [`ByteOrder::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "little-endian" => Some(Self::LittleEndian),
            "big-endian" => Some(Self::BigEndian),
            _ => None,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload encoding on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Whitespace separated decimal text
    #[default]
    Ascii,
    /// Raw component bytes
    Binary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_never_needs_swap() {
        assert!(!ByteOrder::native().needs_swap());
        let other = match ByteOrder::native() {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
        };
        assert!(other.needs_swap());
    }

    #[test]
    fn test_byte_order_names() {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            assert_eq!(ByteOrder::from_name(order.name()), Some(order));
        }
        assert_eq!(ByteOrder::from_name("middle-endian"), None);
    }
}
