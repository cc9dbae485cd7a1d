//! Pixel component types - the scalar storage types a dataset can hold.

use bytemuck::Pod;
use std::fmt;

/// Scalar type of one pixel component.
///
/// Each type has a fixed size and a well-defined binary representation.
/// Multi-component pixels (vectors, RGB, ...) are several components of the
/// same type stored interleaved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ComponentType {
    /// Unsigned 8-bit integer
    #[default]
    Uint8 = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 16-bit integer
    Uint16 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 32-bit integer
    Uint32 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 64-bit integer
    Uint64 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 8,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 9,
}

impl ComponentType {
    /// Number of component types.
    pub const COUNT: usize = 10;

    /// Size in bytes of the widest component type.
    pub const MAX_BYTES: usize = 8;

    /// All component types, in tag order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Uint64,
        Self::Int64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single component of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the short Rust-style name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "u8",
            Self::Int8 => "i8",
            Self::Uint16 => "u16",
            Self::Int16 => "i16",
            Self::Uint32 => "u32",
            Self::Int32 => "i32",
            Self::Uint64 => "u64",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        }
    }

    /// Returns true for IEEE floating point types.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns true for signed integer and floating point types.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust scalar types that map onto a [`ComponentType`].
///
/// Used for typed views over raw pixel buffers.
pub trait Component: Pod {
    /// The component tag for this Rust type.
    const TYPE: ComponentType;
}

macro_rules! impl_component {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(impl Component for $ty {
            const TYPE: ComponentType = ComponentType::$tag;
        })*
    };
}

impl_component! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

/// Copy a host-order byte buffer into a typed vector.
///
/// Works regardless of the alignment of `bytes`; trailing bytes that do not
/// form a whole component are ignored.
pub fn pixels_as<T: Component>(bytes: &[u8]) -> Vec<T> {
    let whole = bytes.len() - bytes.len() % T::TYPE.num_bytes();
    bytemuck::pod_collect_to_vec(&bytes[..whole])
}

/// Serialize typed components into a host-order byte buffer.
pub fn pixels_from<T: Component>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}
