//! VTK legacy structured-points constants.

use crate::util::ComponentType;

/// First header line written by this crate.
pub const SIGNATURE_LINE: &str = "# vtk DataFile Version 3.0";

/// Prefix every legacy VTK file starts with, whatever its version.
pub const SIGNATURE_PREFIX: &str = "# vtk DataFile Version";

/// Canonical file suffix.
pub const EXTENSION: &str = "vtk";

/// Default title line text.
pub const DEFAULT_TITLE: &str = "VTK File Generated by gridio";

/// Marker appended to the title to record the binary byte order.
pub const BYTE_ORDER_MARKER: &str = "(byte order: ";

/// Values per line in ASCII payloads.
pub const ASCII_VALUES_PER_LINE: usize = 6;

/// Longest header line accepted.
pub const MAX_HEADER_LINE: usize = 1024;

/// Name given to the scalar array on write.
pub const SCALARS_NAME: &str = "scalars";

// Keywords
pub const KW_ASCII: &str = "ASCII";
pub const KW_BINARY: &str = "BINARY";
pub const KW_DATASET: &str = "DATASET";
pub const KW_STRUCTURED_POINTS: &str = "STRUCTURED_POINTS";
pub const KW_DIMENSIONS: &str = "DIMENSIONS";
pub const KW_SPACING: &str = "SPACING";
pub const KW_ASPECT_RATIO: &str = "ASPECT_RATIO";
pub const KW_ORIGIN: &str = "ORIGIN";
pub const KW_POINT_DATA: &str = "POINT_DATA";
pub const KW_SCALARS: &str = "SCALARS";
pub const KW_VECTORS: &str = "VECTORS";
pub const KW_LOOKUP_TABLE: &str = "LOOKUP_TABLE";

/// Name of a component type in a `SCALARS` line.
///
/// `long`/`unsigned_long` are written as 64-bit, as on LP64 platforms.
pub const fn type_name(ty: ComponentType) -> &'static str {
    match ty {
        ComponentType::Uint8 => "unsigned_char",
        ComponentType::Int8 => "char",
        ComponentType::Uint16 => "unsigned_short",
        ComponentType::Int16 => "short",
        ComponentType::Uint32 => "unsigned_int",
        ComponentType::Int32 => "int",
        ComponentType::Uint64 => "unsigned_long",
        ComponentType::Int64 => "long",
        ComponentType::Float32 => "float",
        ComponentType::Float64 => "double",
    }
}

/// Parse a `SCALARS`/`VECTORS` type name, case-insensitively.
pub fn type_from_name(name: &str) -> Option<ComponentType> {
    let ty = match name.to_ascii_lowercase().as_str() {
        "unsigned_char" => ComponentType::Uint8,
        "char" | "signed_char" => ComponentType::Int8,
        "unsigned_short" => ComponentType::Uint16,
        "short" => ComponentType::Int16,
        "unsigned_int" => ComponentType::Uint32,
        "int" => ComponentType::Int32,
        "unsigned_long" | "vtktypeuint64" => ComponentType::Uint64,
        "long" | "vtktypeint64" => ComponentType::Int64,
        "float" => ComponentType::Float32,
        "double" => ComponentType::Float64,
        _ => return None,
    };
    Some(ty)
}
