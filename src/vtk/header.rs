//! Structured-points header parsing and emission.
//!
//! ```text
//! # vtk DataFile Version 3.0
//! <title> (byte order: big-endian)
//! ASCII | BINARY
//! DATASET STRUCTURED_POINTS
//! DIMENSIONS <nx> <ny> <nz>
//! SPACING <sx> <sy> <sz>
//! ORIGIN <ox> <oy> <oz>
//! POINT_DATA <nx*ny*nz>
//! SCALARS <name> <type> <components>
//! LOOKUP_TABLE default
//! <payload>
//! ```

use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::str::FromStr;

use super::format::*;
use crate::core::{checked_storage, ImageDescriptor};
use crate::util::{ByteOrder, ComponentType, Encoding, Error, Result};

/// Longest title written, in bytes.
pub const MAX_TITLE_LEN: usize = 256;

/// Parsed or to-be-written structured-points header.
#[derive(Clone, Debug, PartialEq)]
pub struct VtkHeader {
    /// Title without the byte order marker
    pub title: String,
    /// Byte order recorded in the title, if any
    pub byte_order: Option<ByteOrder>,
    pub encoding: Encoding,
    /// 2 when the third axis is the padding written for 2-D images, else 3
    pub dimension_count: usize,
    pub dimensions: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub scalars_name: String,
    pub component_type: ComponentType,
    pub component_count: usize,
    /// Absolute file position of the first payload byte
    pub payload_offset: u64,
}

impl VtkHeader {
    /// Build the header for writing `descriptor`.
    ///
    /// Fails with [`Error::Dimensionality`] unless the descriptor is 2-D or
    /// 3-D. A 2-D descriptor is padded to a 3-axis header.
    pub fn from_descriptor(path: &Path, descriptor: &ImageDescriptor, title: &str) -> Result<Self> {
        let dimension_count = descriptor.dimension_count();
        if !(2..=3).contains(&dimension_count) {
            return Err(Error::Dimensionality {
                path: path.to_path_buf(),
                dimensions: dimension_count,
            });
        }
        let padded = descriptor.to_3d();
        Ok(Self {
            title: sanitize_title(title),
            byte_order: Some(descriptor.byte_order()),
            encoding: descriptor.encoding(),
            dimension_count,
            dimensions: axis3(padded.extent()),
            spacing: axis3(padded.spacing()),
            origin: axis3(padded.origin()),
            scalars_name: SCALARS_NAME.to_string(),
            component_type: descriptor.component_type(),
            component_count: descriptor.component_count(),
            payload_offset: 0,
        })
    }

    /// Number of points (pixels) in the dataset.
    pub fn point_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Size of a binary payload in bytes.
    pub fn payload_bytes(&self) -> usize {
        self.point_count() * self.component_count * self.component_type.num_bytes()
    }

    /// Convert to a descriptor. `default_order` is used when the file does
    /// not record its byte order.
    pub fn to_descriptor(&self, default_order: ByteOrder) -> Result<ImageDescriptor> {
        let n = self.dimension_count;
        Ok(ImageDescriptor::new(&self.dimensions[..n], self.component_type)?
            .with_spacing(&self.spacing[..n])?
            .with_origin(&self.origin[..n])?
            .with_component_count(self.component_count)?
            .with_byte_order(self.byte_order.unwrap_or(default_order))
            .with_encoding(self.encoding))
    }

    /// Emit the header, fields in fixed order, ending with the line after
    /// which the payload starts.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", SIGNATURE_LINE)?;
        match self.byte_order {
            Some(order) => writeln!(w, "{} {}{})", self.title, BYTE_ORDER_MARKER, order.name())?,
            None => writeln!(w, "{}", self.title)?,
        }
        match self.encoding {
            Encoding::Ascii => writeln!(w, "{}", KW_ASCII)?,
            Encoding::Binary => writeln!(w, "{}", KW_BINARY)?,
        }
        writeln!(w, "{} {}", KW_DATASET, KW_STRUCTURED_POINTS)?;

        let [nx, ny, nz] = self.dimensions;
        let [sx, sy, sz] = self.spacing;
        let [ox, oy, oz] = self.origin;
        if self.dimension_count == 2 {
            writeln!(w, "{} {} {} 1", KW_DIMENSIONS, nx, ny)?;
            writeln!(w, "{} {} {} 1.0", KW_SPACING, sx, sy)?;
            writeln!(w, "{} {} {} 0.0", KW_ORIGIN, ox, oy)?;
        } else {
            writeln!(w, "{} {} {} {}", KW_DIMENSIONS, nx, ny, nz)?;
            writeln!(w, "{} {} {} {}", KW_SPACING, sx, sy, sz)?;
            writeln!(w, "{} {} {} {}", KW_ORIGIN, ox, oy, oz)?;
        }

        writeln!(w, "{} {}", KW_POINT_DATA, self.point_count())?;
        writeln!(
            w,
            "{} {} {} {}",
            KW_SCALARS,
            self.scalars_name,
            type_name(self.component_type),
            self.component_count
        )?;
        writeln!(w, "{} default", KW_LOOKUP_TABLE)
    }

    /// Parse a header from the start of `reader`, leaving
    /// [`payload_offset`](Self::payload_offset) at the first payload byte.
    ///
    /// The reader may have consumed bytes past the payload start; callers
    /// seek to `payload_offset` before decoding.
    pub fn parse<R: BufRead>(reader: &mut R, path: &Path) -> Result<Self> {
        let mut lines = HeaderLines { reader, path, pos: 0, buf: Vec::new() };

        let signature = lines.next_line()?.unwrap_or_default();
        if !signature.starts_with(SIGNATURE_PREFIX) {
            return Err(Error::format(path, "missing '# vtk DataFile Version' signature"));
        }

        let raw_title = lines.next_line()?.ok_or_else(|| lines.eof("title"))?;
        let (title, byte_order) = split_title(&raw_title);

        let encoding_line = lines.required("ASCII or BINARY")?;
        let encoding = if encoding_line.eq_ignore_ascii_case(KW_ASCII) {
            Encoding::Ascii
        } else if encoding_line.eq_ignore_ascii_case(KW_BINARY) {
            Encoding::Binary
        } else {
            return Err(Error::format(path, format!("expected ASCII or BINARY, found {:?}", encoding_line)));
        };

        let dataset = lines.required("DATASET")?;
        let mut tokens = dataset.split_whitespace();
        if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case(KW_DATASET)) {
            return Err(Error::format(path, format!("expected DATASET, found {:?}", dataset)));
        }
        match tokens.next() {
            Some(kind) if kind.eq_ignore_ascii_case(KW_STRUCTURED_POINTS) => {}
            other => {
                return Err(Error::format(
                    path,
                    format!("unsupported dataset {}, only STRUCTURED_POINTS is handled", other.unwrap_or("<none>")),
                ))
            }
        }

        let mut dimensions = None;
        let mut spacing = [1.0; 3];
        let mut origin = [0.0; 3];
        let point_count: usize = loop {
            let line = lines.required("POINT_DATA")?;
            let mut tokens = line.split_whitespace();
            let keyword = tokens.next().unwrap_or_default().to_ascii_uppercase();
            match keyword.as_str() {
                KW_DIMENSIONS => dimensions = Some(triple::<usize>(path, KW_DIMENSIONS, tokens)?),
                KW_SPACING | KW_ASPECT_RATIO => spacing = triple(path, KW_SPACING, tokens)?,
                KW_ORIGIN => origin = triple(path, KW_ORIGIN, tokens)?,
                KW_POINT_DATA => break single(path, KW_POINT_DATA, tokens.next())?,
                _ => {
                    return Err(Error::format(
                        path,
                        format!("unexpected {:?} in structured points header", keyword),
                    ))
                }
            }
        };

        let dimensions = dimensions.ok_or_else(|| Error::format(path, "DIMENSIONS missing"))?;
        if dimensions.contains(&0) {
            return Err(Error::format(path, "DIMENSIONS must be positive"));
        }
        let declared = dimensions
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| Error::format(path, "DIMENSIONS overflow"))?;
        if point_count != declared {
            return Err(Error::format(
                path,
                format!("POINT_DATA {} does not match DIMENSIONS {:?}", point_count, dimensions),
            ));
        }

        let attribute = lines.required("SCALARS")?;
        let mut tokens = attribute.split_whitespace();
        let keyword = tokens.next().unwrap_or_default().to_ascii_uppercase();
        let scalars_name = tokens.next().unwrap_or_default().to_string();
        let type_token = tokens.next().unwrap_or_default();
        let component_type = type_from_name(type_token)
            .ok_or_else(|| Error::format(path, format!("unsupported component type {:?}", type_token)))?;
        let component_count = match keyword.as_str() {
            KW_SCALARS => match tokens.next() {
                Some(token) => single(path, KW_SCALARS, Some(token))?,
                None => 1,
            },
            KW_VECTORS => 3,
            _ => {
                return Err(Error::format(path, format!("expected SCALARS or VECTORS, found {:?}", attribute)))
            }
        };
        if component_count == 0 {
            return Err(Error::format(path, "component count must be at least 1"));
        }
        if checked_storage(&dimensions, component_count).is_none() {
            return Err(Error::format(path, "DIMENSIONS overflow"));
        }

        let payload_offset = if keyword == KW_SCALARS {
            lines.skip_lookup_table(encoding)?
        } else {
            lines.pos
        };

        Ok(Self {
            title,
            byte_order,
            encoding,
            dimension_count: if is_padded_2d(&dimensions, &spacing, &origin) { 2 } else { 3 },
            dimensions,
            spacing,
            origin,
            scalars_name,
            component_type,
            component_count,
            payload_offset,
        })
    }
}

/// Line reader tracking the absolute position of the next unread byte.
struct HeaderLines<'a, R> {
    reader: &'a mut R,
    path: &'a Path,
    pos: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> HeaderLines<'_, R> {
    /// Read one raw line, at most `limit` bytes. Returns false at end of file.
    fn read_raw(&mut self, limit: usize) -> Result<bool> {
        self.buf.clear();
        let n = (&mut *self.reader)
            .take(limit as u64)
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| Error::io(self.path, "read", e))?;
        self.pos += n as u64;
        Ok(n > 0)
    }

    /// Next line with surrounding whitespace removed, or `None` at end of file.
    fn next_line(&mut self) -> Result<Option<String>> {
        if !self.read_raw(MAX_HEADER_LINE)? {
            return Ok(None);
        }
        if self.buf.last() != Some(&b'\n') && self.buf.len() == MAX_HEADER_LINE {
            return Err(Error::format(self.path, "header line too long"));
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).trim().to_string()))
    }

    /// Next non-blank line, failing at end of file.
    fn required(&mut self, what: &str) -> Result<String> {
        loop {
            match self.next_line()? {
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(line),
                None => return Err(self.eof(what)),
            }
        }
    }

    fn eof(&self, what: &str) -> Error {
        Error::format(self.path, format!("unexpected end of header, expected {}", what))
    }

    /// Consume an optional `LOOKUP_TABLE` line and return the payload offset.
    ///
    /// Binary payloads start right after the attribute line when there is no
    /// lookup table, so only the very next line is examined there. In text
    /// payloads blank lines are skipped first.
    fn skip_lookup_table(&mut self, encoding: Encoding) -> Result<u64> {
        loop {
            let line_start = self.pos;
            if !self.read_raw(MAX_HEADER_LINE)? {
                return Ok(line_start);
            }
            let start = self
                .buf
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(self.buf.len());
            let trimmed = &self.buf[start..];
            if encoding == Encoding::Ascii && trimmed.is_empty() {
                continue;
            }
            let is_lookup = trimmed.len() >= KW_LOOKUP_TABLE.len()
                && trimmed[..KW_LOOKUP_TABLE.len()].eq_ignore_ascii_case(KW_LOOKUP_TABLE.as_bytes());
            if is_lookup && self.buf.last() == Some(&b'\n') {
                return Ok(self.pos);
            }
            return Ok(line_start);
        }
    }
}

/// Split a title line into text and the recorded byte order.
fn split_title(raw: &str) -> (String, Option<ByteOrder>) {
    if let Some(idx) = raw.rfind(BYTE_ORDER_MARKER) {
        let rest = &raw[idx + BYTE_ORDER_MARKER.len()..];
        if let Some(order) = rest.find(')').and_then(|end| ByteOrder::from_name(&rest[..end])) {
            return (raw[..idx].trim_end().to_string(), Some(order));
        }
    }
    (raw.to_string(), None)
}

/// Single line, bounded length title.
fn sanitize_title(title: &str) -> String {
    let mut clean: String = title
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if clean.len() > MAX_TITLE_LEN {
        let mut cut = MAX_TITLE_LEN;
        while !clean.is_char_boundary(cut) {
            cut -= 1;
        }
        clean.truncate(cut);
    }
    clean
}

/// True when the third axis is exactly the padding a 2-D image is written
/// with. Any other degenerate third axis stays 3-D so its geometry survives.
fn is_padded_2d(dimensions: &[usize; 3], spacing: &[f64; 3], origin: &[f64; 3]) -> bool {
    dimensions[2] == 1 && spacing[2] == 1.0 && origin[2] == 0.0
}

fn axis3<T: Copy>(values: &[T]) -> [T; 3] {
    [values[0], values[1], values[2]]
}

fn single<T: FromStr>(path: &Path, keyword: &str, token: Option<&str>) -> Result<T> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| Error::format(path, format!("{} has an invalid value", keyword)))
}

fn triple<'t, T: FromStr + Copy>(
    path: &Path,
    keyword: &str,
    mut tokens: impl Iterator<Item = &'t str>,
) -> Result<[T; 3]> {
    let values = [
        single(path, keyword, tokens.next())?,
        single(path, keyword, tokens.next())?,
        single(path, keyword, tokens.next())?,
    ];
    if tokens.next().is_some() {
        return Err(Error::format(path, format!("{} expects 3 values", keyword)));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<VtkHeader> {
        VtkHeader::parse(&mut Cursor::new(text.as_bytes()), Path::new("test.vtk"))
    }

    const MINIMAL: &str = "# vtk DataFile Version 3.0\n\
        title\n\
        ASCII\n\
        DATASET STRUCTURED_POINTS\n\
        DIMENSIONS 3 2 1\n\
        SPACING 0.5 2 1\n\
        ORIGIN 1 2 0\n\
        POINT_DATA 6\n\
        SCALARS scalars short 1\n\
        LOOKUP_TABLE default\n\
        1 2 3 4 5 6\n";

    #[test]
    fn test_parse_minimal() {
        let header = parse(MINIMAL).unwrap();
        assert_eq!(header.title, "title");
        assert_eq!(header.byte_order, None);
        assert_eq!(header.encoding, Encoding::Ascii);
        assert_eq!(header.dimension_count, 2);
        assert_eq!(header.dimensions, [3, 2, 1]);
        assert_eq!(header.spacing, [0.5, 2.0, 1.0]);
        assert_eq!(header.origin, [1.0, 2.0, 0.0]);
        assert_eq!(header.component_type, ComponentType::Int16);
        assert_eq!(header.component_count, 1);
        assert_eq!(header.payload_offset as usize, MINIMAL.find("1 2 3 4").unwrap());

        let d = header.to_descriptor(ByteOrder::BigEndian).unwrap();
        assert_eq!(d.extent(), &[3, 2]);
        assert_eq!(d.spacing(), &[0.5, 2.0]);
        assert_eq!(d.byte_order(), ByteOrder::BigEndian);
    }

    #[test]
    fn test_parse_lenient_variants() {
        let text = "# vtk DataFile Version 2.0\n\
            old file (byte order: little-endian)\n\
            binary\n\
            \n\
            dataset structured_points\n\
            ASPECT_RATIO 1 1 3\n\
            DIMENSIONS 2 2 2\n\
            POINT_DATA 8\n\
            SCALARS density float\n";
        let header = parse(text).unwrap();
        assert_eq!(header.title, "old file");
        assert_eq!(header.byte_order, Some(ByteOrder::LittleEndian));
        assert_eq!(header.encoding, Encoding::Binary);
        assert_eq!(header.dimension_count, 3);
        assert_eq!(header.spacing, [1.0, 1.0, 3.0]);
        assert_eq!(header.origin, [0.0; 3]);
        assert_eq!(header.scalars_name, "density");
        assert_eq!(header.component_count, 1);
        // No lookup table: payload starts right after SCALARS
        assert_eq!(header.payload_offset as usize, text.len());
    }

    #[test]
    fn test_parse_vectors() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET STRUCTURED_POINTS\n\
            DIMENSIONS 1 1 1\nPOINT_DATA 1\nVECTORS v double\n1 2 3\n";
        let header = parse(text).unwrap();
        assert_eq!(header.component_count, 3);
        assert_eq!(header.component_type, ComponentType::Float64);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(Error::Format { .. })));
        assert!(matches!(parse("P5\n2 2\n255\n"), Err(Error::Format { .. })));

        let polydata = MINIMAL.replace("STRUCTURED_POINTS", "POLYDATA");
        assert!(matches!(parse(&polydata), Err(Error::Format { .. })));

        let wrong_count = MINIMAL.replace("POINT_DATA 6", "POINT_DATA 7");
        assert!(matches!(parse(&wrong_count), Err(Error::Format { .. })));

        let bad_type = MINIMAL.replace("short", "bit");
        assert!(matches!(parse(&bad_type), Err(Error::Format { .. })));

        let truncated = &MINIMAL[..MINIMAL.find("POINT_DATA").unwrap()];
        assert!(matches!(parse(truncated), Err(Error::Format { .. })));

        let two_dims = MINIMAL.replace("DIMENSIONS 3 2 1", "DIMENSIONS 3 2");
        assert!(matches!(parse(&two_dims), Err(Error::Format { .. })));
    }

    #[test]
    fn test_write_2d_scenario() {
        let descriptor = ImageDescriptor::d2(2, 2, ComponentType::Uint8).unwrap();
        let header = VtkHeader::from_descriptor(Path::new("a.vtk"), &descriptor, DEFAULT_TITLE).unwrap();
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], SIGNATURE_LINE);
        assert!(lines[1].starts_with(DEFAULT_TITLE));
        assert_eq!(lines[2], "ASCII");
        assert_eq!(lines[3], "DATASET STRUCTURED_POINTS");
        assert_eq!(lines[4], "DIMENSIONS 2 2 1");
        assert_eq!(lines[5], "SPACING 1 1 1.0");
        assert_eq!(lines[6], "ORIGIN 0 0 0.0");
        assert_eq!(lines[7], "POINT_DATA 4");
        assert_eq!(lines[8], "SCALARS scalars unsigned_char 1");
        assert_eq!(lines[9], "LOOKUP_TABLE default");
    }

    #[test]
    fn test_write_3d_separates_every_axis() {
        let descriptor = ImageDescriptor::d3(12, 34, 56, ComponentType::Float32)
            .unwrap()
            .with_spacing(&[0.5, 0.25, 2.0])
            .unwrap()
            .with_encoding(Encoding::Binary);
        let header = VtkHeader::from_descriptor(Path::new("a.vtk"), &descriptor, "t").unwrap();
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\nBINARY\n"));
        assert!(text.contains("\nDIMENSIONS 12 34 56\n"));
        assert!(text.contains("\nSPACING 0.5 0.25 2\n"));
        assert!(text.contains("\nPOINT_DATA 22848\n"));
    }

    #[test]
    fn test_written_header_parses_back() {
        let descriptor = ImageDescriptor::d3(4, 5, 6, ComponentType::Int32)
            .unwrap()
            .with_origin(&[-1.5, 0.0, 3.25])
            .unwrap()
            .with_component_count(2)
            .unwrap()
            .with_byte_order(ByteOrder::LittleEndian);
        let header = VtkHeader::from_descriptor(Path::new("a.vtk"), &descriptor, "round trip").unwrap();
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();

        let parsed = parse(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(parsed.payload_offset as usize, out.len());
        assert_eq!(parsed.to_descriptor(ByteOrder::BigEndian).unwrap(), descriptor);
    }

    #[test]
    fn test_dimensionality_gate() {
        for extent in [&[4usize][..], &[2, 2, 2, 2][..]] {
            let descriptor = ImageDescriptor::new(extent, ComponentType::Uint8).unwrap();
            assert!(matches!(
                VtkHeader::from_descriptor(Path::new("a.vtk"), &descriptor, "t"),
                Err(Error::Dimensionality { .. })
            ));
        }
    }

    #[test]
    fn test_degenerate_third_axis_stays_3d() {
        let text = MINIMAL.replace("SPACING 0.5 2 1", "SPACING 0.5 2 2.5");
        let header = parse(&text).unwrap();
        assert_eq!(header.dimension_count, 3);
        let d = header.to_descriptor(ByteOrder::BigEndian).unwrap();
        assert_eq!(d.extent(), &[3, 2, 1]);
        assert_eq!(d.spacing(), &[0.5, 2.0, 2.5]);

        let text = MINIMAL.replace("ORIGIN 1 2 0", "ORIGIN 1 2 7");
        assert_eq!(parse(&text).unwrap().dimension_count, 3);
    }

    #[test]
    fn test_dimension_overflow() {
        let huge = MINIMAL
            .replace("DIMENSIONS 3 2 1", "DIMENSIONS 4294967296 4294967296 2")
            .replace("POINT_DATA 6", "POINT_DATA 0");
        assert!(matches!(parse(&huge), Err(Error::Format { .. })));

        // Point count fits but the byte size does not
        let wide = MINIMAL
            .replace("DIMENSIONS 3 2 1", &format!("DIMENSIONS {} 1 1", usize::MAX / 2))
            .replace("POINT_DATA 6", &format!("POINT_DATA {}", usize::MAX / 2));
        assert!(matches!(parse(&wide), Err(Error::Format { .. })));
    }

    #[test]
    fn test_title_sanitized() {
        assert_eq!(sanitize_title("a\nb\rc"), "a b c");
        assert_eq!(sanitize_title(&"x".repeat(300)).len(), MAX_TITLE_LEN);
        assert_eq!(split_title("no marker"), ("no marker".to_string(), None));
        assert_eq!(
            split_title("t (byte order: sideways)"),
            ("t (byte order: sideways)".to_string(), None)
        );
    }
}
