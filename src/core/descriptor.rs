//! Image metadata: geometry and pixel layout of a dataset.

use smallvec::SmallVec;
use std::fmt;

use crate::util::{ByteOrder, ComponentType, Encoding, Error, Result};

/// Largest dimension count a descriptor can describe.
pub const MAX_DIMENSIONS: usize = 4;

/// Per-axis storage. Inline for the common 2-D/3-D case.
pub type AxisVec<T> = SmallVec<[T; 3]>;

/// Describes an image dataset independently of any file format.
///
/// A descriptor is a plain value: every constructor and setter validates its
/// invariants, so a descriptor that exists is always consistent.
///
/// - `extent`, `spacing` and `origin` all have `dimension_count()` entries
/// - every extent is positive
/// - `component_count >= 1`
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDescriptor {
    extent: AxisVec<usize>,
    spacing: AxisVec<f64>,
    origin: AxisVec<f64>,
    component_type: ComponentType,
    component_count: usize,
    byte_order: ByteOrder,
    encoding: Encoding,
}

impl ImageDescriptor {
    /// Create a scalar descriptor with unit spacing, zero origin, host byte
    /// order and ASCII encoding.
    pub fn new(extent: &[usize], component_type: ComponentType) -> Result<Self> {
        check_extent(extent, 1)?;
        let dims = extent.len();
        Ok(Self {
            extent: SmallVec::from_slice(extent),
            spacing: smallvec::smallvec![1.0; dims],
            origin: smallvec::smallvec![0.0; dims],
            component_type,
            component_count: 1,
            byte_order: ByteOrder::native(),
            encoding: Encoding::Ascii,
        })
    }

    /// Create a 2-D descriptor.
    pub fn d2(width: usize, height: usize, component_type: ComponentType) -> Result<Self> {
        Self::new(&[width, height], component_type)
    }

    /// Create a 3-D descriptor.
    pub fn d3(width: usize, height: usize, depth: usize, component_type: ComponentType) -> Result<Self> {
        Self::new(&[width, height, depth], component_type)
    }

    pub fn with_spacing(mut self, spacing: &[f64]) -> Result<Self> {
        self.set_spacing(spacing)?;
        Ok(self)
    }

    pub fn with_origin(mut self, origin: &[f64]) -> Result<Self> {
        self.set_origin(origin)?;
        Ok(self)
    }

    pub fn with_component_count(mut self, count: usize) -> Result<Self> {
        self.set_component_count(count)?;
        Ok(self)
    }

    pub fn with_component_type(mut self, component_type: ComponentType) -> Self {
        self.component_type = component_type;
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    // === Accessors ===

    /// Number of axes.
    #[inline]
    pub fn dimension_count(&self) -> usize {
        self.extent.len()
    }

    #[inline]
    pub fn extent(&self) -> &[usize] {
        &self.extent
    }

    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    #[inline]
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    #[inline]
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    // === Setters ===

    /// Replace the extent. Spacing and origin are reset when the dimension
    /// count changes.
    pub fn set_extent(&mut self, extent: &[usize]) -> Result<()> {
        check_extent(extent, self.component_count)?;
        if extent.len() != self.extent.len() {
            self.spacing = smallvec::smallvec![1.0; extent.len()];
            self.origin = smallvec::smallvec![0.0; extent.len()];
        }
        self.extent = SmallVec::from_slice(extent);
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        self.check_axis_len("spacing", spacing.len())?;
        self.spacing = SmallVec::from_slice(spacing);
        Ok(())
    }

    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        self.check_axis_len("origin", origin.len())?;
        self.origin = SmallVec::from_slice(origin);
        Ok(())
    }

    pub fn set_component_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::invalid("component count must be at least 1"));
        }
        check_extent(&self.extent, count)?;
        self.component_count = count;
        Ok(())
    }

    pub fn set_component_type(&mut self, component_type: ComponentType) {
        self.component_type = component_type;
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    // === Derived sizes ===

    /// Total number of pixels (product of the extent).
    pub fn pixel_count(&self) -> usize {
        self.extent.iter().product()
    }

    /// Total number of scalar components in the image.
    pub fn component_total(&self) -> usize {
        self.pixel_count() * self.component_count
    }

    /// Size of one pixel in bytes.
    #[inline]
    pub fn pixel_bytes(&self) -> usize {
        self.component_count * self.component_type.num_bytes()
    }

    /// Size of the whole pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixel_count() * self.pixel_bytes()
    }

    /// Return a 3-axis copy: a 2-D descriptor gains a third axis of size 1,
    /// spacing 1 and origin 0. Other dimension counts are returned as is.
    pub fn to_3d(&self) -> Self {
        let mut out = self.clone();
        if out.dimension_count() == 2 {
            out.extent.push(1);
            out.spacing.push(1.0);
            out.origin.push(0.0);
        }
        out
    }

    /// True when both descriptors describe the same pixel layout
    /// (extent, component type and count), ignoring geometry and encoding.
    pub fn matches_layout(&self, other: &Self) -> bool {
        self.extent == other.extent
            && self.component_type == other.component_type
            && self.component_count == other.component_count
    }

    fn check_axis_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.dimension_count() {
            return Err(Error::invalid(format!(
                "{} has {} entries but the image has {} dimensions",
                what,
                len,
                self.dimension_count()
            )));
        }
        Ok(())
    }
}

/// Byte size of an image with `extent` and `component_count` components of
/// the widest type, or `None` when that does not fit in `usize`.
///
/// Every descriptor satisfies this bound, so its size arithmetic never
/// overflows whatever component type it is given.
pub fn checked_storage(extent: &[usize], component_count: usize) -> Option<usize> {
    extent
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))?
        .checked_mul(component_count)?
        .checked_mul(ComponentType::MAX_BYTES)
}

fn check_extent(extent: &[usize], component_count: usize) -> Result<()> {
    if extent.is_empty() || extent.len() > MAX_DIMENSIONS {
        return Err(Error::invalid(format!(
            "dimension count {} outside 1..={}",
            extent.len(),
            MAX_DIMENSIONS
        )));
    }
    if let Some(axis) = extent.iter().position(|&n| n == 0) {
        return Err(Error::invalid(format!("extent of axis {} must be positive", axis)));
    }
    if checked_storage(extent, component_count).is_none() {
        return Err(Error::invalid(format!("image of extent {:?} is too large to address", extent)));
    }
    Ok(())
}

impl fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.extent.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "] {}", self.component_type)?;
        if self.component_count > 1 {
            write!(f, "[{}]", self.component_count)?;
        }
        Ok(())
    }
}
