//! Sub-rectangles of an image's index space for partial I/O.

use smallvec::SmallVec;

use super::descriptor::{AxisVec, ImageDescriptor};
use crate::util::{Error, Result};

/// A sub-rectangle of a dataset, as an index offset plus a size per axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRegion {
    offset: AxisVec<usize>,
    size: AxisVec<usize>,
}

impl ImageRegion {
    /// Create a region from per-axis offsets and sizes.
    pub fn new(offset: &[usize], size: &[usize]) -> Result<Self> {
        if offset.len() != size.len() {
            return Err(Error::invalid(format!(
                "region offset has {} axes but size has {}",
                offset.len(),
                size.len()
            )));
        }
        if offset.is_empty() {
            return Err(Error::invalid("region must have at least one axis"));
        }
        Ok(Self {
            offset: SmallVec::from_slice(offset),
            size: SmallVec::from_slice(size),
        })
    }

    /// The region covering the whole image.
    pub fn full(descriptor: &ImageDescriptor) -> Self {
        Self {
            offset: smallvec::smallvec![0; descriptor.dimension_count()],
            size: SmallVec::from_slice(descriptor.extent()),
        }
    }

    #[inline]
    pub fn offset(&self) -> &[usize] {
        &self.offset
    }

    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[inline]
    pub fn dimension_count(&self) -> usize {
        self.size.len()
    }

    /// Number of pixels covered by the region.
    pub fn pixel_count(&self) -> usize {
        self.size.iter().product()
    }

    /// True when the region covers the whole image described by `descriptor`.
    pub fn is_full(&self, descriptor: &ImageDescriptor) -> bool {
        self.offset.iter().all(|&o| o == 0) && self.size.as_slice() == descriptor.extent()
    }

    /// Check that the region lies inside the image.
    pub fn validate_against(&self, descriptor: &ImageDescriptor) -> Result<()> {
        if self.dimension_count() != descriptor.dimension_count() {
            return Err(Error::invalid(format!(
                "region has {} axes but the image has {}",
                self.dimension_count(),
                descriptor.dimension_count()
            )));
        }
        for (axis, ((&offset, &size), &extent)) in self
            .offset
            .iter()
            .zip(self.size.iter())
            .zip(descriptor.extent())
            .enumerate()
        {
            if offset.checked_add(size).map_or(true, |end| end > extent) {
                return Err(Error::Region { axis, offset, size, extent });
            }
        }
        Ok(())
    }

    /// Iterate the linear pixel index where each contiguous x-run of the
    /// region starts. Every run is `size()[0]` pixels long.
    ///
    /// The region must already be validated against `descriptor`.
    pub fn rows<'a>(&'a self, descriptor: &ImageDescriptor) -> RowStarts<'a> {
        let mut strides: AxisVec<usize> = SmallVec::with_capacity(self.dimension_count());
        let mut stride = 1;
        for &n in descriptor.extent() {
            strides.push(stride);
            stride *= n;
        }
        let remaining = if self.size[0] == 0 {
            0
        } else {
            self.size[1..].iter().product()
        };
        RowStarts {
            region: self,
            strides,
            counter: smallvec::smallvec![0; self.dimension_count()],
            remaining,
        }
    }
}

/// Iterator returned by [`ImageRegion::rows`].
pub struct RowStarts<'a> {
    region: &'a ImageRegion,
    strides: AxisVec<usize>,
    /// Position within the region along axes 1.., axis 0 unused
    counter: AxisVec<usize>,
    remaining: usize,
}

impl Iterator for RowStarts<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let start = (0..self.counter.len())
            .map(|axis| (self.region.offset[axis] + self.counter[axis]) * self.strides[axis])
            .sum();

        // Odometer increment over axes 1..
        for axis in 1..self.counter.len() {
            self.counter[axis] += 1;
            if self.counter[axis] < self.region.size[axis] {
                break;
            }
            self.counter[axis] = 0;
        }
        Some(start)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RowStarts<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ComponentType;

    fn image(extent: &[usize]) -> ImageDescriptor {
        ImageDescriptor::new(extent, ComponentType::Uint8).unwrap()
    }

    #[test]
    fn test_full_region() {
        let d = image(&[4, 3]);
        let r = ImageRegion::full(&d);
        assert_eq!(r.offset(), &[0, 0]);
        assert_eq!(r.size(), &[4, 3]);
        assert!(r.is_full(&d));
        assert!(r.validate_against(&d).is_ok());
        assert_eq!(r.rows(&d).collect::<Vec<_>>(), vec![0, 4, 8]);
    }

    #[test]
    fn test_containment() {
        let d = image(&[4, 3]);
        let ok = ImageRegion::new(&[1, 1], &[3, 2]).unwrap();
        assert!(ok.validate_against(&d).is_ok());

        let bad = ImageRegion::new(&[1, 2], &[3, 2]).unwrap();
        assert!(matches!(
            bad.validate_against(&d),
            Err(Error::Region { axis: 1, offset: 2, size: 2, extent: 3 })
        ));

        let overflow = ImageRegion::new(&[usize::MAX, 0], &[2, 1]).unwrap();
        assert!(matches!(overflow.validate_against(&d), Err(Error::Region { axis: 0, .. })));
    }

    #[test]
    fn test_rank_mismatch() {
        let d = image(&[4, 3]);
        let r = ImageRegion::new(&[0, 0, 0], &[1, 1, 1]).unwrap();
        assert!(matches!(r.validate_against(&d), Err(Error::InvalidDescriptor(_))));
        assert!(ImageRegion::new(&[0], &[1, 1]).is_err());
    }

    #[test]
    fn test_rows_3d() {
        // 4 x 3 x 2 volume, region x:1..3, y:1..3, z:1..2
        let d = image(&[4, 3, 2]);
        let r = ImageRegion::new(&[1, 1, 1], &[2, 2, 1]).unwrap();
        r.validate_against(&d).unwrap();
        let rows: Vec<_> = r.rows(&d).collect();
        // z=1 plane starts at 12; y=1 -> +4, y=2 -> +8; x offset 1
        assert_eq!(rows, vec![17, 21]);
        assert_eq!(r.pixel_count(), 4);
    }

    #[test]
    fn test_empty_region_has_no_rows() {
        let d = image(&[4, 3]);
        let r = ImageRegion::new(&[0, 0], &[0, 3]).unwrap();
        assert!(r.validate_against(&d).is_ok());
        assert_eq!(r.rows(&d).count(), 0);
        assert_eq!(r.pixel_count(), 0);
    }
}
