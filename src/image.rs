//! Image, mask and region model
//!
//! Images are n-dimensional grids stored in C (row-major) scan order where
//! every pixel holds one or more scalar components. A pixel location is its
//! linear offset into the spatial grid, which lets a [`Mask`] of the same
//! geometry be sampled with the same value.

use crate::errors::{MaskedStatsError, Result};
use ndarray::{Array2, ArrayD, ArrayView1, IxDyn};

/// Scalar component type of an image
pub trait PixelValue:
    Copy + PartialOrd + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static
{
    /// Largest representable value
    const MAX: Self;
    /// Most negative representable value (zero for unsigned types)
    const NONPOSITIVE_MIN: Self;

    /// Convert to the real type used for sums and moments
    fn to_real(self) -> f64;
}

macro_rules! impl_pixel_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl PixelValue for $t {
                const MAX: Self = <$t>::MAX;
                const NONPOSITIVE_MIN: Self = <$t>::MIN;

                #[inline]
                #[allow(clippy::cast_lossless, clippy::cast_precision_loss, clippy::unnecessary_cast)]
                fn to_real(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_pixel_value!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Row-major strides of a spatial shape
fn c_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Hyper-rectangular sub-range of an image's spatial index space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    start: Vec<usize>,
    size: Vec<usize>,
}

impl Region {
    /// Create a region from its start index and size
    ///
    /// # Errors
    ///
    /// Returns an error if `start` and `size` have different lengths.
    pub fn new(start: Vec<usize>, size: Vec<usize>) -> Result<Self> {
        if start.len() != size.len() {
            return Err(MaskedStatsError::invalid_region(format!(
                "start has {} axes but size has {}",
                start.len(),
                size.len()
            )));
        }
        Ok(Self { start, size })
    }

    /// The region covering a whole grid of the given shape
    #[must_use]
    pub fn whole(shape: &[usize]) -> Self {
        Self {
            start: vec![0; shape.len()],
            size: shape.to_vec(),
        }
    }

    #[must_use]
    pub fn start(&self) -> &[usize] {
        &self.start
    }

    #[must_use]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.size.len()
    }

    /// Number of pixel locations in the region
    #[must_use]
    pub fn len(&self) -> usize {
        self.size.iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this region
    #[must_use]
    pub fn contains(&self, other: &Region) -> bool {
        other.ndim() == self.ndim()
            && self
                .start
                .iter()
                .zip(&self.size)
                .zip(other.start.iter().zip(&other.size))
                .all(|((&s, &n), (&os, &on))| {
                    os >= s && os.checked_add(on).is_some_and(|end| end <= s + n)
                })
    }

    /// Split into at most `pieces` disjoint regions covering this one exactly
    ///
    /// The split runs along the slowest-varying axis with more than one
    /// index, so every piece is a run of whole scanlines.
    #[must_use]
    pub fn split(&self, pieces: usize) -> Vec<Region> {
        let pieces = pieces.max(1);
        if pieces == 1 || self.is_empty() {
            return vec![self.clone()];
        }
        let Some(axis) = self.size.iter().position(|&n| n > 1) else {
            return vec![self.clone()];
        };

        let extent = self.size[axis];
        let chunk = extent.div_ceil(pieces.min(extent));
        let mut regions = Vec::with_capacity(pieces.min(extent));
        let mut offset = 0;
        while offset < extent {
            let len = chunk.min(extent - offset);
            let mut start = self.start.clone();
            let mut size = self.size.clone();
            start[axis] += offset;
            size[axis] = len;
            regions.push(Region { start, size });
            offset += len;
        }
        regions
    }
}

/// Read-only n-dimensional image with one or more components per pixel
#[derive(Debug, Clone)]
pub struct Image<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    /// One row per pixel, in scan order
    pixels: Array2<T>,
}

impl<T: PixelValue> Image<T> {
    /// Build an image from flat scan-ordered data
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is zero or if `data` does not hold
    /// exactly `product(shape) * components` values.
    pub fn from_shape_vec(shape: Vec<usize>, components: usize, data: Vec<T>) -> Result<Self> {
        if components == 0 {
            return Err(MaskedStatsError::invalid_image(
                "pixels need at least one component",
            ));
        }
        let pixel_count: usize = shape.iter().product();
        let pixels = Array2::from_shape_vec((pixel_count, components), data)?;
        Ok(Self {
            strides: c_strides(&shape),
            shape,
            pixels,
        })
    }

    /// Image with a single component per pixel
    ///
    /// # Errors
    ///
    /// Returns an error if the array cannot be flattened into pixels.
    pub fn scalar(data: ArrayD<T>) -> Result<Self> {
        let shape = data.shape().to_vec();
        Self::from_shape_vec(shape, 1, data.iter().copied().collect())
    }

    /// Image whose trailing axis holds the pixel components
    ///
    /// # Errors
    ///
    /// Returns an error if the array has no axes or an empty component axis.
    pub fn vector(data: ArrayD<T>) -> Result<Self> {
        let Some((&components, spatial)) = data.shape().split_last() else {
            return Err(MaskedStatsError::invalid_image(
                "vector image needs a component axis",
            ));
        };
        Self::from_shape_vec(spatial.to_vec(), components, data.iter().copied().collect())
    }

    /// Spatial shape (component axis excluded)
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn components(&self) -> usize {
        self.pixels.ncols()
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.pixels.nrows()
    }

    #[must_use]
    pub fn largest_region(&self) -> Region {
        Region::whole(&self.shape)
    }

    /// Components of the pixel at a linear location
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below [`Image::pixel_count`].
    #[must_use]
    pub fn pixel(&self, offset: usize) -> ArrayView1<'_, T> {
        self.pixels.row(offset)
    }

    /// Linear location of a multi-dimensional index
    #[must_use]
    pub fn offset_of(&self, index: &[usize]) -> usize {
        index.iter().zip(&self.strides).map(|(&i, &s)| i * s).sum()
    }

    /// Scan-ordered iteration over the pixels of a region
    ///
    /// The region must lie inside [`Image::largest_region`].
    #[must_use]
    pub fn scan(&self, region: &Region) -> RegionScan<'_, T> {
        debug_assert!(self.largest_region().contains(region));
        RegionScan {
            image: self,
            start: region.start.clone(),
            size: region.size.clone(),
            index: vec![0; region.ndim()],
            remaining: region.len(),
        }
    }
}

/// Iterator over `(location, pixel)` pairs of one region, last axis fastest
#[derive(Debug)]
pub struct RegionScan<'a, T> {
    image: &'a Image<T>,
    start: Vec<usize>,
    size: Vec<usize>,
    /// Position relative to `start`
    index: Vec<usize>,
    remaining: usize,
}

impl<'a, T: PixelValue> Iterator for RegionScan<'a, T> {
    type Item = (usize, ArrayView1<'a, T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let image = self.image;
        let offset = self
            .index
            .iter()
            .zip(&self.start)
            .zip(&image.strides)
            .map(|((&i, &s), &stride)| (i + s) * stride)
            .sum();

        self.remaining -= 1;
        for axis in (0..self.index.len()).rev() {
            self.index[axis] += 1;
            if self.index[axis] < self.size[axis] {
                break;
            }
            self.index[axis] = 0;
        }

        Some((offset, image.pixels.row(offset)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: PixelValue> ExactSizeIterator for RegionScan<'_, T> {}

/// Inclusion mask with the spatial geometry of an image
///
/// A location is selected when its value is exactly `1`.
#[derive(Debug, Clone)]
pub struct Mask {
    shape: Vec<usize>,
    values: Vec<u8>,
}

impl Mask {
    #[must_use]
    pub fn new(values: ArrayD<u8>) -> Self {
        Self {
            shape: values.shape().to_vec(),
            values: values.iter().copied().collect(),
        }
    }

    /// Mask holding the same value everywhere
    #[must_use]
    pub fn filled(shape: &[usize], value: u8) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(shape), value))
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Mask value at a linear location
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the mask.
    #[must_use]
    pub fn value_at(&self, offset: usize) -> u8 {
        self.values[offset]
    }

    /// Number of locations marked for inclusion
    #[must_use]
    pub fn selected(&self) -> usize {
        self.values.iter().filter(|&&v| v == 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array3};

    #[test]
    fn test_pixel_value_limits() {
        assert_eq!(<u8 as PixelValue>::NONPOSITIVE_MIN, 0);
        assert_eq!(<i16 as PixelValue>::NONPOSITIVE_MIN, i16::MIN);
        assert_eq!(<f32 as PixelValue>::NONPOSITIVE_MIN, f32::MIN);
        assert!(<f64 as PixelValue>::NONPOSITIVE_MIN < 0.0);
        assert_eq!(200u8.to_real(), 200.0);
    }

    #[test]
    fn test_scan_order_and_offsets() -> Result<()> {
        let data = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 12 + y * 4 + x) as i32);
        let image = Image::scalar(data.into_dyn())?;
        assert_eq!(image.shape(), &[2, 3, 4]);
        assert_eq!(image.pixel_count(), 24);
        assert_eq!(image.offset_of(&[1, 2, 3]), 23);

        let region = Region::new(vec![1, 1, 2], vec![1, 2, 2])?;
        let visited: Vec<(usize, i32)> = image.scan(&region).map(|(o, p)| (o, p[0])).collect();
        assert_eq!(visited, vec![(18, 18), (19, 19), (22, 22), (23, 23)]);
        Ok(())
    }

    #[test]
    fn test_vector_image_components() -> Result<()> {
        let data = ArrayD::from_shape_vec(vec![2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let image = Image::vector(data)?;
        assert_eq!(image.shape(), &[2]);
        assert_eq!(image.components(), 3);
        assert_eq!(image.pixel(1), arr1(&[4.0f32, 5.0, 6.0]));

        let err = Image::<f32>::from_shape_vec(vec![2], 0, vec![]);
        assert!(matches!(err, Err(MaskedStatsError::InvalidImage(_))));
        Ok(())
    }

    #[test]
    fn test_split_covers_region_once() -> Result<()> {
        let region = Region::new(vec![0, 2], vec![7, 5])?;
        let pieces = region.split(3);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces.iter().map(Region::len).sum::<usize>(), region.len());
        assert!(pieces.iter().all(|p| region.contains(p)));
        assert_eq!(pieces[0].start(), &[0, 2]);
        assert_eq!(pieces[1].start(), &[3, 2]);
        assert_eq!(pieces[2].size(), &[1, 5]);
        Ok(())
    }

    #[test]
    fn test_contains_rejects_overflowing_end() -> Result<()> {
        let whole = Region::whole(&[4, 3]);
        assert!(whole.contains(&Region::new(vec![1, 0], vec![3, 3])?));
        assert!(!whole.contains(&Region::new(vec![usize::MAX, 0], vec![1, 3])?));
        assert!(!whole.contains(&Region::new(vec![2, 1], vec![1, usize::MAX])?));
        Ok(())
    }

    #[test]
    fn test_split_skips_unit_axes_and_caps_pieces() {
        let region = Region::whole(&[1, 4]);
        let pieces = region.split(16);
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| p.size() == [1, 1]));

        let empty = Region::whole(&[0, 4]);
        assert_eq!(empty.split(4), vec![empty.clone()]);
    }

    #[test]
    fn test_mask_lookup() {
        let mask = Mask::new(ArrayD::from_shape_vec(vec![2, 2], vec![1, 0, 2, 1]).unwrap());
        assert_eq!(mask.value_at(2), 2);
        assert_eq!(mask.selected(), 2);
        assert_eq!(Mask::filled(&[3], 1).selected(), 3);
    }
}
