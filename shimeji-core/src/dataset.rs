//! Columnar storage for two-dimensional point sets.

use crate::{error::DatasetError, kernel::LANES};

/// Immutable columnar storage for a two-dimensional point set.
///
/// Coordinates are held as two parallel `f32` columns so the distance kernels
/// can load contiguous lanes. Each column is padded to a multiple of eight
/// entries; the padding is never reported as a point and exists only so wide
/// loads over the tail stay in bounds. Points are identified by their dense
/// zero-based index, duplicates and coincident coordinates are permitted.
///
/// # Examples
/// ```
/// use shimeji_core::Dataset;
///
/// let dataset = Dataset::from_records(2, [(0, 1.0, 2.0), (1, 3.0, 4.0)])
///     .expect("indices are in bounds");
/// assert_eq!(dataset.len(), 2);
/// assert_eq!(dataset.xs(), [1.0, 3.0]);
/// assert_eq!(dataset.ys(), [2.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    xs: Vec<f32>,
    ys: Vec<f32>,
    len: usize,
}

impl Dataset {
    /// Builds a dataset of `len` points from `(index, x, y)` records.
    ///
    /// Records may arrive in any order. Indices must be below `len`; a
    /// repeated index overwrites the earlier record. Slots no record names
    /// remain at the origin.
    ///
    /// # Errors
    /// Returns [`DatasetError::IndexOutOfBounds`] when a record names an
    /// index at or beyond `len`.
    pub fn from_records(
        len: usize,
        records: impl IntoIterator<Item = (usize, f32, f32)>,
    ) -> Result<Self, DatasetError> {
        let padded = padded_len(len);
        let mut xs = vec![0.0; padded];
        let mut ys = vec![0.0; padded];
        for (index, x, y) in records {
            if index >= len {
                return Err(DatasetError::IndexOutOfBounds { index, len });
            }
            xs[index] = x;
            ys[index] = y;
        }
        Ok(Self { xs, ys, len })
    }

    /// Builds a dataset from pre-assembled coordinate columns.
    ///
    /// # Errors
    /// Returns [`DatasetError::ColumnLengthMismatch`] when the columns differ
    /// in length.
    ///
    /// # Examples
    /// ```
    /// use shimeji_core::Dataset;
    ///
    /// let dataset = Dataset::from_columns(vec![0.0, 1.0], vec![0.0, 0.0])
    ///     .expect("columns have equal length");
    /// assert_eq!(dataset.len(), 2);
    /// ```
    pub fn from_columns(mut xs: Vec<f32>, mut ys: Vec<f32>) -> Result<Self, DatasetError> {
        if xs.len() != ys.len() {
            return Err(DatasetError::ColumnLengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let len = xs.len();
        let padded = padded_len(len);
        xs.resize(padded, 0.0);
        ys.resize(padded, 0.0);
        Ok(Self { xs, ys, len })
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the dataset contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the x column without tail padding.
    #[must_use]
    pub fn xs(&self) -> &[f32] {
        &self.xs[..self.len]
    }

    /// Returns the y column without tail padding.
    #[must_use]
    pub fn ys(&self) -> &[f32] {
        &self.ys[..self.len]
    }

    /// The x column including tail padding, for lane-granular reads.
    pub(crate) fn xs_padded(&self) -> &[f32] {
        &self.xs
    }

    /// The y column including tail padding, for lane-granular reads.
    pub(crate) fn ys_padded(&self) -> &[f32] {
        &self.ys
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(LANES) * LANES
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, 0)]
    #[case::partial_lane(3, 8)]
    #[case::full_lane(8, 8)]
    #[case::lane_and_tail(10, 16)]
    fn columns_are_padded_to_lane_multiples(#[case] len: usize, #[case] expected: usize) {
        let dataset =
            Dataset::from_records(len, (0..len).map(|i| (i, i as f32, 0.0))).expect("in bounds");
        assert_eq!(dataset.len(), len);
        assert_eq!(dataset.xs_padded().len(), expected);
        assert_eq!(dataset.ys_padded().len(), expected);
    }

    #[test]
    fn records_land_at_their_index_in_any_order() {
        let dataset = Dataset::from_records(3, [(2, 2.0, 20.0), (0, 0.0, 0.0), (1, 1.0, 10.0)])
            .expect("in bounds");
        assert_eq!(dataset.xs(), [0.0, 1.0, 2.0]);
        assert_eq!(dataset.ys(), [0.0, 10.0, 20.0]);
    }

    #[test]
    fn out_of_bounds_record_is_rejected() {
        let err = Dataset::from_records(2, [(2, 0.0, 0.0)]).expect_err("index 2 is out of bounds");
        assert_eq!(err, DatasetError::IndexOutOfBounds { index: 2, len: 2 });
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = Dataset::from_columns(vec![0.0], vec![0.0, 1.0])
            .expect_err("columns differ in length");
        assert_eq!(err, DatasetError::ColumnLengthMismatch { xs: 1, ys: 2 });
    }
}
