//! Min-max feature scaling.
use crate::batcher::{Batch, BatchIterator};
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// Per-feature min-max scaler onto `[min_range, max_range]`.
///
/// Only obtainable by fitting, so a scaler in hand always has statistics.
/// A feature whose observed range is zero is divided by 1 instead, which maps
/// the constant value onto `min_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min_range: f64,
    max_range: f64,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// One full pass over `batches`, recording per-feature min and max.
    pub fn fit<I>(batches: I, min_range: f64, max_range: f64) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Batch>>,
    {
        if !(min_range < max_range) {
            return Err(DataError::InvalidConfig(format!(
                "scaler range [{}, {}] is empty",
                min_range, max_range
            )));
        }
        let mut data_min: Vec<f64> = Vec::new();
        let mut data_max: Vec<f64> = Vec::new();
        for batch in batches {
            let batch = batch?;
            for row in &batch.features {
                if data_min.is_empty() {
                    data_min = row.clone();
                    data_max = row.clone();
                    continue;
                }
                if row.len() != data_min.len() {
                    return Err(DataError::ShapeMismatch {
                        expected: data_min.len(),
                        found: row.len(),
                    });
                }
                for (i, &x) in row.iter().enumerate() {
                    data_min[i] = data_min[i].min(x);
                    data_max[i] = data_max[i].max(x);
                }
            }
        }
        if data_min.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        tracing::debug!(features = data_min.len(), "fitted min-max scaler");
        Ok(Self {
            min_range,
            max_range,
            data_min,
            data_max,
        })
    }

    /// Fit over a whole iterator. The iterator is reset before and after the
    /// pass, and any preprocessor already attached is bypassed while fitting.
    pub fn fit_iterator(iter: &mut BatchIterator, min_range: f64, max_range: f64) -> Result<Self> {
        let previous = iter.take_preprocessor();
        iter.reset()?;
        let fitted = Self::fit(iter.by_ref(), min_range, max_range);
        iter.reset()?;
        if let Some(previous) = previous {
            iter.set_preprocessor(previous);
        }
        fitted
    }

    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min_range, self.max_range)
    }

    pub fn num_features(&self) -> usize {
        self.data_min.len()
    }

    fn spread(&self, i: usize) -> f64 {
        let spread = self.data_max[i] - self.data_min[i];
        if spread > 0.0 {
            spread
        } else {
            1.0
        }
    }

    fn check_width(&self, found: usize) -> Result<()> {
        if found != self.data_min.len() {
            return Err(DataError::ShapeMismatch {
                expected: self.data_min.len(),
                found,
            });
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &mut [f64]) -> Result<()> {
        self.check_width(row.len())?;
        let target = self.max_range - self.min_range;
        for (i, x) in row.iter_mut().enumerate() {
            *x = (*x - self.data_min[i]) / self.spread(i) * target + self.min_range;
        }
        Ok(())
    }

    pub fn transform(&self, batch: &mut Batch) -> Result<()> {
        for row in &mut batch.features {
            self.transform_row(row)?;
        }
        Ok(())
    }

    /// Inverse of `transform_row`.
    pub fn revert_row(&self, row: &mut [f64]) -> Result<()> {
        self.check_width(row.len())?;
        let target = self.max_range - self.min_range;
        for (i, x) in row.iter_mut().enumerate() {
            *x = (*x - self.min_range) / target * self.spread(i) + self.data_min[i];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batches(rows: Vec<Vec<f64>>) -> Vec<Result<Batch>> {
        let labels = vec![0.0; rows.len()];
        vec![Ok(Batch::new(rows, labels))]
    }

    #[test]
    fn midpoint_maps_to_zero() {
        let scaler = MinMaxScaler::fit(batches(vec![vec![0.0], vec![10.0]]), -1.0, 1.0).unwrap();
        let mut row = [5.0];
        scaler.transform_row(&mut row).unwrap();
        assert_eq!(row[0], 0.0);

        let mut ends = [0.0];
        scaler.transform_row(&mut ends).unwrap();
        assert_eq!(ends[0], -1.0);
        let mut ends = [10.0];
        scaler.transform_row(&mut ends).unwrap();
        assert_eq!(ends[0], 1.0);
    }

    #[test]
    fn fitted_data_stays_in_range() {
        let rows = vec![
            vec![3.0, 0.0, 22.0, 1.0, 0.0, 7.25, 2.0],
            vec![1.0, 1.0, 38.0, 1.0, 0.0, 71.2833, 0.0],
            vec![3.0, 1.0, 0.0, 0.0, 0.0, 7.925, 3.0],
            vec![2.0, 0.0, 54.0, 0.0, 2.0, 51.8625, 1.0],
        ];
        let scaler = MinMaxScaler::fit(batches(rows.clone()), -1.0, 1.0).unwrap();
        let mut batch = Batch::new(rows, vec![0.0; 4]);
        scaler.transform(&mut batch).unwrap();
        for row in &batch.features {
            for &x in row {
                assert!((-1.0..=1.0).contains(&x), "{} out of range", x);
            }
        }
    }

    #[test]
    fn constant_feature_maps_to_lower_bound() {
        let scaler = MinMaxScaler::fit(batches(vec![vec![4.0, 1.0], vec![4.0, 3.0]]), -1.0, 1.0).unwrap();
        let mut row = [4.0, 2.0];
        scaler.transform_row(&mut row).unwrap();
        assert_eq!(row, [-1.0, 0.0]);
        assert!(row.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn revert_undoes_transform() {
        let scaler = MinMaxScaler::fit(batches(vec![vec![-2.0, 100.0], vec![6.0, 300.0]]), -1.0, 1.0).unwrap();
        let mut row = [1.0, 250.0];
        scaler.transform_row(&mut row).unwrap();
        scaler.revert_row(&mut row).unwrap();
        assert!((row[0] - 1.0).abs() < 1e-12);
        assert!((row[1] - 250.0).abs() < 1e-9);
    }

    #[test]
    fn empty_and_mismatched_input() {
        assert!(matches!(
            MinMaxScaler::fit(Vec::new(), -1.0, 1.0),
            Err(DataError::EmptyDataset)
        ));
        assert!(matches!(
            MinMaxScaler::fit(batches(vec![vec![1.0]]), 1.0, -1.0),
            Err(DataError::InvalidConfig(_))
        ));
        let scaler = MinMaxScaler::fit(batches(vec![vec![1.0, 2.0]]), -1.0, 1.0).unwrap();
        assert!(matches!(
            scaler.transform_row(&mut [1.0]),
            Err(DataError::ShapeMismatch { expected: 2, found: 1 })
        ));
    }
}
