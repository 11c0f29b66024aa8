//! Binary classification metrics for the sigmoid-output network.
use crate::batcher::{Batch, BatchIterator};
use crate::error::{DataError, Result};
use crate::network::MLP;
use std::fmt;

/// Counts of outcomes, with class 1 as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Accumulates predictions over batches and reports accuracy, precision,
/// recall and F1. Ratios with an empty denominator are reported as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    threshold: f64,
    matrix: ConfusionMatrix,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Evaluation {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            matrix: ConfusionMatrix::default(),
        }
    }

    /// Forward pass over every batch of `iter`, starting from its beginning.
    pub fn evaluate(model: &MLP, iter: &mut BatchIterator) -> Result<Self> {
        let mut eval = Self::default();
        iter.reset()?;
        for batch in iter.by_ref() {
            eval.eval_batch(model, &batch?)?;
        }
        tracing::debug!(examples = eval.matrix.total(), "evaluation finished");
        Ok(eval)
    }

    pub fn eval_batch(&mut self, model: &MLP, batch: &Batch) -> Result<()> {
        for (row, &label) in batch.features.iter().zip(&batch.labels) {
            if row.len() != model.input_size() {
                return Err(DataError::ShapeMismatch {
                    expected: model.input_size(),
                    found: row.len(),
                });
            }
            let output = model.predict(row);
            self.record(output[0], label);
        }
        Ok(())
    }

    pub fn record(&mut self, output: f64, label: f64) {
        let predicted = output > self.threshold;
        let actual = label >= 0.5;
        let m = &mut self.matrix;
        match (predicted, actual) {
            (true, true) => m.true_positives += 1,
            (true, false) => m.false_positives += 1,
            (false, false) => m.true_negatives += 1,
            (false, true) => m.false_negatives += 1,
        }
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        self.matrix
    }

    pub fn count(&self) -> usize {
        self.matrix.total()
    }

    pub fn accuracy(&self) -> f64 {
        let m = &self.matrix;
        ratio(m.true_positives + m.true_negatives, m.total())
    }

    pub fn precision(&self) -> f64 {
        let m = &self.matrix;
        ratio(m.true_positives, m.true_positives + m.false_positives)
    }

    pub fn recall(&self) -> f64 {
        let m = &self.matrix;
        ratio(m.true_positives, m.true_positives + m.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.matrix;
        writeln!(f, "========================Evaluation Metrics========================")?;
        writeln!(f, " # of classes:    2")?;
        writeln!(f, " # of examples:   {}", self.count())?;
        writeln!(f, " Accuracy:        {:.4}", self.accuracy())?;
        writeln!(f, " Precision:       {:.4}", self.precision())?;
        writeln!(f, " Recall:          {:.4}", self.recall())?;
        writeln!(f, " F1 Score:        {:.4}", self.f1())?;
        writeln!(f, "Precision, recall & F1: reported for positive class (class 1) only")?;
        writeln!(f)?;
        writeln!(f, "=========================Confusion Matrix=========================")?;
        writeln!(f, "    0    1")?;
        writeln!(f, "-----------")?;
        writeln!(f, " {:>4} {:>4} | 0 = 0", m.true_negatives, m.false_positives)?;
        writeln!(f, " {:>4} {:>4} | 1 = 1", m.false_negatives, m.true_positives)?;
        writeln!(f)?;
        write!(f, "Confusion matrix format: Actual (rowClass) predicted as (columnClass) N times")
    }
}
