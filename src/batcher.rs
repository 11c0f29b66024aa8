//! Groups transformed records into fixed-size feature/label batches.
use crate::datasets::RecordReader;
use crate::error::{DataError, Result};
use crate::layers::Matrix;
use crate::normalize::MinMaxScaler;
use crate::transform::TransformProcess;

/// A group of feature rows with their binary labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Matrix,
    pub labels: Vec<f64>,
}

impl Batch {
    pub fn new(features: Matrix, labels: Vec<f64>) -> Self {
        Self { features, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }
}

/// Lazy, restartable batch stream over a CSV file.
///
/// The last batch holds whatever rows remain and may be shorter than
/// `batch_size`. If a preprocessor is attached, every batch is scaled
/// before it is handed out.
pub struct BatchIterator {
    reader: RecordReader,
    process: TransformProcess,
    batch_size: usize,
    label_index: usize,
    preprocessor: Option<MinMaxScaler>,
}

impl BatchIterator {
    pub fn new(
        reader: RecordReader,
        process: TransformProcess,
        batch_size: usize,
        label_index: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(DataError::InvalidConfig("batch size must be positive".into()));
        }
        let width = process.output_columns().len();
        if label_index >= width {
            return Err(DataError::InvalidConfig(format!(
                "label index {} out of range for {} columns",
                label_index, width
            )));
        }
        Ok(Self {
            reader,
            process,
            batch_size,
            label_index,
            preprocessor: None,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of input features per row (transformed width minus the label).
    pub fn num_features(&self) -> usize {
        self.process.output_columns().len() - 1
    }

    pub fn reset(&mut self) -> Result<()> {
        self.reader.reset()
    }

    pub fn set_preprocessor(&mut self, scaler: MinMaxScaler) {
        self.preprocessor = Some(scaler);
    }

    pub fn preprocessor(&self) -> Option<&MinMaxScaler> {
        self.preprocessor.as_ref()
    }

    pub fn take_preprocessor(&mut self) -> Option<MinMaxScaler> {
        self.preprocessor.take()
    }

    fn next_batch(&mut self) -> Result<Option<Batch>> {
        let mut features = Vec::with_capacity(self.batch_size);
        let mut labels = Vec::with_capacity(self.batch_size);
        while labels.len() < self.batch_size {
            let record = match self.reader.next() {
                Some(record) => record?,
                None => break,
            };
            let mut values = self.process.apply(&record)?;
            let label = values.remove(self.label_index);
            if label != 0.0 && label != 1.0 {
                return Err(DataError::InvalidLabel {
                    line: record.line,
                    value: label,
                });
            }
            features.push(values);
            labels.push(label);
        }
        if labels.is_empty() {
            return Ok(None);
        }
        let mut batch = Batch::new(features, labels);
        if let Some(scaler) = &self.preprocessor {
            scaler.transform(&mut batch)?;
        }
        Ok(Some(batch))
    }
}

impl Iterator for BatchIterator {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";

    fn titanic_csv(rows: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        for i in 0..rows {
            let sex = if i % 2 == 0 { "male" } else { "female" };
            writeln!(file, "{},{},3,\"Doe, {}\",{},{},0,0,T{},{}.5,,S", i + 1, i % 2, i, sex, 20 + i, i, i).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn iterator(file: &NamedTempFile, batch_size: usize) -> BatchIterator {
        let reader = RecordReader::open(file.path(), 1).unwrap();
        let process = TransformProcess::titanic().unwrap();
        BatchIterator::new(reader, process, batch_size, 0).unwrap()
    }

    #[test]
    fn batches_reconstruct_row_sequence() {
        let file = titanic_csv(70);
        let mut it = iterator(&file, 32);
        let batches: Vec<Batch> = it.by_ref().map(|b| b.unwrap()).collect();
        assert_eq!(batches.iter().map(Batch::len).collect::<Vec<_>>(), [32, 32, 6]);

        let rows: Vec<Vec<f64>> = batches.iter().flat_map(|b| b.features.clone()).collect();
        let labels: Vec<f64> = batches.iter().flat_map(|b| b.labels.clone()).collect();
        assert_eq!(rows.len(), 70);
        for (i, (row, label)) in rows.iter().zip(&labels).enumerate() {
            assert_eq!(row.len(), 7);
            assert_eq!(row[2], 20.0 + i as f64);
            assert_eq!(*label, (i % 2) as f64);
        }

        it.reset().unwrap();
        assert_eq!(it.count(), 3);
    }

    #[test]
    fn invalid_label_and_batch_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        writeln!(file, "1,2,3,n,male,22,1,0,t,7.25,,S").unwrap();
        file.flush().unwrap();

        let mut it = iterator(&file, 4);
        assert!(matches!(it.next(), Some(Err(DataError::InvalidLabel { value, .. })) if value == 2.0));

        let reader = RecordReader::open(file.path(), 1).unwrap();
        let process = TransformProcess::titanic().unwrap();
        assert!(matches!(
            BatchIterator::new(reader, process, 0, 0),
            Err(DataError::InvalidConfig(_))
        ));
    }
}
