//! Lazy CSV record reading for the passenger files.
use crate::error::{DataError, Result};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::fs::File;
use std::path::{Path, PathBuf};

/// One raw CSV row, fields still as strings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// Streams rows from a CSV file after skipping `skip_lines` leading lines.
///
/// The file is opened eagerly so a missing path fails at construction.
/// The handle is released once the last row has been read; `reset` reopens
/// it, which makes the sequence restartable.
pub struct RecordReader {
    path: PathBuf,
    skip_lines: usize,
    records: Option<StringRecordsIntoIter<File>>,
    header: Option<Vec<String>>,
}

impl RecordReader {
    pub fn open(path: impl AsRef<Path>, skip_lines: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = open_records(&path)?;
        let mut reader = Self {
            path,
            skip_lines,
            records: Some(records),
            header: None,
        };
        reader.skip_header()?;
        Ok(reader)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is still held open. False after end of stream.
    pub fn is_open(&self) -> bool {
        self.records.is_some()
    }

    /// Last skipped line, if any lines were skipped.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Reopen the file and start over from the first data row.
    pub fn reset(&mut self) -> Result<()> {
        self.records = Some(open_records(&self.path)?);
        self.header = None;
        self.skip_header()
    }

    fn skip_header(&mut self) -> Result<()> {
        let Some(records) = self.records.as_mut() else {
            return Ok(());
        };
        for _ in 0..self.skip_lines {
            match records.next() {
                Some(Ok(record)) => {
                    self.header = Some(record.iter().map(str::to_string).collect());
                }
                Some(Err(source)) => {
                    return Err(DataError::Csv {
                        path: self.path.clone(),
                        source,
                    })
                }
                None => break,
            }
        }
        Ok(())
    }
}

impl Iterator for RecordReader {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(next) = self.records.as_mut()?.next() else {
            self.records = None;
            return None;
        };
        Some(match next {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                Ok(RawRecord::new(line, record.iter().map(str::to_string).collect()))
            }
            Err(source) => Err(DataError::Csv {
                path: self.path.clone(),
                source,
            }),
        })
    }
}

fn open_records(path: &Path) -> Result<StringRecordsIntoIter<File>> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file)
        .into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn skips_header_and_keeps_quoted_commas() {
        let file = csv_file("a,b,c\n1,\"Braund, Mr. Owen\",x\n2,plain,\n");
        let mut reader = RecordReader::open(file.path(), 1).unwrap();
        assert_eq!(reader.header().unwrap(), ["a", "b", "c"]);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.line, 2);
        assert_eq!(first.fields, ["1", "Braund, Mr. Owen", "x"]);

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.fields, ["2", "plain", ""]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn reset_restarts_sequence() {
        let file = csv_file("h\n1\n2\n");
        let mut reader = RecordReader::open(file.path(), 1).unwrap();
        let first_pass: Vec<_> = reader.by_ref().map(|r| r.unwrap().fields).collect();
        reader.reset().unwrap();
        let second_pass: Vec<_> = reader.map(|r| r.unwrap().fields).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 2);
    }

    #[test]
    fn handle_released_at_end_of_stream() {
        let file = csv_file("h\n1\n");
        let mut reader = RecordReader::open(file.path(), 1).unwrap();
        assert!(reader.is_open());
        assert_eq!(reader.next().unwrap().unwrap().fields, ["1"]);
        assert!(reader.next().is_none());
        assert!(!reader.is_open());
        assert!(reader.next().is_none());

        reader.reset().unwrap();
        assert!(reader.is_open());
        assert_eq!(reader.header().unwrap(), ["h"]);
        assert_eq!(reader.count(), 1);
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = RecordReader::open("/definitely/not/here.csv", 1).err().unwrap();
        assert!(matches!(err, DataError::Open { .. }));
    }
}
