//! Row transform: drop columns, encode categoricals, fill missing numerics.
use crate::datasets::RawRecord;
use crate::error::{DataError, Result};
use crate::schema::{ColumnType, Schema};

/// A single declarative transform step.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    RemoveColumns(Vec<String>),
    /// Replace a categorical value with its index in the column vocabulary.
    CategoricalToInteger(String),
    /// Substitute `value` when the cell is empty.
    ReplaceEmptyWithValue { column: String, value: f64 },
}

#[derive(Debug, Clone)]
enum Cell {
    Integer,
    Double,
    Categorical(Vec<String>),
}

#[derive(Debug, Clone)]
struct ColumnPlan {
    index: usize,
    name: String,
    cell: Cell,
    replace_empty: Option<f64>,
}

/// Compiled transform from raw string rows to numeric vectors.
#[derive(Debug, Clone)]
pub struct TransformProcess {
    input: Schema,
    steps: Vec<TransformStep>,
    plan: Vec<ColumnPlan>,
}

impl TransformProcess {
    /// Validate `steps` against `input` and compile the per-column plan.
    pub fn new(input: Schema, steps: Vec<TransformStep>) -> Result<Self> {
        let mut removed = vec![false; input.len()];
        let mut encoded = vec![false; input.len()];
        let mut replace: Vec<Option<f64>> = vec![None; input.len()];

        let live_index = |name: &str, removed: &[bool]| -> Result<usize> {
            let idx = input.index_of(name)?;
            if removed[idx] {
                return Err(DataError::UnknownColumn(name.to_string()));
            }
            Ok(idx)
        };

        for step in &steps {
            match step {
                TransformStep::RemoveColumns(names) => {
                    for name in names {
                        let idx = live_index(name, &removed)?;
                        removed[idx] = true;
                    }
                }
                TransformStep::CategoricalToInteger(name) => {
                    let idx = live_index(name, &removed)?;
                    if !matches!(input.columns()[idx].kind, ColumnType::Categorical(_)) {
                        return Err(DataError::InvalidConfig(format!(
                            "column `{}` is not categorical",
                            name
                        )));
                    }
                    encoded[idx] = true;
                }
                TransformStep::ReplaceEmptyWithValue { column, value } => {
                    let idx = live_index(column, &removed)?;
                    replace[idx] = Some(*value);
                }
            }
        }

        let mut plan = Vec::new();
        for (index, column) in input.columns().iter().enumerate() {
            if removed[index] {
                continue;
            }
            let cell = match &column.kind {
                ColumnType::Integer => Cell::Integer,
                ColumnType::Double => Cell::Double,
                ColumnType::Categorical(vocab) if encoded[index] => Cell::Categorical(vocab.clone()),
                ColumnType::Categorical(_) | ColumnType::String => {
                    return Err(DataError::InvalidConfig(format!(
                        "column `{}` would stay non-numeric after the transform",
                        column.name
                    )))
                }
            };
            plan.push(ColumnPlan {
                index,
                name: column.name.clone(),
                cell,
                replace_empty: replace[index],
            });
        }

        Ok(Self { input, steps, plan })
    }

    /// Drops PassengerId/Name/Ticket/Cabin, encodes Sex and Embarked, and
    /// fills empty Age/Fare with 0. Output: Survived followed by 7 features.
    pub fn titanic() -> Result<Self> {
        let remove = ["PassengerId", "Name", "Ticket", "Cabin"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(
            Schema::titanic(),
            vec![
                TransformStep::RemoveColumns(remove),
                TransformStep::CategoricalToInteger("Sex".into()),
                TransformStep::CategoricalToInteger("Embarked".into()),
                TransformStep::ReplaceEmptyWithValue { column: "Age".into(), value: 0.0 },
                TransformStep::ReplaceEmptyWithValue { column: "Fare".into(), value: 0.0 },
            ],
        )
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Column names of the transformed record, in order.
    pub fn output_columns(&self) -> Vec<&str> {
        self.plan.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn output_index_of(&self, name: &str) -> Result<usize> {
        self.plan
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    pub fn apply(&self, record: &RawRecord) -> Result<Vec<f64>> {
        if record.fields.len() != self.input.len() {
            return Err(DataError::MalformedRow {
                line: record.line,
                expected: self.input.len(),
                found: record.fields.len(),
            });
        }
        self.plan
            .iter()
            .map(|p| p.convert(&record.fields[p.index], record.line))
            .collect()
    }
}

impl ColumnPlan {
    fn convert(&self, raw: &str, line: u64) -> Result<f64> {
        if raw.is_empty() {
            if let Some(value) = self.replace_empty {
                return Ok(value);
            }
        }
        let invalid = || DataError::InvalidValue {
            line,
            column: self.name.clone(),
            value: raw.to_string(),
        };
        match &self.cell {
            Cell::Integer => raw.trim().parse::<i64>().map(|v| v as f64).map_err(|_| invalid()),
            Cell::Double => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid),
            Cell::Categorical(vocab) => vocab
                .iter()
                .position(|v| v == raw)
                .map(|code| code as f64)
                .ok_or_else(|| DataError::UnknownCategory {
                    line,
                    column: self.name.clone(),
                    value: raw.to_string(),
                }),
        }
    }
}
