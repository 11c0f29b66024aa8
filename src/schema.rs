//! Column schema for the raw passenger CSV.
use crate::error::{DataError, Result};

/// Declared type of a raw CSV column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Integer,
    Double,
    String,
    /// Categorical column with a fixed, ordered vocabulary. The position of a
    /// value in the vocabulary is its integer code.
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// Ordered list of columns. Must match the CSV column order exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// The twelve columns of the Kaggle Titanic files.
    pub fn titanic() -> Self {
        fn col(name: &str, kind: ColumnType) -> Column {
            Column { name: name.to_string(), kind }
        }
        fn vocab(values: &[&str]) -> ColumnType {
            ColumnType::Categorical(values.iter().map(|v| v.to_string()).collect())
        }
        Self::new(vec![
            col("PassengerId", ColumnType::Integer),
            col("Survived", ColumnType::Integer),
            col("Pclass", ColumnType::Integer),
            col("Name", ColumnType::String),
            col("Sex", vocab(&["male", "female"])),
            col("Age", ColumnType::Double),
            col("SibSp", ColumnType::Integer),
            col("Parch", ColumnType::Integer),
            col("Ticket", ColumnType::String),
            col("Fare", ColumnType::Double),
            col("Cabin", ColumnType::String),
            col("Embarked", vocab(&["C", "Q", "S", ""])),
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    /// Checks a header record against the declared column names, in order.
    pub fn check_header<'a, I>(&self, header: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let found: Vec<&str> = header.into_iter().map(str::trim).collect();
        let expected: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        if found != expected {
            return Err(DataError::SchemaMismatch {
                expected: expected.join(","),
                found: found.join(","),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titanic_schema_order() {
        let schema = Schema::titanic();
        assert_eq!(schema.len(), 12);
        assert_eq!(schema.index_of("PassengerId").unwrap(), 0);
        assert_eq!(schema.index_of("Embarked").unwrap(), 11);
        assert!(matches!(
            schema.index_of("Boat"),
            Err(DataError::UnknownColumn(c)) if c == "Boat"
        ));
    }

    #[test]
    fn header_check() {
        let schema = Schema::titanic();
        let header = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";
        assert!(schema.check_header(header.split(',')).is_ok());

        let swapped = "PassengerId,Pclass,Survived,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";
        assert!(matches!(
            schema.check_header(swapped.split(',')),
            Err(DataError::SchemaMismatch { .. })
        ));
    }
}
