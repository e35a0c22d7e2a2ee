use thiserror::Error;

/// Errors raised while declaring a feature schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{group} column group is empty")]
    EmptyGroup { group: &'static str },
    #[error("column '{column}' is declared more than once")]
    DuplicateColumn { column: String },
    #[error("target column name is empty")]
    EmptyTarget,
}

pub type Result<T> = std::result::Result<T, SchemaError>;
