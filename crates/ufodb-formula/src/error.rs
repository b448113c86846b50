use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error(
        "invalid command format at position {position}: {reason} \
         (use ={{row}}column [+|-|*|/] {{row}}column ...)"
    )]
    InvalidCommandFormat { position: usize, reason: &'static str },
    #[error("column '{0}' not found")]
    UnknownColumn(String),
    #[error("column index {index} out of range for {len} columns")]
    ColumnIndexOutOfRange { index: usize, len: usize },
    #[error("row index {index} out of range for {len} rows")]
    RowIndexOutOfRange { index: usize, len: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot apply '{operator}' to {left} and {right}")]
    NonNumericOperand {
        operator: char,
        left: &'static str,
        right: &'static str,
    },
}
