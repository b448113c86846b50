//! Quick formulas over a single table.
//!
//! A command is `=` followed by cell references joined by `+`, `-`, `*` or `/`:
//!
//! ```text
//! ={0}price * {0}qty - {1}2
//! ```
//!
//! `{row}` is a zero-based row index. The column part is `id`, a zero-based position into
//! the declared columns, or a column name (case-insensitive). Operators apply strictly left
//! to right with no precedence, like a running total.
//!
//! ```
//! use ufodb_formula::{execute_command, FormulaValue};
//! use ufodb_store::Table;
//!
//! let mut table = Table::new("t", ["a", "b"]).unwrap();
//! table.insert_record([("a", "3"), ("b", "4")]).unwrap();
//!
//! assert_eq!(execute_command("={0}a + {0}b * {0}1", &table), Ok(FormulaValue::Int(28)));
//! ```

mod error;
mod eval;
mod parser;
mod value;

pub use error::FormulaError;
pub use eval::{evaluate, execute_command, resolve, CellSource};
pub use parser::{parse_command, CellRef, ColumnRef, Command, Operator};
pub use value::FormulaValue;
