use ufodb_store::{Table, ID_COLUMN};

use crate::error::FormulaError;
use crate::parser::{parse_command, CellRef, ColumnRef, Command};
use crate::value::FormulaValue;

/// Read-only grid the evaluator pulls cells from.
pub trait CellSource {
    /// Declared columns in order, excluding the identity field.
    fn columns(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Text stored at `row` under `field`. Missing fields read as empty.
    fn cell(&self, row: usize, field: &str) -> Option<&str>;
}

impl CellSource for Table {
    fn columns(&self) -> &[String] {
        Table::columns(self)
    }

    fn row_count(&self) -> usize {
        self.len()
    }

    fn cell(&self, row: usize, field: &str) -> Option<&str> {
        self.row(row).map(|record| record.get(field))
    }
}

/// Looks up the raw text a reference points at.
///
/// The column is resolved before the row, so a reference that is wrong in both places
/// reports the column.
pub fn resolve<'a, S>(cell: &CellRef, source: &'a S) -> Result<&'a str, FormulaError>
where
    S: CellSource + ?Sized,
{
    let columns = source.columns();
    let field = match &cell.column {
        ColumnRef::Id => ID_COLUMN,
        ColumnRef::Index(index) => columns
            .get(*index)
            .ok_or(FormulaError::ColumnIndexOutOfRange {
                index: *index,
                len: columns.len(),
            })?
            .as_str(),
        ColumnRef::Name(name) => {
            let wanted = name.to_lowercase();
            columns
                .iter()
                .find(|column| column.to_lowercase() == wanted)
                .ok_or_else(|| FormulaError::UnknownColumn(name.clone()))?
                .as_str()
        }
    };

    source
        .cell(cell.row, field)
        .ok_or(FormulaError::RowIndexOutOfRange {
            index: cell.row,
            len: source.row_count(),
        })
}

/// Resolves every reference, then folds the values left to right.
///
/// A reference error anywhere in the command wins over an arithmetic error earlier in it.
pub fn evaluate<S>(command: &Command, source: &S) -> Result<FormulaValue, FormulaError>
where
    S: CellSource + ?Sized,
{
    let first = FormulaValue::coerce(resolve(command.first(), source)?);
    let operands = command
        .steps()
        .iter()
        .map(|(op, cell)| Ok((*op, FormulaValue::coerce(resolve(cell, source)?))))
        .collect::<Result<Vec<_>, FormulaError>>()?;

    operands
        .into_iter()
        .try_fold(first, |acc, (op, rhs)| acc.apply(op, rhs))
}

/// Parses and evaluates `input` against `source`.
pub fn execute_command<S>(input: &str, source: &S) -> Result<FormulaValue, FormulaError>
where
    S: CellSource + ?Sized,
{
    let command = parse_command(input)?;
    let result = evaluate(&command, source);
    if let Err(err) = &result {
        log::debug!("formula {input:?} failed: {err}");
    }
    result
}
