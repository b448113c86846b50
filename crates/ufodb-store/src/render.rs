use std::fmt::Write as _;

use crate::record::{Record, ID_COLUMN};
use crate::table::Table;

const CELL_WIDTH: usize = 10;

/// Renders a table as a plain-text grid: `id` first, then the declared columns.
///
/// ```text
/// | id         | name       |
/// --------------------------
/// | 1          | ann        |
/// ```
pub fn render_table(table: &Table) -> String {
    render_records(table.columns(), table.records())
}

/// Renders an arbitrary selection of records under the given column list.
pub fn render_records<'a, I>(columns: &[String], records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = String::new();

    let header = std::iter::once(ID_COLUMN).chain(columns.iter().map(String::as_str));
    push_row(&mut out, header);
    out.push_str(&"-".repeat((CELL_WIDTH + 3) * (columns.len() + 1)));
    out.push('\n');

    for record in records {
        let cells =
            std::iter::once(record.id()).chain(columns.iter().map(|column| record.get(column)));
        push_row(&mut out, cells);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        let sep = if i == 0 { "|" } else { " |" };
        let _ = write!(out, "{sep} {cell:<CELL_WIDTH$}");
    }
    out.push_str(" |\n");
}
