//! Line-oriented database file format.
//!
//! ```text
//! <table_count>
//! <table_name>
//! <column_count>
//! <column_1>
//! ...
//! <column_N>
//! <next_id>
//! <record_count>
//! <field_1>|<field_2>|...|<field_N>|<id>
//! ```
//!
//! The block from `<table_name>` through the record lines repeats `table_count` times.
//! Field values are joined with `|` without escaping, so a value containing `|` or a line
//! break does not load back as it was saved. Saving logs a warning when that happens.
//!
//! Loading is stricter about identity than about layout: `next_id` must be at least 1 and
//! every numeric record id must leave room for a larger `next_id`. A table name that
//! appears twice is not an error; the later block replaces the earlier one in place.

use std::io::{self, Write};
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use thiserror::Error;

use crate::record::{Record, ID_COLUMN};
use crate::table::Table;

const FIELD_DELIMITER: &str = "|";

/// A parse failure, located by 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub message: String,
}

impl FormatError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Writes `tables` in file order.
pub fn write_tables(tables: &[Table], out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", tables.len())?;
    for table in tables {
        writeln!(out, "{}", table.name())?;
        writeln!(out, "{}", table.columns().len())?;
        for column in table.columns() {
            writeln!(out, "{column}")?;
        }
        writeln!(out, "{}", table.next_id())?;
        writeln!(out, "{}", table.len())?;
        for record in table.records() {
            let mut values = Vec::with_capacity(table.columns().len());
            for column in table.columns() {
                let value = record.get(column);
                if value.contains(FIELD_DELIMITER) || value.contains(['\n', '\r']) {
                    log::warn!(
                        "table '{}' record {}: value of '{}' contains a delimiter or line break \
                         and will not load back unchanged",
                        table.name(),
                        record.id(),
                        column
                    );
                }
                values.push(value);
            }
            writeln!(
                out,
                "{}{FIELD_DELIMITER}{}",
                values.join(FIELD_DELIMITER),
                record.id()
            )?;
        }
    }
    Ok(())
}

/// Renders `tables` to a string in the file format.
pub fn to_string(tables: &[Table]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_tables(tables, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parses a whole database file. Tables are returned in file order.
pub fn parse(text: &str) -> Result<Vec<Table>, FormatError> {
    let mut reader = LineReader::new(text);

    let table_count = reader.count("table count")?;
    let mut tables: Vec<Table> = Vec::with_capacity(table_count.min(1024));
    for _ in 0..table_count {
        let table = reader.table()?;
        match tables.iter_mut().find(|t| t.name() == table.name()) {
            Some(earlier) => {
                log::warn!(
                    "line {}: table '{}' appears again; the later block replaces the earlier one",
                    reader.table_line,
                    table.name()
                );
                *earlier = table;
            }
            None => tables.push(table),
        }
    }

    if reader.lines.any(|(_, line)| !line.trim().is_empty()) {
        log::debug!("ignoring trailing content after {table_count} tables");
    }
    Ok(tables)
}

struct LineReader<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    last_line: usize,
    table_line: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
            last_line: 0,
            table_line: 0,
        }
    }

    fn next(&mut self, expected: &str) -> Result<&'a str, FormatError> {
        match self.lines.next() {
            Some((index, line)) => {
                self.last_line = index + 1;
                Ok(line)
            }
            None => Err(FormatError::new(
                self.last_line + 1,
                format!("unexpected end of file, expected {expected}"),
            )),
        }
    }

    fn number<T: std::str::FromStr>(&mut self, expected: &str) -> Result<T, FormatError> {
        let line = self.next(expected)?;
        line.trim().parse().map_err(|_| {
            FormatError::new(self.last_line, format!("expected {expected}, found {line:?}"))
        })
    }

    fn count(&mut self, expected: &str) -> Result<usize, FormatError> {
        self.number(expected)
    }

    fn table(&mut self) -> Result<Table, FormatError> {
        let name = self.next("table name")?.to_string();
        self.table_line = self.last_line;

        let column_count = self.count("column count")?;
        let mut columns = Vec::with_capacity(column_count.min(1024));
        for _ in 0..column_count {
            columns.push(self.next("column name")?.to_string());
        }
        if column_count == 0 {
            // Older writers emitted an empty line for an empty column list.
            let blank = matches!(self.lines.peek(), Some((_, line)) if line.trim().is_empty());
            if blank {
                self.next("next id")?;
            }
        }

        let next_id: u64 = self.number("next id")?;
        if next_id == 0 {
            return Err(FormatError::new(self.last_line, "next id must be at least 1"));
        }
        let record_count = self.count("record count")?;
        let mut table = Table::from_parts(name, columns, next_id);
        for _ in 0..record_count {
            let line = self.next("record")?;
            let record = self.record(&table, line)?;
            if let Ok(id) = record.id().trim().parse::<u64>() {
                let Some(raised) = table.observe_id(id) else {
                    return Err(FormatError::new(
                        self.last_line,
                        format!("record id {id} is out of range"),
                    ));
                };
                if raised {
                    log::warn!(
                        "table '{}': record id {id} is not below the stored next id; raised next id to {}",
                        table.name(),
                        table.next_id()
                    );
                }
            }
            table.push_loaded(record);
        }
        Ok(table)
    }

    fn record(&self, table: &Table, line: &str) -> Result<Record, FormatError> {
        let tokens: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let expected = table.columns().len() + 1;
        // A record of a zero-column table is written as `|<id>`.
        let tolerated = table.columns().len().max(1) + 1;
        if tokens.len() < expected {
            return Err(FormatError::new(
                self.last_line,
                format!(
                    "record has {} fields, expected {expected}",
                    tokens.len()
                ),
            ));
        }
        if tokens.len() > tolerated {
            log::warn!(
                "table '{}' line {}: record has {} fields, expected {expected}; \
                 a value probably contains '{FIELD_DELIMITER}'",
                table.name(),
                self.last_line,
                tokens.len()
            );
        }

        let mut record = Record::new();
        for (column, value) in table.columns().iter().zip(&tokens) {
            record.set(column.clone(), *value);
        }
        // `tokens` is never empty: `split` yields at least one piece.
        let id = tokens.last().copied().unwrap_or_default();
        record.set(ID_COLUMN, id);
        Ok(record)
    }
}
