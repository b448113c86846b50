use std::ops::RangeInclusive;

use crate::error::StoreError;
use crate::record::{Record, RecordId, ID_COLUMN};

/// A named collection of records with an ordered column list and an identity counter.
///
/// Records keep insertion order. Identifiers are minted from `next_id`, which only grows:
/// deleting a record never recycles its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    records: Vec<Record>,
    next_id: u64,
}

impl Table {
    /// Creates an empty table. Column names must be distinct, non-empty, single-line and
    /// must not shadow the implicit `id` column.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        validate_table_name(&name)?;

        let mut table = Self {
            name,
            columns: Vec::new(),
            records: Vec::new(),
            next_id: 1,
        };
        for column in columns {
            let column = column.into();
            table.check_new_column(&column)?;
            table.columns.push(column);
        }
        Ok(table)
    }

    /// Rebuilds an empty table from persisted parts without validating names.
    pub(crate) fn from_parts(name: String, columns: Vec<String>, next_id: u64) -> Self {
        Self {
            name,
            columns,
            records: Vec::new(),
            next_id,
        }
    }

    /// Appends a record read from a file, keeping its stored id.
    pub(crate) fn push_loaded(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared columns in order, excluding `id`.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Zero-based row lookup.
    pub fn row(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Appends a record and returns its freshly minted id.
    ///
    /// Declared columns missing from `values` are stored as empty text; keys outside the
    /// column list are kept. A caller-supplied `id` is overwritten. Fails with
    /// [`StoreError::IdSpaceExhausted`] once `next_id` has no successor.
    pub fn insert_record<I, K, V>(&mut self, values: I) -> Result<RecordId, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let Some(following) = self.next_id.checked_add(1) else {
            return Err(StoreError::IdSpaceExhausted(self.name.clone()));
        };

        let mut record: Record = values.into_iter().collect();
        for column in &self.columns {
            if !record.contains(column) {
                record.set(column.clone(), String::new());
            }
        }

        let id = RecordId::new(self.next_id);
        record.set(ID_COLUMN, id.to_string());
        self.next_id = following;
        self.records.push(record);
        Ok(id)
    }

    /// Overwrites the given fields of record `id`, leaving the others untouched.
    pub fn update_record<I, K, V>(&mut self, id: RecordId, updates: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let updates: Vec<(String, String)> = updates
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if updates.iter().any(|(field, _)| field == ID_COLUMN) {
            return Err(StoreError::InvalidColumn {
                table: self.name.clone(),
                column: ID_COLUMN.to_string(),
                reason: "the identity field cannot be updated",
            });
        }

        let Some(record) = self.records.iter_mut().find(|record| record.has_id(id)) else {
            return Err(StoreError::RecordNotFound {
                table: self.name.clone(),
                id,
            });
        };
        for (field, value) in updates {
            record.set(field, value);
        }
        Ok(())
    }

    /// Removes the first record with `id`. Returns `false` when there is none.
    pub fn delete_record(&mut self, id: RecordId) -> bool {
        match self.records.iter().position(|record| record.has_id(id)) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    /// Records whose `column` text equals `value` exactly, in insertion order.
    pub fn select_where(&self, column: &str, value: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.get(column) == value)
            .collect()
    }

    /// Appends a column. Existing records stay without the field until it is set.
    pub fn add_column(&mut self, column: impl Into<String>) -> Result<(), StoreError> {
        let column = column.into();
        self.check_new_column(&column)?;
        self.columns.push(column);
        Ok(())
    }

    /// Removes a column and deletes its field from every record.
    pub fn remove_column(&mut self, column: &str) -> Result<(), StoreError> {
        let index = self.require_column(column)?;
        self.columns.remove(index);
        for record in &mut self.records {
            record.remove(column);
        }
        Ok(())
    }

    /// Renames a column in place and moves every record's value to the new name.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> Result<(), StoreError> {
        let to = to.into();
        let index = self.require_column(from)?;
        if from == to {
            return Ok(());
        }
        self.check_new_column(&to)?;

        self.columns[index] = to.clone();
        for record in &mut self.records {
            if let Some(value) = record.remove(from) {
                record.set(to.clone(), value);
            }
        }
        Ok(())
    }

    /// Copies the value of the first row in `rows` into every other row of the range.
    pub fn fill_down(&mut self, column: &str, rows: RangeInclusive<usize>) -> Result<(), StoreError> {
        self.require_column(column)?;
        let (first, last) = (*rows.start(), *rows.end());
        if first > last || last >= self.records.len() {
            return Err(StoreError::RowOutOfRange {
                table: self.name.clone(),
                first,
                last,
                len: self.records.len(),
            });
        }

        let value = self.records[first].get(column).to_string();
        for record in &mut self.records[first + 1..=last] {
            record.set(column, value.clone());
        }
        Ok(())
    }

    /// Raises `next_id` so it stays above an id found in persisted data.
    ///
    /// Returns `None` when `id` has no successor, i.e. no `next_id` can stay above it.
    pub(crate) fn observe_id(&mut self, id: u64) -> Option<bool> {
        if id < self.next_id {
            return Some(false);
        }
        self.next_id = id.checked_add(1)?;
        Some(true)
    }

    fn require_column(&self, column: &str) -> Result<usize, StoreError> {
        self.column_index(column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    fn check_new_column(&self, column: &str) -> Result<(), StoreError> {
        let reason = if column.is_empty() {
            Some("column name is empty")
        } else if column.eq_ignore_ascii_case(ID_COLUMN) {
            Some("the id column is implicit")
        } else if column.contains(['\n', '\r']) {
            Some("column name contains a line break")
        } else if self.columns.iter().any(|c| c == column) {
            Some("column already exists")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StoreError::InvalidColumn {
                table: self.name.clone(),
                column: column.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let reason = if name.is_empty() {
        "table name is empty"
    } else if name.contains(['\n', '\r']) {
        "table name contains a line break"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidTableName {
        name: name.to_string(),
        reason,
    })
}
