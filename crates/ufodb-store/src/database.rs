use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::{PersistError, StoreError};
use crate::format::{self, FormatError};
use crate::options::{SaveMode, StoreOptions};
use crate::record::{Record, RecordId};
use crate::table::Table;

/// Named tables, kept in creation order. The unit of persistence.
///
/// Every operation looks its table up by name. Lookups scan linearly, as do record lookups
/// by id inside a table; both are sized for interactive documents, not bulk data.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Vec<Table>,
    options: StoreOptions,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            tables: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(Table::name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name() == name)
    }

    fn require(&self, name: &str) -> Result<&Table, StoreError> {
        self.table(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut Table, StoreError> {
        self.table_mut(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Creates an empty table with `next_id = 1`.
    pub fn create_table<I, S>(
        &mut self,
        name: impl Into<String>,
        columns: I,
    ) -> Result<&mut Table, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.table(&name).is_some() {
            return Err(StoreError::DuplicateTable(name));
        }
        let table = Table::new(name, columns)?;
        log::debug!("created table '{}' with {} columns", table.name(), table.columns().len());
        self.tables.push(table);
        let last = self.tables.len() - 1;
        Ok(&mut self.tables[last])
    }

    /// Appends a record to `table` and returns its minted id.
    pub fn insert<I, K, V>(&mut self, table: &str, values: I) -> Result<RecordId, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.require_mut(table)?.insert_record(values)
    }

    /// Overwrites the given fields of record `id` in `table`.
    pub fn update<I, K, V>(
        &mut self,
        table: &str,
        id: RecordId,
        updates: I,
    ) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.require_mut(table)?.update_record(id, updates)
    }

    /// Removes record `id` from `table`.
    ///
    /// Returns `false` both when the record and when the table does not exist, so callers
    /// can probe without handling an error.
    pub fn delete_record(&mut self, table: &str, id: RecordId) -> bool {
        match self.table_mut(table) {
            Some(table) => table.delete_record(id),
            None => false,
        }
    }

    pub fn select_all(&self, table: &str) -> Result<&[Record], StoreError> {
        Ok(self.require(table)?.records())
    }

    pub fn select_where(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<&Record>, StoreError> {
        Ok(self.require(table)?.select_where(column, value))
    }

    pub fn add_column(&mut self, table: &str, column: impl Into<String>) -> Result<(), StoreError> {
        self.require_mut(table)?.add_column(column)
    }

    pub fn remove_column(&mut self, table: &str, column: &str) -> Result<(), StoreError> {
        self.require_mut(table)?.remove_column(column)
    }

    pub fn rename_column(
        &mut self,
        table: &str,
        from: &str,
        to: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.require_mut(table)?.rename_column(from, to)
    }

    pub fn fill_down(
        &mut self,
        table: &str,
        column: &str,
        rows: RangeInclusive<usize>,
    ) -> Result<(), StoreError> {
        self.require_mut(table)?.fill_down(column, rows)
    }

    /// Serializes every table into the file format.
    pub fn to_file_contents(&self) -> String {
        format::to_string(&self.tables)
    }

    /// Replaces all tables with the contents of `text`. On error nothing changes.
    pub fn replace_from_str(&mut self, text: &str) -> Result<(), FormatError> {
        self.tables = format::parse(text)?;
        Ok(())
    }

    /// Rewrites `path` with the whole database, using the configured [`SaveMode`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let tables = &self.tables;
        let result = match self.options.save_mode {
            SaveMode::Atomic => ufodb_fs::replace_with(path, |out| format::write_tables(tables, out)),
            SaveMode::InPlace => {
                ufodb_fs::overwrite_with(path, |out| format::write_tables(tables, out))
            }
        };
        result.map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("saved {} tables to {}", self.tables.len(), path.display());
        Ok(())
    }

    /// Replaces every table with the contents of `path`. On error nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PersistError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PersistError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        self.replace_from_str(&text)
            .map_err(|source| PersistError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("loaded {} tables from {}", self.tables.len(), path.display());
        Ok(())
    }

    /// [`Database::save`] reporting only success; the failure is logged.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> bool {
        match self.save(path) {
            Ok(()) => true,
            Err(err) => {
                log::error!("{err}");
                false
            }
        }
    }

    /// [`Database::load`] reporting only success; the failure is logged.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> bool {
        match self.load(path) {
            Ok(()) => true,
            Err(err) => {
                log::error!("{err}");
                false
            }
        }
    }
}
