use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the implicit identity field carried by every record.
pub const ID_COLUMN: &str = "id";

/// Per-table record identifier, minted from the table's `next_id` counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One row: an open mapping from field name to text.
///
/// Fields outside the owning table's column list are allowed. Reading a field the record
/// does not carry yields the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field's text, or `""` when the record does not carry it.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Returns the field's text only when the record carries it.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    /// The identity field as stored (decimal text).
    pub fn id(&self) -> &str {
        self.get(ID_COLUMN)
    }

    /// Identity matches compare the stored text against the decimal form of `id`.
    pub fn has_id(&self, id: RecordId) -> bool {
        self.id() == id.to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_read_as_empty_text() {
        let record: Record = [("a", "1")].into_iter().collect();
        assert_eq!(record.get("a"), "1");
        assert_eq!(record.get("b"), "");
        assert_eq!(record.field("b"), None);
    }

    #[test]
    fn id_match_is_textual() {
        let mut record = Record::new();
        record.set(ID_COLUMN, "7");
        assert!(record.has_id(RecordId::new(7)));

        record.set(ID_COLUMN, "07");
        assert!(!record.has_id(RecordId::new(7)));
    }

    #[test]
    fn record_id_parses_surrounding_whitespace() {
        assert_eq!(" 12 ".parse::<RecordId>(), Ok(RecordId::new(12)));
        assert!("x".parse::<RecordId>().is_err());
    }
}
