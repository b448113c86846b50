use serde::{Deserialize, Serialize};

/// Store-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// How [`crate::Database::save`] replaces the target file.
    pub save_mode: SaveMode,
}

/// Strategy used when rewriting a database file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    /// Write a sibling temp file, sync it, then rename it over the target.
    #[default]
    Atomic,
    /// Truncate the target and write into it directly. A failed save leaves a partial file.
    InPlace,
}
