//! Record-oriented table store.
//!
//! A [`Database`] owns named [`Table`]s; a table owns an ordered list of [`Record`]s, each of
//! which is an open mapping from column name to text carrying a reserved `id` field minted
//! from a per-table counter. The whole database persists to a line-oriented text file (see
//! [`format`]).
//!
//! All values are opaque text. The declared column list of a table is advisory: records may
//! carry fields outside it.

pub mod database;
pub mod error;
pub mod format;
pub mod options;
pub mod record;
pub mod render;
pub mod table;

pub use database::Database;
pub use error::{PersistError, StoreError};
pub use format::FormatError;
pub use options::{SaveMode, StoreOptions};
pub use record::{Record, RecordId, ID_COLUMN};
pub use render::{render_records, render_table};
pub use table::Table;
