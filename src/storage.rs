//! In-memory table storage.
//!
//! Tables keep fixed-layout records in insertion order. Every stored record
//! is tagged with the transaction that wrote it so scans can be filtered by a
//! snapshot (see [`crate::tx::Trx::scan`]).
//!
//! # Record layout
//!
//! ```text
//! +------+-----------+------+-----------+-----+
//! | null | field 0   | null | field 1   | ... |   null byte only for nullable fields
//! +------+-----------+------+-----------+-----+
//! ```
//!
//! INTS and FLOATS are 4 bytes little-endian, CHARS occupy their declared
//! width (NUL-terminated unless full) and DATES are 10 ASCII bytes.

pub mod error;
pub mod handler;
pub mod meta;
pub mod record;
pub mod table;

pub use error::StorageError;
pub use handler::{Database, DefaultHandler};
pub use meta::{ColumnDef, FieldMeta, TableMeta};
pub use record::Record;
pub use table::{Table, TableScan};
