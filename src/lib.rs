//! SELECT execution for a small relational database.
//!
//! A parsed [`sql::Selects`] is executed by [`executor::SelectExecutor`]
//! against in-memory [`storage`] tables under a [`tx::Trx`] snapshot.
//! [`session::Session`] wraps this with auto-commit and multi-operation
//! transaction handling and produces the text response sent to a client.

pub mod config;
pub mod datum;
pub mod executor;
pub mod session;
pub mod sql;
pub mod storage;
pub mod tx;
