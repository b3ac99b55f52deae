//! Client sessions.
//!
//! A [`Session`] holds the current database, the session configuration and
//! an optional explicit transaction. Without an explicit transaction every
//! SELECT runs in its own auto-commit transaction; after [`Session::begin`]
//! the session is in multi-operation mode and the caller ends the
//! transaction with [`Session::commit`] or [`Session::rollback`].

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::executor::{ExecutorError, SelectExecutor};
use crate::sql::Selects;
use crate::storage::DefaultHandler;
use crate::tx::{TransactionManager, Trx, TxError};

/// Status reported for a successful statement.
pub const SUCCESS: &str = "SUCCESS";

/// Outcome of one statement as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    status: &'static str,
    response: String,
}

impl SessionEvent {
    fn success(response: String) -> Self {
        Self {
            status: SUCCESS,
            response,
        }
    }

    fn failure(err: &ExecutorError) -> Self {
        Self {
            status: err.code(),
            response: format!("{}\n", err.code()),
        }
    }

    /// `SUCCESS` or the error code of the failed statement.
    pub fn status(&self) -> &'static str {
        self.status
    }

    /// Returns true if the statement succeeded.
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    /// Text sent to the client: the result set, or the error code line.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Consumes the event and returns the response text.
    pub fn into_response(self) -> String {
        self.response
    }
}

/// A client session.
///
/// # Transaction Cleanup
///
/// Dropping a session with an explicit transaction still open rolls it back.
pub struct Session {
    handler: Arc<DefaultHandler>,
    tx_manager: Arc<TransactionManager>,
    db: String,
    transaction: Option<Trx>,
    config: Config,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.rollback();
    }
}

impl Session {
    /// Creates a session using database `db`.
    pub fn new(handler: Arc<DefaultHandler>, tx_manager: Arc<TransactionManager>, db: impl Into<String>) -> Self {
        Self {
            handler,
            tx_manager,
            db: db.into(),
            transaction: None,
            config: Config::default(),
        }
    }

    /// Replaces the session configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current database.
    pub fn current_db(&self) -> &str {
        &self.db
    }

    /// Switches the current database.
    pub fn set_current_db(&mut self, db: impl Into<String>) {
        self.db = db.into();
    }

    /// Explicit transaction, if one is open.
    pub fn transaction(&self) -> Option<&Trx> {
        self.transaction.as_ref()
    }

    /// Returns true between [`begin`](Self::begin) and the matching commit or rollback.
    pub fn is_trx_multi_operation_mode(&self) -> bool {
        self.transaction.is_some()
    }

    /// Opens an explicit transaction. No-op if one is already open.
    pub fn begin(&mut self) -> &Trx {
        let tx_manager = &self.tx_manager;
        self.transaction.get_or_insert_with(|| {
            let trx = Trx::begin(tx_manager);
            debug!(txid = %trx.id(), "explicit transaction started");
            trx
        })
    }

    /// Commits the explicit transaction. No-op without one.
    pub fn commit(&mut self) -> Result<(), TxError> {
        match self.transaction.take() {
            Some(trx) => trx.commit(),
            None => Ok(()),
        }
    }

    /// Rolls the explicit transaction back. No-op without one.
    pub fn rollback(&mut self) {
        if let Some(trx) = self.transaction.take() {
            let _ = trx.rollback();
        }
    }

    /// Executes a SELECT and reports its outcome.
    ///
    /// In multi-operation mode the statement runs in the explicit
    /// transaction and leaves it open; otherwise it runs in a fresh
    /// transaction that is committed on success and rolled back on failure.
    pub fn execute_select(&mut self, selects: &Selects) -> SessionEvent {
        let output = &self.config.output;
        let outcome = match &self.transaction {
            Some(trx) => SelectExecutor::new(&self.handler, &self.db, trx).run(selects, output, true),
            None => {
                let trx = Trx::begin(&self.tx_manager);
                SelectExecutor::new(&self.handler, &self.db, &trx).run(selects, output, false)
            }
        };

        match outcome {
            Ok(text) => SessionEvent::success(text),
            Err(err) => SessionEvent::failure(&err),
        }
    }
}
