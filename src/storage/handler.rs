//! Databases and the table handler.
//!
//! [`DefaultHandler`] owns every database of a server instance and is the
//! entry point the executor uses to look tables up by name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::error::StorageError;
use super::meta::{ColumnDef, TableMeta};
use super::table::Table;

/// A named set of tables.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Database {
    /// Creates an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a table.
    pub fn create_table(&self, name: &str, columns: &[ColumnDef]) -> Result<Arc<Table>, StorageError> {
        let meta = TableMeta::new(name, columns)?;
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(StorageError::TableExists(name.to_string()));
        }
        let table = Arc::new(Table::new(meta));
        tables.insert(name.to_string(), Arc::clone(&table));
        debug!(db = %self.name, table = %name, "table created");
        Ok(table)
    }

    /// Looks a table up by name.
    pub fn find_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.read().get(name).cloned()
    }

    /// Names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registry of databases.
#[derive(Debug, Default)]
pub struct DefaultHandler {
    databases: RwLock<HashMap<String, Arc<Database>>>,
}

impl DefaultHandler {
    /// Creates a handler with no databases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database.
    pub fn create_database(&self, name: &str) -> Result<Arc<Database>, StorageError> {
        let mut databases = self.databases.write();
        if databases.contains_key(name) {
            return Err(StorageError::DatabaseExists(name.to_string()));
        }
        let db = Arc::new(Database::new(name));
        databases.insert(name.to_string(), Arc::clone(&db));
        debug!(db = %name, "database created");
        Ok(db)
    }

    /// Looks a database up by name.
    pub fn database(&self, name: &str) -> Option<Arc<Database>> {
        self.databases.read().get(name).cloned()
    }

    /// Creates a table in database `db`.
    pub fn create_table(
        &self,
        db: &str,
        name: &str,
        columns: &[ColumnDef],
    ) -> Result<Arc<Table>, StorageError> {
        self.database(db)
            .ok_or_else(|| StorageError::DatabaseNotFound(db.to_string()))?
            .create_table(name, columns)
    }

    /// Looks table `name` up in database `db`.
    pub fn find_table(&self, db: &str, name: &str) -> Option<Arc<Table>> {
        self.database(db)?.find_table(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::AttrType;

    #[test]
    fn test_create_and_find() {
        let handler = DefaultHandler::new();
        handler.create_database("sys").unwrap();
        handler
            .create_table("sys", "t", &[ColumnDef::new("a", AttrType::Ints)])
            .unwrap();

        let table = handler.find_table("sys", "t").unwrap();
        assert_eq!(table.name(), "t");
        assert!(handler.find_table("sys", "u").is_none());
        assert!(handler.find_table("other", "t").is_none());
        assert_eq!(handler.database("sys").unwrap().table_names(), vec!["t".to_string()]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let handler = DefaultHandler::new();
        handler.create_database("sys").unwrap();
        assert_eq!(
            handler.create_database("sys").unwrap_err(),
            StorageError::DatabaseExists("sys".into())
        );

        let columns = [ColumnDef::new("a", AttrType::Ints)];
        handler.create_table("sys", "t", &columns).unwrap();
        assert_eq!(
            handler.create_table("sys", "t", &columns).unwrap_err(),
            StorageError::TableExists("t".into())
        );
        assert_eq!(
            handler.create_table("nope", "t", &columns).unwrap_err(),
            StorageError::DatabaseNotFound("nope".into())
        );
    }
}
