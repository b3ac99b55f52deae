//! Tables and table scans.

use parking_lot::RwLock;

use crate::tx::TxId;

use super::error::StorageError;
use super::meta::TableMeta;
use super::record::Record;

/// A record tagged with the transaction that inserted it.
#[derive(Debug, Clone)]
struct StoredRecord {
    xmin: TxId,
    record: Record,
}

/// An in-memory table.
///
/// Records are kept in insertion order. Visibility is decided by the caller
/// through the predicate given to [`Table::scan_visible`].
#[derive(Debug)]
pub struct Table {
    meta: TableMeta,
    records: RwLock<Vec<StoredRecord>>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(meta: TableMeta) -> Self {
        Self {
            meta,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// Table metadata.
    pub fn table_meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Appends a record written by `xmin`.
    pub(crate) fn append(&self, xmin: TxId, record: Record) {
        self.records.write().push(StoredRecord { xmin, record });
    }

    /// Collects the records whose writer satisfies `is_visible`.
    ///
    /// The visible records are copied out under the read lock so the scan
    /// does not hold it while the caller iterates.
    pub(crate) fn scan_visible(&self, is_visible: impl Fn(TxId) -> bool) -> TableScan {
        let records: Vec<Record> = self
            .records
            .read()
            .iter()
            .filter(|stored| is_visible(stored.xmin))
            .map(|stored| stored.record.clone())
            .collect();

        TableScan {
            table: self.meta.name().to_string(),
            record_size: self.meta.record_size(),
            records: records.into_iter(),
        }
    }
}

/// Iterator over the visible records of a table.
///
/// Yields an error for every record whose length does not match the table's
/// record size.
#[derive(Debug)]
pub struct TableScan {
    table: String,
    record_size: usize,
    records: std::vec::IntoIter<Record>,
}

impl Iterator for TableScan {
    type Item = Result<Record, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        if record.len() != self.record_size {
            return Some(Err(StorageError::MalformedRecord {
                table: self.table.clone(),
                expected: self.record_size,
                actual: record.len(),
            }));
        }
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{AttrType, Value};
    use crate::storage::ColumnDef;

    fn int_table() -> Table {
        Table::new(TableMeta::new("t", &[ColumnDef::new("a", AttrType::Ints)]).unwrap())
    }

    #[test]
    fn test_scan_filters_by_writer() {
        let table = int_table();
        for (txid, n) in [(1, 10), (2, 20), (1, 30)] {
            let record = table.table_meta().encode(&[Value::Int(n)]).unwrap();
            table.append(TxId::new(txid), record);
        }

        let field = &table.table_meta().fields()[0];
        let values: Vec<Value> = table
            .scan_visible(|txid| txid == TxId::new(1))
            .map(|r| r.unwrap().value(field).unwrap())
            .collect();
        assert_eq!(values, vec![Value::Int(10), Value::Int(30)]);
    }

    #[test]
    fn test_scan_reports_malformed_record() {
        let table = int_table();
        table.append(TxId::new(1), Record::new(vec![0; 3]));

        let mut scan = table.scan_visible(|_| true);
        assert_eq!(
            scan.next(),
            Some(Err(StorageError::MalformedRecord {
                table: "t".into(),
                expected: 4,
                actual: 3,
            }))
        );
        assert_eq!(scan.next(), None);
    }
}
