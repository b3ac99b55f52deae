//! Fixed-layout records.

use crate::datum::{AttrType, Value};

use super::error::StorageError;
use super::meta::FieldMeta;

/// Raw bytes of one row, laid out as described by a [`TableMeta`](super::TableMeta).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: Vec<u8>,
}

impl Record {
    /// Wraps raw record bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length record.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decodes the value of `field`.
    ///
    /// A nullable field whose indicator byte is non-zero reads as NULL.
    /// CHARS and DATES end at the first NUL byte or at the field width.
    pub fn value(&self, field: &FieldMeta) -> Result<Value, StorageError> {
        let slot = self
            .data
            .get(field.offset..field.offset + field.slot_len())
            .ok_or_else(|| StorageError::FieldOutOfBounds {
                field: field.name.clone(),
                record_len: self.data.len(),
            })?;

        let bytes = if field.nullable {
            if slot[0] != 0 {
                return Ok(Value::Null);
            }
            &slot[1..]
        } else {
            slot
        };

        let value = match field.attr_type {
            AttrType::Ints => Value::Int(i32::from_le_bytes(word(bytes))),
            AttrType::Floats => Value::Float(f32::from_le_bytes(word(bytes))),
            AttrType::Chars => Value::Chars(text(bytes)),
            AttrType::Dates => Value::Date(text(bytes)),
            AttrType::Nulls => Value::Null,
        };
        Ok(value)
    }
}

fn word(bytes: &[u8]) -> [u8; 4] {
    let mut buf = [0u8; 4];
    let n = bytes.len().min(4);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ColumnDef, TableMeta};

    #[test]
    fn test_decode_values() {
        let meta = TableMeta::new(
            "t",
            &[
                ColumnDef::new("a", AttrType::Ints).nullable(),
                ColumnDef::chars("b", 4),
                ColumnDef::new("c", AttrType::Dates).nullable(),
            ],
        )
        .unwrap();
        let record = meta
            .encode(&[Value::Int(-5), Value::Chars("abcd".into()), Value::Null])
            .unwrap();

        let fields = meta.fields();
        assert_eq!(record.value(&fields[0]).unwrap(), Value::Int(-5));
        assert_eq!(record.value(&fields[1]).unwrap(), Value::Chars("abcd".into()));
        assert_eq!(record.value(&fields[2]).unwrap(), Value::Null);
    }

    #[test]
    fn test_short_strings_stop_at_nul() {
        let meta = TableMeta::new("t", &[ColumnDef::chars("b", 6)]).unwrap();
        let record = meta.encode(&[Value::Chars("xy".into())]).unwrap();
        assert_eq!(record.data(), b"xy\0\0\0\0");
        assert_eq!(record.value(&meta.fields()[0]).unwrap(), Value::Chars("xy".into()));
    }

    #[test]
    fn test_field_out_of_bounds() {
        let meta = TableMeta::new("t", &[ColumnDef::new("a", AttrType::Floats)]).unwrap();
        let record = Record::new(vec![1, 2]);
        assert_eq!(
            record.value(&meta.fields()[0]),
            Err(StorageError::FieldOutOfBounds {
                field: "a".into(),
                record_len: 2,
            })
        );
    }
}
