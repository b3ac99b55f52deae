//! Table and field metadata.
//!
//! [`TableMeta::new`] lays fields out back to back in declaration order and
//! computes the fixed record size. [`TableMeta::encode`] turns a row of
//! values into a record of that layout.

use std::collections::HashSet;

use crate::datum::{AttrType, Value, DATE_WIDTH};

use super::error::StorageError;
use super::record::Record;

/// Width used for CHARS columns created without an explicit width.
pub const DEFAULT_CHARS_WIDTH: usize = 4;

/// Column definition used to create a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub attr_type: AttrType,
    /// Value width in bytes.
    pub len: usize,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

impl ColumnDef {
    /// Creates a NOT NULL column of the given type.
    ///
    /// CHARS columns get [`DEFAULT_CHARS_WIDTH`]; use [`ColumnDef::chars`]
    /// for another width.
    pub fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            len: attr_type.fixed_size().unwrap_or(DEFAULT_CHARS_WIDTH),
            nullable: false,
        }
    }

    /// Creates a NOT NULL CHARS column of `width` bytes.
    pub fn chars(name: impl Into<String>, width: usize) -> Self {
        Self {
            len: width,
            ..Self::new(name, AttrType::Chars)
        }
    }

    /// Marks the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Physical description of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Column name.
    pub name: String,
    /// Column type.
    pub attr_type: AttrType,
    /// Byte offset of the field inside the record (null indicator first if nullable).
    pub offset: usize,
    /// Value width in bytes, excluding the null indicator.
    pub len: usize,
    /// Whether a null indicator byte precedes the value.
    pub nullable: bool,
}

impl FieldMeta {
    /// Offset of the value bytes.
    pub fn value_offset(&self) -> usize {
        self.offset + usize::from(self.nullable)
    }

    /// Bytes the field occupies in a record.
    pub fn slot_len(&self) -> usize {
        self.len + usize::from(self.nullable)
    }

    /// Writes `value` into the field's slot of `buf`, coercing INTS to
    /// FLOATS and CHARS to DATES.
    fn write(&self, value: &Value, buf: &mut [u8]) -> Result<(), StorageError> {
        let slot = &mut buf[self.offset..self.offset + self.slot_len()];
        let (indicator, bytes) = if self.nullable {
            let (indicator, bytes) = slot.split_at_mut(1);
            (Some(indicator), bytes)
        } else {
            (None, slot)
        };

        if value.is_null() {
            return match indicator {
                Some(indicator) => {
                    indicator[0] = 1;
                    Ok(())
                }
                None => Err(StorageError::NullNotAllowed(self.name.clone())),
            };
        }

        match (self.attr_type, value) {
            (AttrType::Ints, Value::Int(n)) => bytes.copy_from_slice(&n.to_le_bytes()),
            (AttrType::Floats, Value::Float(n)) => bytes.copy_from_slice(&n.to_le_bytes()),
            (AttrType::Floats, Value::Int(n)) => bytes.copy_from_slice(&(*n as f32).to_le_bytes()),
            (AttrType::Chars, Value::Chars(s) | Value::Date(s)) => {
                if s.len() > self.len {
                    return Err(StorageError::ValueTooLong {
                        field: self.name.clone(),
                        width: self.len,
                        len: s.len(),
                    });
                }
                bytes[..s.len()].copy_from_slice(s.as_bytes());
            }
            (AttrType::Dates, Value::Date(s) | Value::Chars(s)) => match Value::date(s) {
                Some(Value::Date(normalized)) => bytes.copy_from_slice(normalized.as_bytes()),
                _ => return Err(StorageError::InvalidDate(s.clone())),
            },
            (expected, value) => {
                return Err(StorageError::TypeMismatch {
                    field: self.name.clone(),
                    expected,
                    actual: value.attr_type(),
                })
            }
        }
        Ok(())
    }
}

/// Metadata of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    name: String,
    fields: Vec<FieldMeta>,
    record_size: usize,
}

impl TableMeta {
    /// Lays out `columns` in order.
    ///
    /// Rejects empty or duplicate column names, NULLS columns and zero-width
    /// CHARS columns.
    pub fn new(name: impl Into<String>, columns: &[ColumnDef]) -> Result<Self, StorageError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(columns.len());
        let mut offset = 0;

        for column in columns {
            let invalid = |reason| StorageError::InvalidColumn {
                field: column.name.clone(),
                reason,
            };
            if column.name.is_empty() {
                return Err(invalid("empty name"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(invalid("duplicate name"));
            }
            let len = match column.attr_type {
                AttrType::Nulls => return Err(invalid("NULLS is not a column type")),
                AttrType::Chars if column.len == 0 => return Err(invalid("zero width")),
                AttrType::Chars => column.len,
                AttrType::Dates => DATE_WIDTH,
                AttrType::Ints | AttrType::Floats => 4,
            };

            let field = FieldMeta {
                name: column.name.clone(),
                attr_type: column.attr_type,
                offset,
                len,
                nullable: column.nullable,
            };
            offset += field.slot_len();
            fields.push(field);
        }

        Ok(Self {
            name: name.into(),
            fields,
            record_size: offset,
        })
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Number of fields.
    pub fn field_num(&self) -> usize {
        self.fields.len()
    }

    /// Size in bytes of every record of this table.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Encodes one row of values into a record.
    pub fn encode(&self, values: &[Value]) -> Result<Record, StorageError> {
        if values.len() != self.fields.len() {
            return Err(StorageError::ColumnCountMismatch {
                table: self.name.clone(),
                expected: self.fields.len(),
                actual: values.len(),
            });
        }

        let mut data = vec![0u8; self.record_size];
        for (field, value) in self.fields.iter().zip(values) {
            field.write(value, &mut data)?;
        }
        Ok(Record::new(data))
    }
}
