//! Ordered, name-tagged field archives.
//!
//! Persistence in this crate is expressed as an explicit sequence of named
//! field writes and reads. Each persisted type writes a version tag, then its
//! parent's fields (by invoking the embedded parent's hooks), then its own
//! fields, always in the same order; readers consume the very same sequence.
//! The field names make the stored layout self-describing without coupling it
//! to any particular on-disk format.

use crate::math::{Point, Real, Vector};
use downcast_rs::{impl_downcast, Downcast};
use thiserror::Error;

/// Errors produced while reading or instantiating archived data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ArchiveError {
    /// The archive ran out of records while a field was still expected.
    #[error("archive exhausted while reading field `{0}`")]
    Exhausted(String),
    /// The next record's name does not match the requested field.
    #[error("expected field `{expected}` but found `{found}`")]
    FieldMismatch {
        /// Name of the field the reader asked for.
        expected: String,
        /// Name of the record actually stored at the cursor.
        found: String,
    },
    /// The record holds a value of a different type than requested.
    #[error("field `{field}` does not hold a {expected}")]
    TypeMismatch {
        /// Name of the offending field.
        field: String,
        /// The requested value kind.
        expected: &'static str,
    },
    /// A stored enumeration label has no known mapping.
    #[error("field `{field}` holds unknown label `{label}`")]
    UnknownLabel {
        /// Name of the offending field.
        field: String,
        /// The unmapped label.
        label: String,
    },
    /// No factory was registered for the requested type label.
    #[error("no factory registered for type `{0}`")]
    UnknownType(String),
}

/// A single archived value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ArchiveValue {
    /// A boolean flag.
    Bool(bool),
    /// An unsigned integer (version tags, counts).
    U32(u32),
    /// A real scalar.
    Scalar(Real),
    /// A 3D vector.
    Vector(Vector),
    /// A 3D point.
    Point(Point),
    /// A string (names, enumeration labels).
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
struct Record {
    name: String,
    value: ArchiveValue,
}

/// An ordered sink of named field values.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ArchiveOut {
    records: Vec<Record>,
}

impl ArchiveOut {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of records written so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the version tag of `type_name`.
    pub fn write_version(&mut self, type_name: &str, version: u32) {
        self.push(format!("{type_name}::version"), ArchiveValue::U32(version));
    }

    /// Writes a boolean field.
    pub fn write_bool(&mut self, name: &str, value: bool) {
        self.push(name.to_owned(), ArchiveValue::Bool(value));
    }

    /// Writes an unsigned integer field.
    pub fn write_u32(&mut self, name: &str, value: u32) {
        self.push(name.to_owned(), ArchiveValue::U32(value));
    }

    /// Writes a scalar field.
    pub fn write_scalar(&mut self, name: &str, value: Real) {
        self.push(name.to_owned(), ArchiveValue::Scalar(value));
    }

    /// Writes a vector field.
    pub fn write_vector(&mut self, name: &str, value: &Vector) {
        self.push(name.to_owned(), ArchiveValue::Vector(*value));
    }

    /// Writes a point field.
    pub fn write_point(&mut self, name: &str, value: &Point) {
        self.push(name.to_owned(), ArchiveValue::Point(*value));
    }

    /// Writes a string field.
    pub fn write_str(&mut self, name: &str, value: &str) {
        self.push(name.to_owned(), ArchiveValue::Str(value.to_owned()));
    }

    fn push(&mut self, name: String, value: ArchiveValue) {
        self.records.push(Record { name, value });
    }
}

/// An ordered source of named field values, reading back a sequence produced
/// by [`ArchiveOut`].
///
/// Reads are strictly sequential: each read consumes the record at the cursor
/// and fails if its name does not match the requested field.
#[derive(Clone, Debug)]
pub struct ArchiveIn {
    records: Vec<Record>,
    cursor: usize,
}

impl From<ArchiveOut> for ArchiveIn {
    fn from(out: ArchiveOut) -> Self {
        Self {
            records: out.records,
            cursor: 0,
        }
    }
}

impl ArchiveIn {
    /// The number of records not yet consumed.
    pub fn remaining(&self) -> usize {
        self.records.len() - self.cursor
    }

    /// Reads the version tag of `type_name`.
    pub fn read_version(&mut self, type_name: &str) -> Result<u32, ArchiveError> {
        let name = format!("{type_name}::version");
        match self.next(&name)? {
            ArchiveValue::U32(v) => Ok(v),
            _ => Err(self.type_mismatch(&name, "u32")),
        }
    }

    /// Reads a boolean field.
    pub fn read_bool(&mut self, name: &str) -> Result<bool, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::Bool(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "bool")),
        }
    }

    /// Reads an unsigned integer field.
    pub fn read_u32(&mut self, name: &str) -> Result<u32, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::U32(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "u32")),
        }
    }

    /// Reads a scalar field.
    pub fn read_scalar(&mut self, name: &str) -> Result<Real, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::Scalar(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "scalar")),
        }
    }

    /// Reads a vector field.
    pub fn read_vector(&mut self, name: &str) -> Result<Vector, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::Vector(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "vector")),
        }
    }

    /// Reads a point field.
    pub fn read_point(&mut self, name: &str) -> Result<Point, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::Point(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "point")),
        }
    }

    /// Reads a string field.
    pub fn read_str(&mut self, name: &str) -> Result<String, ArchiveError> {
        match self.next(name)? {
            ArchiveValue::Str(v) => Ok(v),
            _ => Err(self.type_mismatch(name, "string")),
        }
    }

    fn next(&mut self, name: &str) -> Result<ArchiveValue, ArchiveError> {
        let record = self
            .records
            .get(self.cursor)
            .ok_or_else(|| ArchiveError::Exhausted(name.to_owned()))?;
        if record.name != name {
            return Err(ArchiveError::FieldMismatch {
                expected: name.to_owned(),
                found: record.name.clone(),
            });
        }
        self.cursor += 1;
        Ok(record.value.clone())
    }

    fn type_mismatch(&self, name: &str, expected: &'static str) -> ArchiveError {
        ArchiveError::TypeMismatch {
            field: name.to_owned(),
            expected,
        }
    }
}

/// Types whose state can be written to and restored from an ordered archive.
///
/// Implementations must keep the read sequence identical to the write
/// sequence: version tag first, then the embedded parent's fields, then the
/// type's own fields.
pub trait Archive: Downcast + std::fmt::Debug {
    /// The stable label identifying this type in archives and in the factory
    /// registry.
    fn type_name(&self) -> &'static str;

    /// Writes this object's state.
    fn archive_out(&self, out: &mut ArchiveOut);

    /// Restores this object's state.
    fn archive_in(&mut self, input: &mut ArchiveIn) -> Result<(), ArchiveError>;
}

impl_downcast!(Archive);
