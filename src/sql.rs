//! Storage boundary types and the nullable identifier adapter.
//!
//! Database drivers differ in how they hand values over; [`SqlValue`] is the common denominator
//! that a driver integration converts its own cell representation into before scanning, and back
//! from when binding parameters.
//!
//! ```rust
//! use sandid::{NullSandId, SandId, SqlValue};
//!
//! let x = SandId::scan(SqlValue::Text("AAECAwQFBgcICQoLDA0ODw"))?;
//! assert_eq!(x.to_sql(), SqlValue::Bytes(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]));
//!
//! let y = NullSandId::scan(SqlValue::Null)?;
//! assert!(!y.valid);
//! assert_eq!(y.to_sql(), SqlValue::Null);
//! # Ok::<(), sandid::ScanError>(())
//! ```

#[cfg(not(feature = "std"))]
use core as std;

use crate::{ParseError, SandId};
use std::fmt;

/// A value crossing the boundary between an identifier and a storage driver.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum SqlValue<'a> {
    /// An absent value (SQL `NULL`).
    Null,
    /// A string-like value.
    Text(&'a str),
    /// A byte sequence value.
    Bytes(&'a [u8]),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Real(f64),
    /// A boolean value.
    Bool(bool),
}

impl SqlValue<'_> {
    /// Returns a short name of the value type for diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Bool(_) => "bool",
        }
    }
}

impl SandId {
    /// Creates an object from a storage value.
    ///
    /// Text values are decoded from the 22-character representation and byte values from the
    /// 16-byte representation. Any other value type, including [`SqlValue::Null`], is rejected.
    /// Use [`NullSandId`] to scan a column that may hold `NULL`.
    pub fn scan(value: SqlValue<'_>) -> Result<Self, ScanError> {
        match value {
            SqlValue::Text(str_value) => Ok(Self::try_from_str(str_value)?),
            SqlValue::Bytes(slice_value) => Ok(Self::try_from_slice(slice_value)?),
            other => Err(ScanError::invalid_source_type(other.type_name())),
        }
    }

    /// Returns the value handed back to storage, i.e., the 16-byte binary representation.
    pub const fn to_sql(&self) -> SqlValue<'_> {
        SqlValue::Bytes(self.as_bytes())
    }
}

/// Represents a [`SandId`] that may be absent, for use as a scan destination and bind parameter
/// of nullable storage columns.
///
/// An absent value always holds [`SandId::ZERO`] with `valid` set to `false`.
///
/// # Examples
///
/// ```rust
/// use sandid::{NullSandId, SandId, SqlValue};
///
/// let bytes = [0xffu8; 16];
/// let x = NullSandId::scan(SqlValue::Bytes(&bytes))?;
/// assert!(x.valid);
/// assert_eq!(x.id, SandId::from_bytes(bytes));
/// assert_eq!(Option::<SandId>::from(x), Some(x.id));
/// # Ok::<(), sandid::ScanError>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NullSandId {
    /// The identifier, or [`SandId::ZERO`] if absent.
    pub id: SandId,

    /// Whether `id` holds a present value.
    pub valid: bool,
}

impl NullSandId {
    /// The absent value.
    pub const NULL: Self = Self {
        id: SandId::ZERO,
        valid: false,
    };

    /// Creates a present value.
    pub const fn new(id: SandId) -> Self {
        Self { id, valid: true }
    }

    /// Creates an object from a storage value.
    ///
    /// [`SqlValue::Null`] yields the absent value; any other value is scanned as in
    /// [`SandId::scan`] and errors propagate.
    pub fn scan(value: SqlValue<'_>) -> Result<Self, ScanError> {
        match value {
            SqlValue::Null => Ok(Self::NULL),
            other => SandId::scan(other).map(Self::new),
        }
    }

    /// Returns the value handed back to storage: [`SqlValue::Null`] if absent, or the 16-byte
    /// binary representation otherwise.
    pub const fn to_sql(&self) -> SqlValue<'_> {
        if self.valid {
            self.id.to_sql()
        } else {
            SqlValue::Null
        }
    }

    /// Returns the identifier if present.
    pub const fn get(&self) -> Option<SandId> {
        if self.valid {
            Some(self.id)
        } else {
            None
        }
    }
}

impl From<SandId> for NullSandId {
    fn from(id: SandId) -> Self {
        Self::new(id)
    }
}

impl From<Option<SandId>> for NullSandId {
    fn from(value: Option<SandId>) -> Self {
        value.map_or(Self::NULL, Self::new)
    }
}

impl From<NullSandId> for Option<SandId> {
    fn from(object: NullSandId) -> Self {
        object.get()
    }
}

/// An error scanning a storage value into a [`SandId`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScanError {
    kind: ScanErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum ScanErrorKind {
    Parse(ParseError),
    InvalidSourceType { found: &'static str },
}

impl ScanError {
    /// Creates an `InvalidSourceType` variant from the name of the rejected value type.
    const fn invalid_source_type(found: &'static str) -> Self {
        Self {
            kind: ScanErrorKind::InvalidSourceType { found },
        }
    }

    /// Returns the underlying decode error if the value had an acceptable type but an invalid
    /// content.
    pub const fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ScanErrorKind::Parse(err) => Some(err),
            ScanErrorKind::InvalidSourceType { .. } => None,
        }
    }

    /// Reports whether the value was neither text nor bytes.
    pub const fn is_invalid_source_type(&self) -> bool {
        matches!(self.kind, ScanErrorKind::InvalidSourceType { .. })
    }
}

impl From<ParseError> for ScanError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: ScanErrorKind::Parse(err),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScanErrorKind::Parse(err) => fmt::Display::fmt(err, f),
            ScanErrorKind::InvalidSourceType { found } => {
                write!(
                    f,
                    "could not scan as SandID: invalid source type: {} (expected text or bytes)",
                    found
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ScanErrorKind::Parse(err) => Some(err),
            ScanErrorKind::InvalidSourceType { .. } => None,
        }
    }
}
