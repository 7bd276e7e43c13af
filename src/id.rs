#[cfg(not(feature = "std"))]
use core as std;

use crate::{BINARY_LEN, MAX_NODE, MAX_SALT, MAX_TIMESTAMP, TEXT_LEN};
use fstr::FStr;
use std::{cmp, fmt, str};

/// Digit characters used in the textual representation (URL-safe base64 alphabet).
const DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// An O(1) map from ASCII code points to digit values.
const DECODE_MAP: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x3e, 0xff, 0xff,
    0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
    0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0xff, 0xff, 0xff, 0xff, 0x3f,
    0xff, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f, 0x30, 0x31, 0x32, 0x33, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Represents a SandID and provides converters and comparison operators.
///
/// The derived comparison operators compare the 16-byte big-endian array lexicographically,
/// which matches the generation order of identifiers produced by one generator.
///
/// # Examples
///
/// ```rust
/// use sandid::SandId;
///
/// let x = "AAECAwQFBgcICQoLDA0ODw".parse::<SandId>()?;
/// assert_eq!(x.to_string(), "AAECAwQFBgcICQoLDA0ODw");
/// assert_eq!(x.as_bytes(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
///
/// let y = SandId::from(0x0123456789abcdef0123456789abcdefu128);
/// assert_eq!(y.to_u128(), 0x0123456789abcdef0123456789abcdefu128);
/// # Ok::<(), sandid::ParseError>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct SandId([u8; 16]);

impl SandId {
    /// The all-zero value reserved as the "absent" sentinel.
    pub const ZERO: Self = Self([0; 16]);

    /// Creates an object from a 128-bit unsigned integer.
    pub const fn from_u128(int_value: u128) -> Self {
        Self(int_value.to_be_bytes())
    }

    /// Returns the 128-bit unsigned integer representation.
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Creates an object from a 16-byte big-endian byte array.
    pub const fn from_bytes(array_value: [u8; 16]) -> Self {
        Self(array_value)
    }

    /// Creates an object from a byte slice that must be exactly 16 bytes long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::SandId;
    ///
    /// assert!(SandId::try_from_slice(&[0u8; 16]).unwrap().is_zero());
    /// assert!(SandId::try_from_slice(&[0u8; 17]).is_err());
    /// ```
    pub const fn try_from_slice(slice_value: &[u8]) -> Result<Self, ParseError> {
        if slice_value.len() != BINARY_LEN {
            return Err(ParseError::invalid_length(slice_value.len(), BINARY_LEN));
        }

        let mut dst = [0u8; 16];
        let mut i = 0;
        while i < BINARY_LEN {
            dst[i] = slice_value[i];
            i += 1;
        }
        Ok(Self(dst))
    }

    /// Returns the big-endian byte array representation.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a reference to the big-endian byte array representation.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Reports whether this is the all-zero sentinel value.
    pub const fn is_zero(&self) -> bool {
        self.to_u128() == 0
    }

    /// Creates an object from field values.
    ///
    /// # Panics
    ///
    /// Panics if any argument is out of the value range of the field.
    pub const fn from_fields(timestamp: u64, salt: u8, sequence: u16, node: u64) -> Self {
        if timestamp > MAX_TIMESTAMP || salt > MAX_SALT || node > MAX_NODE {
            panic!("invalid field value");
        } else {
            Self::from_u128(
                ((timestamp as u128) << 68)
                    | ((salt as u128) << 64)
                    | ((sequence as u128) << 48)
                    | (node as u128),
            )
        }
    }

    /// Returns the 60-bit `timestamp` field value.
    pub const fn timestamp(&self) -> u64 {
        (self.to_u128() >> 68) as u64
    }

    /// Returns the 4-bit `salt` field value.
    pub const fn salt(&self) -> u8 {
        (self.to_u128() >> 64) as u8 & MAX_SALT
    }

    /// Returns the 16-bit `sequence` field value.
    pub const fn sequence(&self) -> u16 {
        (self.to_u128() >> 48) as u16
    }

    /// Returns the 48-bit `node` field value.
    pub const fn node(&self) -> u64 {
        self.to_u128() as u64 & MAX_NODE
    }

    /// Creates an object from a 22-character string representation.
    ///
    /// The string must consist of exactly 22 characters from the URL-safe base64 alphabet without
    /// padding, and the four unused trailing bits carried by the last character must be zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::SandId;
    ///
    /// let x = SandId::try_from_str("ASNFZ4mrze8BI0VniavN7w")?;
    /// let y = "ASNFZ4mrze8BI0VniavN7w".parse::<SandId>()?;
    /// assert_eq!(x, y);
    ///
    /// assert!(SandId::try_from_str("ASNFZ4mrze8BI0VniavN7w==").is_err());
    /// # Ok::<(), sandid::ParseError>(())
    /// ```
    pub const fn try_from_str(str_value: &str) -> Result<Self, ParseError> {
        let src = str_value.as_bytes();
        if src.len() != TEXT_LEN {
            return Err(ParseError::invalid_length(src.len(), TEXT_LEN));
        }

        let mut digits = [0u8; TEXT_LEN];
        let mut i = 0;
        while i < TEXT_LEN {
            let n = DECODE_MAP[src[i] as usize];
            if n == 0xff {
                return Err(ParseError::invalid_character(str_value, i));
            }
            digits[i] = n;
            i += 1;
        }

        // the last digit holds the lowest 2 bits followed by 4 unused bits
        if digits[TEXT_LEN - 1] & 0x0f != 0 {
            return Err(ParseError::invalid_character(str_value, TEXT_LEN - 1));
        }

        let mut dst = [0u8; 16];
        let (mut si, mut di) = (0, 0);
        while di < 15 {
            let v = (digits[si] as u32) << 18
                | (digits[si + 1] as u32) << 12
                | (digits[si + 2] as u32) << 6
                | digits[si + 3] as u32;
            dst[di] = (v >> 16) as u8;
            dst[di + 1] = (v >> 8) as u8;
            dst[di + 2] = v as u8;
            si += 4;
            di += 3;
        }
        dst[15] = digits[20] << 2 | digits[21] >> 4;

        Ok(Self(dst))
    }

    /// Creates an object from a 22-character string representation known to be valid.
    ///
    /// Intended for literals and other inputs that are valid by construction. Use
    /// [`SandId::try_from_str`] or [`str::parse`] for untrusted input.
    ///
    /// # Panics
    ///
    /// Panics if the argument is not a valid string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::SandId;
    ///
    /// const X: SandId = SandId::must_parse("AAECAwQFBgcICQoLDA0ODw");
    /// assert_eq!(X.to_bytes()[15], 15);
    /// ```
    pub const fn must_parse(str_value: &str) -> Self {
        match Self::try_from_str(str_value) {
            Ok(value) => value,
            Err(_) => panic!("could not parse string as SandID"),
        }
    }

    /// Returns the 22-character string representation stored in a stack-allocated string-like
    /// type that can be handled like [`String`] through common traits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::SandId;
    ///
    /// let x = SandId::from_bytes([0xff; 16]);
    /// let y = x.encode();
    /// assert_eq!(y, "_____________________w");
    /// assert_eq!(format!("{}", y), "_____________________w");
    /// ```
    pub const fn encode(&self) -> FStr<22> {
        let src = &self.0;
        let mut dst = [0u8; TEXT_LEN];
        let (mut si, mut di) = (0, 0);
        while si < 15 {
            let v = (src[si] as usize) << 16 | (src[si + 1] as usize) << 8 | src[si + 2] as usize;
            dst[di] = DIGITS[v >> 18 & 0x3f];
            dst[di + 1] = DIGITS[v >> 12 & 0x3f];
            dst[di + 2] = DIGITS[v >> 6 & 0x3f];
            dst[di + 3] = DIGITS[v & 0x3f];
            si += 3;
            di += 4;
        }
        dst[20] = DIGITS[(src[15] >> 2) as usize];
        dst[21] = DIGITS[((src[15] & 0x03) << 4) as usize];

        // SAFETY: All bytes in `dst` are valid ASCII characters.
        unsafe { FStr::from_inner_unchecked(dst) }
    }
}

/// Reports whether `a` and `b` hold the same 16 bytes.
pub fn equal(a: SandId, b: SandId) -> bool {
    a == b
}

/// Compares `a` and `b` byte by byte as unsigned integers.
///
/// # Examples
///
/// ```rust
/// use sandid::SandId;
/// use std::cmp::Ordering;
///
/// let a = SandId::from_u128(1);
/// let b = SandId::from_u128(2);
/// assert_eq!(sandid::compare(a, b), Ordering::Less);
/// assert_eq!(sandid::compare(b, a), Ordering::Greater);
/// assert_eq!(sandid::compare(a, a), Ordering::Equal);
/// ```
pub fn compare(a: SandId, b: SandId) -> cmp::Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

impl From<u128> for SandId {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<SandId> for u128 {
    fn from(object: SandId) -> Self {
        object.to_u128()
    }
}

impl From<[u8; 16]> for SandId {
    /// Creates an object from a 16-byte big-endian byte array.
    fn from(value: [u8; 16]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<SandId> for [u8; 16] {
    /// Returns the big-endian byte array representation.
    fn from(object: SandId) -> Self {
        object.to_bytes()
    }
}

impl TryFrom<&[u8]> for SandId {
    type Error = ParseError;

    /// Creates an object from a byte slice that must be exactly 16 bytes long.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from_slice(value)
    }
}

impl TryFrom<&str> for SandId {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from_str(value)
    }
}

impl AsRef<[u8]> for SandId {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl str::FromStr for SandId {
    type Err = ParseError;

    /// Creates an object from a 22-character string representation.
    fn from_str(str_value: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(str_value)
    }
}

impl fmt::Display for SandId {
    /// Returns the 22-character canonical string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sandid::SandId;
    ///
    /// let x = "ASNFZ4mrze8BI0VniavN7w".parse::<SandId>()?;
    /// assert_eq!(format!("{}", x), "ASNFZ4mrze8BI0VniavN7w");
    /// assert_eq!(format!("{:24}", x), "ASNFZ4mrze8BI0VniavN7w  ");
    /// assert_eq!(format!("{:.^7.5}", x), ".ASNFZ.");
    /// # Ok::<(), sandid::ParseError>(())
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.encode().as_str(), f)
    }
}

/// An error parsing an invalid textual or binary representation of SandID.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum ParseErrorKind {
    InvalidLength {
        n_bytes: usize,
        expected: usize,
    },
    InvalidCharacter {
        /// Holds the invalid character as a UTF-8 byte array to work in the const context.
        utf8_char: [u8; 4],
        position: usize,
    },
}

impl ParseError {
    /// Creates an `InvalidLength` variant from the actual and expected lengths.
    const fn invalid_length(n_bytes: usize, expected: usize) -> Self {
        Self {
            kind: ParseErrorKind::InvalidLength { n_bytes, expected },
        }
    }

    /// Creates an `InvalidCharacter` variant from the entire string and the position of invalid
    /// character.
    const fn invalid_character(src: &str, position: usize) -> Self {
        const fn is_char_boundary(utf8_bytes: &[u8], index: usize) -> bool {
            match index {
                0 => true,
                i if i < utf8_bytes.len() => (utf8_bytes[i] as i8) >= -64,
                _ => index == utf8_bytes.len(),
            }
        }

        let bs = src.as_bytes();
        assert!(is_char_boundary(bs, position));
        let mut utf8_char = [bs[position], 0, 0, 0];

        let mut i = 1;
        while !is_char_boundary(bs, position + i) {
            utf8_char[i] = bs[position + i];
            i += 1;
        }

        Self {
            kind: ParseErrorKind::InvalidCharacter {
                utf8_char,
                position,
            },
        }
    }

    /// Reports whether the input had a wrong length.
    pub const fn is_invalid_length(&self) -> bool {
        matches!(self.kind, ParseErrorKind::InvalidLength { .. })
    }

    /// Reports whether the input contained a character outside of the alphabet.
    pub const fn is_invalid_character(&self) -> bool {
        matches!(self.kind, ParseErrorKind::InvalidCharacter { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse as SandID: ")?;
        match self.kind {
            ParseErrorKind::InvalidLength { n_bytes, expected } => {
                write!(f, "invalid length: {} bytes (expected {})", n_bytes, expected)
            }
            ParseErrorKind::InvalidCharacter {
                utf8_char,
                position,
            } => {
                let len = match utf8_char[0] {
                    0x00..=0x7f => 1,
                    0xf0..=0xff => 4,
                    0xe0..=0xef => 3,
                    _ => 2,
                };
                match str::from_utf8(&utf8_char[..len]).ok().and_then(|s| s.chars().next()) {
                    Some(chr) => {
                        write!(f, "invalid character '{}' at {}", chr.escape_debug(), position)
                    }
                    None => write!(f, "invalid character at {}", position),
                }
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(feature = "std")]
mod with_std {
    use super::{ParseError, SandId};

    impl TryFrom<String> for SandId {
        type Error = ParseError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_from_str(&value)
        }
    }

    impl From<SandId> for String {
        fn from(object: SandId) -> Self {
            object.encode().into()
        }
    }
}


#[cfg(feature = "serde")]
mod with_serde {
    use super::{fmt, str, SandId};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for SandId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for SandId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = SandId;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a SandID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Self::Value::try_from_str(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            match Self::Value::try_from_slice(value) {
                Ok(object) => Ok(object),
                Err(err) => match str::from_utf8(value) {
                    Ok(str_value) => self.visit_str(str_value),
                    _ => Err(de::Error::custom(err)),
                },
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::SandId;
        use serde_test::{Configure, Token};

        /// Serializes and deserializes prepared cases correctly
        #[test]
        fn serializes_and_deserializes_prepared_cases_correctly() {
            let cases = [
                ("AAAAAAAAAAAAAAAAAAAAAA", &[0u8; 16]),
                (
                    "AAECAwQFBgcICQoLDA0ODw",
                    &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
                ),
                (
                    "ASNFZ4mrze8BI0VniavN7w",
                    &[
                        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67,
                        0x89, 0xab, 0xcd, 0xef,
                    ],
                ),
                ("_____________________w", &[0xff; 16]),
            ];

            for (text, bytes) in cases {
                let e = text.parse::<SandId>().unwrap();
                serde_test::assert_tokens(&e.readable(), &[Token::Str(text)]);
                serde_test::assert_tokens(&e.compact(), &[Token::Bytes(bytes)]);

                // deserialize the other format regardless of human-readability configuration
                serde_test::assert_de_tokens(&e.readable(), &[Token::Bytes(bytes)]);
                serde_test::assert_de_tokens(&e.compact(), &[Token::Str(text)]);

                // deserialize textual representation even if passed as byte slice
                serde_test::assert_de_tokens(&e.readable(), &[Token::Bytes(text.as_bytes())]);
            }
        }

        /// Fails deserialization on invalid representations
        #[test]
        fn fails_deserialization_on_invalid_representations() {
            serde_test::assert_de_tokens_error::<serde_test::Readable<SandId>>(
                &[Token::Str("AAAAAAAAAAAAAAAAAAAAA=")],
                "could not parse as SandID: invalid character '=' at 21",
            );
            serde_test::assert_de_tokens_error::<serde_test::Compact<SandId>>(
                &[Token::Bytes(&[0xffu8; 15])],
                "could not parse as SandID: invalid length: 15 bytes (expected 16)",
            );
        }

        /// Round-trips through JSON as a quoted string
        #[test]
        fn round_trips_through_json_as_a_quoted_string() {
            #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
            struct Record {
                id: SandId,
            }

            let record = Record {
                id: "AAECAwQFBgcICQoLDA0ODw".parse().unwrap(),
            };
            let json = serde_json::to_string(&record).unwrap();
            assert_eq!(json, r#"{"id":"AAECAwQFBgcICQoLDA0ODw"}"#);
            assert_eq!(serde_json::from_str::<Record>(&json).unwrap(), record);

            assert!(serde_json::from_str::<Record>(r#"{"id":"AAECAwQFBgcICQoLDA0OD"}"#).is_err());
            assert!(serde_json::from_str::<Record>(r#"{"id":"AAECAwQFBgcICQoLDA0OD="}"#).is_err());
            assert!(serde_json::from_str::<Record>(r#"{"id":42}"#).is_err());
        }
    }
}
