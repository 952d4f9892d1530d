//! BER encoded integers.
//!
//! The functions in this module interpret the content octets of an INTEGER
//! or ENUMERATED value. They are used by the scalar implementations for
//! Rust’s built-in integer types. The [`Integer`] and [`Unsigned`] types
//! keep the content octets of integers of arbitrary size.

use bytes::Bytes;
use crate::decode::ContentError;


//------------ Macros for built-in integers ----------------------------------

macro_rules! signed_impl {
    ( $name:ident, $type:ident ) => {
        /// Decodes the content octets of an integer into the type.
        pub fn $name(content: &[u8]) -> Result<$type, ContentError> {
            let value = decode_i64(content)?;
            $type::try_from(value).map_err(|_| {
                ContentError::from_static("integer out of range")
            })
        }
    }
}

macro_rules! unsigned_impl {
    ( $name:ident, $type:ident ) => {
        /// Decodes the content octets of an unsigned integer into the type.
        pub fn $name(content: &[u8]) -> Result<$type, ContentError> {
            let value = decode_u64(content)?;
            $type::try_from(value).map_err(|_| {
                ContentError::from_static("integer out of range")
            })
        }
    }
}


//------------ Built-in integers ---------------------------------------------

/// Decodes the content octets of an integer into an `i64`.
///
/// The content octets are a big-endian, two‘s complement byte sequence of
/// the integer. They must not be empty and must be encoded in the smallest
/// possible number of octets.
pub fn decode_i64(content: &[u8]) -> Result<i64, ContentError> {
    check_head(content)?;
    if content.len() > 8 {
        return Err(ContentError::from_static("integer out of range"))
    }
    Ok(sign_extend(content))
}

/// Converts up to eight octets of a two’s complement integer into an `i64`.
///
/// The octets don’t need to be minimal. Empty octets are zero.
pub(crate) fn sign_extend(octets: &[u8]) -> i64 {
    debug_assert!(octets.len() <= 8);
    let fill = match octets.first() {
        Some(first) if first & 0x80 != 0 => 0xFF,
        _ => 0x00,
    };
    let mut buf = [fill; 8];
    buf[8 - octets.len()..].copy_from_slice(octets);
    i64::from_be_bytes(buf)
}

/// Decodes the content octets of an integer into a `u64`.
///
/// Negative values are rejected. Since the sign bit must be clear, one more
/// octet than the size of the type is allowed if that octet is zero.
pub fn decode_u64(content: &[u8]) -> Result<u64, ContentError> {
    check_head(content)?;
    if content[0] & 0x80 != 0 {
        return Err(ContentError::from_static("negative unsigned integer"))
    }
    let content = match content.split_first() {
        Some((&0, rest)) if !rest.is_empty() => rest,
        _ => content
    };
    if content.len() > 8 {
        return Err(ContentError::from_static("integer out of range"))
    }
    let mut buf = [0; 8];
    buf[8 - content.len()..].copy_from_slice(content);
    Ok(u64::from_be_bytes(buf))
}

signed_impl!(decode_i8, i8);
signed_impl!(decode_i16, i16);
signed_impl!(decode_i32, i32);
unsigned_impl!(decode_u8, u8);
unsigned_impl!(decode_u16, u16);
unsigned_impl!(decode_u32, u32);

/// Checks that an integer is started correctly.
///
/// Specifically, checks that there is at least one octet and that the
/// first nine bits of a multi-octet integer are not all the same.
///
/// The latter ensures that an integer is encoded in the smallest possible
/// number of octets. If we insist on this rule, we can use the content
/// octets as the value for large integers and use simply compare slices
/// for comparision.
fn check_head(content: &[u8]) -> Result<(), ContentError> {
    match (content.first(), content.get(1).map(|x| x & 0x80 != 0)) {
        (None, _) => {
            Err(ContentError::from_static("empty integer"))
        }
        (Some(0), Some(false)) | (Some(0xFF), Some(true)) => {
            Err(ContentError::from_static("integer not minimally encoded"))
        }
        _ => Ok(())
    }
}


//------------ Integer -------------------------------------------------------

/// A BER encoded integer.
///
/// As integers are variable length in BER, this type is just a simple wrapper
/// atop the underlying `Bytes` value containing the raw content. A value of
/// this type is a signed integer. If a value is defined as an unsigned
/// integer, i.e., as `INTEGER (0..MAX)`, you should use the sibling type
/// [`Unsigned`] instead.
///
/// If you have even stricter range restrictions, you can decode straight
/// into Rust’s built-in integer types.
///
/// # BER Encoding
///
/// In BER, an INTEGER is encoded as a primitive value with the content octets
/// providing a variable-length, big-endian, two‘s complement byte sequence of
/// that integer. Thus, the most-significant bit of the first octet serves as
/// the sign bit.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates an integer from its content octets.
    pub fn from_content(content: Bytes) -> Result<Self, ContentError> {
        check_head(&content)?;
        Ok(Integer(content))
    }

    /// Returns whether the integer is zero.
    ///
    /// The default value has no content octets and is zero, too.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty() || self.0.as_ref() == [0]
    }

    /// Returns whether the integer is negative.
    pub fn is_negative(&self) -> bool {
        self.0.first().map_or(false, |x| x & 0x80 != 0)
    }

    /// Returns the integer as an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.0.is_empty() {
            return Some(0)
        }
        decode_i64(&self.0).ok()
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//------------ Unsigned ------------------------------------------------------

/// A BER encoded unsigned integer.
///
/// As integers are variable length in BER, this type is just a simple wrapper
/// atop the underlying `Bytes` value containing the raw content. It
/// guarantees that the wrapped integer is greater or equal to 0. This equals
/// an integer defined as `INTEGER (0..MAX)` in ASN.1.
///
/// # BER Encoding
///
/// In BER, an INTEGER is encoded as a primitive value with the content octets
/// providing a variable-length, big-endian, two‘s complement byte sequence of
/// that integer. Thus, the most-significant bit of the first octet serves as
/// the sign bit and, for an unsigned integer, has to be unset.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Unsigned(Bytes);

impl Unsigned {
    /// Creates an unsigned integer from its content octets.
    pub fn from_content(content: Bytes) -> Result<Self, ContentError> {
        check_head(&content)?;
        if content[0] & 0x80 != 0 {
            return Err(ContentError::from_static("negative unsigned integer"))
        }
        Ok(Unsigned(content))
    }

    /// Returns the integer as a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.is_empty() {
            return Some(0)
        }
        decode_u64(&self.0).ok()
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//============ Tests =========================================================
