//! A BER-encoded OCTET STRING.
//!
//! This is an internal module. It’s public types are re-exported by the
//! parent.

use std::{fmt, ops};
use bytes::Bytes;


//------------ OctetString ---------------------------------------------------

/// An OCTET STRING value.
///
/// An octet string is a sequence of octets, i.e., a glorified `[u8]`. The
/// type wraps a `Bytes` value, so the content octets taken from the source
/// are kept without copying them again.
///
/// A `Vec<u8>` decodes as a SEQUENCE OF INTEGER, so this type or `Bytes`
/// itself has to be used for binary content.
///
/// # BER Encoding
///
/// Octet strings are either encoded as a primitive or a constructed value.
/// In the primitive form, the content octets are the string’s octets. In a
/// constructed form, the content is a sequence of encoded octets strings
/// which in turn may be primitive or constructed.
///
/// We only support the primitive form.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OctetString(Bytes);

impl OctetString {
    /// Creates an octet string from a bytes value.
    pub fn new(bytes: Bytes) -> Self {
        OctetString(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the octet string into its bytes value.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


//--- From

impl From<Bytes> for OctetString {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(vec: Vec<u8>) -> Self {
        Self::new(vec.into())
    }
}

impl From<&'static [u8]> for OctetString {
    fn from(slice: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(slice))
    }
}

impl From<OctetString> for Bytes {
    fn from(s: OctetString) -> Self {
        s.into_bytes()
    }
}


//--- Deref, AsRef

impl ops::Deref for OctetString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- PartialEq

impl PartialEq<[u8]> for OctetString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for OctetString {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}


//--- Debug

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OctetString(")?;
        for octet in self.as_slice() {
            write!(f, "{:02x}", octet)?;
        }
        write!(f, ")")
    }
}


//============ Tests =========================================================
