//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::{DecodeError, ErrorKind, Source};


//------------ Length -------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-value marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets. The first octet 0xFF is reserved.
///
/// We only accept long forms with at most as many octets as a `usize` has.
/// Leading zero octets are fine as long as that limit is kept.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Length {
    /// The length.
    ///
    /// If this is `None`, the length is indefinite. Otherwise it is definite
    /// with the given value.
    length: Option<Definite>,
}

impl Length {
    /// The indefinite length.
    pub const INDEFINITE: Self = Length { length: None };

    /// Creates a definite length.
    pub const fn definite_from(len: usize) -> Self {
        Length { length: Some(Definite(len)) }
    }

    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        self.length.map(|x| x.0)
    }

    /// Returns whether the length is indefinite.
    pub fn is_indefinite(self) -> bool {
        self.length.is_none()
    }

    /// Returns whether the length is definite and zero.
    pub fn is_zero(self) -> bool {
        self.definite() == Some(0)
    }

    /// Takes the length octets from the beginning of a source.
    ///
    /// Returns the length and the number of octets consumed.
    pub fn take_from<S: Source>(
        source: &mut S
    ) -> Result<(Self, usize), DecodeError> {
        let pos = source.pos();
        let first = source.take_opt_u8()?.ok_or_else(|| {
            DecodeError::new(ErrorKind::MalformedLength, pos)
                .with_detail("missing length octets")
        })?;
        match first {
            // Bit 7 clear: single.
            n if (n & 0x80) == 0 => {
                Ok((Self::definite_from(usize::from(n)), 1))
            }

            // 0x80: indefinite.
            0x80 => Ok((Self::INDEFINITE, 1)),

            // 0xFF: illegal.
            0xFF => {
                Err(DecodeError::new(ErrorKind::MalformedLength, pos)
                    .with_detail("illegal length octets"))
            }

            // anything else: clear left bit, number of octets.
            n => {
                let count = usize::from(n & 0x7F);
                if count > Definite::LEN {
                    return Err(
                        DecodeError::new(ErrorKind::MalformedLength, pos)
                            .with_detail("excessive length")
                    )
                }
                let mut res = 0usize;
                for _ in 0..count {
                    let octet = source.take_opt_u8()?.ok_or_else(|| {
                        DecodeError::new(ErrorKind::MalformedLength, pos)
                            .with_detail("unexpected end of data in length")
                    })?;
                    // Can’t overflow: we checked count above.
                    res = (res << 8) | usize::from(octet);
                }
                Ok((Self::definite_from(res), count + 1))
            }
        }
    }

    /// Returns the length of the encoded representation of the value.
    pub fn encoded_len(self) -> usize {
        match self.length {
            Some(definite) => definite.encoded_len(),
            None => 1,
        }
    }

    /// Appends the encoded length to the end of `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        match self.length {
            Some(definite) => definite.append_encoded(target),
            None => target.push(0x80),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.length {
            Some(len) => write!(f, "{}", len.0),
            None => f.write_str("indefinite"),
        }
    }
}


//------------ Definite ------------------------------------------------------

/// A definite length.
///
/// This is a newtype of `usize` which allows us to do all the encoding
/// things on it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
struct Definite(usize);

impl Definite {
    const LEN: usize = 0usize.to_ne_bytes().len();

    fn encoded_len(self) -> usize {
        if self.0 > 0x7F {
            let idx = self.encoded_start_idx();
            debug_assert!(idx < Self::LEN);

            Self::LEN - idx + 1
        }
        else {
            1
        }
    }

    fn append_encoded(self, target: &mut Vec<u8>) {
        if self.0 > 0x7F {
            let idx = self.encoded_start_idx();
            debug_assert!(idx < Self::LEN);

            // LEN will never be greater than 126 bytes. Also, `idx` won’t be
            // greater than LEN, so the subtraction here is fine.
            target.push(((Self::LEN - idx) | 0x80) as u8);

            // Panic: idx can’t be bigger than LEN, so this can’t panic.
            #[allow(clippy::slicing_indexing)]
            target.extend_from_slice(
                &self.0.to_be_bytes()[idx..]
            )
        }
        else {
            target.push(self.0 as u8)
        }
    }

    /// Returns the index of the first non-zero octet of `len`.
    fn encoded_start_idx(self) -> usize {
        (self.0.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================
