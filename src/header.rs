//! The header of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::{DecodeError, ErrorKind, Fragment, Source};
use crate::ident::{Ident, Tag};
use crate::length::Length;


//------------ Header --------------------------------------------------------

/// The identifier and length octets of an encoded value.
///
/// Every encoded value starts with a header followed by the content octets
/// and, if the length is indefinite, the two end-of-contents octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    ident: Ident,
    length: Length,

    /// The number of octets the header occupied in the source.
    len: usize,
}

impl Header {
    /// Takes a header from the beginning of a source.
    ///
    /// Fails if either the identifier or length octets are malformed.
    pub fn take_from<S: Source>(
        source: &mut S
    ) -> Result<Self, DecodeError> {
        let (ident, ident_len) = Ident::take_from(source)?;
        let (length, length_len) = Length::take_from(source)?;
        Ok(Header { ident, length, len: ident_len + length_len })
    }

    pub fn ident(self) -> Ident {
        self.ident
    }

    pub fn tag(self) -> Tag {
        self.ident.tag()
    }

    pub fn is_constructed(self) -> bool {
        self.ident.is_constructed()
    }

    pub fn length(self) -> Length {
        self.length
    }

    /// Returns the number of octets of the encoded header.
    pub fn encoded_len(self) -> usize {
        self.len
    }

    /// Returns whether this is the header of an end-of-contents marker.
    pub fn is_end_of_contents(self) -> bool {
        self.ident == Ident::END_OF_CONTENTS && self.length.is_zero()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{} {} length {}",
            if self.is_constructed() { "CONSTRUCTED" }
            else { "PRIMITIVE" },
            self.tag(), self.length
        )
    }
}


//------------ End-of-contents -----------------------------------------------

/// Returns whether the source continues with end-of-contents octets.
///
/// Nothing is consumed. Since every value needs at least two octets, fails
/// with [`ErrorKind::StreamError`] if there are fewer left.
pub fn peek_end_of_contents<S: Source>(
    source: &mut S
) -> Result<bool, DecodeError> {
    let pos = source.pos();
    let frag = source.request(2).map_err(|err| {
        DecodeError::stream(err, pos)
    })?;
    if frag.slice().len() < 2 {
        return Err(
            DecodeError::new(ErrorKind::StreamError, pos)
                .with_detail("unexpected end of data")
        )
    }
    Ok(frag.slice() == [0, 0])
}

/// Takes the end-of-contents octets from the beginning of a source.
///
/// Returns the number of octets consumed which always is two. Fails with
/// [`ErrorKind::TrailerMismatch`] if the source doesn’t start with two zero
/// octets or with [`ErrorKind::StreamError`] if the data ends early.
pub fn take_end_of_contents<S: Source>(
    source: &mut S
) -> Result<usize, DecodeError> {
    let pos = source.pos();
    let frag = source.request(2).map_err(|err| {
        DecodeError::stream(err, pos)
    })?;
    if frag.slice().len() < 2 {
        return Err(
            DecodeError::new(ErrorKind::StreamError, pos)
                .with_detail("unexpected end of data")
        )
    }
    if frag.slice() != [0, 0] {
        return Err(
            DecodeError::new(ErrorKind::TrailerMismatch, pos)
                .with_detail("expected end-of-contents octets")
        )
    }
    frag.consume();
    Ok(2)
}


//============ Tests =========================================================
