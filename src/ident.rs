//! The identifier octets of a BER encoded value.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::fmt;
use crate::decode::{DecodeError, ErrorKind, Source};


//------------ Configuration Constants ---------------------------------------

/// The maximum number of identifier octets we accept.
///
/// This is enough for every tag number that fits into a `u32`.
const MAX_IDENT_LEN: usize = 6;


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags are used to identify the type of a value. Tags consist of
/// one of four classes, represented by the [`Class`] enum, and a number
/// within this class. The number is an unsigned integer.
///
/// In BER encoding, the tag becomes part of the identifier octets by
/// combining it with a bit indicating whether a value is primitive or
/// constructed.
///
/// # Limitations
///
/// We only support tag numbers that fit into a `u32`. This should be more
/// than enough in practice.
//
//  Internally, we store the tag as the identifier octets of a primitive value
//  with the same tag.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Tag(Ident);

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Self(Ident::new(class, false, number))
    }

    /// Creates a new tag in class “universal” with the given number.
    pub const fn universal(number: u32) -> Self {
        Self::new(Class::Universal, number)
    }

    /// Creates a new tag in class “application” with the given number.
    pub const fn application(number: u32) -> Self {
        Self::new(Class::Application, number)
    }

    /// Creates a new tag in class “context dependent” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Creates a new tag in class “private” with the given number.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, number)
    }

    /// Returns the class of the identifier octets.
    pub const fn class(self) -> Class {
        self.0.class()
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.0.number()
    }
}

/// # Universal tags used by the decoder
///
/// See clause 8.4 of ITU Recommendation X.690 for the complete list.
///
impl Tag {
    /// The tag of the end-of-contents octets, UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);

    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);
    pub const INTEGER: Self = Self::new(Class::Universal, 2);
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);
    pub const NULL: Self = Self::new(Class::Universal, 5);
    pub const REAL: Self = Self::new(Class::Universal, 9);
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    ///
    /// Sequences, choices, and arrays all use this tag.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the VisibleString type, UNIVERSAL 26.
    ///
    /// Dates and times in their text form use this tag.
    pub const VISIBLE_STRING: Self = Self::new(Class::Universal, 26);

    /// Returns the name of a universal tag known to the decoder.
    const fn universal_name(self) -> Option<&'static str> {
        if !matches!(self.class(), Class::Universal) {
            return None
        }
        Some(match self.number() {
            0 => "END-OF-CONTENTS",
            1 => "BOOLEAN",
            2 => "INTEGER",
            4 => "OCTET STRING",
            5 => "NULL",
            9 => "REAL",
            10 => "ENUMERATED",
            12 => "UTF8String",
            16 => "SEQUENCE",
            26 => "VisibleString",
            _ => return None
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = self.universal_name() {
            return f.write_str(name)
        }
        match self.class() {
            Class::Universal => write!(f, "[UNIVERSAL {}]", self.number()),
            Class::Application => {
                write!(f, "[APPLICATION {}]", self.number())
            }
            Class::Context => write!(f, "[{}]", self.number()),
            Class::Private => write!(f, "[PRIVATE {}]", self.number()),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({} - {:?})", self, self.0.as_slice())
    }
}


//------------ Ident ---------------------------------------------------------

/// The identifier octets of an encoded value.
///
/// The identifier combines the [`Tag`] of a value with the bit marking it
/// as primitive or constructed.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident(I);

#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
enum I {
    L1([u8; 1]),
    L2([u8; 2]),
    L3([u8; 3]),
    L4([u8; 4]),
    L5([u8; 5]),
    L6([u8; 6]),
}

impl Ident {
    /// The tag marking the end-of-contents in an indefinite length value.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, false, 0);

    /// Creates identifier octets from class, constructed flag, and number.
    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        let first = if constructed {
            class.into_u8() | 0x20
        }
        else {
            class.into_u8()
        };

        if number <= 0x1e {
            // five bits but not all of them one (so not 0x1f)
            return Self(I::L1([first | number as u8]))
        }

        // Now the first octet is always the class plus bits 1 to 5 all 1.
        let first = first | 0x1f;

        // The lowest seven bits are the last octet. Shift the number by
        // seven to see what’s left. If that’s zero, we have a two octet
        // tag.
        let n0 = (number & 0x7F) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L2([first, n0]))
        }

        // Now rince an repeat.
        let n1 = (number | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L3([first, n1, n0]))
        }

        let n2 = (number | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L4([first, n2, n1, n0]))
        }

        let n3 = (number | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L5([first, n3, n2, n1, n0]))
        }

        let n4 = (number | 0x80) as u8;
        let number = number >> 7;
        debug_assert!(number == 0);
        Self(I::L6([first, n4, n3, n2, n1, n0]))
    }

    /// Creates identifier octets from a tag.
    pub const fn from_tag(tag: Tag, constructed: bool) -> Self {
        if constructed {
            match tag.0.0 {
                I::L1([x]) => Self(I::L1([x | 0x20])),
                I::L2([x, y0]) => Self(I::L2([x | 0x20, y0])),
                I::L3([x, y0, y1]) => {
                    Self(I::L3([x | 0x20, y0, y1]))
                }
                I::L4([x, y0, y1, y2]) => {
                    Self(I::L4([x | 0x20, y0, y1, y2]))
                }
                I::L5([x, y0, y1, y2, y3]) => {
                    Self(I::L5([x | 0x20, y0, y1, y2, y3]))
                }
                I::L6([x, y0, y1, y2, y3, y4]) => {
                    Self(I::L6([x | 0x20, y0, y1, y2, y3, y4]))
                }
            }
        }
        else {
            tag.0
        }
    }

    /// Returns the tag for the identifier octets.
    pub const fn tag(self) -> Tag {
        match self.0 {
            I::L1([x]) => Tag(Self(I::L1([x & 0xDF]))),
            I::L2([x, y0]) => Tag(Self(I::L2([x & 0xDF, y0]))),
            I::L3([x, y0, y1]) => {
                Tag(Self(I::L3([x & 0xDF, y0, y1])))
            }
            I::L4([x, y0, y1, y2]) => {
                Tag(Self(I::L4([x & 0xDF, y0, y1, y2])))
            }
            I::L5([x, y0, y1, y2, y3]) => {
                Tag(Self(I::L5([x & 0xDF, y0, y1, y2, y3])))
            }
            I::L6([x, y0, y1, y2, y3, y4]) => {
                Tag(Self(I::L6([x & 0xDF, y0, y1, y2, y3, y4])))
            }
        }
    }

    /// Returns the class of the identifier octets.
    pub const fn class(self) -> Class {
        Class::from_u8(self.first())
    }

    /// Returns whether the value is to be a constructed value.
    pub const fn is_constructed(self) -> bool {
        self.first() & 0x20 != 0
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        match self.0 {
            I::L1([x]) => (x & 0x1f) as u32,
            I::L2([_, x0]) => x0 as u32,
            I::L3([_, x1, x2]) => {
                  ((x1 & 0x7f) as u32) << 7
                | (x2 as u32)
            }
            I::L4([_, x1, x2, x3]) => {
                  ((x1 & 0x7f) as u32) << 14 
                | ((x2 & 0x7f) as u32) << 7
                | (x3 as u32)
            }
            I::L5([_, x1, x2, x3, x4]) => {
                  ((x1 & 0x7f) as u32) << 21
                | ((x2 & 0x7f) as u32) << 14 
                | ((x3 & 0x7f) as u32) << 7
                | (x4 as u32)
            }
            I::L6([_, x1, x2, x3, x4, x5]) => {
                  ((x1 & 0x7f) as u32) << 28
                | ((x2 & 0x7f) as u32) << 21
                | ((x3 & 0x7f) as u32) << 14 
                | ((x4 & 0x7f) as u32) << 7
                | (x5 as u32)
            }
        }
    }

    /// Returns a slice of the encoded octets.
    pub const fn as_slice(&self) -> &[u8] {
        match &self.0 {
            I::L1(arr) => arr.as_slice(),
            I::L2(arr) => arr.as_slice(),
            I::L3(arr) => arr.as_slice(),
            I::L4(arr) => arr.as_slice(),
            I::L5(arr) => arr.as_slice(),
            I::L6(arr) => arr.as_slice(),
        }
    }

    /// Returns the first octet.
    const fn first(self) -> u8 {
        match self.0 {
            I::L1([x]) => x,
            I::L2([x, ..]) => x,
            I::L3([x, ..]) => x,
            I::L4([x, ..]) => x,
            I::L5([x, ..]) => x,
            I::L6([x, ..]) => x,
        }
    }

    /// Takes the identifier octets from the beginning of a source.
    ///
    /// Returns the identifier and the number of octets consumed. Tag
    /// numbers encoded in the high tag number form are normalized, so the
    /// identifier compares equal to one created via [`Ident::new`] even if
    /// the encoding used more octets than necessary.
    ///
    /// Fails with [`ErrorKind::MalformedTag`] if the data ends before the
    /// identifier is complete or if the tag number doesn’t fit into a
    /// `u32`.
    pub fn take_from<S: Source>(
        source: &mut S
    ) -> Result<(Self, usize), DecodeError> {
        let pos = source.pos();
        let first = source.take_opt_u8()?.ok_or_else(|| {
            DecodeError::new(ErrorKind::MalformedTag, pos)
                .with_detail("missing identifier octets")
        })?;

        // If we have a single octet tag, we can already return.
        if (first & 0x1f) < 0x1f {
            return Ok((Self(I::L1([first])), 1))
        }

        let class = Class::from_u8(first);
        let constructed = first & 0x20 != 0;
        let mut number = 0u32;
        let mut len = 1;
        loop {
            let octet = source.take_opt_u8()?.ok_or_else(|| {
                DecodeError::new(ErrorKind::MalformedTag, pos)
                    .with_detail("unexpected end of data in identifier")
            })?;
            len += 1;
            if len > MAX_IDENT_LEN || number > (u32::MAX >> 7) {
                return Err(
                    DecodeError::new(ErrorKind::MalformedTag, pos)
                        .with_detail("tag numbers above 32 bits not supported")
                )
            }
            number = (number << 7) | u32::from(octet & 0x7f);
            if octet & 0x80 == 0 {
                return Ok((Self::new(class, constructed, number), len))
            }
        }
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub const fn encoded_len(self) -> usize {
        match self.0 {
            I::L1(_) => 1,
            I::L2(_) => 2,
            I::L3(_) => 3,
            I::L4(_) => 4,
            I::L5(_) => 5,
            I::L6(_) => 6,
        }
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.as_slice())
    }
}


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    const fn from_u8(octet: u8) -> Self {
        match octet {
            0x00..=0x3F => Self::Universal,
            0x40..=0x7F => Self::Application,
            0x80..=0xBF => Self::Context,
            0xC0..=0xFF => Self::Private
        }
    }

    const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Class::Universal => "UNIVERSAL",
            Class::Application => "APPLICATION",
            Class::Context => "CONTEXT",
            Class::Private => "PRIVATE",
        })
    }
}


//============ Tests =========================================================
