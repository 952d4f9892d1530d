//! Typed values to decode into.
//!
//! The decoder doesn’t know the types it fills. Instead, every target type
//! implements [`Decodable`] which hands out a [`ValueMut`] naming the
//! category of the type together with access to it. There are six
//! categories, each with its own trait:
//!
//! * [`Scalar`] for types decoded from the content octets of a single
//!   primitive value, such as integers and strings,
//! * [`Enumeration`] for types that map ENUMERATED integers to variants,
//! * [`Sequence`] for record types with a fixed set of fields,
//! * [`Choice`] for types holding at most one of a set of selections,
//! * [`Array`] for homogeneous lists, and
//! * [`Nullable`] for optional values.
//!
//! Implementations are provided for Rust’s built-in scalar types, `String`,
//! `Bytes`, [`OctetString`], `Option<T>`, `Vec<T>`, and `Box<T>`. The
//! date and time types live in [`datetime`][crate::datetime]. Sequences,
//! choices, and enumerations are implemented by the application, usually
//! by generated code.
//!
//! # BER Encoding
//!
//! A value in a position where the type is known from the context only, at
//! the top level or as an array element, carries the universal tag of its
//! category: scalars use their own tag, enumerations are ENUMERATED, and
//! sequences, choices, and arrays are SEQUENCE. Such a value may also be a
//! NULL if it is nullable.
//!
//! The fields of a sequence and the selections of a choice are tagged with
//! the context specific tag given by the [`FieldInfo::id`]. A choice is
//! always encoded as a constructed value containing the selected value, so
//! a choice field appears as `[field] { [selection] value }`. A field with
//! the [`FormattingMode::Untagged`] hint drops the outer level: the
//! selections of the choice appear directly among the fields of the
//! sequence.

use std::fmt;
use bytes::Bytes;
use crate::decode::ContentError;
use crate::ident::Tag;
use crate::ostring::OctetString;
use crate::{int, real};


//------------ Decodable -----------------------------------------------------

/// A type that can be decoded into.
pub trait Decodable {
    /// Returns the category of the value and access to it.
    fn value_mut(&mut self) -> ValueMut<'_>;
}


//------------ ValueMut ------------------------------------------------------

/// Mutable access to a value of one of the categories.
pub enum ValueMut<'a> {
    Scalar(&'a mut dyn Scalar),
    Enumeration(&'a mut dyn Enumeration),
    Sequence(&'a mut dyn Sequence),
    Choice(&'a mut dyn Choice),
    Array(&'a mut dyn Array),
    Nullable(&'a mut dyn Nullable),
}

impl ValueMut<'_> {
    /// Returns the name of the category for diagnostics.
    pub fn category(&self) -> &'static str {
        match *self {
            ValueMut::Scalar(_) => "scalar",
            ValueMut::Enumeration(_) => "enumeration",
            ValueMut::Sequence(_) => "sequence",
            ValueMut::Choice(_) => "choice",
            ValueMut::Array(_) => "array",
            ValueMut::Nullable(_) => "nullable",
        }
    }

    /// Returns the universal tag used when the value isn’t tagged.
    ///
    /// Returns `None` for nullable values whose tag depends on whether the
    /// value is present.
    pub fn universal_tag(&self) -> Option<Tag> {
        match *self {
            ValueMut::Scalar(ref scalar) => Some(scalar.universal_tag()),
            ValueMut::Enumeration(_) => Some(Tag::ENUMERATED),
            ValueMut::Sequence(_)
            | ValueMut::Choice(_)
            | ValueMut::Array(_) => Some(Tag::SEQUENCE),
            ValueMut::Nullable(_) => None,
        }
    }

    /// Returns whether an untagged element with `tag` can be decoded.
    ///
    /// Nullable values accept nothing here. Whether they accept a NULL or
    /// their inner value is decided by the caller.
    pub fn accepts_universal(&self, tag: Tag) -> bool {
        match *self {
            ValueMut::Scalar(ref scalar) => scalar.accepts_universal(tag),
            ValueMut::Nullable(_) => false,
            _ => self.universal_tag() == Some(tag),
        }
    }
}


//------------ Scalar --------------------------------------------------------

/// A value decoded from the content octets of a primitive value.
pub trait Scalar {
    /// Returns the universal tag of the type.
    fn universal_tag(&self) -> Tag;

    /// Returns whether an untagged element with `tag` holds the type.
    ///
    /// The provided implementation accepts the type’s own universal tag
    /// only. Types with more than one encoding can accept others, too.
    fn accepts_universal(&self, tag: Tag) -> bool {
        tag == self.universal_tag()
    }

    /// Replaces the value with the one encoded in `content`.
    fn decode_content(&mut self, content: Bytes) -> Result<(), ContentError>;

    /// Returns whether the type is a text string.
    ///
    /// Empty text strings may be replaced with a field’s default value.
    fn is_text(&self) -> bool {
        false
    }
}


//------------ Enumeration ---------------------------------------------------

/// A value of an enumerated type.
pub trait Enumeration {
    /// Sets the value from its integer representation.
    ///
    /// Returns `false` and leaves the value unchanged if the integer isn’t
    /// a valid enumerator. A type with a fallback enumerator can accept
    /// every integer.
    fn set_from_int(&mut self, value: i32) -> bool;
}


//------------ Sequence ------------------------------------------------------

/// A record with a fixed set of fields.
pub trait Sequence {
    /// Returns the descriptions of the fields.
    ///
    /// The index of a field in this slice is the index used with
    /// [`field_mut`][Self::field_mut] and
    /// [`apply_default`][Self::apply_default].
    fn fields(&self) -> &[FieldInfo];

    /// Returns the field with the given index.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decodable>;

    /// Resets all fields to their default values.
    fn reset(&mut self);

    /// Sets the field with the given index to its declared default value.
    ///
    /// Only called for fields whose [`FieldInfo::has_default`] is set. The
    /// provided implementation does nothing.
    fn apply_default(&mut self, index: usize) {
        let _ = index;
    }
}


//------------ Choice --------------------------------------------------------

/// A value holding at most one of a set of selections.
pub trait Choice {
    /// Returns the descriptions of the selections.
    fn selections(&self) -> &[FieldInfo];

    /// Makes the selection with the given index the current one.
    ///
    /// The selection starts out with its default value. Returns the
    /// selected value or `None` if there is no such selection.
    fn select(&mut self, index: usize) -> Option<&mut dyn Decodable>;

    /// Resets the value to having no selection.
    fn reset(&mut self);
}


//------------ Array ---------------------------------------------------------

/// A homogeneous list of values.
pub trait Array {
    /// Removes all elements.
    fn clear(&mut self);

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns whether there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an element with its default value and returns it.
    fn push_default(&mut self) -> &mut dyn Decodable;

    /// Removes the last element.
    fn pop(&mut self);
}


//------------ Nullable ------------------------------------------------------

/// An optional value.
pub trait Nullable {
    /// Sets the value to null.
    fn set_null(&mut self);

    /// Makes the value present and returns it.
    ///
    /// If the value is null, it becomes present with its default value.
    fn make_value(&mut self) -> &mut dyn Decodable;
}


//------------ FieldInfo -----------------------------------------------------

/// The description of a field of a sequence or a selection of a choice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    /// The name of the field used in diagnostics.
    pub name: &'static str,

    /// The number of the context specific tag of the field.
    pub id: u32,

    /// How the field is formatted.
    pub hint: FormattingMode,

    /// Whether the field has a default value.
    pub has_default: bool,
}

impl FieldInfo {
    /// Creates a field without hint or default value.
    pub const fn new(name: &'static str, id: u32) -> Self {
        FieldInfo {
            name, id, hint: FormattingMode::Default, has_default: false
        }
    }

    /// Sets the formatting hint.
    pub const fn with_hint(mut self, hint: FormattingMode) -> Self {
        self.hint = hint;
        self
    }

    /// Marks the field as having a default value.
    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Returns whether the field is an untagged choice.
    pub fn is_untagged(&self) -> bool {
        self.hint == FormattingMode::Untagged
    }
}


//------------ FormattingMode ------------------------------------------------

/// A formatting hint attached to a field.
///
/// Only [`Untagged`][Self::Untagged] and [`Nillable`][Self::Nillable]
/// change how a field is decoded. The others only show up in diagnostics.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FormattingMode {
    #[default]
    Default,
    Dec,
    Hex,
    Base64,
    Text,
    List,

    /// The field is a choice whose selections appear among the fields.
    Untagged,

    /// The field is nullable and encoded with an explicit wrapper.
    Nillable,
}

impl fmt::Display for FormattingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            FormattingMode::Default => "DEFAULT",
            FormattingMode::Dec => "DEC",
            FormattingMode::Hex => "HEX",
            FormattingMode::Base64 => "BASE64",
            FormattingMode::Text => "TEXT",
            FormattingMode::List => "LIST",
            FormattingMode::Untagged => "UNTAGGED",
            FormattingMode::Nillable => "NILLABLE",
        })
    }
}


//------------ Scalar implementations ----------------------------------------

macro_rules! scalar_impl {
    ( $type:ty, $tag:expr, $decode:path ) => {
        impl Scalar for $type {
            fn universal_tag(&self) -> Tag {
                $tag
            }

            fn decode_content(
                &mut self, content: Bytes
            ) -> Result<(), ContentError> {
                *self = $decode(&content)?;
                Ok(())
            }
        }

        impl Decodable for $type {
            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Scalar(self)
            }
        }
    }
}

scalar_impl!(i8, Tag::INTEGER, int::decode_i8);
scalar_impl!(i16, Tag::INTEGER, int::decode_i16);
scalar_impl!(i32, Tag::INTEGER, int::decode_i32);
scalar_impl!(i64, Tag::INTEGER, int::decode_i64);
scalar_impl!(u8, Tag::INTEGER, int::decode_u8);
scalar_impl!(u16, Tag::INTEGER, int::decode_u16);
scalar_impl!(u32, Tag::INTEGER, int::decode_u32);
scalar_impl!(u64, Tag::INTEGER, int::decode_u64);
scalar_impl!(f32, Tag::REAL, real::decode_f32);
scalar_impl!(f64, Tag::REAL, real::decode_f64);
scalar_impl!(bool, Tag::BOOLEAN, decode_bool);
scalar_impl!(int::Integer, Tag::INTEGER, decode_integer);
scalar_impl!(int::Unsigned, Tag::INTEGER, decode_unsigned);
scalar_impl!(Bytes, Tag::OCTET_STRING, decode_bytes);
scalar_impl!(OctetString, Tag::OCTET_STRING, decode_octet_string);

fn decode_bool(content: &Bytes) -> Result<bool, ContentError> {
    match content[..] {
        [value] => Ok(value != 0),
        _ => Err(ContentError::from_static("invalid boolean"))
    }
}

fn decode_integer(content: &Bytes) -> Result<int::Integer, ContentError> {
    int::Integer::from_content(content.clone())
}

fn decode_unsigned(
    content: &Bytes
) -> Result<int::Unsigned, ContentError> {
    int::Unsigned::from_content(content.clone())
}

fn decode_bytes(content: &Bytes) -> Result<Bytes, ContentError> {
    Ok(content.clone())
}

fn decode_octet_string(
    content: &Bytes
) -> Result<OctetString, ContentError> {
    Ok(OctetString::new(content.clone()))
}

impl Scalar for String {
    fn universal_tag(&self) -> Tag {
        Tag::UTF8_STRING
    }

    fn decode_content(&mut self, content: Bytes) -> Result<(), ContentError> {
        let res = String::from_utf8(content.to_vec()).map_err(|_| {
            ContentError::from_static("invalid UTF-8 string")
        })?;
        *self = res;
        Ok(())
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl Decodable for String {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Scalar(self)
    }
}


//------------ Generic implementations ---------------------------------------

impl<T: Decodable + Default> Nullable for Option<T> {
    fn set_null(&mut self) {
        *self = None
    }

    fn make_value(&mut self) -> &mut dyn Decodable {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Decodable + Default> Decodable for Option<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Nullable(self)
    }
}

impl<T: Decodable + Default> Array for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn push_default(&mut self) -> &mut dyn Decodable {
        self.push(T::default());
        let idx = Vec::len(self) - 1;
        &mut self[idx]
    }

    fn pop(&mut self) {
        let _ = Vec::pop(self);
    }
}

impl<T: Decodable + Default> Decodable for Vec<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(self)
    }
}

impl<T: Decodable + ?Sized> Decodable for Box<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        (**self).value_mut()
    }
}


//============ Tests =========================================================
