//! Decoding data in Basic Encoding Rules.
//!
//! This crate decodes values encoded in the Basic Encoding Rules (BER)
//! defined in ITU Recommendation X.690 into typed Rust values. The types
//! describe themselves to the decoder through the traits of the
//! [`value`] module. Implementations for the common scalar and container
//! types are provided; sequences, choices, and enumerations are usually
//! implemented by generated code.
//!
//! Decoding happens in a streaming fashion: the data is read from a
//! [`Source`][decode::Source] octet by octet without ever going back, so it
//! doesn’t need to be in memory in full.
//!
//! # Example
//!
//! ```
//! use berdec::{Decodable, FieldInfo, Sequence, ValueMut};
//! use berdec::decode::{Decoder, DecoderOptions, Outcome};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     label: String,
//! }
//!
//! const POINT_FIELDS: &[FieldInfo] = &[
//!     FieldInfo::new("x", 0),
//!     FieldInfo::new("label", 1),
//! ];
//!
//! impl Sequence for Point {
//!     fn fields(&self) -> &[FieldInfo] {
//!         POINT_FIELDS
//!     }
//!
//!     fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decodable> {
//!         match index {
//!             0 => Some(&mut self.x),
//!             1 => Some(&mut self.label),
//!             _ => None,
//!         }
//!     }
//!
//!     fn reset(&mut self) {
//!         *self = Point::default()
//!     }
//! }
//!
//! impl Decodable for Point {
//!     fn value_mut(&mut self) -> ValueMut<'_> {
//!         ValueMut::Sequence(self)
//!     }
//! }
//!
//! let data = b"\x30\x08\x80\x01\x22\x81\x03abc";
//! let mut point = Point::default();
//! let mut decoder = Decoder::from_slice(data, DecoderOptions::default());
//! assert_eq!(decoder.decode(&mut point).unwrap(), Outcome::Success);
//! assert_eq!(point.x, 0x22);
//! assert_eq!(point.label, "abc");
//! ```

pub use self::header::Header;
pub use self::ident::{Class, Ident, Tag};
pub use self::length::Length;
pub use self::ostring::OctetString;
pub use self::value::{
    Array, Choice, Decodable, Enumeration, FieldInfo, FormattingMode,
    Nullable, Scalar, Sequence, ValueMut,
};

pub mod datetime;
pub mod decode;
pub mod int;
pub mod real;
pub mod value;

mod header;
mod ident;
mod length;
mod ostring;

#[cfg(test)]
mod fixture;
