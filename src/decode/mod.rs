//! Decoding data in Basic Encoding Rules.
//!
//! The entry point is [`Decoder`] which reads encoded values from a
//! [`Source`] and decodes them into anything implementing
//! [`Decodable`][crate::value::Decodable]. How it does so is controlled by
//! [`DecoderOptions`]. For the common case of a value stored in a slice,
//! there is [`decode_slice`].
//!
//! Problems are reported through [`DecodeError`]. In addition, the decoder
//! keeps a [`DiagnosticLog`] that describes where in the data a problem
//! happened.

pub use self::decoder::{decode_slice, Decoder, Outcome};
pub use self::error::{ContentError, DecodeError, ErrorKind};
pub use self::log::{DiagnosticLog, Severity};
pub use self::options::{
    DecoderOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_SEQUENCE_SIZE
};
pub use self::source::{
    BytesFragment, BytesSource, Fragment, IntoSource, Pos, ReaderFragment,
    ReaderSource, SliceFragment, SliceSource, Source, SKIP_CHUNK,
};

mod decoder;
mod error;
mod log;
mod node;
mod options;
mod source;

#[cfg(test)]
mod test;
