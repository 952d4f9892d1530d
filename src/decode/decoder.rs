//! The decoder.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::io;
use bytes::Bytes;
use crate::value::Decodable;
use super::error::{DecodeError, ErrorKind};
use super::log::{DiagnosticLog, Severity};
use super::node::Node;
use super::options::DecoderOptions;
use super::source::{
    BytesSource, Fragment, IntoSource, Pos, ReaderSource, SliceSource, Source,
};


//------------ Outcome -------------------------------------------------------

/// The outcome of a successful decode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    /// The value was decoded without any complaints.
    Success,

    /// The value was decoded but the log contains warnings.
    ///
    /// This happens when unknown elements were skipped.
    Warning,
}


//------------ Decoder -------------------------------------------------------

/// A decoder for BER encoded values.
///
/// The decoder reads one value after another from its source. Each call to
/// [`decode`][Self::decode] consumes exactly one top-level element and
/// decodes it into the given target.
///
/// Besides the result of the last decode, the decoder keeps a diagnostic
/// log describing any problem encountered along with the chain of
/// elements that led to it, as well as the number of unknown elements
/// skipped.
///
/// If decoding fails, the source is left somewhere within the failed
/// element. The decoder shouldn’t be used for further decoding then.
pub struct Decoder<S> {
    /// The source to read from.
    source: S,

    /// The options of the decoder.
    options: DecoderOptions,

    /// The number of levels we are currently nested into the data.
    depth: usize,

    /// The log of the last decode.
    log: DiagnosticLog,

    /// The number of unknown elements encountered.
    unknown_skipped: usize,
}

impl<S: Source> Decoder<S> {
    /// Creates a new decoder atop anything that can be a source.
    pub fn new<I>(source: I, options: DecoderOptions) -> Self
    where I: IntoSource<Source = S> {
        Decoder {
            source: source.into_source(),
            options,
            depth: 0,
            log: DiagnosticLog::default(),
            unknown_skipped: 0,
        }
    }

    /// Decodes the next element into `target`.
    ///
    /// The log and severity are reset before decoding. Whether decoding
    /// succeeds or fails, the log describes what happened afterwards. The
    /// content of `target` is unspecified if decoding fails.
    pub fn decode<T: Decodable + ?Sized>(
        &mut self, target: &mut T
    ) -> Result<Outcome, DecodeError> {
        self.log.clear();
        self.depth = 0;
        let mut root = Node::root(self.source.pos());
        let res = root.decode_root(self, target.value_mut());
        self.depth = 0;
        match res {
            Ok(()) => {
                if self.log.severity() >= Severity::Warning {
                    Ok(Outcome::Warning)
                }
                else {
                    Ok(Outcome::Success)
                }
            }
            Err(err) => {
                self.log.raise(Severity::Error);
                Err(err)
            }
        }
    }

    /// Checks that the source has no data left.
    ///
    /// Trailing data fails with [`ErrorKind::LengthMismatch`]. Like any
    /// failed decode, the error is added to the log.
    pub fn check_end(&mut self) -> Result<(), DecodeError> {
        let pos = self.pos();
        let empty = match self.source.request(1) {
            Ok(frag) => Ok(frag.slice().is_empty()),
            Err(err) => Err(DecodeError::stream(err, pos)),
        };
        let err = match empty {
            Ok(true) => return Ok(()),
            Ok(false) => {
                DecodeError::new(ErrorKind::LengthMismatch, pos)
                    .with_detail("trailing data")
            }
            Err(err) => err,
        };
        self.log.error(&format!("{}: {}", Severity::Error, err));
        Err(err)
    }

    /// Returns the current position of the source.
    pub fn pos(&self) -> Pos {
        self.source.pos()
    }
}

impl<'a> Decoder<SliceSource<'a>> {
    /// Creates a decoder for a slice of octets.
    pub fn from_slice(data: &'a [u8], options: DecoderOptions) -> Self {
        Self::new(data, options)
    }
}

impl Decoder<BytesSource> {
    /// Creates a decoder for a bytes value.
    ///
    /// Octet strings decoded from this decoder share memory with `data`.
    pub fn from_bytes(data: Bytes, options: DecoderOptions) -> Self {
        Self::new(data, options)
    }
}

impl<R: io::Read> Decoder<ReaderSource<R>> {
    /// Creates a decoder reading from a reader.
    pub fn from_reader(reader: R, options: DecoderOptions) -> Self {
        Self::new(ReaderSource::new(reader), options)
    }
}

impl<S> Decoder<S> {
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Returns the worst severity of the last decode.
    pub fn severity(&self) -> Severity {
        self.log.severity()
    }

    /// Returns the text of the log of the last decode.
    pub fn log(&self) -> &str {
        self.log.as_str()
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Returns the number of unknown elements encountered.
    ///
    /// The counter isn’t reset by [`decode`][Self::decode], it accumulates
    /// over all decodes until changed via
    /// [`set_num_unknown_elements_skipped`][Self::set_num_unknown_elements_skipped].
    pub fn num_unknown_elements_skipped(&self) -> usize {
        self.unknown_skipped
    }

    pub fn set_num_unknown_elements_skipped(&mut self, value: usize) {
        self.unknown_skipped = value
    }

    /// Converts the decoder into its source.
    pub fn into_source(self) -> S {
        self.source
    }

    pub(super) fn depth(&self) -> usize {
        self.depth
    }

    pub(super) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub(super) fn log_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.log
    }

    pub(super) fn count_unknown(&mut self) {
        self.unknown_skipped += 1
    }

    /// Runs `op` one level deeper into the data.
    ///
    /// The depth is restored afterwards whatever the outcome of `op`.
    pub(super) fn nested<F, T>(&mut self, op: F) -> T
    where F: FnOnce(&mut Self) -> T {
        self.depth += 1;
        let res = op(self);
        self.depth -= 1;
        res
    }
}


//------------ decode_slice --------------------------------------------------

/// Decodes a single element from a slice into `target`.
///
/// The element must cover the whole slice.
pub fn decode_slice<T: Decodable + ?Sized>(
    data: &[u8], options: &DecoderOptions, target: &mut T,
) -> Result<Outcome, DecodeError> {
    let mut decoder = Decoder::from_slice(data, options.clone());
    let outcome = decoder.decode(target)?;
    decoder.check_end()?;
    Ok(outcome)
}
