//! The source for decoding.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{cmp, error, fmt, io, ops};
use std::convert::Infallible;
use std::io::Read;
use bytes::{Buf, Bytes, BytesMut};
use super::error::{DecodeError, ErrorKind};


//------------ Configuration Constants ---------------------------------------

/// The largest number of octets discarded at once when skipping data.
pub const SKIP_CHUNK: usize = 4096;


//------------ Source --------------------------------------------------------

/// A view into a sequence of octets.
///
/// Sources form the foundation of decoding. They provide the raw octets to
/// decoders in order and never go back.
///
/// A source hands out its data via fragments. A call to [`request`] returns
/// a fragment of up to the requested number of octets. The caller can look
/// at these through [`Fragment::slice`] and decides whether to [`consume`]
/// them. If the fragment is shorter than requested, the source has reached
/// the end of its data. Dropping a fragment without consuming it leaves the
/// source unchanged which makes it possible to peek ahead.
///
/// [`request`]: Source::request
/// [`consume`]: Fragment::consume
pub trait Source {
    /// The fragment type returned by [`request`][Self::request].
    type Fragment<'f>: Fragment<'f> where Self: 'f;

    /// The error produced when the source failed to read more data.
    type Error: error::Error + Send + Sync + 'static;


    //--- Required methods

    /// Returns the number of octets consumed since the source was created.
    fn pos(&self) -> Pos;

    /// Requests up to `len` octets.
    ///
    /// The returned fragment only is shorter than `len` if the source has
    /// reached the end of its data.
    fn request<'f>(
        &'f mut self, len: usize
    ) -> Result<Self::Fragment<'f>, Self::Error>;


    //--- Provided methods

    /// Takes an optional octet from the source.
    ///
    /// If there aren’t any more octets available from the source, returns
    /// `Ok(None)`.
    fn take_opt_u8(&mut self) -> Result<Option<u8>, DecodeError> {
        let pos = self.pos();
        let frag = self.request(1).map_err(|err| {
            DecodeError::stream(err, pos)
        })?;
        match frag.slice().first().copied() {
            Some(value) => {
                frag.consume();
                Ok(Some(value))
            }
            None => Ok(None)
        }
    }

    /// Takes a single octet from the source.
    ///
    /// If there aren’t any more octets available from the source, returns
    /// a stream error.
    fn take_u8(&mut self) -> Result<u8, DecodeError> {
        let pos = self.pos();
        self.take_opt_u8()?.ok_or_else(|| {
            DecodeError::new(ErrorKind::StreamError, pos)
                .with_detail("unexpected end of data")
        })
    }

    /// Takes exactly `len` octets from the source.
    ///
    /// Fails with a stream error if the data ends early.
    ///
    /// The provided implementation copies the octets. Sources that keep
    /// their data in a [`Bytes`] value can hand out a part of it instead.
    fn take_bytes(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        let pos = self.pos();
        let frag = self.request(len).map_err(|err| {
            DecodeError::stream(err, pos)
        })?;
        if frag.slice().len() < len {
            return Err(
                DecodeError::new(ErrorKind::StreamError, pos)
                    .with_detail(format!(
                        "unexpected end of data: needed {} octets, {} left",
                        len, frag.slice().len()
                    ))
            )
        }
        let mut res = BytesMut::with_capacity(len);
        res.extend_from_slice(frag.slice());
        frag.consume();
        Ok(res.freeze())
    }

    /// Discards exactly `len` octets.
    ///
    /// The octets are discarded in chunks of at most [`SKIP_CHUNK`] octets
    /// so that skipping never buffers a large value.
    fn skip(&mut self, mut len: usize) -> Result<(), DecodeError> {
        while len > 0 {
            let pos = self.pos();
            let chunk = cmp::min(len, SKIP_CHUNK);
            let frag = self.request(chunk).map_err(|err| {
                DecodeError::stream(err, pos)
            })?;
            if frag.slice().len() < chunk {
                return Err(
                    DecodeError::new(ErrorKind::StreamError, pos)
                        .with_detail("unexpected end of data while skipping")
                )
            }
            frag.consume();
            len -= chunk;
        }
        Ok(())
    }
}


//------------ Fragment ------------------------------------------------------

/// A part of the data of a source.
pub trait Fragment<'f> {
    /// Returns the octets of the fragment.
    fn slice(&self) -> &[u8];

    /// Advances the source past the fragment.
    fn consume(self);
}


//------------ IntoSource ----------------------------------------------------

/// A type that can be converted into a source.
pub trait IntoSource {
    type Source: Source;

    fn into_source(self) -> Self::Source;
}

impl<T: Source> IntoSource for T {
    type Source = Self;

    fn into_source(self) -> Self::Source {
        self
    }
}


//------------ SliceSource ---------------------------------------------------

/// A source atop a slice of octets.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'s> {
    data: &'s [u8],
    pos: usize,
}

impl<'s> SliceSource<'s> {
    pub fn new(data: &'s [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the octets not yet consumed.
    pub fn remaining(&self) -> &'s [u8] {
        self.data
    }
}

impl<'s> Source for SliceSource<'s> {
    type Error = Infallible;
    type Fragment<'f> = SliceFragment<'s, 'f> where Self: 'f;

    fn pos(&self) -> Pos {
        self.pos.into()
    }

    fn request<'f>(
        &'f mut self, len: usize
    ) -> Result<Self::Fragment<'f>, Self::Error> {
        let data = self.data;
        let (head, tail) = match data.split_at_checked(len) {
            Some(some) => some,
            None => (data, b"".as_ref())
        };
        Ok(SliceFragment { slice: self, head, tail })
    }
}

impl<'a> IntoSource for &'a [u8] {
    type Source = SliceSource<'a>;

    fn into_source(self) -> Self::Source {
        SliceSource::new(self)
    }
}


//------------ SliceFragment -------------------------------------------------

pub struct SliceFragment<'s, 'f> {
    slice: &'f mut SliceSource<'s>,
    head: &'s [u8],
    tail: &'s [u8],
}

impl<'s, 'f> Fragment<'f> for SliceFragment<'s, 'f> {
    fn slice(&self) -> &[u8] {
        self.head
    }

    fn consume(self) {
        self.slice.data = self.tail;
        self.slice.pos += self.head.len();
    }
}


//------------ BytesSource ---------------------------------------------------

/// A source atop a [`Bytes`] value.
///
/// Content octets taken from this source share the underlying memory with
/// the original value rather than being copied.
#[derive(Clone, Debug)]
pub struct BytesSource {
    data: Bytes,
    pos: usize,
}

impl BytesSource {
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the octets not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl Source for BytesSource {
    type Error = Infallible;
    type Fragment<'f> = BytesFragment<'f>;

    fn pos(&self) -> Pos {
        self.pos.into()
    }

    fn request<'f>(
        &'f mut self, len: usize
    ) -> Result<Self::Fragment<'f>, Self::Error> {
        let len = cmp::min(len, self.data.len());
        Ok(BytesFragment { source: self, len })
    }

    fn take_bytes(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        if self.data.len() < len {
            return Err(
                DecodeError::new(ErrorKind::StreamError, self.pos())
                    .with_detail(format!(
                        "unexpected end of data: needed {} octets, {} left",
                        len, self.data.len()
                    ))
            )
        }
        self.pos += len;
        Ok(self.data.split_to(len))
    }
}

impl IntoSource for Bytes {
    type Source = BytesSource;

    fn into_source(self) -> Self::Source {
        BytesSource::new(self)
    }
}


//------------ BytesFragment -------------------------------------------------

pub struct BytesFragment<'f> {
    source: &'f mut BytesSource,
    len: usize,
}

impl<'f> Fragment<'f> for BytesFragment<'f> {
    fn slice(&self) -> &[u8] {
        &self.source.data[..self.len]
    }

    fn consume(self) {
        self.source.data.advance(self.len);
        self.source.pos += self.len;
    }
}


//------------ ReaderSource --------------------------------------------------

/// A source atop a reader.
///
/// The source only ever buffers as many octets as have been requested.
pub struct ReaderSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), pos: 0 }
    }

    /// Returns the reader.
    ///
    /// Octets already buffered by the source are lost.
    pub fn into_reader(self) -> R {
        self.reader
    }
}

impl<R: io::Read> Source for ReaderSource<R> {
    type Fragment<'f> = ReaderFragment<'f> where Self: 'f;
    type Error = io::Error;

    fn pos(&self) -> Pos {
        self.pos.into()
    }

    fn request<'f>(
        &'f mut self, len: usize
    ) -> Result<Self::Fragment<'f>, Self::Error> {
        let cur_len = self.buf.len();
        if cur_len < len {
            let missing = (len - cur_len) as u64;
            (&mut self.reader).take(missing).read_to_end(&mut self.buf)?;
        }
        let len = cmp::min(len, self.buf.len());
        Ok(ReaderFragment { buf: &mut self.buf, pos: &mut self.pos, len })
    }
}


//------------ ReaderFragment ------------------------------------------------

pub struct ReaderFragment<'f> {
    buf: &'f mut Vec<u8>,
    pos: &'f mut usize,
    len: usize,
}

impl<'f> Fragment<'f> for ReaderFragment<'f> {
    fn slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn consume(self) {
        self.buf.copy_within(self.len.., 0);
        self.buf.truncate(self.buf.len() - self.len);
        *self.pos += self.len;
    }
}


//------------ Pos -----------------------------------------------------------

/// The logical position within a source.
///
/// This is the number of octets consumed since the source was created. The
/// difference between two positions is the number of octets consumed in
/// between.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pos(usize);

impl Pos {
    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl From<Pos> for usize {
    fn from(pos: Pos) -> usize {
        pos.0
    }
}

impl ops::Add<usize> for Pos {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Pos(self.0 + rhs)
    }
}

impl ops::Sub for Pos {
    type Output = usize;

    fn sub(self, rhs: Self) -> usize {
        self.0.saturating_sub(rhs.0)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


//============ Tests =========================================================
