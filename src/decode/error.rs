//! Error Handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use std::{error, fmt};
use std::borrow::Cow;
use super::source::Pos;


//------------ ErrorKind -----------------------------------------------------

/// The kind of a decoding failure.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// The identifier octets are truncated or the tag number is too large.
    #[error("malformed identifier octets")]
    MalformedTag,

    /// The length octets are truncated, reserved, or too wide.
    #[error("malformed length octets")]
    MalformedLength,

    /// Values are nested deeper than the configured maximum depth.
    #[error("maximum nesting depth exceeded")]
    DepthExceeded,

    /// A value is larger than the configured maximum size.
    #[error("size limit exceeded")]
    SizeLimitExceeded,

    /// A primitive value uses the indefinite length form.
    #[error("indefinite length not supported for primitive values")]
    UnsupportedIndefiniteLength,

    /// The underlying source failed or ended early.
    #[error("stream error")]
    StreamError,

    /// A value’s octet count disagrees with its length or its parent’s.
    #[error("length mismatch")]
    LengthMismatch,

    /// The end-of-contents octets of an indefinite length value are wrong.
    #[error("missing or malformed end-of-contents")]
    TrailerMismatch,

    /// A value has a tag that doesn’t fit the target or is unknown.
    #[error("unexpected element")]
    UnexpectedElement,

    /// An element should be skipped but skipping is disabled.
    #[error("skipping unknown elements is disabled")]
    SkippingDisabled,

    /// An unknown primitive value with indefinite length can’t be skipped.
    #[error("cannot skip primitive value of indefinite length")]
    CannotSkipPrimitiveIndefinite,

    /// The content octets of a value are invalid for the target type.
    #[error("invalid content")]
    InvalidContent,
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// The error carries its [`ErrorKind`], the position in the source where it
/// happened, and optional details. An error raised by the source itself is
/// available through [`error::Error::source`].
#[derive(Debug)]
pub struct DecodeError {
    kind: ErrorKind,
    pos: Pos,
    detail: Detail,
}

#[derive(Debug)]
enum Detail {
    None,
    Content(ContentError),
    Source(Box<dyn error::Error + Send + Sync>),
}

impl DecodeError {
    /// Creates a new error of the given kind at the given position.
    pub fn new(kind: ErrorKind, pos: Pos) -> Self {
        DecodeError { kind, pos, detail: Detail::None }
    }

    /// Creates an error for invalid content octets.
    pub fn content(err: impl Into<ContentError>, pos: Pos) -> Self {
        DecodeError {
            kind: ErrorKind::InvalidContent,
            pos,
            detail: Detail::Content(err.into()),
        }
    }

    /// Creates an error for a failed source.
    pub fn stream(
        err: impl error::Error + Send + Sync + 'static, pos: Pos
    ) -> Self {
        DecodeError {
            kind: ErrorKind::StreamError,
            pos,
            detail: Detail::Source(Box::new(err)),
        }
    }

    /// Adds a human readable detail message to the error.
    pub fn with_detail(mut self, detail: impl Into<ContentError>) -> Self {
        self.detail = Detail::Content(detail.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the source position where the error happened.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the detail message if there is one.
    pub fn detail(&self) -> Option<&str> {
        match self.detail {
            Detail::Content(ref err) => Some(err.as_str()),
            _ => None
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.pos)?;
        match self.detail {
            Detail::None => Ok(()),
            Detail::Content(ref err) => write!(f, ": {}", err),
            Detail::Source(ref err) => write!(f, ": {}", err),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.detail {
            Detail::Source(ref err) => Some(err.as_ref()),
            _ => None
        }
    }
}


//------------ ContentError --------------------------------------------------

/// An error in the content octets of a value.
///
/// Scalar types return this error when their content octets can’t be
/// converted into a value. It only carries a message. The decoder adds the
/// position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentError {
    message: Cow<'static, str>,
}

impl ContentError {
    /// Creates a content error from a static message.
    pub const fn from_static(msg: &'static str) -> Self {
        ContentError { message: Cow::Borrowed(msg) }
    }

    pub fn as_str(&self) -> &str {
        self.message.as_ref()
    }
}

impl From<&'static str> for ContentError {
    fn from(msg: &'static str) -> Self {
        Self::from_static(msg)
    }
}

impl From<String> for ContentError {
    fn from(msg: String) -> Self {
        ContentError { message: Cow::Owned(msg) }
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for ContentError { }


//============ Tests =========================================================
