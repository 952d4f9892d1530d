//! The frames of a decode.
//!
//! Every encoded element is decoded in its own [`Node`]. A node knows the
//! header of its element, how many octets of it have been consumed so far,
//! and its parent node. The parents form a chain on the call stack which is
//! used to describe where in the data a problem happened.
//!
//! This is a private module.

use std::fmt;
use std::fmt::Write as _;
use bytes::Bytes;
use smallvec::SmallVec;
use crate::header::{self, Header};
use crate::ident::{Class, Tag};
use crate::int;
use crate::length::Length;
use crate::value::{
    Array, Choice, Decodable, Enumeration, FieldInfo, FormattingMode,
    Nullable, Scalar, Sequence, ValueMut,
};
use super::decoder::Decoder;
use super::error::{ContentError, DecodeError, ErrorKind};
use super::log::Severity;
use super::source::{Pos, Source};


//------------ NodeState -----------------------------------------------------

/// How far decoding a node has progressed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum NodeState {
    Fresh,
    HeaderRead,
    BodyDecoded,
    TrailerVerified,
}


//------------ Node ----------------------------------------------------------

/// The frame for decoding a single element.
pub(super) struct Node<'p> {
    /// The node of the enclosing element.
    parent: Option<&'p Node<'p>>,

    /// The source position the root node started at.
    base: Pos,

    /// The header once it has been read.
    header: Option<Header>,

    consumed_header: usize,
    consumed_body: usize,
    consumed_tail: usize,

    /// The nesting level of the element, starting at 1 for the root.
    depth: usize,

    /// The name of the field decoded in this node if known.
    field_name: Option<&'static str>,

    /// The formatting hint of the field.
    hint: FormattingMode,

    state: NodeState,
}

/// # Creation and accessors
///
impl<'p> Node<'p> {
    /// Creates the root node of a decode.
    pub(super) fn root(base: Pos) -> Self {
        Node {
            parent: None,
            base,
            header: None,
            consumed_header: 0,
            consumed_body: 0,
            consumed_tail: 0,
            depth: 1,
            field_name: None,
            hint: FormattingMode::Default,
            state: NodeState::Fresh,
        }
    }

    /// Creates a node for an element nested in `parent`.
    fn child(parent: &'p Node<'p>) -> Self {
        Node {
            parent: Some(parent),
            depth: parent.depth + 1,
            ..Self::root(parent.base)
        }
    }

    /// Returns the length of the element.
    ///
    /// A node without a header has an empty body.
    fn length(&self) -> Length {
        self.header.map_or(Length::definite_from(0), Header::length)
    }

    fn is_constructed(&self) -> bool {
        self.header.map_or(false, Header::is_constructed)
    }

    /// Returns the number of octets of the element consumed so far.
    pub(super) fn total_len(&self) -> usize {
        self.consumed_header + self.consumed_body + self.consumed_tail
    }

    /// Returns the source position where the element starts.
    fn start_pos(&self) -> usize {
        match self.parent {
            Some(parent) => {
                parent.start_pos()
                    .saturating_add(parent.consumed_header)
                    .saturating_add(parent.consumed_body)
            }
            None => self.base.to_usize()
        }
    }

    /// Returns the source position where the element ends if known.
    ///
    /// The end is unknown if the header hasn’t been read, if the trailer of
    /// an indefinite length element hasn’t been seen yet, or if the length
    /// points past the largest possible position.
    fn end_pos(&self) -> Option<usize> {
        let header = self.header?;
        let start = self.start_pos();
        match header.length().definite() {
            Some(len) => {
                start.checked_add(self.consumed_header)?.checked_add(len)
            }
            None if self.state == NodeState::TrailerVerified => {
                start.checked_add(self.total_len())
            }
            None => None
        }
    }

    fn set_field(&mut self, info: &FieldInfo) {
        self.field_name = Some(info.name);
        self.hint = info.hint;
    }
}


/// # Framing
///
impl<'p> Node<'p> {
    /// Reads the identifier and length octets of the element.
    ///
    /// Fails if the decoder already is at its maximum depth. A primitive
    /// element with indefinite length is accepted here and refused by
    /// whatever tries to consume its content.
    pub(super) fn read_tag_header<S: Source>(
        &mut self, dec: &mut Decoder<S>
    ) -> Result<Header, DecodeError> {
        debug_assert_eq!(self.state, NodeState::Fresh);
        let max_depth = dec.options().max_depth();
        if dec.depth() >= max_depth {
            return Err(self.fail(
                dec, ErrorKind::DepthExceeded,
                format!("maximum depth of {} exceeded", max_depth)
            ))
        }
        let header = match Header::take_from(dec.source_mut()) {
            Ok(header) => header,
            Err(err) => return Err(self.log_error(dec, err)),
        };
        self.header = Some(header);
        self.consumed_header = header.encoded_len();
        self.state = NodeState::HeaderRead;
        if dec.options().trace_level() > 0 {
            self.log_trace(dec, "ENTER");
        }
        Ok(header)
    }

    /// Checks the end of the element.
    ///
    /// For a definite length, the whole body must have been consumed. For
    /// an indefinite length, the end-of-contents octets must follow.
    pub(super) fn read_tag_trailer<S: Source>(
        &mut self, dec: &mut Decoder<S>
    ) -> Result<(), DecodeError> {
        match self.length().definite() {
            Some(len) => {
                if self.consumed_body != len {
                    return Err(self.fail(
                        dec, ErrorKind::LengthMismatch,
                        format!(
                            "consumed {} content octets of {}",
                            self.consumed_body, len
                        )
                    ))
                }
            }
            None => {
                let tail = match header::take_end_of_contents(
                    dec.source_mut()
                ) {
                    Ok(tail) => tail,
                    Err(err) => return Err(self.log_error(dec, err)),
                };
                self.consumed_tail = tail;
            }
        }
        self.state = NodeState::TrailerVerified;
        if dec.options().trace_level() > 0 {
            self.log_trace(dec, "LEAVE");
        }
        Ok(())
    }

    /// Returns whether there are more nested elements in the body.
    fn has_more<S: Source>(
        &self, dec: &mut Decoder<S>
    ) -> Result<bool, DecodeError> {
        match self.length().definite() {
            Some(len) => Ok(self.consumed_body < len),
            None => match header::peek_end_of_contents(dec.source_mut()) {
                Ok(end) => Ok(!end),
                Err(err) => Err(self.log_error(dec, err)),
            }
        }
    }

    /// Decodes all nested elements of a constructed element.
    ///
    /// Each element gets its own child node. The closure is called after
    /// the child’s header has been read and has to consume the body. The
    /// trailer is checked afterwards and the element’s octets are added to
    /// the body of this node.
    fn decode_children<S, F>(
        &mut self, dec: &mut Decoder<S>, mut op: F
    ) -> Result<(), DecodeError>
    where
        S: Source,
        F: FnMut(&mut Node, &mut Decoder<S>, Header) -> Result<(), DecodeError>
    {
        dec.nested(|dec| {
            while self.has_more(dec)? {
                let start = dec.pos();
                let mut child = Node::child(self);
                let header = child.read_tag_header(dec)?;
                if header.is_end_of_contents() {
                    return Err(child.fail(
                        dec, ErrorKind::UnexpectedElement,
                        "end-of-contents in definite length value"
                    ))
                }
                if header.tag() == Tag::END_OF_CONTENTS {
                    return Err(child.fail(
                        dec, ErrorKind::TrailerMismatch,
                        format!("malformed end-of-contents {}", header)
                    ))
                }
                self.check_child_fits(&child, dec, header)?;
                op(&mut child, dec, header)?;
                child.read_tag_trailer(dec)?;
                let len = child.total_len();
                self.add_child(dec, start, len)?;
            }
            Ok(())
        })
    }

    /// Checks that a nested element fits into what is left of the body.
    ///
    /// This happens right after the nested element’s header has been read
    /// so that a definite length exceeding the body is refused before any
    /// of its content is read.
    fn check_child_fits<S: Source>(
        &self, child: &Node, dec: &mut Decoder<S>, header: Header
    ) -> Result<(), DecodeError> {
        let Some(limit) = self.length().definite() else {
            return Ok(())
        };
        let Some(len) = header.length().definite() else {
            return Ok(())
        };
        let left = limit.saturating_sub(self.consumed_body);
        match header.encoded_len().checked_add(len) {
            Some(total) if total <= left => Ok(()),
            _ => Err(child.fail(
                dec, ErrorKind::LengthMismatch,
                format!(
                    "nested element of {} content octets exceeds the {} \
                     octets left",
                    len, left
                )
            ))
        }
    }

    /// Adds the octets of a nested element to the body.
    ///
    /// The element’s header, body, and tail must add up to what has been
    /// read from the source since `start`.
    fn add_child<S: Source>(
        &mut self, dec: &mut Decoder<S>, start: Pos, len: usize
    ) -> Result<(), DecodeError> {
        let advanced = dec.pos() - start;
        if advanced != len {
            return Err(self.fail(
                dec, ErrorKind::LengthMismatch,
                format!(
                    "nested element accounts for {} octets but {} were read",
                    len, advanced
                )
            ))
        }
        self.consumed_body += len;
        if let Some(limit) = self.length().definite() {
            if self.consumed_body > limit {
                return Err(self.fail(
                    dec, ErrorKind::LengthMismatch,
                    format!(
                        "nested elements exceed the length of {} octets",
                        limit
                    )
                ))
            }
        }
        Ok(())
    }

    /// Checks that the element has the constructed encoding.
    fn require_constructed<S: Source>(
        &self, dec: &mut Decoder<S>, what: &str
    ) -> Result<(), DecodeError> {
        if self.is_constructed() {
            Ok(())
        }
        else {
            Err(self.fail(
                dec, ErrorKind::UnexpectedElement,
                format!("primitive encoding of {}", what)
            ))
        }
    }
}


/// # Decoding values
///
impl<'p> Node<'p> {
    /// Decodes the whole top-level element into `value`.
    pub(super) fn decode_root<S: Source>(
        &mut self, dec: &mut Decoder<S>, value: ValueMut
    ) -> Result<(), DecodeError> {
        let start = dec.pos();
        let header = self.read_tag_header(dec)?;
        self.decode_untagged(dec, header, value)?;
        self.read_tag_trailer(dec)?;
        let advanced = dec.pos() - start;
        if advanced != self.total_len() {
            return Err(self.fail(
                dec, ErrorKind::LengthMismatch,
                format!(
                    "element accounts for {} octets but {} were read",
                    self.total_len(), advanced
                )
            ))
        }
        Ok(())
    }

    /// Decodes a value that carries its universal tag.
    ///
    /// This happens at the top level and for array elements. A nullable
    /// value is null if the element is a NULL.
    fn decode_untagged<S: Source>(
        &mut self, dec: &mut Decoder<S>, header: Header, value: ValueMut
    ) -> Result<(), DecodeError> {
        let value = match value {
            ValueMut::Nullable(nullable) => {
                if is_null(header) {
                    return self.decode_null(dec, nullable)
                }
                return self.decode_untagged(
                    dec, header, nullable.make_value().value_mut()
                )
            }
            value => value,
        };
        if !value.accepts_universal(header.tag()) {
            return Err(self.fail(
                dec, ErrorKind::UnexpectedElement,
                format!(
                    "expected {} for {} but found {}",
                    OptTag(value.universal_tag()), value.category(),
                    header.tag(),
                )
            ))
        }
        self.decode_tagged(dec, value, FormattingMode::Default)
    }

    /// Decodes a value whose tag has already been matched.
    fn decode_tagged<S: Source>(
        &mut self, dec: &mut Decoder<S>, value: ValueMut,
        hint: FormattingMode,
    ) -> Result<(), DecodeError> {
        match value {
            ValueMut::Scalar(target) => self.decode_scalar(dec, target),
            ValueMut::Enumeration(target) => {
                self.decode_enumeration(dec, target)
            }
            ValueMut::Sequence(target) => self.decode_sequence(dec, target),
            ValueMut::Choice(target) => self.decode_choice(dec, target),
            ValueMut::Array(target) => self.decode_array(dec, target),
            ValueMut::Nullable(target) => {
                self.decode_nullable(dec, target, hint)
            }
        }
    }

    /// Takes the content octets of a primitive element.
    fn read_content<S: Source>(
        &mut self, dec: &mut Decoder<S>
    ) -> Result<Bytes, DecodeError> {
        let Some(len) = self.length().definite() else {
            return Err(self.fail(
                dec, ErrorKind::UnsupportedIndefiniteLength,
                "indefinite length for a primitive type"
            ))
        };
        if self.is_constructed() {
            return Err(self.fail(
                dec, ErrorKind::UnexpectedElement,
                "constructed encoding of a primitive type"
            ))
        }
        let max = dec.options().max_sequence_size();
        if len > max {
            return Err(self.fail(
                dec, ErrorKind::SizeLimitExceeded,
                format!("content of {} octets exceeds limit of {}", len, max)
            ))
        }
        let content = match dec.source_mut().take_bytes(len) {
            Ok(content) => content,
            Err(err) => return Err(self.log_error(dec, err)),
        };
        self.consumed_body = len;
        self.state = NodeState::BodyDecoded;
        Ok(content)
    }

    fn decode_scalar<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Scalar
    ) -> Result<(), DecodeError> {
        let content = self.read_content(dec)?;
        target.decode_content(content).map_err(|err| {
            self.fail(dec, ErrorKind::InvalidContent, err)
        })
    }

    fn decode_enumeration<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Enumeration
    ) -> Result<(), DecodeError> {
        let content = self.read_content(dec)?;
        let value = match int::decode_i32(&content) {
            Ok(value) => value,
            Err(err) => {
                return Err(self.fail(dec, ErrorKind::InvalidContent, err))
            }
        };
        if !target.set_from_int(value) {
            return Err(self.fail(
                dec, ErrorKind::InvalidContent,
                format!("unknown enumerator {}", value)
            ))
        }
        Ok(())
    }

    fn decode_sequence<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Sequence
    ) -> Result<(), DecodeError> {
        self.require_constructed(dec, "a sequence")?;
        target.reset();
        let default_empty = dec.options().default_empty_strings();
        self.decode_children(dec, |child, dec, header| {
            child.decode_field(dec, header, target, default_empty)
        })?;
        self.state = NodeState::BodyDecoded;
        Ok(())
    }

    /// Decodes a single element of a sequence.
    fn decode_field<S: Source>(
        &mut self, dec: &mut Decoder<S>, header: Header,
        target: &mut dyn Sequence, default_empty: bool,
    ) -> Result<(), DecodeError> {
        let tag = header.tag();

        if let Some((index, info)) = find_field(target.fields(), tag, true) {
            self.set_field(&info);
            let Some(slot) = target.field_mut(index) else {
                return Err(self.missing_slot(dec, &info))
            };
            let value = slot.value_mut();
            let is_text = matches!(
                value, ValueMut::Scalar(ref scalar) if scalar.is_text()
            );
            self.decode_tagged(dec, value, info.hint)?;
            if default_empty && info.has_default && is_text
                && self.consumed_body == 0
            {
                target.apply_default(index);
            }
            return Ok(())
        }

        if let Some((index, selection, info)) = find_untagged(target, tag) {
            self.set_field(&info);
            let choice = match target.field_mut(index) {
                Some(slot) => match slot.value_mut() {
                    ValueMut::Choice(choice) => Some(choice),
                    _ => None,
                },
                None => None,
            };
            let Some(slot) = choice.and_then(|c| c.select(selection)) else {
                return Err(self.missing_slot(dec, &info))
            };
            return self.decode_tagged(dec, slot.value_mut(), info.hint)
        }

        self.skip_unknown(dec, header)
    }

    fn decode_choice<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Choice
    ) -> Result<(), DecodeError> {
        self.require_constructed(dec, "a choice")?;
        target.reset();
        let mut selected: Option<&'static str> = None;
        self.decode_children(dec, |child, dec, header| {
            let Some((index, info)) = find_field(
                target.selections(), header.tag(), false
            ) else {
                return child.skip_unknown(dec, header)
            };
            child.set_field(&info);
            if let Some(previous) = selected {
                return Err(child.fail(
                    dec, ErrorKind::UnexpectedElement,
                    format!(
                        "selection '{}' after selection '{}'",
                        info.name, previous
                    )
                ))
            }
            selected = Some(info.name);
            let Some(slot) = target.select(index) else {
                return Err(child.missing_slot(dec, &info))
            };
            child.decode_tagged(dec, slot.value_mut(), info.hint)
        })?;
        self.state = NodeState::BodyDecoded;
        Ok(())
    }

    fn decode_array<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Array
    ) -> Result<(), DecodeError> {
        self.require_constructed(dec, "an array")?;
        target.clear();
        let max = dec.options().max_sequence_size();
        self.decode_children(dec, |child, dec, header| {
            if target.len() >= max {
                return Err(child.fail(
                    dec, ErrorKind::SizeLimitExceeded,
                    format!("more than {} array elements", max)
                ))
            }
            let element = target.push_default();
            if !accepts_untagged(element, header) {
                target.pop();
                return child.skip_unknown(dec, header)
            }
            child.decode_untagged(dec, header, element.value_mut())
        })?;
        self.state = NodeState::BodyDecoded;
        Ok(())
    }

    /// Decodes a nullable value in a tagged position.
    ///
    /// Unless the field is nillable, the value simply is made present.
    /// Absent fields are left null by resetting the enclosing sequence.
    fn decode_nullable<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Nullable,
        hint: FormattingMode,
    ) -> Result<(), DecodeError> {
        if hint == FormattingMode::Nillable {
            return self.decode_nillable(dec, target)
        }
        self.decode_tagged(
            dec, target.make_value().value_mut(), FormattingMode::Default
        )
    }

    /// Decodes a nillable value.
    ///
    /// The element is constructed. If it is empty, the value is null.
    /// Otherwise it contains the value as its `[0]` element.
    fn decode_nillable<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Nullable
    ) -> Result<(), DecodeError> {
        self.require_constructed(dec, "a nillable value")?;
        target.set_null();
        let mut present = false;
        self.decode_children(dec, |child, dec, header| {
            if present || header.tag() != Tag::ctx(0) {
                return child.skip_unknown(dec, header)
            }
            present = true;
            child.decode_tagged(
                dec, target.make_value().value_mut(),
                FormattingMode::Default
            )
        })?;
        self.state = NodeState::BodyDecoded;
        Ok(())
    }

    /// Decodes a NULL into a nullable value.
    fn decode_null<S: Source>(
        &mut self, dec: &mut Decoder<S>, target: &mut dyn Nullable
    ) -> Result<(), DecodeError> {
        if !self.length().is_zero() {
            return Err(self.fail(
                dec, ErrorKind::InvalidContent, "NULL with content octets"
            ))
        }
        target.set_null();
        self.state = NodeState::BodyDecoded;
        Ok(())
    }
}


/// # Skipping
///
impl<'p> Node<'p> {
    /// Handles an element the target doesn’t know.
    ///
    /// The element is counted. It is skipped with a warning if skipping is
    /// enabled and is an error otherwise.
    fn skip_unknown<S: Source>(
        &mut self, dec: &mut Decoder<S>, header: Header
    ) -> Result<(), DecodeError> {
        dec.count_unknown();
        if !dec.options().skip_unknown_elements() {
            return Err(self.fail(
                dec, ErrorKind::UnexpectedElement,
                format!("unknown element {}", header.tag())
            ))
        }
        self.log_msg(
            dec, Severity::Warning,
            format_args!("skipping unknown element {}", header.tag())
        );
        self.skip_field(dec)
    }

    /// Skips over the body of the element.
    ///
    /// A definite length body is discarded without looking at it. An
    /// indefinite length body is walked element by element to find its
    /// end.
    pub(super) fn skip_field<S: Source>(
        &mut self, dec: &mut Decoder<S>
    ) -> Result<(), DecodeError> {
        if !dec.options().skip_unknown_elements() {
            return Err(self.fail(
                dec, ErrorKind::SkippingDisabled, "cannot skip element"
            ))
        }
        match self.length().definite() {
            Some(len) => {
                if let Err(err) = dec.source_mut().skip(len) {
                    return Err(self.log_error(dec, err))
                }
                self.consumed_body = len;
            }
            None => {
                if !self.is_constructed() {
                    return Err(self.fail(
                        dec, ErrorKind::CannotSkipPrimitiveIndefinite,
                        "primitive element with indefinite length"
                    ))
                }
                self.decode_children(dec, |child, dec, _| {
                    child.skip_field(dec)
                })?;
            }
        }
        self.state = NodeState::BodyDecoded;
        Ok(())
    }
}


/// # Diagnostics
///
impl<'p> Node<'p> {
    /// Creates an error at the current position and logs it.
    fn fail<S: Source>(
        &self, dec: &mut Decoder<S>, kind: ErrorKind,
        detail: impl Into<ContentError>,
    ) -> DecodeError {
        let err = DecodeError::new(kind, dec.pos()).with_detail(detail);
        self.log_error(dec, err)
    }

    /// Logs an error with the chain of elements leading to this node.
    pub(super) fn log_error<S>(
        &self, dec: &mut Decoder<S>, err: DecodeError
    ) -> DecodeError {
        self.log_msg(dec, Severity::Error, &err);
        err
    }

    /// Logs a message with the chain of elements leading to this node.
    pub(super) fn log_msg<S>(
        &self, dec: &mut Decoder<S>, severity: Severity,
        message: impl fmt::Display,
    ) {
        let mut text = format!("{}: {}\n", severity, message);
        self.write_chain(&mut text);
        match severity {
            Severity::Success => dec.log_mut().trace(&text),
            Severity::Warning => dec.log_mut().warning(&text),
            Severity::Error => dec.log_mut().error(&text),
        }
    }

    /// Logs entering or leaving the node.
    fn log_trace<S>(&self, dec: &mut Decoder<S>, event: &str) {
        let mut text = format!("{} ", event);
        self.write_frame(&mut text);
        dec.log_mut().trace(&text);
    }

    fn missing_slot<S: Source>(
        &self, dec: &mut Decoder<S>, info: &FieldInfo
    ) -> DecodeError {
        self.fail(
            dec, ErrorKind::UnexpectedElement,
            format!("no value for field '{}'", info.name)
        )
    }

    /// Writes the description of all nodes from the root to this one.
    fn write_chain(&self, target: &mut String) {
        let mut frames: SmallVec<[&Node; 16]> = SmallVec::new();
        let mut node = Some(self);
        while let Some(item) = node {
            frames.push(item);
            node = item.parent;
        }
        for frame in frames.iter().rev() {
            target.push_str("    ");
            frame.write_frame(target);
        }
    }

    /// Writes the description of this node.
    fn write_frame(&self, target: &mut String) {
        let _ = write!(
            target, "depth {}: octets [{}, ", self.depth, self.start_pos()
        );
        let _ = match self.end_pos() {
            Some(end) => write!(target, "{})", end),
            None => write!(target, "?)"),
        };
        let _ = match self.header {
            Some(header) => write!(target, " {}", header),
            None => write!(target, " header not read"),
        };
        if let Some(name) = self.field_name {
            let _ = write!(target, " field '{}'", name);
        }
        if self.hint != FormattingMode::Default {
            let _ = write!(target, " ({})", self.hint);
        }
        target.push('\n');
    }
}


//------------ Helper Functions ----------------------------------------------

/// Finds the field or selection with the given context specific tag.
///
/// If `tagged_only` is set, untagged fields are ignored.
fn find_field(
    fields: &[FieldInfo], tag: Tag, tagged_only: bool
) -> Option<(usize, FieldInfo)> {
    if tag.class() != Class::Context {
        return None
    }
    fields.iter().enumerate().find(|(_, info)| {
        info.id == tag.number() && !(tagged_only && info.is_untagged())
    }).map(|(index, info)| (index, *info))
}

/// Finds an untagged choice field with a selection for the given tag.
///
/// Returns the index of the field, the index of the selection, and the
/// description of the selection.
fn find_untagged(
    target: &mut dyn Sequence, tag: Tag
) -> Option<(usize, usize, FieldInfo)> {
    for index in 0..target.fields().len() {
        let untagged = target.fields().get(index).map_or(
            false, FieldInfo::is_untagged
        );
        if !untagged {
            continue
        }
        let Some(slot) = target.field_mut(index) else { continue };
        if let ValueMut::Choice(choice) = slot.value_mut() {
            if let Some((selection, info)) = find_field(
                choice.selections(), tag, false
            ) {
                return Some((index, selection, info))
            }
        }
    }
    None
}

/// Returns whether the header is that of a NULL.
fn is_null(header: Header) -> bool {
    header.tag() == Tag::NULL && !header.is_constructed()
}

/// Returns whether an untagged value accepts an element with the header.
fn accepts_untagged(value: &mut dyn Decodable, header: Header) -> bool {
    match value.value_mut() {
        ValueMut::Nullable(nullable) => {
            is_null(header) || accepts_untagged(nullable.make_value(), header)
        }
        value => value.accepts_universal(header.tag()),
    }
}


//------------ OptTag --------------------------------------------------------

/// Displays an optional tag.
struct OptTag(Option<Tag>);

impl fmt::Display for OptTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(tag) => write!(f, "{}", tag),
            None => f.write_str("NULL or value"),
        }
    }
}
