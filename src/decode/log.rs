//! The diagnostic log of a decoder.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;


//------------ Severity ------------------------------------------------------

/// How bad the outcome of a decode is.
///
/// The variants are ordered, so the worst of two severities is their
/// maximum.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    #[default]
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        })
    }
}


//------------ DiagnosticLog -------------------------------------------------

/// The human readable account of a decode.
///
/// The log collects the messages of one decode together with the worst
/// severity seen. Every message is mirrored to `tracing` under the target
/// `berdec::decode`: trace lines at the trace level, warnings at the warn
/// level, and errors at the debug level since the caller receives them as
/// a [`DecodeError`][super::DecodeError] anyway.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticLog {
    text: String,
    severity: Severity,
}

impl DiagnosticLog {
    /// Returns the text of the log.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the worst severity seen.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.severity = Severity::Success;
    }

    /// Raises the severity to at least `severity`.
    pub(crate) fn raise(&mut self, severity: Severity) {
        self.severity = self.severity.max(severity)
    }

    pub(crate) fn trace(&mut self, message: &str) {
        tracing::trace!(target: "berdec::decode", "{}", message);
        self.push(message);
    }

    pub(crate) fn warning(&mut self, message: &str) {
        tracing::warn!(target: "berdec::decode", "{}", message);
        self.raise(Severity::Warning);
        self.push(message);
    }

    pub(crate) fn error(&mut self, message: &str) {
        tracing::debug!(target: "berdec::decode", "{}", message);
        self.raise(Severity::Error);
        self.push(message);
    }

    fn push(&mut self, message: &str) {
        self.text.push_str(message);
        if !message.ends_with('\n') {
            self.text.push('\n');
        }
    }
}

impl fmt::Display for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}


//============ Tests =========================================================
