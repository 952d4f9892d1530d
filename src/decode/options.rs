//! Decoder configuration.
//!
//! This is a private module. Its public items are re-exported by the parent.


//------------ Configuration Constants ---------------------------------------

/// The default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// The default maximum size of a single value or array, one GiB.
pub const DEFAULT_MAX_SEQUENCE_SIZE: usize = 1 << 30;


//------------ DecoderOptions ------------------------------------------------

/// The options for a [`Decoder`][super::Decoder].
///
/// The options are created via `Default` and adjusted via the builder style
/// `with_*` methods. A decoder only reads them, so a single value can be
/// shared by many decoders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecoderOptions {
    /// The maximum number of nested element levels.
    max_depth: usize,

    /// The maximum size of primitive content and of array element counts.
    max_sequence_size: usize,

    /// Whether elements the target doesn’t know are skipped.
    skip_unknown_elements: bool,

    /// Whether empty strings load the default of fields that have one.
    default_empty_strings: bool,

    /// Whether entering and leaving elements is logged.
    trace_level: u32,
}

impl DecoderOptions {
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_sequence_size(&self) -> usize {
        self.max_sequence_size
    }

    pub fn skip_unknown_elements(&self) -> bool {
        self.skip_unknown_elements
    }

    pub fn default_empty_strings(&self) -> bool {
        self.default_empty_strings
    }

    pub fn trace_level(&self) -> u32 {
        self.trace_level
    }

    /// Sets the maximum number of nested element levels.
    ///
    /// A top-level scalar needs a depth of one, a sequence with scalar
    /// fields a depth of two, and so on.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum size of primitive content and array element counts.
    pub fn with_max_sequence_size(mut self, size: usize) -> Self {
        self.max_sequence_size = size;
        self
    }

    /// Sets whether unknown elements are skipped or are an error.
    pub fn with_skip_unknown_elements(mut self, skip: bool) -> Self {
        self.skip_unknown_elements = skip;
        self
    }

    /// Sets whether empty strings load the default value of their field.
    pub fn with_default_empty_strings(mut self, default: bool) -> Self {
        self.default_empty_strings = default;
        self
    }

    /// Sets the trace level.
    ///
    /// With a level above zero, the decoder logs entering and leaving every
    /// element.
    pub fn with_trace_level(mut self, level: u32) -> Self {
        self.trace_level = level;
        self
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_sequence_size: DEFAULT_MAX_SEQUENCE_SIZE,
            skip_unknown_elements: true,
            default_empty_strings: true,
            trace_level: 0,
        }
    }
}


//============ Tests =========================================================
