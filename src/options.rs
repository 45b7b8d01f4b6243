//! Decode options.
//!
//! The defensive limits of the decoder and content extractor. The defaults
//! match the hosted tool; they exist as options so embedders processing
//! trusted captures can raise them, and harnesses can lower them.

/// Tunable limits for one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Collection counts above this yield an empty collection. Schutz gegen
    /// manipulierte Laengenangaben; gutartige Payloads bleiben weit darunter.
    pub max_elements: usize,
    /// Cap on printable-run extraction in the stream-level fallback.
    pub max_fallback_strings: usize,
    /// Cap on printable-run extraction inside one BinaryFormatter blob.
    pub max_blob_strings: usize,
    /// Attempt URL-decoding when the input contains `%`.
    pub url_decode: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_elements: 10_000,
            max_fallback_strings: 200,
            max_blob_strings: 50,
            url_decode: true,
        }
    }
}

impl DecodeOptions {
    /// Returns the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collection clamp.
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    /// Disables URL-decoding of `%`-bearing input.
    pub fn without_url_decode(mut self) -> Self {
        self.url_decode = false;
        self
    }
}
