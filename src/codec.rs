//! Text decoding for name and unit buffers
//!
//! Raw buffers come from length-prefixed or fixed-width reads. They are
//! trimmed at the byte level first, then decoded strictly in the configured
//! encoding. Nothing is ever decoded in place.

use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;

use crate::{GrafError, Result};

/// Default encoding for agent names and units
pub const DEFAULT_ENCODING: &str = "latin1";

/// Bytes stripped from both ends of a raw text buffer
const PADDING: &[u8] = b"\n\r\t \0";

/// Strip padding (newline, carriage return, tab, space, NUL) from both ends
#[must_use]
pub fn trim(raw: &[u8]) -> &[u8] {
    let Some(start) = raw.iter().position(|b| !PADDING.contains(b)) else {
        return &[];
    };
    // A non-padding byte exists, so rposition cannot miss.
    let end = raw.iter().rposition(|b| !PADDING.contains(b)).unwrap_or(start);
    &raw[start..=end]
}

/// Labels naming ISO-8859-1 itself rather than its windows-1252 superset
const LATIN_1_LABELS: &[&str] = &[
    "latin1",
    "latin-1",
    "latin",
    "l1",
    "iso-8859-1",
    "iso8859-1",
    "8859",
    "cp819",
];

/// Text encoding used for header strings
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(Kind);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Every byte maps to the code point of the same value
    Latin1,
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    /// UTF-8
    #[must_use]
    pub fn utf_8() -> Self {
        Self(Kind::Whatwg(encoding_rs::UTF_8))
    }

    /// ISO-8859-1, bytes 0x80-0x9F decode to the C1 controls
    #[must_use]
    pub fn latin_1() -> Self {
        Self(Kind::Latin1)
    }

    /// windows-1252, bytes 0x80-0x9F decode to punctuation and symbols
    #[must_use]
    pub fn windows_1252() -> Self {
        Self(Kind::Whatwg(encoding_rs::WINDOWS_1252))
    }

    /// Look up an encoding by label (`"utf-8"`, `"latin1"`, `"cp1252"`, ...)
    ///
    /// Latin-1 labels resolve to true ISO-8859-1. Every other label follows
    /// the WHATWG table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEncoding` if the label is not recognised
    pub fn for_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        if LATIN_1_LABELS.contains(&normalized.as_str()) {
            return Ok(Self::latin_1());
        }
        Encoding::for_label(normalized.as_bytes())
            .map(|encoding| Self(Kind::Whatwg(encoding)))
            .ok_or_else(|| GrafError::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the encoding
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.0 {
            Kind::Latin1 => "ISO-8859-1",
            Kind::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Decode raw bytes strictly, without replacement characters
    ///
    /// # Errors
    ///
    /// Returns `Decode` if any byte sequence is invalid for this encoding
    pub fn decode(self, raw: &[u8]) -> Result<String> {
        match self.0 {
            Kind::Latin1 => Ok(encoding_rs::mem::decode_latin1(raw).into_owned()),
            Kind::Whatwg(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(raw)
                .map(std::borrow::Cow::into_owned)
                .ok_or_else(|| GrafError::Decode {
                    encoding: encoding.name(),
                    bytes: raw.to_vec(),
                }),
        }
    }

    /// Trim padding, then decode
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the trimmed bytes are invalid for this encoding
    pub fn decode_trimmed(self, raw: &[u8]) -> Result<String> {
        self.decode(trim(raw))
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::latin_1()
    }
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.name()).finish()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = GrafError;

    fn from_str(s: &str) -> Result<Self> {
        Self::for_label(s)
    }
}
