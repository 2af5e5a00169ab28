//! Reading input files in one of the supported text encodings.

use std::fmt;
use std::path::Path;

use encoding_rs::{Encoding, IBM866, UTF_8, WINDOWS_1251};

/// Text encodings accepted for input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Cp866,
    Cp1251,
}

impl SourceEncoding {
    /// Every accepted label, in the order shown to users.
    pub const LABELS: &'static [&'static str] = &["utf-8", "cp866", "cp1251"];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(SourceEncoding::Utf8),
            "cp866" | "ibm866" => Some(SourceEncoding::Cp866),
            "cp1251" | "windows-1251" => Some(SourceEncoding::Cp1251),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Cp866 => "cp866",
            SourceEncoding::Cp1251 => "cp1251",
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            SourceEncoding::Utf8 => UTF_8,
            SourceEncoding::Cp866 => IBM866,
            SourceEncoding::Cp1251 => WINDOWS_1251,
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    /// The bytes are not valid in the requested encoding.
    Malformed(SourceEncoding),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "{}", e),
            SourceError::Malformed(enc) => write!(f, "input is not valid {}", enc),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

/// Decode raw bytes. A leading UTF-8 byte order mark is dropped.
pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<String, SourceError> {
    let (text, had_errors) = encoding.encoding().decode_with_bom_removal(bytes);
    if had_errors {
        return Err(SourceError::Malformed(encoding));
    }
    Ok(text.into_owned())
}

/// Read and decode the file at `path`.
pub fn read_source(path: impl AsRef<Path>, encoding: SourceEncoding) -> Result<String, SourceError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes, encoding)
}
