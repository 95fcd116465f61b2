//! Encrypted CMS output and its encoding.

use std::fmt;
use std::str::FromStr;

/// Serialization of a finalized CMS structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Base64 BER between `-----BEGIN CMS-----` / `-----END CMS-----` lines
    #[default]
    Pem,
    /// Raw BER bytes
    Der,
}

impl OutputEncoding {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputEncoding::Pem => "pem",
            OutputEncoding::Der => "der",
        }
    }

    /// Whether the encoding is safe to print to a terminal.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, OutputEncoding::Pem)
    }
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pem" => Ok(OutputEncoding::Pem),
            "der" | "ber" => Ok(OutputEncoding::Der),
            _ => Err(format!("Unsupported output encoding: {s}")),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized, serialized CMS enveloped-data structure.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    bytes: Vec<u8>,
    encoding: OutputEncoding,
}

impl EncryptedEnvelope {
    #[must_use]
    pub fn new(bytes: Vec<u8>, encoding: OutputEncoding) -> Self {
        Self { bytes, encoding }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }
}

impl fmt::Debug for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EncryptedEnvelope(encoding={}, len={})",
            self.encoding,
            self.bytes.len()
        )
    }
}
