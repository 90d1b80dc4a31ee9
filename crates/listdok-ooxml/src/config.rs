//! Writer configuration
//!
//! Options can be set in code or loaded from a TOML table:
//!
//! ```toml
//! compression = "stored"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::CompressionMethod;

use crate::error::Result;

/// Compression applied to every archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate (what Word produces)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// Options for [`DocxWriter`](crate::writer::DocxWriter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WriterOptions {
    /// Entry compression
    pub compression: Compression,
    /// Deflate level; the zip crate default when unset
    pub compression_level: Option<i64>,
}

impl WriterOptions {
    /// Parse options from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = WriterOptions::default();
        assert_eq!(options.compression, Compression::Deflated);
        assert_eq!(options.compression_level, None);
    }

    #[test]
    fn test_parse_options() {
        let options = WriterOptions::from_toml_str(
            r#"
compression = "stored"
compression_level = 3
"#,
        )
        .unwrap();

        assert_eq!(options.compression, Compression::Stored);
        assert_eq!(options.compression_level, Some(3));
        assert_eq!(options.compression.method(), CompressionMethod::Stored);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let options = WriterOptions::from_toml_str("").unwrap();
        assert_eq!(options, WriterOptions::default());
    }

    #[test]
    fn test_unknown_compression_rejected() {
        assert!(WriterOptions::from_toml_str(r#"compression = "bzip2""#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listdok.toml");
        std::fs::write(&path, "compression = \"deflated\"\n").unwrap();

        let options = WriterOptions::load(&path).unwrap();
        assert_eq!(options.compression, Compression::Deflated);
    }
}
