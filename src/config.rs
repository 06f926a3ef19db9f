//! Configuration types for plugin XML generation.
//!
//! All builder behaviour is controlled through [`BuildConfig`], built via its
//! [`BuildConfigBuilder`]. The defaults reproduce the document layout the
//! grandMA3 console itself exports, so most callers never touch them.

use crate::error::PluginXmlError;
use serde::{Deserialize, Serialize};

/// `DataVersion` stamped on the `GMA3` root element.
pub const MA3_DATA_VERSION: &str = "2.0.2.0";

/// Source units per `Block` element.
pub const BLOCK_SIZE: usize = 1024;

/// Spaces per nesting level in the formatted output.
pub const DEFAULT_INDENT: usize = 4;

/// Configuration for a plugin XML build.
///
/// Built via [`BuildConfig::builder()`] or using [`BuildConfig::default()`].
///
/// # Example
/// ```rust
/// use ma3_plugin_xml::{BuildConfig, ChunkUnit};
///
/// let config = BuildConfig::builder()
///     .block_size(512)
///     .chunk_unit(ChunkUnit::Chars)
///     .build()
///     .unwrap();
/// assert_eq!(config.block_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Value of the root `DataVersion` attribute. Default: `"2.0.2.0"`.
    pub data_version: String,

    /// Maximum number of source units (see [`ChunkUnit`]) per `Block`. Default: 1024.
    ///
    /// The console reassembles blocks in order, so the value only changes
    /// how many `Block` elements a plugin occupies, never its content.
    pub block_size: usize,

    /// Whether blocks are cut on byte or character boundaries. Default: [`ChunkUnit::Bytes`].
    pub chunk_unit: ChunkUnit,

    /// Indentation width of the formatted document. Default: 4.
    pub indent: usize,

    /// Reject descriptors with an empty `name`, `version` or `path`. Default: false.
    ///
    /// Without it those fields flow into the document as empty attributes
    /// and an empty `path` surfaces later as an unreadable file.
    pub strict: bool,

    /// Timeout for the artifact upload in seconds. Default: 120.
    pub upload_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_version: MA3_DATA_VERSION.to_string(),
            block_size: BLOCK_SIZE,
            chunk_unit: ChunkUnit::default(),
            indent: DEFAULT_INDENT,
            strict: false,
            upload_timeout_secs: 120,
        }
    }
}

impl BuildConfig {
    /// Create a new builder for `BuildConfig`.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BuildConfig`].
#[derive(Debug)]
pub struct BuildConfigBuilder {
    config: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn data_version(mut self, version: impl Into<String>) -> Self {
        self.config.data_version = version.into();
        self
    }

    pub fn block_size(mut self, n: usize) -> Self {
        self.config.block_size = n;
        self
    }

    pub fn chunk_unit(mut self, unit: ChunkUnit) -> Self {
        self.config.chunk_unit = unit;
        self
    }

    pub fn indent(mut self, width: usize) -> Self {
        self.config.indent = width.min(16);
        self
    }

    pub fn strict(mut self, v: bool) -> Self {
        self.config.strict = v;
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BuildConfig, PluginXmlError> {
        let c = &self.config;
        if c.block_size == 0 {
            return Err(PluginXmlError::InvalidConfig(
                "Block size must be ≥ 1".into(),
            ));
        }
        if c.data_version.trim().is_empty() {
            return Err(PluginXmlError::InvalidConfig(
                "Data version must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Unit in which [`BuildConfig::block_size`] is measured.
///
/// | Unit | Behaviour |
/// |------|-----------|
/// | `Bytes` | Raw file bytes; any file content is accepted (default) |
/// | `Chars` | Unicode scalar values; the file must be valid UTF-8 |
///
/// For ASCII sources both units cut blocks at the same offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkUnit {
    /// Cut blocks every `block_size` bytes. (default)
    #[default]
    Bytes,
    /// Cut blocks every `block_size` characters; a block never splits a character.
    ///
    /// Characters are Unicode scalar values. A character outside the Basic
    /// Multilingual Plane (most emoji) counts once here, where a UTF-16
    /// based splitter counts it twice, so block boundaries differ from such
    /// tools for sources containing them.
    Chars,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_console_layout() {
        let c = BuildConfig::default();
        assert_eq!(c.data_version, "2.0.2.0");
        assert_eq!(c.block_size, 1024);
        assert_eq!(c.chunk_unit, ChunkUnit::Bytes);
        assert_eq!(c.indent, 4);
        assert!(!c.strict);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let err = BuildConfig::builder().block_size(0).build().unwrap_err();
        assert!(matches!(err, PluginXmlError::InvalidConfig(_)));
    }

    #[test]
    fn blank_data_version_is_rejected() {
        let err = BuildConfig::builder().data_version("  ").build().unwrap_err();
        assert!(err.to_string().contains("Data version"));
    }

    #[test]
    fn builder_clamps_indent_and_timeout() {
        let c = BuildConfig::builder()
            .indent(100)
            .upload_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.indent, 16);
        assert_eq!(c.upload_timeout_secs, 1);
    }

    #[test]
    fn chunk_unit_serialises_lowercase() {
        let json = serde_json::to_string(&ChunkUnit::Chars).unwrap();
        assert_eq!(json, "\"chars\"");
    }
}
