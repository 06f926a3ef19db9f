//! Error types for the ma3-plugin-xml library.
//!
//! Every failure is fatal: the first error aborts the whole run and no output
//! file is produced. The `Display` text of each variant is the exact message
//! handed to the fatal-failure channel, so the wording below is part of the
//! public contract (CI logs and tests match on the prefixes).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ma3-plugin-xml library.
#[derive(Debug, Error)]
pub enum PluginXmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The descriptor input is not a JSON array of plugin objects.
    #[error("The value of \"{input}\" is not valid JSON: {detail}")]
    MalformedInput { input: String, detail: String },

    /// A descriptor lacks a required value (strict mode only).
    #[error("Plugin #{index} is missing a value for \"{field}\"")]
    InvalidDescriptor { index: usize, field: &'static str },

    /// A plugin's Lua file could not be read.
    #[error("Unable to read lua file \"{path}\": {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or replace the output XML file.
    #[error("Unable to write output file \"{}\": {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact sink rejected the upload.
    #[error("Failed to upload artifact \"{name}\": {reason}")]
    ArtifactUploadFailed { name: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Anything that does not fit the categories above.
    #[error("Unknown error occurred: {0}")]
    Internal(String),
}

impl PluginXmlError {
    /// Wrap a JSON parser failure for the named input.
    pub fn malformed_input(input: &str, err: &serde_json::Error) -> Self {
        PluginXmlError::MalformedInput {
            input: input.to_string(),
            detail: err.to_string(),
        }
    }
}
