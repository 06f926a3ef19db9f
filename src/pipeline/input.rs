//! Descriptor input: raw `plugins` JSON → typed [`PluginDescriptor`]s.
//!
//! The input arrives as one text blob (usually a multi-line workflow input).
//! Parsing is all-or-nothing: a malformed blob aborts the run before any
//! file is touched.

use crate::error::PluginXmlError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Name of the input carrying the descriptor array, used in error messages.
pub const PLUGINS_INPUT: &str = "plugins";

/// One plugin to embed in the document.
///
/// `name`, `version` and `path` default to empty strings when the key is
/// missing or `null`. Numbers and booleans are taken as their JSON text, so
/// `"version": 1` reads as `"1"`. Guids are optional; an empty guid counts as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    /// Plugin name shown on the console.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Opaque version string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    /// Path to the plugin's Lua file.
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: String,
    /// Guid of the `UserPlugin` element.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub plugin_guid: Option<String>,
    /// Guid of the `ComponentLua` element.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub lua_guid: Option<String>,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_plugin_guid(mut self, guid: impl Into<String>) -> Self {
        self.plugin_guid = Some(guid.into());
        self
    }

    pub fn with_lua_guid(mut self, guid: impl Into<String>) -> Self {
        self.lua_guid = Some(guid.into());
        self
    }
}

/// Scalar JSON value as text; `null` is `None`, arrays and objects are
/// rendered as compact JSON.
fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?))
}

/// Parse the raw `plugins` input into descriptors.
///
/// Anything other than a JSON array of objects is rejected with
/// [`PluginXmlError::MalformedInput`] carrying the parser's message.
pub fn parse_descriptors(raw: &str) -> Result<Vec<PluginDescriptor>, PluginXmlError> {
    let plugins: Vec<PluginDescriptor> = serde_json::from_str(raw)
        .map_err(|e| PluginXmlError::malformed_input(PLUGINS_INPUT, &e))?;
    debug!("Parsed {} plugin descriptor(s)", plugins.len());
    Ok(plugins)
}

/// Reject the first descriptor with an empty required field.
///
/// Only applied in strict mode; `index` in the error is 1-based.
pub fn validate_descriptors(plugins: &[PluginDescriptor]) -> Result<(), PluginXmlError> {
    for (i, plugin) in plugins.iter().enumerate() {
        let missing = [
            ("name", &plugin.name),
            ("version", &plugin.version),
            ("path", &plugin.path),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(PluginXmlError::InvalidDescriptor {
                index: i + 1,
                field,
            });
        }
    }
    Ok(())
}
