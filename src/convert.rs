//! Document building: descriptors → formatted grandMA3 plugin XML.
//!
//! [`DocumentBuilder`] owns the tree for the duration of one build and
//! processes descriptors strictly in input order. The first unreadable file
//! aborts the build; no partial document is ever returned.

use crate::config::BuildConfig;
use crate::error::PluginXmlError;
use crate::pipeline::document::{file_content_element, names, Element};
use crate::pipeline::input::{parse_descriptors, validate_descriptors, PluginDescriptor};
use crate::pipeline::source::{ByteSource, FsSource};
use crate::pipeline::{encode, guid, serialize};
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

/// Builds the plugin document from descriptors.
///
/// The random source only matters for descriptors without guids; with every
/// guid supplied the output is fully deterministic.
pub struct DocumentBuilder<'a, R> {
    config: &'a BuildConfig,
    source: &'a dyn ByteSource,
    rng: R,
}

impl<'a, R: RngCore + CryptoRng> DocumentBuilder<'a, R> {
    pub fn new(config: &'a BuildConfig, source: &'a dyn ByteSource, rng: R) -> Self {
        Self {
            config,
            source,
            rng,
        }
    }

    /// Build the element tree for `plugins`.
    pub fn build_tree(&mut self, plugins: &[PluginDescriptor]) -> Result<Element, PluginXmlError> {
        let mut root =
            Element::new(names::ROOT).with_attribute(names::DATA_VERSION, &self.config.data_version);

        for plugin in plugins {
            let user_plugin = self.plugin_element(plugin)?;
            root.append_child(user_plugin);
        }

        Ok(root)
    }

    /// Build and format the complete XML document for `plugins`.
    pub fn build(&mut self, plugins: &[PluginDescriptor]) -> Result<String, PluginXmlError> {
        info!("Building plugin document for {} plugin(s)", plugins.len());
        let root = self.build_tree(plugins)?;
        let xml = serialize::to_xml(&root, self.config.indent)?;
        debug!("Serialised document: {} bytes", xml.len());
        Ok(xml)
    }

    /// One `UserPlugin → ComponentLua → FileContent → Block*` subtree.
    fn plugin_element(&mut self, plugin: &PluginDescriptor) -> Result<Element, PluginXmlError> {
        let plugin_guid = guid::resolve_guid(plugin.plugin_guid.as_deref(), &mut self.rng);
        let lua_guid = guid::resolve_guid(plugin.lua_guid.as_deref(), &mut self.rng);

        let content = self
            .source
            .read(&plugin.path)
            .map_err(|e| file_access(&plugin.path, e))?;
        let blocks = encode::encode_blocks(&content, self.config.chunk_unit, self.config.block_size)
            .map_err(|e| file_access(&plugin.path, e))?;
        debug!(
            "Plugin '{}' ({}): {} bytes in {} block(s)",
            plugin.name,
            plugin.path,
            content.len(),
            blocks.len()
        );

        let mut lua = Element::new(names::COMPONENT_LUA).with_attribute(names::GUID, lua_guid);
        lua.append_child(file_content_element(blocks));

        let mut user_plugin = Element::new(names::USER_PLUGIN)
            .with_attribute(names::NAME, &plugin.name)
            .with_attribute(names::GUID, plugin_guid)
            .with_attribute(names::VERSION, &plugin.version);
        user_plugin.append_child(lua);

        Ok(user_plugin)
    }
}

fn file_access(path: &str, source: std::io::Error) -> PluginXmlError {
    PluginXmlError::FileAccess {
        path: path.to_string(),
        source,
    }
}

/// Build the XML for `plugins`, reading files from disk.
///
/// Missing guids are drawn from the thread-local CSPRNG.
pub fn build_xml(
    plugins: &[PluginDescriptor],
    config: &BuildConfig,
) -> Result<String, PluginXmlError> {
    DocumentBuilder::new(config, &FsSource, rand::rng()).build(plugins)
}

/// Parse the raw `plugins` JSON and build the XML in one step.
pub fn convert(raw_plugins: &str, config: &BuildConfig) -> Result<String, PluginXmlError> {
    let plugins = parse_descriptors(raw_plugins)?;
    if config.strict {
        validate_descriptors(&plugins)?;
    }
    build_xml(&plugins, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkUnit;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::io;

    const PLUGIN_GUID: &str = "C3 13 5E E5 B6 B5 10 02 15 9F 34 2F 14 B7 E5 8B";
    const LUA_GUID: &str = "C3 13 5E E5 81 D3 10 02 EB 89 05 59 8F 53 BF 8B";

    #[derive(Default)]
    struct MemorySource(HashMap<String, Vec<u8>>);

    impl MemorySource {
        fn with(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
            self.0.insert(path.to_string(), content.into());
            self
        }
    }

    impl ByteSource for MemorySource {
        fn read(&self, path: &str) -> io::Result<Vec<u8>> {
            self.0.get(path).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
            })
        }
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn single_plugin_document() {
        let config = BuildConfig::default();
        let source = MemorySource::default().with("a.lua", "print('hi')");
        let plugins = vec![PluginDescriptor::new("Test Plugin", "1.0.0", "a.lua")
            .with_plugin_guid(PLUGIN_GUID)
            .with_lua_guid(LUA_GUID)];

        let xml = DocumentBuilder::new(&config, &source, seeded())
            .build(&plugins)
            .unwrap();

        let expected = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <GMA3 DataVersion=\"2.0.2.0\">\n\
             \x20   <UserPlugin Name=\"Test Plugin\" Guid=\"{PLUGIN_GUID}\" Version=\"1.0.0\">\n\
             \x20       <ComponentLua Guid=\"{LUA_GUID}\">\n\
             \x20           <FileContent Size=\"1\">\n\
             \x20               <Block Base64=\"cHJpbnQoJ2hpJyk=\"/>\n\
             \x20           </FileContent>\n\
             \x20       </ComponentLua>\n\
             \x20   </UserPlugin>\n\
             </GMA3>\n"
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn no_plugins_yields_empty_root() {
        let config = BuildConfig::default();
        let source = MemorySource::default();
        let xml = DocumentBuilder::new(&config, &source, seeded())
            .build(&[])
            .unwrap();
        assert!(xml.ends_with("<GMA3 DataVersion=\"2.0.2.0\"/>\n"), "got: {xml}");
    }

    #[test]
    fn one_user_plugin_per_descriptor_in_order() {
        let config = BuildConfig::default();
        let source = MemorySource::default().with("a.lua", "a").with("b.lua", "b");
        let plugins = vec![
            PluginDescriptor::new("second", "2", "b.lua"),
            PluginDescriptor::new("first", "1", "a.lua"),
        ];
        let root = DocumentBuilder::new(&config, &source, seeded())
            .build_tree(&plugins)
            .unwrap();
        let names: Vec<_> = root
            .children()
            .iter()
            .map(|c| c.attribute("Name").unwrap())
            .collect();
        assert_eq!(names, ["second", "first"]);
    }

    #[test]
    fn missing_guids_are_generated() {
        let config = BuildConfig::default();
        let source = MemorySource::default().with("a.lua", "x");
        let plugins = vec![PluginDescriptor::new("p", "1", "a.lua").with_plugin_guid("")];
        let root = DocumentBuilder::new(&config, &source, seeded())
            .build_tree(&plugins)
            .unwrap();
        let user_plugin = &root.children()[0];
        let lua = &user_plugin.children()[0];
        let plugin_guid = user_plugin.attribute("Guid").unwrap();
        let lua_guid = lua.attribute("Guid").unwrap();
        assert!(guid::is_guid(plugin_guid), "got: {plugin_guid}");
        assert!(guid::is_guid(lua_guid), "got: {lua_guid}");
        assert_ne!(plugin_guid, lua_guid);
    }

    #[test]
    fn size_matches_block_count() {
        let config = BuildConfig::default();
        let source = MemorySource::default().with("big.lua", vec![b'-'; 2049]);
        let plugins = vec![PluginDescriptor::new("p", "1", "big.lua")];
        let root = DocumentBuilder::new(&config, &source, seeded())
            .build_tree(&plugins)
            .unwrap();
        let file_content = &root.children()[0].children()[0].children()[0];
        assert_eq!(file_content.child_count(), 3);
        assert_eq!(file_content.attribute("Size"), Some("3"));
    }

    #[test]
    fn unreadable_file_aborts_remaining_plugins() {
        let config = BuildConfig::default();
        let source = MemorySource::default().with("a.lua", "a");
        let plugins = vec![
            PluginDescriptor::new("ok", "1", "a.lua"),
            PluginDescriptor::new("gone", "1", "missing.lua"),
            PluginDescriptor::new("never read", "1", "a.lua"),
        ];
        let err = DocumentBuilder::new(&config, &source, seeded())
            .build(&plugins)
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Unable to read lua file \"missing.lua\": "),
            "got: {err}"
        );
    }

    #[test]
    fn chars_mode_rejects_invalid_utf8_as_file_access() {
        let config = BuildConfig::builder()
            .chunk_unit(ChunkUnit::Chars)
            .build()
            .unwrap();
        let source = MemorySource::default().with("bin.lua", vec![0xff, 0xfe]);
        let plugins = vec![PluginDescriptor::new("p", "1", "bin.lua")];
        let err = DocumentBuilder::new(&config, &source, seeded())
            .build(&plugins)
            .unwrap_err();
        assert!(matches!(err, PluginXmlError::FileAccess { .. }));
    }

    #[test]
    fn custom_data_version_is_used() {
        let config = BuildConfig::builder().data_version("2.1.0.0").build().unwrap();
        let source = MemorySource::default();
        let root = DocumentBuilder::new(&config, &source, seeded())
            .build_tree(&[])
            .unwrap();
        assert_eq!(root.attribute("DataVersion"), Some("2.1.0.0"));
    }

    #[test]
    fn convert_rejects_gaps_in_strict_mode() {
        let config = BuildConfig::builder().strict(true).build().unwrap();
        let err = convert(r#"[{"name": "no path", "version": "1"}]"#, &config).unwrap_err();
        assert!(matches!(
            err,
            PluginXmlError::InvalidDescriptor { index: 1, field: "path" }
        ));
    }

    #[test]
    fn convert_reports_empty_path_as_unreadable_file() {
        let err = convert(r#"[{"name": "no path"}]"#, &BuildConfig::default()).unwrap_err();
        assert!(
            err.to_string().starts_with("Unable to read lua file \"\": "),
            "got: {err}"
        );
    }
}
