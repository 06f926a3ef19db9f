//! In-memory element tree for the plugin document.
//!
//! The tree is deliberately minimal: an element is a name, an ordered list of
//! attributes and an ordered list of children. Order is preserved exactly as
//! inserted, which is all the serializer needs to produce stable output.

/// One XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing the value in place if the key exists.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder-style [`Element::set_attribute`].
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Element and attribute names of the grandMA3 plugin document.
pub mod names {
    pub const ROOT: &str = "GMA3";
    pub const DATA_VERSION: &str = "DataVersion";
    pub const USER_PLUGIN: &str = "UserPlugin";
    pub const COMPONENT_LUA: &str = "ComponentLua";
    pub const FILE_CONTENT: &str = "FileContent";
    pub const BLOCK: &str = "Block";
    pub const NAME: &str = "Name";
    pub const GUID: &str = "Guid";
    pub const VERSION: &str = "Version";
    pub const SIZE: &str = "Size";
    pub const BASE64: &str = "Base64";
}

/// Build a `FileContent` element from encoded blocks.
///
/// `Size` is derived from the child count after every block is appended.
pub fn file_content_element(blocks: impl IntoIterator<Item = String>) -> Element {
    let mut file_content = Element::new(names::FILE_CONTENT);
    for block in blocks {
        file_content.append_child(Element::new(names::BLOCK).with_attribute(names::BASE64, block));
    }
    let size = file_content.child_count();
    file_content.set_attribute(names::SIZE, size.to_string());
    file_content
}
