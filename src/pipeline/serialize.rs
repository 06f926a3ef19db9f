//! Serialisation: element tree → formatted XML text.
//!
//! Output starts with a UTF-8 XML declaration, puts every element on its own
//! line indented by nesting depth, writes childless elements self-closing and
//! ends with a single `\n`. Attribute values are markup-escaped; tabs and
//! line breaks become character references so every element stays on one
//! line and the value survives attribute normalisation. Characters XML 1.0
//! cannot carry at all (other C0 controls, `U+FFFE`, `U+FFFF`) are dropped.

use crate::error::PluginXmlError;
use crate::pipeline::document::Element;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::fmt::Display;
use std::io::Write;
use tracing::warn;

/// Serialise `root` as a complete XML document.
pub fn to_xml(root: &Element, indent: usize) -> Result<String, PluginXmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_element(&mut writer, root)?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
    xml.push('\n');
    Ok(xml)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), PluginXmlError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(xml_error)
}

/// Escape an attribute value for a double-quoted XML attribute.
pub fn escape_attribute(value: &str) -> String {
    let escaped = escape(value);
    let mut out = String::with_capacity(escaped.len());
    let mut dropped = 0usize;
    for ch in escaped.chars() {
        match ch {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => dropped += 1,
            c => out.push(c),
        }
    }
    if dropped > 0 {
        warn!("Dropped {dropped} character(s) not allowed in XML from attribute value");
    }
    out
}

fn xml_error<E: Display>(e: E) -> PluginXmlError {
    PluginXmlError::Internal(format!("XML serialisation failed: {e}"))
}
