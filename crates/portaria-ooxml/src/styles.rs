//! Style definitions of a package (`word/styles.xml`)
//!
//! The writer only references a paragraph or table style when the target
//! package defines it; everything else falls back to direct formatting.
//!
//! Localized Word templates translate style IDs (`Ttulo`, `Ttulo1`) but keep
//! the built-in English names (`Title`, `heading 1`), so lookups match either.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Styles defined by a package
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: BTreeMap<String, Style>,
    /// ID of the default paragraph style
    pub default_paragraph: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub id: String,
    /// Display name; the ID when the definition has none
    pub name: String,
    pub style_type: StyleType,
    pub based_on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("character") => StyleType::Character,
            Some("table") => StyleType::Table,
            Some("numbering") => StyleType::Numbering,
            _ => StyleType::Paragraph,
        }
    }
}

impl StyleSheet {
    /// Parse a `styles.xml` part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut open: Option<(Style, bool)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"style" => {
                    open = start_style(e);
                }
                // <w:style .../> has no children
                Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"style" => {
                    if let Some((style, is_default)) = start_style(e) {
                        sheet.insert(style, is_default);
                    }
                }
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if let Some((style, _)) = open.as_mut() {
                        match e.local_name().as_ref() {
                            b"name" => {
                                if let Some(name) = get_attr(e, b"w:val") {
                                    style.name = name;
                                }
                            }
                            b"basedOn" => style.based_on = get_attr(e, b"w:val"),
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => {
                    if let Some((style, is_default)) = open.take() {
                        sheet.insert(style, is_default);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    fn insert(&mut self, style: Style, is_default: bool) {
        if is_default && style.style_type == StyleType::Paragraph {
            self.default_paragraph = Some(style.id.clone());
        }
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Whether a style with this ID and type is defined
    pub fn has(&self, id: &str, style_type: StyleType) -> bool {
        self.get(id).is_some_and(|s| s.style_type == style_type)
    }

    /// ID of the style of this type whose ID or display name is `key`
    ///
    /// An exact ID wins; names compare case-insensitively.
    pub fn resolve(&self, key: &str, style_type: StyleType) -> Option<&str> {
        if self.has(key, style_type) {
            return self.get(key).map(|s| s.id.as_str());
        }
        self.styles
            .values()
            .find(|s| s.style_type == style_type && s.name.eq_ignore_ascii_case(key))
            .map(|s| s.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// A style opened by a `<w:style>` element; the flag is `w:default="1"`
fn start_style(e: &BytesStart) -> Option<(Style, bool)> {
    let id = get_attr(e, b"w:styleId")?;
    let style = Style {
        name: id.clone(),
        id,
        style_type: StyleType::from_attr(get_attr(e, b"w:type").as_deref()),
        based_on: None,
    };
    let is_default = matches!(get_attr(e, b"w:default").as_deref(), Some("1" | "true"));
    Some((style, is_default))
}

/// Attribute value by qualified name
pub(crate) fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
