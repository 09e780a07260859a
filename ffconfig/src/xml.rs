//! Minimal element tree over `quick-xml` events.
//!
//! The server documents are small, so they are read into a tree once and
//! then walked by the schema, stats and values parsers.

use quick_xml::{Reader, events::Event};

use crate::error::XmlError;

/// A node inside an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(start: &quick_xml::events::BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Value of the attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Direct child elements named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First direct child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// First element named `name` in document order, including `self`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.elements().find_map(|e| e.find(name))
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    fn drop_indentation(&mut self) {
        if self.has_element_children() {
            self.children
                .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
        }
    }

    /// Trimmed text of the first direct child named `name`, if any.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|e| e.text().trim().to_string())
    }
}

/// Parse `input` and return its root element.
///
/// Text is kept verbatim. Whitespace-only text between child elements is
/// indentation and is dropped when its element closes.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::new(&start)?),
            Event::Empty(start) => {
                let element = Element::new(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let mut element = stack.pop().ok_or(XmlError::UnexpectedClose(name))?;
                element.drop_indentation();
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                let text = text.unescape()?.into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unterminated(open.name));
    }
    root.ok_or(XmlError::Empty)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_text_and_attrs() {
        let doc = parse(
            r#"<?xml version="1.0"?>
            <config><section name="Server &amp; Co"><item id="a"><name>Port</name></item></section></config>"#,
        )
        .unwrap();
        assert_eq!(doc.name, "config");
        let section = doc.child("section").unwrap();
        assert_eq!(section.attr("name"), Some("Server & Co"));
        assert_eq!(doc.find("name").unwrap().text(), "Port");
        assert_eq!(section.child("item").unwrap().child_text("name").unwrap(), "Port");
    }

    #[test]
    fn test_empty_element_and_missing_root() {
        let doc = parse("<stats><writable_config/></stats>").unwrap();
        assert_eq!(doc.find("writable_config").unwrap().text(), "");
        assert!(matches!(parse("   "), Err(XmlError::Empty)));
    }

    #[test]
    fn test_text_whitespace_is_preserved() {
        let doc = parse(
            "<config>\n  <general>\n    <name>  padded  </name>\n    <blank>   </blank>\n  </general>\n</config>",
        )
        .unwrap();
        let general = doc.child("general").unwrap();
        assert_eq!(general.child("name").unwrap().text(), "  padded  ");
        assert_eq!(general.child("blank").unwrap().text(), "   ");
        assert!(doc.children.iter().all(|n| matches!(n, Node::Element(_))));
        assert_eq!(general.children.len(), 2);
    }

    #[test]
    fn test_unterminated_document() {
        assert!(parse("<config><section>").is_err());
    }
}
