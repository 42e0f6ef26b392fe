/// Small XML document model for ECP responses, built with quick-xml
///
/// ECP documents are tiny (a few KB at most), so they are read into an owned
/// tree and then walked by the field extractor.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Error raised when a response body is not well-formed XML
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML parsing error at position {position}: {message}")]
pub struct XmlError {
    pub position: u64,
    pub message: String,
}

/// A node inside an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its attributes and children, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Child elements, skipping text nodes
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element called `name`
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// Text content of the first child element called `name`
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(XmlElement::text_content)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this element and all of its descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }
}

/// A parsed document. `root` is `None` when the body held no element at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlDocument {
    pub root: Option<XmlElement>,
}

impl XmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let xml = std::str::from_utf8(bytes).map_err(|e| XmlError {
            position: e.valid_up_to() as u64,
            message: format!("invalid UTF-8: {}", e),
        })?;
        Self::parse_str(xml)
    }

    pub fn parse_str(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(start_element(&e, &reader)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = start_element(&e, &reader)?;
                    close_element(element, &mut stack, &mut root, &reader)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| error_at(&reader, "unexpected end tag"))?;
                    close_element(element, &mut stack, &mut root, &reader)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    push_text(&mut stack, text);
                }
                Ok(Event::CData(e)) => {
                    push_text(&mut stack, String::from_utf8_lossy(&e).into_owned());
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(error_at(&reader, &e.to_string())),
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(error_at(&reader, &format!("unclosed element <{}>", open.name)));
        }

        Ok(XmlDocument { root })
    }
}

fn start_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| error_at(reader, &err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    reader: &Reader<&[u8]>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(error_at(reader, "multiple root elements")),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: String) {
    // Text outside the root element (whitespace, stray characters) is ignored
    if let Some(parent) = stack.last_mut() {
        if !text.is_empty() {
            parent.children.push(XmlNode::Text(text));
        }
    }
}

fn error_at(reader: &Reader<&[u8]>, message: &str) -> XmlError {
    XmlError {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}
