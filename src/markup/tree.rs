//! XML parse tree and the codec turning documents into trees and back.
//!
//! The tree records element names, attributes in document order and child nodes,
//! with all references resolved. Folding rules (force-array, attribute folding,
//! root wrapper) live in [`crate::markup::fold`] and operate on trees only.

use crate::error::BatchError;
use crate::markup::config::DEFAULT_MAX_DEPTH;
use log::debug;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use std::str;

const INDENT: &[u8] = b"  ";

/// A node inside an element: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Appends an attribute. Attributes keep their insertion order.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Iterates over the child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenation of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Appends text, merging with a preceding text node so that runs split by
    /// entity references end up in one node.
    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// Converts between XML documents and [`XmlElement`] trees.
pub trait XmlTreeCodec {
    /// Parses a complete document and returns its root element.
    fn parse_to_tree(&self, input: &str) -> Result<XmlElement, BatchError>;

    /// Writes `root` as a pretty-printed document ending with a newline.
    fn tree_to_xml_string(&self, root: &XmlElement) -> Result<String, BatchError>;
}

/// [`XmlTreeCodec`] backed by `quick-xml`.
///
/// Documents and trees nesting deeper than `max_depth` elements are rejected,
/// the root element being at depth 1.
#[derive(Debug, Clone, Copy)]
pub struct QuickXmlCodec {
    max_depth: usize,
}

impl QuickXmlCodec {
    /// Creates a codec accepting up to [`DEFAULT_MAX_DEPTH`] nested elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec accepting up to `max_depth` nested elements.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Deepest nesting accepted, the root element counting as one.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn ensure_depth<R>(&self, depth: usize, reader: &Reader<R>) -> Result<(), BatchError> {
        if depth > self.max_depth {
            return Err(BatchError::Parse(format!(
                "document nests deeper than {} elements at position {}",
                self.max_depth,
                reader.buffer_position()
            )));
        }
        Ok(())
    }
}

impl Default for QuickXmlCodec {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlTreeCodec for QuickXmlCodec {
    fn parse_to_tree(&self, input: &str) -> Result<XmlElement, BatchError> {
        // Whitespace is kept: text runs are split around entity references and
        // trimming each piece would eat the spaces between words.
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                BatchError::Parse(format!("{} at position {}", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => {
                    ensure_no_root(&root, &reader)?;
                    self.ensure_depth(stack.len() + 1, &reader)?;
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    ensure_no_root(&root, &reader)?;
                    self.ensure_depth(stack.len() + 1, &reader)?;
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    // quick-xml already rejects mismatched end tags
                    let element = stack.pop().ok_or_else(|| {
                        BatchError::Parse(format!(
                            "unexpected closing tag at position {}",
                            reader.buffer_position()
                        ))
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    let raw = utf8(text.as_ref())?;
                    let text = unescape(raw).map_err(|e| BatchError::Parse(e.to_string()))?;
                    push_text(&mut stack, &text, &reader)?;
                }
                Event::CData(cdata) => {
                    let text = utf8(cdata.as_ref())?;
                    push_text(&mut stack, text, &reader)?;
                }
                Event::GeneralRef(reference) => {
                    let text = resolve_reference(utf8(&reference)?)?;
                    push_text(&mut stack, &text, &reader)?;
                }
                Event::Eof => break,
                // declaration, comments, processing instructions and doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(BatchError::Parse(format!(
                "unexpected end of document, <{}> is not closed",
                open.name
            )));
        }

        let root = root.ok_or_else(|| BatchError::Parse("document has no root element".to_string()))?;
        debug!("Parsed XML document with root <{}>", root.name);
        Ok(root)
    }

    fn tree_to_xml_string(&self, root: &XmlElement) -> Result<String, BatchError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, root, 0, self.max_depth)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| BatchError::Serialize(format!("Generated XML is not UTF-8: {}", e)))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, BatchError> {
    str::from_utf8(bytes).map_err(|e| BatchError::Parse(format!("invalid UTF-8: {}", e)))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, BatchError> {
    let name = start.name();
    let mut element = XmlElement::new(utf8(name.as_ref())?);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| BatchError::Parse(format!("in <{}>: {}", element.name, e)))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = unescape(utf8(attr.value.as_ref())?)
            .map_err(|e| BatchError::Parse(format!("in <{}>: {}", element.name, e)))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn ensure_no_root<R>(root: &Option<XmlElement>, reader: &Reader<R>) -> Result<(), BatchError> {
    match root {
        Some(root) => Err(BatchError::Parse(format!(
            "unexpected element after root <{}> at position {}",
            root.name,
            reader.buffer_position()
        ))),
        None => Ok(()),
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text<R>(stack: &mut [XmlElement], text: &str, reader: &Reader<R>) -> Result<(), BatchError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(BatchError::Parse(format!(
            "text outside of the root element at position {}",
            reader.buffer_position()
        ))),
    }
}

/// Resolves `&name;` where `name` is a predefined entity or a character reference.
fn resolve_reference(name: &str) -> Result<String, BatchError> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| BatchError::Parse(format!("invalid character reference &{};", name)));
    }

    resolve_predefined_entity(name)
        .map(|entity| entity.to_string())
        .ok_or_else(|| BatchError::Parse(format!("unknown entity &{};", name)))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
    depth: usize,
    max_depth: usize,
) -> Result<(), BatchError> {
    if depth >= max_depth {
        return Err(BatchError::Serialize(format!(
            "tree nests deeper than {} elements at <{}>",
            max_depth, element.name
        )));
    }

    write_indent(writer, depth);

    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        if element.attributes.is_empty() {
            write_event(writer, Event::Start(start))?;
            write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))?;
        } else {
            write_self_closing(writer, &start);
        }
    } else if !element.has_child_elements() {
        let text = element.text();
        write_event(writer, Event::Start(start))?;
        write_event(writer, Event::Text(BytesText::new(&text)))?;
        write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))?;
    } else {
        write_event(writer, Event::Start(start))?;
        writer.get_mut().push(b'\n');
        for child in &element.children {
            match child {
                XmlNode::Element(child) => write_element(writer, child, depth + 1, max_depth)?,
                XmlNode::Text(text) if text.trim().is_empty() => {}
                XmlNode::Text(text) => {
                    write_indent(writer, depth + 1);
                    write_event(writer, Event::Text(BytesText::new(text.trim())))?;
                    writer.get_mut().push(b'\n');
                }
            }
        }
        write_indent(writer, depth);
        write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))?;
    }

    writer.get_mut().push(b'\n');
    Ok(())
}

/// Writes `<name attr="value" />`, with a space before the slash.
fn write_self_closing(writer: &mut Writer<Vec<u8>>, start: &BytesStart<'_>) {
    let buffer = writer.get_mut();
    buffer.push(b'<');
    buffer.extend_from_slice(start);
    buffer.extend_from_slice(b" />");
}

fn write_indent(writer: &mut Writer<Vec<u8>>, depth: usize) {
    for _ in 0..depth {
        writer.get_mut().extend_from_slice(INDENT);
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), BatchError> {
    writer
        .write_event(event)
        .map_err(|e| BatchError::Serialize(format!("Failed to write XML event: {}", e)))
}
