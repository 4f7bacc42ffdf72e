//! Reads MathML into a small element tree.

use std::borrow::Cow;

use ecow::EcoString;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use super::symbols::named_entity;
use crate::tree::Attributes;
use crate::{Error, Result};

/// Nesting limit of the MathML input.
const MAX_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum MathNode {
    Element(MathElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct MathElement {
    /// The local name, without a namespace prefix.
    pub name: EcoString,
    /// Attribute values, unescaped.
    pub attributes: Attributes,
    /// Child nodes in document order.
    pub children: Vec<MathNode>,
}

impl MathNode {
    /// The node as an element, if it is one.
    pub fn as_element(&self) -> Option<&MathElement> {
        match self {
            MathNode::Element(element) => Some(element),
            MathNode::Text(_) => None,
        }
    }
}

impl MathElement {
    fn start(event: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(event.local_name().as_ref()).into();
        let mut attributes = Attributes::new();
        for attr in event.attributes() {
            let attr = attr.map_err(|err| format!("malformed MathML attribute: {err}"))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|err| format!("malformed MathML attribute: {err}"))?;
            attributes.insert(key, value.as_ref().into());
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// The value of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(EcoString::as_str)
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &MathElement> {
        self.children.iter().filter_map(MathNode::as_element)
    }

    /// All text below this element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                MathNode::Text(text) => out.push_str(text),
                MathNode::Element(element) => element.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(MathNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(MathNode::Text(text.to_owned()));
        }
    }
}

/// Parses MathML source into its top-level nodes.
pub(super) fn parse(source: &str) -> Result<Vec<MathNode>> {
    let mut reader = Reader::from_str(source);
    let mut buf = Vec::new();
    let mut stack: Vec<MathElement> = Vec::new();
    let mut roots = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(format!("MathML nested deeper than {MAX_DEPTH} elements").into());
                }
                stack.push(MathElement::start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                attach(&mut stack, &mut roots, MathElement::start(e)?);
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or("unexpected MathML closing tag")?;
                attach(&mut stack, &mut roots, element);
            }
            Ok(Event::Text(ref e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e));
            }
            Ok(Event::CData(ref e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e));
            }
            Ok(Event::GeneralRef(ref e)) => {
                let name = String::from_utf8_lossy(e);
                push_text(&mut stack, &resolve_entity(&name)?);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(format!(
                    "malformed MathML at position {}: {err}",
                    reader.buffer_position()
                )
                .into());
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed MathML element `{}`", open.name).into());
    }
    Ok(roots)
}

fn attach(stack: &mut [MathElement], roots: &mut Vec<MathNode>, element: MathElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(MathNode::Element(element)),
        None => roots.push(MathNode::Element(element)),
    }
}

/// Text outside of any element is ignored.
fn push_text(stack: &mut [MathElement], text: &str) {
    if let Some(parent) = stack.last_mut() {
        parent.push_text(text);
    }
}

fn resolve_entity(name: &str) -> Result<Cow<'static, str>> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        return value
            .and_then(char::from_u32)
            .map(|ch| Cow::Owned(ch.to_string()))
            .ok_or_else(|| Error::from(format!("invalid character reference `&{name};`")));
    }
    resolve_predefined_entity(name)
        .or_else(|| named_entity(name))
        .map(Cow::Borrowed)
        .ok_or_else(|| format!("unknown entity `&{name};`").into())
}
