use std::collections::{btree_map::Entry, BTreeMap};

use anyhow::Context;
use quick_xml::events::{BytesStart, Event};

use crate::value::Value;

/// Key prefix used for element attributes
pub const ATTRIBUTE_PREFIX: char = '-';
/// Key holding element text when it sits next to attributes or child elements
pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Default)]
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: BTreeMap<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> anyhow::Result<Self> {
        let name = String::from_utf8(start.local_name().into_inner().to_vec())?;
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.context("read attribute")?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8(attribute.key.local_name().into_inner().to_vec())?;
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((format!("{ATTRIBUTE_PREFIX}{key}"), value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Sequence(items) => items.push(value),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Value::Sequence(vec![first, value]);
                }
            },
        }
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        if self.children.is_empty() && self.attributes.is_empty() {
            return (self.name, Value::Scalar(text.to_owned()));
        }
        let mut mapping = self.children;
        for (key, value) in self.attributes {
            mapping.entry(key).or_insert(Value::Scalar(value));
        }
        if !text.is_empty() {
            mapping.insert(TEXT_KEY.to_owned(), Value::Scalar(text.to_owned()));
        }
        (self.name, Value::Mapping(mapping))
    }
}

/// Decodes xml document into [Value] tree.
///
/// Namespace prefixes are dropped from element and attribute names.
/// The result is a mapping with a single key, the name of the root element.
pub fn decode_document(raw_xml: &str) -> anyhow::Result<Value> {
    let mut reader = quick_xml::Reader::from_str(raw_xml);
    let mut stack: Vec<Frame> = vec![Frame::default()];

    loop {
        match reader.read_event().context("read xml event")? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                current_frame(&mut stack)?.push_child(name, value);
            }
            Event::End(_) => {
                anyhow::ensure!(stack.len() > 1, "unexpected closing tag");
                let frame = stack.pop().context("pop element")?;
                let (name, value) = frame.close();
                current_frame(&mut stack)?.push_child(name, value);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                current_frame(&mut stack)?.text.push_str(&text);
            }
            Event::CData(data) => {
                let data = String::from_utf8(data.into_inner().into_owned())?;
                current_frame(&mut stack)?.text.push_str(&data);
            }
            Event::Eof => break,
            _ => (),
        }
    }

    anyhow::ensure!(stack.len() == 1, "early eof");
    let root = stack.pop().context("pop document")?;
    anyhow::ensure!(!root.children.is_empty(), "document has no root element");
    Ok(Value::Mapping(root.children))
}

fn current_frame(stack: &mut [Frame]) -> anyhow::Result<&mut Frame> {
    stack.last_mut().context("element stack is empty")
}
