//! Parsing of raw feed content and lookup of its sections.
//!
//! Both feed shapes end up as one `serde_json::Value` tree. For XML every
//! element becomes a mapping of its attributes and child elements, keyed by
//! local name (the `yweather:` prefix is dropped). Repeated child elements
//! become a sequence; an element holding only text becomes a string.

use std::fmt;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{ConfigError, ParseError, PathError, PathReason},
    mapper::RawSection,
};

/// Wire format of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedShape {
    /// YQL JSON, channel at `query.results.channel`.
    #[default]
    Json,
    /// RSS with the weather namespace, channel at `rss/channel`.
    Xml,
}

impl FeedShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedShape::Json => "json",
            FeedShape::Xml => "xml",
        }
    }

    pub const fn all() -> &'static [FeedShape] {
        &[FeedShape::Json, FeedShape::Xml]
    }

    /// Path from the document root to the channel mapping.
    pub fn root_path(&self) -> &'static [&'static str] {
        match self {
            FeedShape::Json => &["query", "results", "channel"],
            FeedShape::Xml => &["channel"],
        }
    }
}

impl fmt::Display for FeedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FeedShape {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "json" => Ok(FeedShape::Json),
            "xml" => Ok(FeedShape::Xml),
            _ => Err(ConfigError::InvalidShape(value.to_string())),
        }
    }
}

/// The channel of a parsed feed.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    channel: Map<String, Value>,
}

impl FeedDocument {
    /// Parse raw feed text of the given shape.
    pub fn parse(shape: FeedShape, content: &str) -> Result<Self, ParseError> {
        let tree = match shape {
            FeedShape::Json => serde_json::from_str(content)?,
            FeedShape::Xml => xml_to_tree(content)?,
        };
        Self::from_tree(shape, tree)
    }

    /// Wrap an already parsed tree, descending to the channel.
    pub fn from_tree(shape: FeedShape, tree: Value) -> Result<Self, ParseError> {
        let root = shape.root_path();
        let mut node = tree;
        for segment in root {
            node = match node {
                Value::Object(mut map) => map.remove(*segment),
                _ => None,
            }
            .ok_or_else(|| ParseError::MissingRoot(root.join(".")))?;
        }

        match node {
            Value::Object(channel) if !channel.is_empty() => Ok(Self { channel }),
            _ => Err(ParseError::MissingRoot(root.join("."))),
        }
    }

    /// A single flat section, e.g. `["item", "condition"]`.
    pub fn section(&self, path: &[&str]) -> Result<&RawSection, PathError> {
        match self.resolve(path)? {
            Value::Object(map) => Ok(map),
            _ => Err(path_error(path, PathReason::NotASection)),
        }
    }

    /// A list of flat sections in feed order, with `drop` keys removed.
    ///
    /// A lone mapping counts as a list of one.
    pub fn items(&self, path: &[&str], drop: &[&str]) -> Result<Vec<RawSection>, PathError> {
        let value = self.resolve(path)?;
        let entries = match value {
            Value::Array(entries) => entries.iter().collect::<Vec<_>>(),
            Value::Object(_) => vec![value],
            _ => return Err(path_error(path, PathReason::NotASection)),
        };

        entries
            .into_iter()
            .map(|entry| match entry {
                Value::Object(map) => {
                    let mut map = map.clone();
                    for key in drop {
                        map.remove(*key);
                    }
                    Ok(map)
                }
                _ => Err(path_error(path, PathReason::NotASection)),
            })
            .collect()
    }

    /// A scalar value rendered as text, e.g. the channel title.
    pub fn text(&self, path: &[&str]) -> Result<String, PathError> {
        match self.resolve(path)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(path_error(path, PathReason::NotASection)),
        }
    }

    fn resolve(&self, path: &[&str]) -> Result<&Value, PathError> {
        let Some((last, parents)) = path.split_last() else {
            return Err(path_error(path, PathReason::KeyMissing));
        };

        let mut map = &self.channel;
        for segment in parents {
            map = match map.get(*segment) {
                Some(Value::Object(inner)) => inner,
                Some(_) => return Err(path_error(path, PathReason::NotASection)),
                None => return Err(path_error(path, PathReason::SubpathMissing)),
            };
        }

        map.get(*last).ok_or_else(|| path_error(path, PathReason::KeyMissing))
    }
}

fn path_error(path: &[&str], reason: PathReason) -> PathError {
    PathError { path: path.join("."), reason }
}

struct XmlNode {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl XmlNode {
    fn open(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut fields = Map::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
            let key = attr.key;
            if key.as_namespace_binding().is_some() {
                continue;
            }
            let value = attr.unescape_value().map_err(|e| ParseError::Xml(e.to_string()))?;
            fields.insert(
                String::from_utf8_lossy(key.local_name().as_ref()).into_owned(),
                Value::String(value.into_owned()),
            );
        }

        Ok(Self { name, fields, text: String::new() })
    }

    /// Text-only elements become strings; anything else, including an element
    /// with neither text nor attributes, becomes a mapping.
    fn into_value(self) -> (String, Value) {
        if self.fields.is_empty() && !self.text.is_empty() {
            (self.name, Value::String(self.text))
        } else {
            (self.name, Value::Object(self.fields))
        }
    }
}

fn attach(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

fn xml_to_tree(content: &str) -> Result<Value, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Xml(e.to_string()))?;
        let closed = match event {
            Event::Start(ref e) => {
                stack.push(XmlNode::open(e)?);
                None
            }
            Event::Empty(ref e) => Some(XmlNode::open(e)?),
            Event::End(_) => stack.pop(),
            Event::Text(ref e) => {
                if let Some(node) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                    node.text.push_str(&text);
                }
                None
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some(node) = closed {
            let (name, value) = node.into_value();
            match stack.last_mut() {
                Some(parent) => attach(&mut parent.fields, name, value),
                None if root.is_none() => root = Some(value),
                None => return Err(ParseError::Xml("more than one root element".to_string())),
            }
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Xml("unexpected end of document".to_string()));
    }

    root.ok_or_else(|| ParseError::Xml("document has no root element".to_string()))
}
