//! Insertion paths and style maps.
//!
//! A style map sends a paragraph or run style name to an [`InsertionPath`],
//! the chain of elements that must be open before the styled content is
//! inserted. Paths are written as `tag(.class)*(:fresh)?` segments joined by
//! `>`, for example `ul > li:fresh` or `p.note:fresh`.

use core::fmt;
use std::str::FromStr;

use ecow::{EcoString, eco_format};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::tree::Attributes;
use crate::{Error, Result};

/// Maps style names to insertion paths.
pub type StyleMap = IndexMap<EcoString, InsertionPath>;

/// One level of an [`InsertionPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    /// The tag name.
    pub tag: EcoString,
    /// Attributes the element must carry, e.g. `class`.
    pub attributes: Attributes,
    /// Fresh elements are always opened anew, even when an identical
    /// element is already open.
    pub fresh: bool,
}

impl PathElement {
    /// A reusable element.
    pub fn new(tag: impl Into<EcoString>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            fresh: false,
        }
    }

    /// An element that is always opened anew.
    pub fn fresh(tag: impl Into<EcoString>) -> Self {
        Self {
            fresh: true,
            ..Self::new(tag)
        }
    }

    /// Adds an attribute.
    pub fn with_attr(mut self, name: impl Into<EcoString>, value: impl Into<EcoString>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Whether an open element with the given tag and attributes satisfies
    /// this level.
    pub fn matches(&self, tag: &str, attributes: &Attributes) -> bool {
        self.tag == tag && &self.attributes == attributes
    }
}

/// The chain of elements to open before inserting content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct InsertionPath(Vec<PathElement>);

impl InsertionPath {
    /// A path opening `elements` from the outside in.
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// The empty path: content goes wherever the builder currently is,
    /// after closing everything that is open.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single fresh element at the top level.
    pub fn top_level(tag: impl Into<EcoString>) -> Self {
        Self(vec![PathElement::fresh(tag)])
    }

    /// The path levels, outermost first.
    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// Whether the path opens nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length of the reusable prefix, i.e. the index of the first fresh
    /// element.
    pub fn reusable_prefix(&self) -> usize {
        self.0
            .iter()
            .position(|element| element.fresh)
            .unwrap_or(self.0.len())
    }
}

impl FromStr for InsertionPath {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::empty());
        }

        input
            .split('>')
            .map(|segment| parse_segment(input, segment.trim()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl TryFrom<String> for InsertionPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn parse_segment(input: &str, segment: &str) -> Result<PathElement> {
    let (segment, fresh) = match segment.split_once(':') {
        Some((rest, "fresh")) => (rest, true),
        Some((_, modifier)) => {
            return Err(Error::invalid_path(
                input,
                format!("unknown modifier `{modifier}`"),
            ));
        }
        None => (segment, false),
    };

    let mut parts = segment.split('.');
    let tag = parts.next().unwrap_or_default();
    if !is_valid_name(tag) {
        return Err(Error::invalid_path(input, "expected a tag name"));
    }

    let classes = parts.collect::<Vec<_>>();
    if classes.iter().any(|class| !is_valid_name(class)) {
        return Err(Error::invalid_path(input, "expected a class name"));
    }

    let mut element = PathElement::new(tag);
    element.fresh = fresh;
    if !classes.is_empty() {
        element
            .attributes
            .insert("class".into(), classes.join(" ").into());
    }
    Ok(element)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for InsertionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, element) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(&element.tag)?;
            if let Some(class) = element.attributes.get("class") {
                for name in class.split_whitespace() {
                    write!(f, ".{name}")?;
                }
            }
            if element.fresh {
                f.write_str(":fresh")?;
            }
        }
        Ok(())
    }
}

/// Looks up a style, recording a warning message when the name is unmapped.
pub(crate) fn lookup<'a>(
    map: &'a StyleMap,
    kind: &str,
    name: Option<&EcoString>,
) -> (Option<&'a InsertionPath>, Option<EcoString>) {
    let Some(name) = name else {
        return (None, None);
    };
    match map.get(name) {
        Some(path) => (Some(path), None),
        None => (None, Some(eco_format!("Unrecognised {kind} style: {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_path_with_fresh_suffix() {
        let path: InsertionPath = "ul > li:fresh".parse().unwrap();
        assert_eq!(
            path,
            InsertionPath::new(vec![PathElement::new("ul"), PathElement::fresh("li")])
        );
        assert_eq!(path.reusable_prefix(), 1);
    }

    #[test]
    fn parses_classes_into_class_attribute() {
        let path: InsertionPath = "p.note.wide:fresh".parse().unwrap();
        assert_eq!(
            path.elements()[0],
            PathElement::fresh("p").with_attr("class", "note wide")
        );
        assert_eq!(path.to_string(), "p.note.wide:fresh");
    }

    #[test]
    fn blank_input_is_the_empty_path() {
        let path: InsertionPath = "  ".parse().unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn rejects_unknown_modifier() {
        let err = "h1:stale".parse::<InsertionPath>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid insertion path \"h1:stale\": unknown modifier `stale`"
        );
    }

    #[test]
    fn rejects_missing_tag() {
        assert!("ul > ".parse::<InsertionPath>().is_err());
        assert!(".note".parse::<InsertionPath>().is_err());
    }

    #[test]
    fn lookup_warns_only_for_unmapped_names() {
        let mut map = StyleMap::new();
        map.insert("Heading1".into(), InsertionPath::top_level("h1"));

        let (path, warning) = lookup(&map, "paragraph", Some(&"Heading1".into()));
        assert_eq!(path, Some(&InsertionPath::top_level("h1")));
        assert_eq!(warning, None);

        let (path, warning) = lookup(&map, "paragraph", None);
        assert_eq!((path, warning), (None, None));

        let (path, warning) = lookup(&map, "run", Some(&"Emphatic".into()));
        assert_eq!(path, None);
        assert_eq!(warning.as_deref(), Some("Unrecognised run style: Emphatic"));
    }
}
