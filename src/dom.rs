//! Minimal element tree built from SVG markup.
//!
//! Only what the converter looks at survives: local element names, the
//! unprefixed attributes and the nesting. Text, comments and editor
//! namespaces (`inkscape:`, `sodipodi:`, ...) are dropped.

use miette::SourceSpan;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::ConvertError;

/// One element with its attributes in document order
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Byte range of the start tag in the source
    pub span: SourceSpan,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span: SourceSpan::from((0, 0)),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attribute value by name. The last occurrence wins.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn xml_error(message: impl Into<String>, at: usize) -> ConvertError {
    ConvertError::Xml {
        message: message.into(),
        span: SourceSpan::from((at, 0)),
    }
}

fn element_from(e: &BytesStart<'_>, span: SourceSpan) -> Result<Element, ConvertError> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConvertError::Xml {
            message: err.to_string(),
            span,
        })?;
        if attr.key.prefix().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(err.to_string(), span.offset()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        span,
    })
}

/// Parse markup into its root element
pub fn parse(source: &str) -> Result<Element, ConvertError> {
    let mut reader = Reader::from_str(source);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let before = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error(e.to_string(), reader.buffer_position()))?;
        let after = reader.buffer_position();
        // trimmed whitespace is consumed along with the tag
        let skipped = source.as_bytes()[before..after]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        let span = SourceSpan::from((before + skipped, after - before - skipped));

        match event {
            Event::Start(e) => stack.push(element_from(&e, span)?),
            Event::Empty(e) => {
                let element = element_from(&e, span)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        root.get_or_insert(element);
                    }
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(xml_error("unexpected closing tag", before));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        root.get_or_insert(element);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::Xml {
            message: format!("unclosed element <{}>", open.name),
            span: open.span,
        });
    }
    root.ok_or(ConvertError::EmptyDocument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_tree() {
        let src = r#"<?xml version="1.0"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
  <g id="layer"><rect width="1" height="2"/></g>
  <circle r="3"></circle>
</svg>"#;
        let root = parse(src).unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attr("viewBox"), Some("0 0 10 10"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].name, "rect");
        assert_eq!(root.children[1].attr("r"), Some("3"));
    }

    #[test]
    fn spans_point_at_start_tags() {
        let src = "<svg>\n  <rect width=\"1\"/>\n</svg>";
        let root = parse(src).unwrap();
        let rect = &root.children[0];
        let at = rect.span.offset();
        assert_eq!(&src[at..at + rect.span.len()], "<rect width=\"1\"/>");
    }

    #[test]
    fn prefixes_are_stripped_or_dropped() {
        let src = r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:inkscape="x" inkscape:version="1.2" width="4"/>"#;
        let root = parse(src).unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attr("version"), None);
        assert_eq!(root.attr("width"), Some("4"));
    }

    #[test]
    fn entities_are_unescaped() {
        let root = parse(r#"<svg id="a&amp;b"/>"#).unwrap();
        assert_eq!(root.attr("id"), Some("a&b"));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(matches!(parse("<svg><g></svg>"), Err(ConvertError::Xml { .. })));
        assert!(matches!(parse("<svg><g>"), Err(ConvertError::Xml { .. })));
        assert_eq!(parse("  "), Err(ConvertError::EmptyDocument));
    }

    #[test]
    fn malformed_attributes_are_errors() {
        let src = "<svg>\n  <rect width=5 height=\"5\"/>\n</svg>";
        let Err(ConvertError::Xml { span, .. }) = parse(src) else {
            panic!("unquoted value accepted");
        };
        assert_eq!(&src[span.offset()..span.offset() + span.len()], "<rect width=5 height=\"5\"/>");

        assert!(matches!(
            parse(r#"<svg><rect width="5" height="5" width="9"/></svg>"#),
            Err(ConvertError::Xml { .. })
        ));
    }
}
