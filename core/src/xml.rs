//! Lenient XML document tree for `/xml-api/` responses.
//!
//! Parsing never fails outright. The reader stops at the first malformed
//! construct and whatever was built up to that point is kept; elements still
//! open at that point are closed implicitly. The first problem encountered is
//! reported alongside the tree so strict callers can reject it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of a decoded XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated, trimmed text and CDATA content directly inside this element.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// True for the placeholder returned when no root element could be read.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.children.is_empty() && self.text.is_empty()
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse `input` into a tree, returning the first problem found, if any.
pub(crate) fn parse_lenient(input: &str) -> (XmlElement, Option<String>) {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut problem = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element(&start)),
            Ok(Event::Empty(start)) => attach(&mut stack, &mut root, element(&start)),
            Ok(Event::End(_)) => {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut root, done);
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(open) = stack.last_mut() {
                    let value = text
                        .unescape()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    open.text.push_str(&value);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                problem = Some(format!(
                    "{err} at position {}",
                    reader.error_position()
                ));
                break;
            }
        }
    }

    if !stack.is_empty() && problem.is_none() {
        problem = Some(format!("unclosed element <{}>", stack[stack.len() - 1].name));
    }
    while let Some(open) = stack.pop() {
        attach(&mut stack, &mut root, open);
    }

    match root {
        Some(root) => (root, problem),
        None => (
            XmlElement::default(),
            problem.or_else(|| Some("no root element".to_string())),
        ),
    }
}

fn element(start: &BytesStart<'_>) -> XmlElement {
    let attributes = start
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        ..Default::default()
    }
}

// Elements after the first complete root are dropped.
fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, done: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(done),
        None => {
            if root.is_none() {
                *root = Some(done);
            }
        }
    }
}
