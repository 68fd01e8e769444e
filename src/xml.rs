//! Owned XML element tree, built completely in memory and serialized once.

use std::io::Write;

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::Result;

const INDENT_SIZE: usize = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf element holding only text.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Appends `child` and returns it for further filling.
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends a text leaf.
    pub fn push_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.children.push(Element::with_text(name, text));
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a `/`-separated path of child names, taking the first match at each step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |el, name| el.children.iter().find(|c| c.name == name))
    }

    /// Text of the element at `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(Element::text)
    }
}

/// Writes `root` as an indented UTF-8 document with an XML declaration.
pub fn write_document<W: Write>(root: &Element, inner: W) -> Result<W> {
    let mut writer = Writer::new_with_indent(inner, b' ', INDENT_SIZE);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, root)?;
    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;
    Ok(inner)
}

pub fn to_document_string(root: &Element) -> Result<String> {
    let bytes = write_document(root, Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text().filter(|t| !t.is_empty());
    if text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut root = Element::new("root").with_attribute("xmlns", "urn:test");
        root.push_text("a", "1 & 2");
        root.push(Element::new("b"));
        root.push(Element::new("c")).push_text("d", "x");
        root
    }

    #[test]
    fn serializes_indented_with_declaration() {
        let out = to_document_string(&sample()).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root xmlns=\"urn:test\">"));
        assert!(out.contains("\n    <a>1 &amp; 2</a>"));
        assert!(out.contains("\n    <b/>"));
        assert!(out.contains("\n    <c>\n        <d>x</d>\n    </c>"));
        assert!(out.ends_with("</root>\n"));
    }

    #[test]
    fn empty_text_is_self_closing() {
        let mut root = Element::new("root");
        root.push_text("blank", "");
        let out = to_document_string(&root).unwrap();
        assert!(out.contains("<blank/>"));
    }

    #[test]
    fn find_walks_paths() {
        let root = sample();
        assert_eq!(root.find_text("c/d"), Some("x"));
        assert_eq!(root.find_text("a"), Some("1 & 2"));
        assert!(root.find("c/missing").is_none());
        assert_eq!(root.children_named("b").count(), 1);
    }
}
