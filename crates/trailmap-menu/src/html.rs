//! HTML container implementation.
//!
//! [`HtmlDocument`] is an arena of elements addressed by [`ElementId`].
//! Elements are created detached, nested explicitly and serialized from a
//! chosen root with [`HtmlDocument::to_html`].

use std::fmt::Write;

use crate::container::Containers;
use crate::renderer::{Item, ItemEmitter};

/// Handle of an element in an [`HtmlDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<ElementId>,
}

/// Arena-backed HTML element tree.
#[derive(Debug, Default)]
pub struct HtmlDocument {
    elements: Vec<Element>,
}

impl HtmlDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text content of an element (escaped on output).
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.elements[id.0].text = Some(text.into());
    }

    /// Append a class to the element's `class` attribute.
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let merged = match self.attribute(id, "class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attribute(&id, "class", &merged);
    }

    /// Attribute value of an element.
    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0]
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Tag of an element.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> &str {
        &self.elements[id.0].tag
    }

    /// Children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    /// Serialize an element and its descendants.
    #[must_use]
    pub fn to_html(&self, root: ElementId) -> String {
        let mut out = String::new();
        self.write_element(root, &mut out);
        out
    }

    fn write_element(&self, id: ElementId, out: &mut String) {
        let element = &self.elements[id.0];
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            write!(out, r#" {}="{}""#, name, escape_html(value)).unwrap();
        }
        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape_html(text));
        }
        for &child in &element.children {
            self.write_element(child, out);
        }
        write!(out, "</{}>", element.tag).unwrap();
    }
}

impl Containers for HtmlDocument {
    type Handle = ElementId;

    fn create(&mut self, kind: &str) -> ElementId {
        self.elements.push(Element {
            tag: kind.to_owned(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        });
        ElementId(self.elements.len() - 1)
    }

    fn set_attribute(&mut self, handle: &ElementId, name: &str, value: &str) {
        let attributes = &mut self.elements[handle.0].attributes;
        if let Some(entry) = attributes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_owned();
        } else {
            attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    fn nest(&mut self, parent: &ElementId, child: &ElementId) {
        self.elements[parent.0].children.push(*child);
    }
}

/// Emits `<li><a href="uri">title</a></li>` items.
///
/// The label is taken from `title_field`, falling back to the permalink
/// and then the identifier. Active items get the `active` class.
#[derive(Clone, Debug)]
pub struct LinkEmitter {
    title_field: String,
}

impl LinkEmitter {
    /// Use attribute `title_field` as link label.
    #[must_use]
    pub fn new(title_field: impl Into<String>) -> Self {
        Self {
            title_field: title_field.into(),
        }
    }
}

impl Default for LinkEmitter {
    fn default() -> Self {
        Self::new("title")
    }
}

impl ItemEmitter<HtmlDocument> for LinkEmitter {
    fn emit(&mut self, doc: &mut HtmlDocument, item: &Item<'_>) -> ElementId {
        let li = doc.create(item.kind);
        if item.active {
            doc.add_class(li, "active");
        }

        let link = doc.create("a");
        doc.set_attribute(&link, "href", item.node.uri.as_deref().unwrap_or("#"));
        let label = item
            .node
            .attr_string(&self.title_field)
            .or_else(|| item.node.permalink.clone())
            .unwrap_or_else(|| item.id.to_string());
        doc.set_text(link, label);
        doc.nest(&li, &link);

        li
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
