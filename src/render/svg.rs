//! Minimal SVG document tree used as the vector surface.

use std::fmt::{self, Write as _};

/// SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Node in the document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum SvgNode {
    /// Element.
    Element(SvgElement),
    /// Character data, escaped on output.
    Text(String),
}

/// Element with ordered attributes and children.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgElement {
    /// Tag name.
    pub name: &'static str,
    /// Attributes in insertion order.
    pub attrs: Vec<(&'static str, String)>,
    /// Child nodes.
    pub children: Vec<SvgNode>,
}

impl SvgElement {
    /// Element without attributes or children.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value for the same key.
    pub fn attr(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.set_attr(key, value);
        self
    }

    /// In-place form of [`SvgElement::attr`].
    pub fn set_attr(&mut self, key: &'static str, value: impl fmt::Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Attribute value by key.
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a child element.
    pub fn child(mut self, child: SvgElement) -> Self {
        self.children.push(SvgNode::Element(child));
        self
    }

    /// Append character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(SvgNode::Text(text.into()));
        self
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {k}=\"{}\"", escape_attr(v));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SvgNode::Element(e) => e.write_to(out),
                SvgNode::Text(t) => out.push_str(&escape_text(t)),
            }
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }
}

/// Root `<svg>` with a single `<defs>` block and a flat body.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    defs: Vec<SvgElement>,
    body: Vec<SvgElement>,
    next_id: u32,
}

impl SvgDocument {
    /// Empty `width x height` document.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: Vec::new(),
            next_id: 0,
        }
    }

    /// Document width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Document height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Change the root size and view box; content is kept.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Remove all content and restart id numbering.
    pub fn clear(&mut self) {
        self.defs.clear();
        self.body.clear();
        self.next_id = 0;
    }

    /// `true` when nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty() && self.body.is_empty()
    }

    /// Next document-unique id with `prefix`, e.g. `gradient-0`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a definition.
    pub fn push_def(&mut self, def: SvgElement) {
        self.defs.push(def);
    }

    /// Append a painted element.
    pub fn push(&mut self, element: SvgElement) {
        self.body.push(element);
    }

    /// Painted elements in paint order.
    pub fn body(&self) -> &[SvgElement] {
        &self.body
    }

    /// Definitions.
    pub fn defs(&self) -> &[SvgElement] {
        &self.defs
    }

    /// Serialize as standalone SVG markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"{SVG_NS}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for d in &self.defs {
                d.write_to(&mut out);
            }
            out.push_str("</defs>");
        }
        for e in &self.body {
            e.write_to(&mut out);
        }
        out.push_str("</svg>");
        out
    }
}

/// Escape character data.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for double-quoted output.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
