use std::borrow::Cow;
use std::fmt::{self, Write};

/// Escape text for use in HTML content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A single HTML tag with attributes, written as open/close pairs or as an
/// empty element.
///
/// Attribute values are escaped on write. An attribute without a value is
/// written as a bare boolean attribute (e.g. `checked`).
#[derive(Debug, Clone)]
pub struct Tag<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, Option<Cow<'a, str>>)>,
}

impl<'a> Tag<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn attr(mut self, key: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        self.attrs.push((key, Some(value.into())));
        self
    }

    pub fn attr_opt<V>(self, key: &'a str, value: Option<V>) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn flag(mut self, key: &'a str, on: bool) -> Self {
        if on {
            self.attrs.push((key, None));
        }
        self
    }

    pub fn open(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        self.write_attrs(out)?;
        out.write_str(">")
    }

    pub fn close(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "</{}>", self.name)
    }

    pub fn empty(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        self.write_attrs(out)?;
        out.write_str(" />")
    }

    fn write_attrs(&self, out: &mut dyn Write) -> fmt::Result {
        for (key, value) in &self.attrs {
            match value {
                Some(value) => write!(out, " {}=\"{}\"", key, escape_html(value))?,
                None => write!(out, " {key}")?,
            }
        }
        Ok(())
    }
}
