//! Root `<svg>` element extraction and re-serialization.
//!
//! Input text is scanned with quick-xml until the first `svg` element; the
//! element may sit inside surrounding markup (a pasted HTML fragment, an XML
//! prolog, comments). Only the root start tag is kept as structured data. The
//! body is carried verbatim so decoding sees exactly what the user wrote.

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesStart, Event},
    name::QName,
};

use super::Dimensions;
use crate::debug;
use crate::error::{ConvertError, ConvertResult};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// The parsed root element of user-supplied markup.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    /// Qualified tag name as written (`svg` or `svg:svg`).
    name: String,
    /// Unescaped attributes in source order.
    attrs: Vec<(String, String)>,
    /// Everything after the start tag, up to and including the end tag.
    body: String,
    self_closing: bool,
}

impl VectorDocument {
    /// Locate the first `<svg>` element in `text`.
    ///
    /// Returns `MalformedInput` when no such element exists. A root whose body
    /// is not well-formed is still accepted; the problem surfaces when the
    /// markup is decoded.
    pub fn parse(text: &str) -> ConvertResult<Self> {
        let mut reader = Reader::from_str(text);
        // HTML void elements (`<img>`, `<br>`) never get an end tag.
        reader.config_mut().check_end_names = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) if is_svg(&elem) => {
                    let (name, attrs) = read_start_tag(&elem)?;
                    let body_start = position(&reader, text);
                    let body = match reader.read_to_end(QName(name.as_bytes())) {
                        Ok(_) => &text[body_start..position(&reader, text)],
                        Err(e) => {
                            debug!("svg"; "unbalanced body after root element: {}", e);
                            &text[body_start..]
                        }
                    };
                    return Ok(Self {
                        name,
                        attrs,
                        body: body.to_string(),
                        self_closing: false,
                    });
                }
                Ok(Event::Empty(elem)) if is_svg(&elem) => {
                    let (name, attrs) = read_start_tag(&elem)?;
                    return Ok(Self {
                        name,
                        attrs,
                        body: String::new(),
                        self_closing: true,
                    });
                }
                Ok(Event::Eof) => return Err(ConvertError::MalformedInput),
                Ok(_) => {}
                Err(e) => {
                    debug!("svg"; "markup scan stopped at {}: {}", reader.error_position(), e);
                    return Err(ConvertError::MalformedInput);
                }
            }
        }
    }

    /// Get an attribute value of the root element.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite (or append) an attribute of the root element.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    /// Write display dimensions onto the root `width`/`height` attributes.
    pub fn set_size(&mut self, size: Dimensions) {
        self.set_attribute("width", size.width.to_string());
        self.set_attribute("height", size.height.to_string());
    }

    /// Serialize to a self-contained markup string.
    ///
    /// Adds the SVG (and, when referenced, xlink) namespace declarations that
    /// HTML-style input usually leaves out.
    pub fn to_markup(&self) -> ConvertResult<String> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if !self.name.contains(':') && self.attribute("xmlns").is_none() {
            start.push_attribute(("xmlns", SVG_NS));
        }
        if self.body.contains("xlink:") && self.attribute("xmlns:xlink").is_none() {
            start.push_attribute(("xmlns:xlink", XLINK_NS));
        }

        let event = if self.self_closing {
            Event::Empty(start)
        } else {
            Event::Start(start)
        };

        let mut writer = Writer::new(Vec::with_capacity(self.body.len() + 128));
        writer
            .write_event(event)
            .map_err(|e| ConvertError::DecodeFailure(format!("cannot serialize root: {e}")))?;

        let mut markup = String::from_utf8(writer.into_inner())
            .map_err(|e| ConvertError::DecodeFailure(e.to_string()))?;
        markup.push_str(&self.body);
        Ok(markup)
    }
}

#[inline]
fn is_svg(elem: &BytesStart<'_>) -> bool {
    elem.local_name().as_ref() == b"svg"
}

/// Byte offset of the reader inside `text`.
#[inline]
fn position(reader: &Reader<&[u8]>, text: &str) -> usize {
    usize::try_from(reader.buffer_position())
        .unwrap_or(text.len())
        .min(text.len())
}

/// Collect the tag name and unescaped attributes of a start tag.
fn read_start_tag(elem: &BytesStart<'_>) -> ConvertResult<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();

    let mut attrs = Vec::new();
    for attr in elem.attributes().with_checks(false) {
        let attr = attr
            .map_err(|e| ConvertError::DecodeFailure(format!("malformed root attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map_err(|e| ConvertError::DecodeFailure(format!("attribute `{key}`: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok((name, attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_root() {
        let doc = VectorDocument::parse(r#"<svg viewBox="0 0 100 50"></svg>"#).unwrap();
        assert_eq!(doc.attribute("viewBox"), Some("0 0 100 50"));
        assert_eq!(doc.attribute("width"), None);
        assert!(!doc.self_closing);
        assert_eq!(doc.body, "</svg>");
    }

    #[test]
    fn test_parse_root_inside_other_markup() {
        let text = r#"<?xml version="1.0"?>
<!-- exported -->
<div class="wrap"><p>icon</p><svg width="24" height="12"><rect width="24" height="12"/></svg></div>"#;
        let doc = VectorDocument::parse(text).unwrap();
        assert_eq!(doc.attribute("width"), Some("24"));
        assert_eq!(doc.body, r#"<rect width="24" height="12"/></svg>"#);
    }

    #[test]
    fn test_parse_after_html_void_elements() {
        for text in [
            r#"<div><img src="a.png"></div><svg width="10" height="10"></svg>"#,
            r#"<p>icon<br></p><svg width="10" height="10"></svg>"#,
        ] {
            let doc = VectorDocument::parse(text).unwrap();
            assert_eq!(doc.attribute("width"), Some("10"));
            assert_eq!(doc.body, "</svg>");
        }
    }

    #[test]
    fn test_parse_self_closing_root() {
        let doc = VectorDocument::parse(r#"<svg width="10" height="10"/>"#).unwrap();
        assert!(doc.self_closing);
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_parse_without_svg_is_malformed() {
        assert!(matches!(
            VectorDocument::parse(""),
            Err(ConvertError::MalformedInput)
        ));
        assert!(matches!(
            VectorDocument::parse("just some text"),
            Err(ConvertError::MalformedInput)
        ));
        assert!(matches!(
            VectorDocument::parse("<div><span>no vector here</span></div>"),
            Err(ConvertError::MalformedInput)
        ));
    }

    #[test]
    fn test_parse_keeps_unbalanced_body() {
        let doc = VectorDocument::parse(r#"<svg width="5" height="5"><g></svg>"#).unwrap();
        assert_eq!(doc.attribute("width"), Some("5"));
        assert_eq!(doc.body, "<g></svg>");
    }

    #[test]
    fn test_set_size_overwrites_in_place() {
        let mut doc =
            VectorDocument::parse(r#"<svg id="a" width="1" fill="red" height="2"></svg>"#).unwrap();
        doc.set_size(Dimensions::new(640, 480));

        let keys: Vec<_> = doc.attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["id", "width", "fill", "height"]);
        assert_eq!(doc.attribute("width"), Some("640"));
        assert_eq!(doc.attribute("height"), Some("480"));
    }

    #[test]
    fn test_set_size_appends_missing_attributes() {
        let mut doc = VectorDocument::parse(r#"<svg viewBox="0 0 4 2"/>"#).unwrap();
        doc.set_size(Dimensions::new(4, 2));
        assert_eq!(doc.attribute("width"), Some("4"));
        assert_eq!(doc.attribute("height"), Some("2"));
    }

    #[test]
    fn test_to_markup_adds_namespace() {
        let mut doc = VectorDocument::parse(r#"<svg viewBox="0 0 100 50"></svg>"#).unwrap();
        doc.set_size(Dimensions::new(100, 50));
        let markup = doc.to_markup().unwrap();
        assert_eq!(
            markup,
            r#"<svg viewBox="0 0 100 50" width="100" height="50" xmlns="http://www.w3.org/2000/svg"></svg>"#
        );
    }

    #[test]
    fn test_to_markup_keeps_existing_namespace() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" width="3" height="3"/>"#;
        let markup = VectorDocument::parse(text).unwrap().to_markup().unwrap();
        assert_eq!(markup.matches("xmlns=").count(), 1);
        assert!(markup.ends_with("/>"));
    }

    #[test]
    fn test_to_markup_declares_xlink_when_used() {
        let text = r##"<svg><use xlink:href="#a"/></svg>"##;
        let markup = VectorDocument::parse(text).unwrap().to_markup().unwrap();
        assert!(markup.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
    }

    #[test]
    fn test_attribute_escaping_survives_serialization() {
        let text = r#"<svg data-title="a &amp; b &quot;c&quot;"></svg>"#;
        let doc = VectorDocument::parse(text).unwrap();
        assert_eq!(doc.attribute("data-title"), Some(r#"a & b "c""#));

        let reparsed = VectorDocument::parse(&doc.to_markup().unwrap()).unwrap();
        assert_eq!(reparsed.attribute("data-title"), Some(r#"a & b "c""#));
    }
}
