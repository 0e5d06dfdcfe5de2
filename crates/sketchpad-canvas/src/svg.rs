//! SVG Markup
//!
//! Serializes surface contents and wraps them into standalone documents.
//! Numbers are written with Rust's shortest round-trip formatting, so a 6
//! inch viewport reads `viewBox="0 0 6 6"`.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::element::Element;
use crate::viewport::ViewportSize;

/// SVG namespace
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// XLink namespace
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Serialize elements to markup, one element per line
#[must_use]
pub fn serialize_elements(elements: &[Element]) -> String {
    let mut out = String::new();
    for element in elements {
        write_element(&mut out, element);
        out.push('\n');
    }
    out
}

fn write_element(out: &mut String, element: &Element) {
    let _ = write!(out, "<{}", element.tag());
    for (name, value) in element
        .geometry()
        .into_iter()
        .chain(element.style().attributes())
    {
        let _ = write!(out, " {}=\"{}\"", name, escape(value.as_str()));
    }

    match element {
        Element::Text { content, .. } => {
            let _ = write!(out, ">{}</{}>", escape(content.as_str()), element.tag());
        }
        _ => out.push_str("/>"),
    }
}

fn view_box(viewport: &ViewportSize) -> String {
    format!("0 0 {} {}", viewport.width, viewport.height)
}

/// Wrap markup into an `<svg>` element sized in pixels for on-screen preview
#[must_use]
pub fn preview_document(markup: &str, viewport: &ViewportSize) -> String {
    format!(
        "<svg xmlns=\"{ns}\" width=\"{w}\" height=\"{h}\" viewBox=\"{vb}\">\n{markup}</svg>\n",
        ns = SVG_NAMESPACE,
        w = viewport.pixel_width(),
        h = viewport.pixel_height(),
        vb = view_box(viewport),
    )
}

/// Wrap markup into a standalone export document with declaration header
/// and namespace attributes, sized in real-world inches
#[must_use]
pub fn export_document(markup: &str, viewport: &ViewportSize) -> String {
    format!(
        "{decl}\n<svg xmlns=\"{ns}\" xmlns:xlink=\"{xlink}\" version=\"1.1\" width=\"{w}in\" height=\"{h}in\" viewBox=\"{vb}\">\n{markup}</svg>\n",
        decl = XML_DECLARATION,
        ns = SVG_NAMESPACE,
        xlink = XLINK_NAMESPACE,
        w = viewport.width,
        h = viewport.height,
        vb = view_box(viewport),
    )
}
