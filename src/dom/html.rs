//! HTML serialization of the document surface
//!
//! Live properties win over attributes: an input's current value, a
//! checkbox's checked state and a select's chosen option are written out
//! as they are now, not as they were declared.

use super::{Element, NodeData, NodeId, Tree};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

pub(crate) fn serialize(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, None, &mut out);
    out
}

fn write_node(tree: &Tree, node: NodeId, select_value: Option<&str>, out: &mut String) {
    let Some(n) = tree.node(node) else {
        return;
    };

    let el = match &n.data {
        NodeData::Text(text) => {
            out.push_str(&escape_text(text));
            return;
        }
        NodeData::Element(el) => el,
    };

    out.push('<');
    out.push_str(&el.tag);

    for (name, value) in &el.attrs {
        if skip_attr(el, name) {
            continue;
        }
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }

    if !el.styles.is_empty() {
        let style: Vec<String> = el
            .styles
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        let _ = write!(out, " style=\"{}\"", escape_attr(&style.join("; ")));
    }

    match el.tag.as_str() {
        "input" if el.is_toggle() => {
            if el.checked {
                out.push_str(" checked");
            }
        }
        "input" if !el.value.is_empty() => {
            let _ = write!(out, " value=\"{}\"", escape_attr(&el.value));
        }
        "option" => {
            let own = el
                .attrs
                .get("value")
                .cloned()
                .unwrap_or_else(|| tree.text_content(node));
            if select_value == Some(own.as_str()) {
                out.push_str(" selected");
            }
        }
        _ => {}
    }

    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    if el.tag == "textarea" {
        out.push_str(&escape_text(&el.value));
    } else {
        let inner_select = if el.tag == "select" {
            Some(el.value.as_str())
        } else {
            select_value
        };
        for &child in &n.children {
            write_node(tree, child, inner_select, out);
        }
    }

    let _ = write!(out, "</{}>", el.tag);
}

/// Attributes superseded by live properties
fn skip_attr(el: &Element, name: &str) -> bool {
    match name {
        "checked" => el.tag == "input",
        "selected" => el.tag == "option",
        "value" => el.tag == "input" && !el.is_toggle(),
        _ => false,
    }
}

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
