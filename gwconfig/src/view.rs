//! Plain-text drawing of a rendered form tree.

use std::fmt::Write;

use colored::Colorize;
use schemaform::{
    Control, FormNode, Value,
    form::{MapEditor, MapEntry},
};

const MASK: &str = "********";

/// Draw `node` and its children as an indented tree.
pub fn draw(node: &FormNode) -> String {
    let mut out = String::new();
    match &node.control {
        // The root object has no label of its own.
        Control::Object { fields, map } if node.path.is_empty() => {
            for f in fields {
                draw_node(&mut out, f, 0);
            }
            if let Some(map) = map {
                draw_entries(&mut out, map, 0);
            }
        }
        _ => draw_node(&mut out, node, 0),
    }
    out
}

fn draw_node(out: &mut String, node: &FormNode, depth: usize) {
    let pad = "  ".repeat(depth);
    let label = node.label.bold();
    match &node.control {
        Control::Unsupported => {
            let _ = writeln!(
                out,
                "{pad}{label}: {}",
                "(unsupported, edit as raw)".yellow()
            );
        }
        Control::Object { fields, map } => {
            let _ = writeln!(out, "{pad}{label}");
            for f in fields {
                draw_node(out, f, depth + 1);
            }
            if let Some(map) = map {
                draw_entries(out, map, depth + 1);
            }
        }
        Control::Array { items, .. } => {
            let _ = writeln!(out, "{pad}{label} {}", format!("[{}]", items.len()).dimmed());
            for item in items {
                draw_node(out, item, depth + 1);
            }
        }
        Control::Enum {
            options, selected, ..
        } => {
            let choices = options
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let text = option_text(o);
                    if Some(i) == *selected {
                        text.green().bold().to_string()
                    } else {
                        text.dimmed().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(out, "{pad}{label}: {choices}");
        }
        Control::Toggle { checked } => {
            let mark = if *checked { "[x]".green() } else { "[ ]".normal() };
            let _ = writeln!(out, "{pad}{label}: {mark}");
        }
        Control::Number { text, .. } => {
            let _ = writeln!(out, "{pad}{label}: {}", value_or_placeholder(node, text));
        }
        Control::Text { text, sensitive } => {
            let shown = if *sensitive && !text.is_empty() {
                MASK.to_string()
            } else {
                value_or_placeholder(node, text)
            };
            let _ = writeln!(out, "{pad}{label}: {shown}");
        }
    }
}

fn draw_entries(out: &mut String, map: &MapEditor, depth: usize) {
    for MapEntry { key, node } in &map.entries {
        let mut entry = node.clone();
        entry.label = key.clone();
        draw_node(out, &entry, depth);
    }
}

fn value_or_placeholder(node: &FormNode, text: &str) -> String {
    match (&node.placeholder, text.is_empty()) {
        (Some(p), true) => p.dimmed().to_string(),
        _ => text.to_string(),
    }
}

fn option_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
