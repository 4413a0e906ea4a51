//! Writing configs back out as text

use super::lexer::{is_ident_continue, is_ident_start};
use crate::constants::EDITOR_INDENT;
use crate::domain::FirebaseConfig;
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Render a mapping in relaxed object-literal syntax
///
/// Keys that are valid identifiers are written bare, everything else is
/// double-quoted. [`super::parse_object`] reads the output back unchanged.
pub fn to_literal(map: &Map<String, Value>) -> String {
    let mut out = String::new();
    write_object(&mut out, map, 0);
    out
}

/// Seed text for the editor: the config as 4-space indented JSON, secret omitted
///
/// An absent config gives an empty editor.
pub fn editable_text(config: Option<&FirebaseConfig>) -> Result<String> {
    let Some(config) = config else {
        return Ok(String::new());
    };

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(EDITOR_INDENT));
    config.without_secret().serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| Error::Invalid {
        message: format!("Editor text is not UTF-8: {e}"),
    })
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>, level: usize) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, value) in map {
        push_indent(out, level + 1);
        if is_bare_key(key) {
            out.push_str(key);
        } else {
            out.push_str(&Value::String(key.clone()).to_string());
        }
        out.push_str(": ");
        write_value(out, value, level + 1);
        out.push_str(",\n");
    }
    push_indent(out, level);
    out.push('}');
}

fn write_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Object(map) => write_object(out, map, level),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                push_indent(out, level + 1);
                write_value(out, item, level + 1);
                out.push_str(",\n");
            }
            push_indent(out, level);
            out.push(']');
        }
        // strings, numbers, booleans and null print as JSON
        scalar => out.push_str(&scalar.to_string()),
    }
}
