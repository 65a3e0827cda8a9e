// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use serde_json::Value;

/// One numbered entry in a STRUCTUUR section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureItem {
    pub title: String,
    pub points: Vec<String>,
}

impl StructureItem {
    pub fn new(title: impl Into<String>, points: &[&str]) -> Self {
        Self {
            title: title.into(),
            points: points.iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub fn section_header(label: &str) -> String {
    format!("=== {} ===", label)
}

/// `1. first\n2. second`
pub fn format_focus_points<S: AsRef<str>>(points: &[S]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| format!("{}. {}", i + 1, point.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tone_guidelines(guidelines: &[&str]) -> String {
    bullets(guidelines)
}

pub fn format_structure(items: &[StructureItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut block = format!("{}. {}", i + 1, item.title);
            for point in &item.points {
                block.push_str("\n   - ");
                block.push_str(point);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_instructions(instructions: &[&str]) -> String {
    format!("INSTRUCTIES:\n{}", bullets(instructions))
}

/// Pretty-prints a response schema.
///
/// Objects and arrays of objects are broken over lines with two-space
/// indentation; arrays of scalars stay on one line.
pub fn format_json_schema(schema: &Value) -> String {
    let mut out = String::new();
    write_value(schema, 0, &mut out);
    out
}

fn write_value(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push_str("{\n");
            let last = map.len() - 1;
            for (i, (key, child)) in map.iter().enumerate() {
                push_indent(indent + 2, out);
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_value(child, indent + 2, out);
                if i < last {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(indent, out);
            out.push('}');
        }
        Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
            out.push_str("[\n");
            let last = items.len() - 1;
            for (i, item) in items.iter().enumerate() {
                push_indent(indent + 2, out);
                write_value(item, indent + 2, out);
                if i < last {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(indent, out);
            out.push(']');
        }
        scalar_or_flat => out.push_str(&flat(scalar_or_flat)),
    }
}

fn flat(value: &Value) -> String {
    match value {
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
        ),
        other => other.to_string(),
    }
}

fn push_indent(n: usize, out: &mut String) {
    out.extend(std::iter::repeat(' ').take(n));
}

fn bullets(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
