//! Stable textual description of type trees
//!
//! The description uses the declarative constructor syntax, e.g.
//! `v.object({win_count: v.int64(), loss_count: v.int64()})`, so it can be
//! diffed, documented and parsed back by the source parser. Two trees get
//! the same description iff they are structurally identical, including the
//! order of object fields.

use std::fmt::Write;

use serde_json::Value as JsonValue;

use super::node::{Literal, TypeNode};

/// Returns the description of `node`.
pub fn describe(node: &TypeNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Returns the source form of a literal scalar.
pub fn describe_literal(literal: &Literal) -> String {
    let mut out = String::new();
    write_literal(&mut out, literal);
    out
}

fn write_node(out: &mut String, node: &TypeNode) {
    match node {
        TypeNode::Null => out.push_str("v.null()"),
        TypeNode::Int64 => out.push_str("v.int64()"),
        TypeNode::Float64 => out.push_str("v.number()"),
        TypeNode::Boolean => out.push_str("v.boolean()"),
        TypeNode::String => out.push_str("v.string()"),
        TypeNode::Bytes => out.push_str("v.bytes()"),
        TypeNode::Any => out.push_str("v.any()"),
        TypeNode::Id { table } => {
            out.push_str("v.id(");
            write_string(out, table);
            out.push(')');
        }
        TypeNode::Array { element } => {
            out.push_str("v.array(");
            write_node(out, element);
            out.push(')');
        }
        TypeNode::Object { fields } => {
            out.push_str("v.object({");
            for (i, (name, field)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(name) {
                    out.push_str(name);
                } else {
                    write_string(out, name);
                }
                out.push_str(": ");
                write_node(out, field);
            }
            out.push_str("})");
        }
        TypeNode::Record { key, value } => {
            out.push_str("v.record(");
            write_node(out, key);
            out.push_str(", ");
            write_node(out, value);
            out.push(')');
        }
        TypeNode::Union { alternatives } => {
            out.push_str("v.union(");
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(out, alternative);
            }
            out.push(')');
        }
        TypeNode::Literal { value } => {
            out.push_str("v.literal(");
            write_literal(out, value);
            out.push(')');
        }
        TypeNode::Optional { inner } => {
            out.push_str("v.optional(");
            write_node(out, inner);
            out.push(')');
        }
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::String(s) => write_string(out, s),
        Literal::Int64(n) => {
            let _ = write!(out, "{}n", n);
        }
        Literal::Float64(f) => {
            let _ = write!(out, "{:?}", f);
        }
        Literal::Boolean(b) => {
            let _ = write!(out, "{}", b);
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push_str(&JsonValue::String(s.to_string()).to_string());
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
