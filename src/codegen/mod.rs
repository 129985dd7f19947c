//! Rust type generation
//!
//! Turns the frozen schema registry and the declared endpoints into Rust
//! source: one `<Table>Table` struct per collection, one `<Function>Args`
//! struct and one path constant per endpoint. Nested objects and unions
//! get their own named items. Output depends only on declaration order.
//!
//! Generated types read and write the same JSON the validator encodes:
//! ids and bytes become the `Id` and `Bytes` newtypes, which carry the
//! `{"$id": ...}` and `{"$bytes": ...}` tagged forms. Code that uses
//! `Bytes` needs the `base64` crate next to `serde`.

mod naming;

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::functions::{Endpoint, FunctionRegistry};
use crate::schema::SchemaRegistry;
use crate::types::{FieldMap, Literal, TypeNode};

use naming::{const_ident, field_ident, needs_rename, type_ident};

const HEADER: &str = "\
// @generated by docshape from the declared schema and endpoints. Do not edit.

use serde::{Deserialize, Serialize};
";

const ID_TYPE: &str = r#"/// Document id, `{"$id": "table:id"}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub String);

impl Serialize for Id {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$id", &self.0)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Tagged {
            #[serde(rename = "$id")]
            id: String,
        }
        Tagged::deserialize(deserializer).map(|tagged| Id(tagged.id))
    }
}
"#;

const BYTES_TYPE: &str = r#"/// Binary payload, `{"$bytes": "<base64>"}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub Vec<u8>);

impl Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use base64::Engine as _;
        use serde::ser::SerializeMap;
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.0);
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$bytes", &payload)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use base64::Engine as _;
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Tagged {
            #[serde(rename = "$bytes")]
            payload: String,
        }
        let tagged = Tagged::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(tagged.payload)
            .map(Bytes)
            .map_err(serde::de::Error::custom)
    }
}
"#;

const STRUCT_DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";
const ENUM_DERIVES: &str =
    "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]";

/// Generates the Rust source for a whole deployment.
pub fn generate(registry: &SchemaRegistry, functions: &FunctionRegistry) -> String {
    let mut cg = Codegen::new();
    cg.emit_registry(registry);
    for endpoint in functions.list() {
        cg.emit_endpoint(&endpoint);
    }
    cg.into_string()
}

/// Accumulates generated items. Each top-level name is reserved once, so
/// colliding names get a numeric suffix in emission order.
#[derive(Debug, Default)]
pub struct Codegen {
    items: Vec<String>,
    names: BTreeSet<String>,
    uses_id: bool,
    uses_bytes: bool,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    /// One struct per registered collection, `_id` included.
    pub fn emit_registry(&mut self, registry: &SchemaRegistry) {
        for (name, _) in registry.collections() {
            if let Some(TypeNode::Object { fields }) = registry.document_node(name) {
                let doc = format!("Document in collection `{}`", name);
                let type_name = self.reserve(format!("{}Table", type_ident(name)));
                self.emit_struct(type_name, &doc, fields);
            }
        }
    }

    /// Path constant and argument struct for one endpoint.
    pub fn emit_endpoint(&mut self, endpoint: &Endpoint) {
        let path = endpoint.path();
        let constant = self.reserve(const_ident(&endpoint.name));
        self.items.push(format!(
            "/// Path of {} `{}`\npub const {}: &str = {:?};\n",
            endpoint.kind, path, constant, path
        ));

        let doc = format!("Arguments of `{}`", path);
        let type_name = self.reserve(format!("{}Args", type_ident(&endpoint.name)));
        self.emit_struct(type_name, &doc, endpoint.arg_fields());
    }

    pub fn into_string(self) -> String {
        let mut out = String::from(HEADER);
        let support = [(self.uses_id, ID_TYPE), (self.uses_bytes, BYTES_TYPE)];
        for (_, item) in support.iter().filter(|(used, _)| *used) {
            out.push('\n');
            out.push_str(item);
        }
        for item in self.items {
            out.push('\n');
            out.push_str(&item);
        }
        out
    }

    fn reserve(&mut self, base: String) -> String {
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{}{}", base, suffix);
            suffix += 1;
        }
        self.names.insert(name.clone());
        name
    }

    /// Pushes the struct before any nested item its fields create.
    fn emit_struct(&mut self, name: String, doc: &str, fields: &FieldMap) {
        let slot = self.items.len();
        self.items.push(String::new());

        let mut body = String::new();
        let mut used = BTreeSet::new();
        for (field, node) in fields {
            let mut ident = field_ident(field);
            if used.contains(&ident) {
                let base = ident.clone();
                let mut suffix = 2;
                while used.contains(&ident) {
                    ident = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
            }
            used.insert(ident.clone());

            let hint = format!("{}{}", name, type_ident(field));
            let ty = self.rust_type(node, &hint);

            let mut serde_args = Vec::new();
            if needs_rename(&ident, field) {
                serde_args.push(format!("rename = {:?}", field));
            }
            if node.is_optional() {
                serde_args.push("default".to_string());
                serde_args.push("skip_serializing_if = \"Option::is_none\"".to_string());
            }
            if !serde_args.is_empty() {
                let _ = writeln!(body, "    #[serde({})]", serde_args.join(", "));
            }
            let _ = writeln!(body, "    pub {}: {},", ident, ty);
        }

        self.items[slot] = format!(
            "/// {}\n{}\npub struct {} {{\n{}}}\n",
            doc, STRUCT_DERIVES, name, body
        );
    }

    /// Rust type for `node`. `hint` names any item the node needs.
    fn rust_type(&mut self, node: &TypeNode, hint: &str) -> String {
        match node {
            TypeNode::Null => "()".into(),
            TypeNode::Int64 => "i64".into(),
            TypeNode::Float64 => "f64".into(),
            TypeNode::Boolean => "bool".into(),
            TypeNode::String => "String".into(),
            TypeNode::Id { .. } => {
                self.uses_id = true;
                "Id".into()
            }
            TypeNode::Bytes => {
                self.uses_bytes = true;
                "Bytes".into()
            }
            TypeNode::Any => "serde_json::Value".into(),
            TypeNode::Literal { value } => literal_type(value).into(),
            TypeNode::Array { element } => format!("Vec<{}>", self.rust_type(element, hint)),
            TypeNode::Optional { inner } => format!("Option<{}>", self.rust_type(inner, hint)),
            TypeNode::Record { value, .. } => format!(
                "std::collections::BTreeMap<String, {}>",
                self.rust_type(value, &format!("{}Value", hint))
            ),
            TypeNode::Object { fields } => {
                let name = self.reserve(hint.to_string());
                self.emit_struct(name.clone(), "Nested object", fields);
                name
            }
            TypeNode::Union { alternatives } => match string_literals(alternatives) {
                Some(variants) => self.emit_string_enum(hint, &variants),
                None => self.emit_untagged_enum(hint, alternatives),
            },
        }
    }

    fn emit_string_enum(&mut self, hint: &str, variants: &[&str]) -> String {
        let name = self.reserve(hint.to_string());
        let mut body = String::new();
        let mut used = BTreeSet::new();
        for (i, value) in variants.iter().enumerate() {
            let mut variant = type_ident(value);
            if variant == "Field" || used.contains(&variant) {
                variant = format!("Variant{}", i);
            }
            used.insert(variant.clone());
            let _ = writeln!(body, "    #[serde(rename = {:?})]", value);
            let _ = writeln!(body, "    {},", variant);
        }
        self.items.push(format!(
            "{}\npub enum {} {{\n{}}}\n",
            ENUM_DERIVES, name, body
        ));
        name
    }

    fn emit_untagged_enum(&mut self, hint: &str, alternatives: &[TypeNode]) -> String {
        let name = self.reserve(hint.to_string());
        let slot = self.items.len();
        self.items.push(String::new());

        let mut body = String::new();
        for (i, alternative) in alternatives.iter().enumerate() {
            let ty = self.rust_type(alternative, &format!("{}Variant{}", name, i));
            let _ = writeln!(body, "    Variant{}({}),", i, ty);
        }
        self.items[slot] = format!(
            "{}\n#[serde(untagged)]\npub enum {} {{\n{}}}\n",
            STRUCT_DERIVES, name, body
        );
        name
    }
}

fn literal_type(literal: &Literal) -> &'static str {
    match literal {
        Literal::String(_) => "String",
        Literal::Int64(_) => "i64",
        Literal::Float64(_) => "f64",
        Literal::Boolean(_) => "bool",
    }
}

/// The distinct values of a union made only of string literals
fn string_literals(alternatives: &[TypeNode]) -> Option<Vec<&str>> {
    let mut values: Vec<&str> = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        match alternative {
            TypeNode::Literal {
                value: Literal::String(s),
            } => {
                if !values.contains(&s.as_str()) {
                    values.push(s);
                }
            }
            _ => return None,
        }
    }
    Some(values)
}
