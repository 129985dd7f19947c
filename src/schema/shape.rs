//! Document shapes
//!
//! A shape is the ordered field set of one collection plus its index
//! declarations. The system field `_id` is implicit: every stored document
//! carries `_id: Id(<collection>)` whether or not the shape declares it.

use serde::Serialize;

use crate::types::{field_map, FieldMap, TypeError, TypeNode};

/// System field holding the document identifier
pub const ID_FIELD: &str = "_id";

/// Named index over one or more field paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDef {
    /// Index name, unique per collection
    pub name: String,
    /// Dotted field paths, in index order
    pub fields: Vec<String>,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Field set of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentShape {
    fields: FieldMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDef>,
}

impl DocumentShape {
    /// Builds a shape from `(name, node)` pairs, rejecting duplicate names.
    pub fn new<K, I>(fields: I) -> Result<Self, TypeError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeNode)>,
    {
        Ok(Self::from_fields(field_map(fields)?))
    }

    pub fn from_fields(fields: FieldMap) -> Self {
        Self {
            fields,
            indexes: Vec::new(),
        }
    }

    /// Adds an index declaration. Rules are checked at registration.
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&TypeNode> {
        self.fields.get(name)
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// Declared fields other than `_id`
    pub fn user_fields(&self) -> impl Iterator<Item = (&String, &TypeNode)> {
        self.fields.iter().filter(|(name, _)| name.as_str() != ID_FIELD)
    }

    /// Object node for a stored document: `_id` first, then the user fields.
    pub fn document_node(&self, collection: &str) -> TypeNode {
        let mut fields = FieldMap::with_capacity(self.fields.len() + 1);
        fields.insert(ID_FIELD.to_string(), TypeNode::id(collection));
        for (name, node) in self.user_fields() {
            fields.insert(name.clone(), node.clone());
        }
        TypeNode::Object { fields }
    }

    /// Object node for a document that has not been assigned an `_id` yet.
    pub fn insert_node(&self) -> TypeNode {
        TypeNode::Object {
            fields: self
                .user_fields()
                .map(|(name, node)| (name.clone(), node.clone()))
                .collect(),
        }
    }

    /// Checks the registry rules for this shape. Returns the reason on failure.
    pub(crate) fn check(&self, collection: &str) -> Result<(), String> {
        if let Some(id) = self.fields.get(ID_FIELD) {
            if *id != TypeNode::id(collection) {
                return Err(format!(
                    "'{}' may only be declared as Id({})",
                    ID_FIELD, collection
                ));
            }
        }

        for (name, node) in &self.fields {
            check_field_name(name)?;
            check_nested_names(node)?;
        }

        for (i, index) in self.indexes.iter().enumerate() {
            if self.indexes[..i].iter().any(|other| other.name == index.name) {
                return Err(format!("duplicate index '{}'", index.name));
            }
            if index.fields.is_empty() {
                return Err(format!("index '{}' has no fields", index.name));
            }
            for path in &index.fields {
                let head = path.split('.').next().unwrap_or_default();
                if head != ID_FIELD && !self.fields.contains_key(head) {
                    return Err(format!(
                        "index '{}' refers to undeclared field '{}'",
                        index.name, path
                    ));
                }
            }
        }

        Ok(())
    }
}

// `$`-prefixed keys are reserved for tagged values on the wire.
fn check_field_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty field name".into());
    }
    if name.starts_with('$') {
        return Err(format!("field name '{}' must not start with '$'", name));
    }
    Ok(())
}

fn check_nested_names(node: &TypeNode) -> Result<(), String> {
    match node {
        TypeNode::Object { fields } => {
            for (name, field) in fields {
                check_field_name(name)?;
                check_nested_names(field)?;
            }
            Ok(())
        }
        TypeNode::Array { element } => check_nested_names(element),
        TypeNode::Optional { inner } => check_nested_names(inner),
        TypeNode::Record { value, .. } => check_nested_names(value),
        TypeNode::Union { alternatives } => alternatives.iter().try_for_each(check_nested_names),
        _ => Ok(()),
    }
}
