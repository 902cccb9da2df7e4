use std::collections::BTreeSet;

use serde_json::{Map, Value, json};

use crate::path::{PathSegment, ROOT_KEY, WILDCARD};

/// A schema node reduced to one renderable shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// The shape of the node.
    pub kind: SchemaKind,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// Schema `title`.
    pub title: Option<String>,
    /// Schema `description`.
    pub description: Option<String>,
    /// Schema `default`.
    pub default: Option<Value>,
}

/// Shapes a normalized node can take.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Object with declared properties in declaration order.
    Object {
        properties: Vec<(String, SchemaNode)>,
        additional: AdditionalProperties,
    },
    /// Homogeneous array; `None` when no usable item schema was declared.
    Array { items: Option<Box<SchemaNode>> },
    String,
    Number,
    Integer,
    Boolean,
    /// Closed set of literal values, `null` excluded.
    Enum { values: Vec<Value> },
    /// A node that could not be reduced, kept verbatim.
    Raw(Value),
}

/// How an object treats keys it does not declare.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// No extra keys (absent or `false`).
    Closed,
    /// `additionalProperties: true`: untyped, arbitrary-shape values.
    Open,
    /// Typed string-keyed map.
    Typed(Box<SchemaNode>),
}

impl SchemaNode {
    pub(crate) fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            title: None,
            description: None,
            default: None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::Object { .. } => "object",
            SchemaKind::Array { .. } => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Enum { .. } => "enum",
            SchemaKind::Raw(_) => "raw",
        }
    }

    /// Declared property by name, for object nodes.
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => {
                properties.iter().find(|(k, _)| k == key).map(|(_, n)| n)
            }
            _ => None,
        }
    }

    /// Render the node back into raw JSON Schema form.
    ///
    /// Feeding the result back through [`super::analyze`] reproduces the
    /// same unsupported-path set.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match &self.kind {
            SchemaKind::Object {
                properties,
                additional,
            } => {
                out.insert("type".into(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(k, n)| (k.clone(), n.to_value()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                match additional {
                    AdditionalProperties::Closed => {}
                    AdditionalProperties::Open => {
                        out.insert("additionalProperties".into(), Value::Bool(true));
                    }
                    AdditionalProperties::Typed(n) => {
                        out.insert("additionalProperties".into(), n.to_value());
                    }
                }
            }
            SchemaKind::Array { items } => {
                out.insert("type".into(), json!("array"));
                if let Some(items) = items {
                    out.insert("items".into(), items.to_value());
                }
            }
            SchemaKind::Enum { values } => {
                out.insert("enum".into(), Value::Array(values.clone()));
            }
            SchemaKind::String | SchemaKind::Number | SchemaKind::Integer | SchemaKind::Boolean => {
                out.insert("type".into(), json!(self.type_name()));
            }
            SchemaKind::Raw(raw) => return raw.clone(),
        }
        if self.nullable {
            out.insert("nullable".into(), Value::Bool(true));
        }
        if let Some(t) = &self.title {
            out.insert("title".into(), json!(t));
        }
        if let Some(d) = &self.description {
            out.insert("description".into(), json!(d));
        }
        if let Some(d) = &self.default {
            out.insert("default".into(), d.clone());
        }
        Value::Object(out)
    }
}

/// Result of analysing a raw schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaAnalysis {
    /// Normalized root, `None` when the raw root was unusable.
    pub root: Option<SchemaNode>,
    /// Dotted paths the renderer must not edit structurally.
    pub unsupported: BTreeSet<String>,
}

impl SchemaAnalysis {
    /// Whether the node at the dotted schema key can be edited as a form.
    pub fn is_supported(&self, key: &str) -> bool {
        self.root.is_some() && !self.unsupported.contains(key)
    }

    /// Whether the whole schema must be edited as raw text.
    pub fn root_unsupported(&self) -> bool {
        self.root.is_none() || self.unsupported.contains(ROOT_KEY)
    }

    /// Schema node governing a value path.
    ///
    /// Array indices step into item schemas; keys not declared by an object
    /// step into its typed map schema.
    pub fn lookup(&self, path: &[PathSegment]) -> Option<&SchemaNode> {
        let mut node = self.root.as_ref()?;
        for seg in path {
            node = match (&node.kind, seg) {
                (SchemaKind::Array { items }, PathSegment::Index(_)) => items.as_deref()?,
                (
                    SchemaKind::Object {
                        properties,
                        additional,
                    },
                    PathSegment::Key(k),
                ) => match properties.iter().find(|(name, _)| name == k) {
                    Some((_, n)) => n,
                    None => match additional {
                        AdditionalProperties::Typed(n) => n.as_ref(),
                        _ => return None,
                    },
                },
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Join a schema path into its dotted key.
pub(crate) fn schema_key(path: &[String]) -> String {
    if path.is_empty() {
        ROOT_KEY.to_string()
    } else {
        path.join(".")
    }
}

pub(crate) fn child_path(path: &[String], seg: &str) -> Vec<String> {
    let mut p = path.to_vec();
    p.push(seg.to_string());
    p
}

pub(crate) fn wildcard_path(path: &[String]) -> Vec<String> {
    child_path(path, WILDCARD)
}
