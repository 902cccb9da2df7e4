use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::node::{
    AdditionalProperties, SchemaAnalysis, SchemaKind, SchemaNode, child_path, schema_key,
    wildcard_path,
};
use crate::path::ROOT_KEY;

const UNION_KEYWORDS: [&str; 3] = ["anyOf", "oneOf", "allOf"];

/// Analyse a raw schema root.
///
/// An absent or non-object root yields no schema and marks the root
/// unsupported, meaning the whole config must be edited as raw text.
pub fn analyze(raw: Option<&Value>) -> SchemaAnalysis {
    match raw {
        Some(root @ Value::Object(_)) => {
            let (node, unsupported) = normalize(root, &[]);
            SchemaAnalysis {
                root: Some(node),
                unsupported,
            }
        }
        _ => SchemaAnalysis {
            root: None,
            unsupported: BTreeSet::from([ROOT_KEY.to_string()]),
        },
    }
}

/// Normalize one raw node found at `path` (object-key segments, `*` for
/// array items and map values).
pub fn normalize(raw: &Value, path: &[String]) -> (SchemaNode, BTreeSet<String>) {
    let mut n = Normalizer::default();
    let node = n.node(raw, path);
    (node, n.unsupported)
}

#[derive(Default)]
struct Normalizer {
    unsupported: BTreeSet<String>,
}

impl Normalizer {
    fn mark(&mut self, path: &[String]) {
        let key = schema_key(path);
        debug!("unsupported schema node at {key}");
        self.unsupported.insert(key);
    }

    fn is_marked(&self, path: &[String]) -> bool {
        self.unsupported.contains(&schema_key(path))
    }

    fn raw(&mut self, raw: &Value, path: &[String]) -> SchemaNode {
        self.mark(path);
        let node = SchemaNode::new(SchemaKind::Raw(raw.clone()));
        match raw {
            Value::Object(obj) => with_meta(node, obj),
            _ => node,
        }
    }

    fn node(&mut self, raw: &Value, path: &[String]) -> SchemaNode {
        let Value::Object(obj) = raw else {
            return self.raw(raw, path);
        };

        if let Some(variants) = UNION_KEYWORDS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
        {
            return self.union(raw, obj, variants, path);
        }

        if let Some(Value::Array(values)) = obj.get("enum") {
            return self.enumeration(values, obj, path);
        }
        if let Some(c) = obj.get("const") {
            return self.enumeration(std::slice::from_ref(c), obj, path);
        }

        let Some((ty, type_nullable)) = declared_type(obj) else {
            return self.raw(raw, path);
        };

        let kind = match ty {
            Some("object") => self.object(obj, path),
            Some("array") => self.array(obj, path),
            Some("string") => SchemaKind::String,
            Some("number") => SchemaKind::Number,
            Some("integer") => SchemaKind::Integer,
            Some("boolean") => SchemaKind::Boolean,
            None if obj.contains_key("properties") || obj.contains_key("additionalProperties") => {
                self.object(obj, path)
            }
            None if obj.contains_key("items") => self.array(obj, path),
            _ => return self.raw(raw, path),
        };

        let mut node = with_meta(SchemaNode::new(kind), obj);
        node.nullable |= type_nullable;
        node
    }

    fn object(&mut self, obj: &Map<String, Value>, path: &[String]) -> SchemaKind {
        let properties = match obj.get("properties") {
            Some(Value::Object(props)) => props
                .iter()
                .map(|(k, v)| (k.clone(), self.node(v, &child_path(path, k))))
                .collect(),
            _ => Vec::new(),
        };

        let additional = match obj.get("additionalProperties") {
            Some(Value::Bool(true)) => {
                self.mark(path);
                AdditionalProperties::Open
            }
            Some(schema @ Value::Object(_)) => {
                let value_path = wildcard_path(path);
                let value = self.node(schema, &value_path);
                if self.is_marked(&value_path) {
                    self.mark(path);
                }
                AdditionalProperties::Typed(Box::new(value))
            }
            _ => AdditionalProperties::Closed,
        };

        SchemaKind::Object {
            properties,
            additional,
        }
    }

    fn array(&mut self, obj: &Map<String, Value>, path: &[String]) -> SchemaKind {
        let item = match obj.get("items") {
            Some(Value::Array(list)) => list.first(),
            Some(schema @ Value::Object(_)) => Some(schema),
            _ => None,
        };
        let Some(item) = item else {
            self.mark(path);
            return SchemaKind::Array { items: None };
        };

        let item_path = wildcard_path(path);
        let items = self.node(item, &item_path);
        if self.is_marked(&item_path) {
            self.mark(path);
        }
        SchemaKind::Array {
            items: Some(Box::new(items)),
        }
    }

    fn enumeration(
        &mut self,
        values: &[Value],
        obj: &Map<String, Value>,
        path: &[String],
    ) -> SchemaNode {
        let mut literals = Literals::default();
        literals.extend(values);
        if literals.values.is_empty() {
            self.mark(path);
        }
        let mut node = with_meta(
            SchemaNode::new(SchemaKind::Enum {
                values: literals.values,
            }),
            obj,
        );
        node.nullable |= literals.nullable;
        node
    }

    fn union(
        &mut self,
        raw: &Value,
        obj: &Map<String, Value>,
        variants: &[Value],
        path: &[String],
    ) -> SchemaNode {
        let mut literals = Literals::default();
        let mut others = Vec::new();

        for variant in variants {
            let Value::Object(v) = variant else {
                others.push(variant);
                continue;
            };
            if let Some(Value::Array(values)) = v.get("enum") {
                literals.extend(values);
            } else if let Some(c) = v.get("const") {
                literals.extend(std::slice::from_ref(c));
            } else if v.get("type").and_then(Value::as_str) == Some("null") {
                literals.nullable = true;
            } else {
                others.push(variant);
            }
        }

        let outer_nullable = obj.get("nullable") == Some(&Value::Bool(true));

        if !literals.values.is_empty() && others.is_empty() {
            let mut node = with_meta(
                SchemaNode::new(SchemaKind::Enum {
                    values: literals.values,
                }),
                obj,
            );
            node.nullable = literals.nullable || outer_nullable;
            return node;
        }

        if literals.values.is_empty() && others.len() == 1 {
            let mut node = self.node(others[0], path);
            node.nullable = true;
            node.title = node.title.or_else(|| str_field(obj, "title"));
            node.description = node.description.or_else(|| str_field(obj, "description"));
            node.default = node.default.or_else(|| obj.get("default").cloned());
            return node;
        }

        self.raw(raw, path)
    }
}

/// Literal values collected from `enum`/`const`, deduplicated, `null` split out.
#[derive(Default)]
struct Literals {
    values: Vec<Value>,
    nullable: bool,
}

impl Literals {
    fn extend(&mut self, values: &[Value]) {
        for v in values {
            if v.is_null() {
                self.nullable = true;
            } else if !self.values.contains(v) {
                self.values.push(v.clone());
            }
        }
    }
}

/// Declared `type`, with `["t", "null"]` collapsed to `t` + nullable.
///
/// Returns `None` when the declaration cannot be reduced to one type.
fn declared_type(obj: &Map<String, Value>) -> Option<(Option<&str>, bool)> {
    match obj.get("type") {
        None => Some((None, false)),
        Some(Value::String(t)) if t == "null" => None,
        Some(Value::String(t)) => Some((Some(t.as_str()), false)),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t.as_str() == Some("null"));
            let mut rest = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null");
            match (rest.next(), rest.next()) {
                (Some(t), None) => Some((Some(t), nullable)),
                _ => None,
            }
        }
        Some(_) => None,
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn with_meta(mut node: SchemaNode, obj: &Map<String, Value>) -> SchemaNode {
    node.title = str_field(obj, "title");
    node.description = str_field(obj, "description");
    node.default = obj.get("default").cloned();
    node.nullable |= obj.get("nullable") == Some(&Value::Bool(true));
    node
}
