use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::{Control, FormNode, MapEditor, MapEntry, default_value};
use crate::{
    hints::UiHints,
    path::{PathSegment, WILDCARD},
    schema::{AdditionalProperties, SchemaAnalysis, SchemaKind, SchemaNode, schema_key},
};

/// Render the whole form for `value`.
///
/// Without a usable schema root the result is a single unsupported node,
/// i.e. the whole config is edited as raw text.
pub fn render_form(analysis: &SchemaAnalysis, value: &Value, hints: &UiHints) -> FormNode {
    let Some(root) = &analysis.root else {
        return FormNode {
            path: Vec::new(),
            label: String::new(),
            help: None,
            placeholder: None,
            control: Control::Unsupported,
        };
    };
    let r = Renderer {
        unsupported: &analysis.unsupported,
        hints,
    };
    r.node(root, Some(value), Vec::new(), Vec::new())
}

struct Renderer<'a> {
    unsupported: &'a BTreeSet<String>,
    hints: &'a UiHints,
}

impl Renderer<'_> {
    fn node(
        &self,
        schema: &SchemaNode,
        value: Option<&Value>,
        path: Vec<PathSegment>,
        schema_path: Vec<String>,
    ) -> FormNode {
        let control = if self.unsupported.contains(&schema_key(&schema_path)) {
            Control::Unsupported
        } else {
            self.control(schema, value, &path, &schema_path)
        };
        FormNode {
            label: self.hints.label(&path, Some(schema)),
            help: self.hints.help(&path, Some(schema)),
            placeholder: self.hints.placeholder(&path),
            control,
            path,
        }
    }

    fn control(
        &self,
        schema: &SchemaNode,
        value: Option<&Value>,
        path: &[PathSegment],
        schema_path: &[String],
    ) -> Control {
        match &schema.kind {
            SchemaKind::Object {
                properties,
                additional,
            } => self.object(properties, additional, value, path, schema_path),
            SchemaKind::Array { items: Some(item) } => {
                let items = value
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .enumerate()
                            .map(|(i, v)| {
                                self.node(
                                    item,
                                    Some(v),
                                    extend(path, PathSegment::Index(i)),
                                    extend(schema_path, WILDCARD.to_string()),
                                )
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Control::Array {
                    items,
                    item_default: default_value(item),
                }
            }
            SchemaKind::Enum { values } => Control::Enum {
                selected: value.and_then(|v| values.iter().position(|o| o == v)),
                options: values.clone(),
                nullable: schema.nullable,
            },
            SchemaKind::Boolean => Control::Toggle {
                checked: value
                    .or(schema.default.as_ref())
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            SchemaKind::Number | SchemaKind::Integer => Control::Number {
                text: match value {
                    Some(Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                },
                integer: schema.kind == SchemaKind::Integer,
            },
            SchemaKind::String => Control::Text {
                text: value.and_then(Value::as_str).unwrap_or_default().to_string(),
                sensitive: self.hints.is_sensitive(path),
            },
            SchemaKind::Array { items: None } | SchemaKind::Raw(_) => Control::Unsupported,
        }
    }

    fn object(
        &self,
        properties: &[(String, SchemaNode)],
        additional: &AdditionalProperties,
        value: Option<&Value>,
        path: &[PathSegment],
        schema_path: &[String],
    ) -> Control {
        let obj = value.and_then(Value::as_object);

        let mut ordered: Vec<&(String, SchemaNode)> = properties.iter().collect();
        let order_of = |key: &str| {
            self.hints
                .order(&extend(path, PathSegment::Key(key.to_string())))
        };
        if ordered.iter().any(|(k, _)| order_of(k).is_some()) {
            ordered.sort_by(|(a, _), (b, _)| {
                (order_of(a).unwrap_or(0), a).cmp(&(order_of(b).unwrap_or(0), b))
            });
        }

        let fields = ordered
            .into_iter()
            .map(|(key, child)| {
                self.node(
                    child,
                    obj.and_then(|o| o.get(key)),
                    extend(path, PathSegment::Key(key.clone())),
                    extend(schema_path, key.clone()),
                )
            })
            .collect();

        let map = match additional {
            AdditionalProperties::Typed(value_schema) => {
                let current = obj.cloned().unwrap_or_else(Map::new);
                let entries = current
                    .iter()
                    .filter(|(k, _)| !properties.iter().any(|(name, _)| name == *k))
                    .map(|(k, v)| MapEntry {
                        key: k.clone(),
                        node: self.node(
                            value_schema,
                            Some(v),
                            extend(path, PathSegment::Key(k.clone())),
                            extend(schema_path, WILDCARD.to_string()),
                        ),
                    })
                    .collect();
                Some(MapEditor {
                    entries,
                    value_default: default_value(value_schema),
                    current,
                })
            }
            _ => None,
        };

        Control::Object { fields, map }
    }
}

fn extend<T: Clone>(base: &[T], seg: T) -> Vec<T> {
    let mut v = base.to_vec();
    v.push(seg);
    v
}
