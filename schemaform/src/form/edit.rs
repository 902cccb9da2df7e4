use serde_json::{Map, Number, Value};

use super::{Control, FormNode, PatchIntent};
use crate::{
    path::PathSegment,
    schema::{SchemaKind, SchemaNode},
};

/// Prefix of keys generated for new map entries.
pub const NEW_ENTRY_PREFIX: &str = "custom-";

/// Value a newly added array element or map entry starts with.
pub fn default_value(schema: &SchemaNode) -> Value {
    match schema.kind {
        SchemaKind::Object { .. } => Value::Object(Map::new()),
        SchemaKind::Array { .. } => Value::Array(Vec::new()),
        SchemaKind::Boolean => Value::Bool(false),
        SchemaKind::Number | SchemaKind::Integer => Value::from(0),
        SchemaKind::String | SchemaKind::Enum { .. } | SchemaKind::Raw(_) => {
            Value::String(String::new())
        }
    }
}

impl FormNode {
    fn intent(&self, value: Option<Value>) -> PatchIntent {
        PatchIntent {
            path: self.path.clone(),
            value,
        }
    }

    fn child_intent(&self, seg: PathSegment, value: Option<Value>) -> PatchIntent {
        let mut path = self.path.clone();
        path.push(seg);
        PatchIntent { path, value }
    }

    /// Flip a toggle.
    pub fn set_checked(&self, checked: bool) -> Option<PatchIntent> {
        match self.control {
            Control::Toggle { .. } => Some(self.intent(Some(Value::Bool(checked)))),
            _ => None,
        }
    }

    /// Text typed into a text or numeric input.
    ///
    /// Blank numeric input removes the value. Text that does not parse as a
    /// number is kept verbatim so validation reports it.
    pub fn input(&self, text: &str) -> Option<PatchIntent> {
        match &self.control {
            Control::Text { .. } => Some(self.intent(Some(Value::String(text.to_string())))),
            Control::Number { integer, .. } => {
                let t = text.trim();
                if t.is_empty() {
                    return Some(self.intent(None));
                }
                let value = match (*integer, t.parse::<i64>(), t.parse::<f64>()) {
                    (true, Ok(i), _) => Value::from(i),
                    (_, _, Ok(f)) => Number::from_f64(f)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(text.to_string())),
                    _ => Value::String(text.to_string()),
                };
                Some(self.intent(Some(value)))
            }
            _ => None,
        }
    }

    /// Pick an enum option, or clear a nullable enum with `None`.
    pub fn select(&self, index: Option<usize>) -> Option<PatchIntent> {
        let Control::Enum {
            options, nullable, ..
        } = &self.control
        else {
            return None;
        };
        match index {
            Some(i) => options.get(i).map(|v| self.intent(Some(v.clone()))),
            None if *nullable => Some(self.intent(None)),
            None => None,
        }
    }

    /// Append a default element to an array.
    pub fn add_item(&self) -> Option<PatchIntent> {
        match &self.control {
            Control::Array {
                items,
                item_default,
            } => Some(self.child_intent(
                PathSegment::Index(items.len()),
                Some(item_default.clone()),
            )),
            _ => None,
        }
    }

    /// Remove an array element; later elements shift down.
    pub fn remove_item(&self, index: usize) -> Option<PatchIntent> {
        match &self.control {
            Control::Array { items, .. } if index < items.len() => {
                Some(self.child_intent(PathSegment::Index(index), None))
            }
            _ => None,
        }
    }

    /// Add a map entry under the first free `custom-N` key.
    pub fn add_entry(&self) -> Option<PatchIntent> {
        let Control::Object { map: Some(map), .. } = &self.control else {
            return None;
        };
        let key = (1..)
            .map(|i| format!("{NEW_ENTRY_PREFIX}{i}"))
            .find(|k| !map.current.contains_key(k))?;
        Some(self.child_intent(PathSegment::Key(key), Some(map.value_default.clone())))
    }

    /// Rename a map entry in place.
    ///
    /// Rejected when `to` is empty, already present, or `from` is not a map
    /// entry. The whole object is written back so key order is kept.
    pub fn rename_entry(&self, from: &str, to: &str) -> Option<PatchIntent> {
        let Control::Object { map: Some(map), .. } = &self.control else {
            return None;
        };
        let to = to.trim();
        if to.is_empty() || map.current.contains_key(to) {
            return None;
        }
        if !map.entries.iter().any(|e| e.key == from) {
            return None;
        }
        let renamed: Map<String, Value> = map
            .current
            .iter()
            .map(|(k, v)| {
                let k = if k == from { to.to_string() } else { k.clone() };
                (k, v.clone())
            })
            .collect();
        Some(self.intent(Some(Value::Object(renamed))))
    }

    /// Remove a map entry.
    pub fn remove_entry(&self, key: &str) -> Option<PatchIntent> {
        let Control::Object { map: Some(map), .. } = &self.control else {
            return None;
        };
        map.entries
            .iter()
            .any(|e| e.key == key)
            .then(|| self.child_intent(PathSegment::Key(key.to_string()), None))
    }
}
