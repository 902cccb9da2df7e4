//! Form rendering contract.
//!
//! [`render_form`] maps a normalized schema, the current form value and the UI
//! hints into a tree of [`FormNode`]s, one per editable field. The tree is a
//! description of controls, not widgets: a front end draws it with whatever
//! toolkit it uses and turns user actions into [`PatchIntent`]s through the
//! helpers on [`FormNode`]. Intents go to
//! [`ConfigState::apply_patch`](crate::state::ConfigState::apply_patch); the
//! renderer never computes the next tree itself.

use serde_json::{Map, Value};

use crate::path::PathSegment;

mod edit;
mod render;

pub use edit::default_value;
pub use render::render_form;

/// A requested change: write `value` at `path`, or remove it when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchIntent {
    pub path: Vec<PathSegment>,
    pub value: Option<Value>,
}

/// One rendered field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormNode {
    /// Value path the field edits.
    pub path: Vec<PathSegment>,
    pub label: String,
    pub help: Option<String>,
    pub placeholder: Option<String>,
    pub control: Control,
}

/// The control drawn for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// The schema here cannot be edited as a form; use raw editing.
    Unsupported,
    /// Declared properties, plus an entry list for typed open maps.
    Object {
        fields: Vec<FormNode>,
        map: Option<MapEditor>,
    },
    /// One node per element, with add/remove.
    Array {
        items: Vec<FormNode>,
        item_default: Value,
    },
    /// Closed choice over `options`.
    Enum {
        options: Vec<Value>,
        selected: Option<usize>,
        nullable: bool,
    },
    Toggle {
        checked: bool,
    },
    Number {
        text: String,
        integer: bool,
    },
    Text {
        text: String,
        /// Draw masked, like a password input.
        sensitive: bool,
    },
}

/// Key/value list for keys an object does not declare.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEditor {
    pub entries: Vec<MapEntry>,
    /// The whole object as stored, declared keys included.
    pub(crate) current: Map<String, Value>,
    /// Value given to a newly added entry.
    pub(crate) value_default: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub node: FormNode,
}

impl FormNode {
    /// Child field by key, for object nodes.
    pub fn field(&self, key: &str) -> Option<&FormNode> {
        match &self.control {
            Control::Object { fields, .. } => fields
                .iter()
                .find(|f| f.path.last().and_then(PathSegment::as_key) == Some(key)),
            _ => None,
        }
    }

    /// Walk down a chain of keys.
    pub fn find(&self, keys: &[&str]) -> Option<&FormNode> {
        keys.iter().try_fold(self, |node, k| node.field(k))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.control, Control::Unsupported)
    }
}
