//! Path-addressed access to a configuration tree.
//!
//! A path is a sequence of [`PathSegment`]s: a string segment addresses an
//! object key, an integer segment addresses an array index. Writes create
//! missing containers on demand, choosing the container kind from the
//! *next* segment. An index may address an existing element or append one
//! past the end. Misaddressed writes (an index into an object or beyond the
//! end of an array, a key into an array, anything into a scalar) are ignored.
//!
//! The helpers mutate in place; callers holding shared state clone the tree
//! first (see [`crate::state::ConfigState::update_form_value`]).

use std::fmt;

use serde_json::{Map, Value};

/// Key used when a path addresses the root of the tree.
pub const ROOT_KEY: &str = "<root>";

/// Wildcard segment standing for "any array element / any map entry".
pub const WILDCARD: &str = "*";

/// One step of a configuration path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl PathSegment {
    /// Key text, if this is an object key segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    fn empty_container(&self) -> Value {
        match self {
            PathSegment::Key(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Build a path from a list of literals, e.g. `path!["a", "b", 0]`.
#[macro_export]
macro_rules! path {
    ($($seg:expr),* $(,)?) => {
        vec![$($crate::path::PathSegment::from($seg)),*]
    };
}

/// Parse a dotted path such as `slack.channels.0.name`.
///
/// All-digit segments become indices; empty input yields the empty path.
pub fn parse_path(dotted: &str) -> Vec<PathSegment> {
    if dotted.is_empty() {
        return Vec::new();
    }
    dotted
        .split('.')
        .map(|s| match s.parse::<usize>() {
            Ok(i) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                PathSegment::Index(i)
            }
            _ => PathSegment::Key(s.to_string()),
        })
        .collect()
}

/// Dotted display form of a path, with indices written out.
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return ROOT_KEY.to_string();
    }
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Dotted schema key for a path: indices collapse to [`WILDCARD`].
pub fn path_key(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return ROOT_KEY.to_string();
    }
    path.iter()
        .map(|s| match s {
            PathSegment::Key(k) => k.as_str(),
            PathSegment::Index(_) => WILDCARD,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Read the value at `path`.
pub fn get<'a>(tree: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(tree, |cur, seg| match (seg, cur) {
        (PathSegment::Key(k), Value::Object(map)) => map.get(k),
        (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i),
        _ => None,
    })
}

/// Write `value` at `path`, creating intermediate containers as needed.
pub fn set(tree: &mut Value, path: &[PathSegment], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut cur = tree;
    for (i, seg) in parents.iter().enumerate() {
        let next = &path[i + 1];
        let slot = match (seg, cur) {
            (PathSegment::Key(k), Value::Object(map)) => map.entry(k.clone()).or_insert(Value::Null),
            (PathSegment::Index(idx), Value::Array(arr)) => match element_slot(arr, *idx) {
                Some(slot) => slot,
                None => {
                    trace!("set: index {idx} out of range in {}", display_path(path));
                    return;
                }
            },
            _ => {
                trace!("set: misaddressed segment {seg} in {}", display_path(path));
                return;
            }
        };
        if slot.is_null() {
            *slot = next.empty_container();
        }
        cur = slot;
    }

    match (last, cur) {
        (PathSegment::Key(k), Value::Object(map)) => {
            map.insert(k.clone(), value);
        }
        (PathSegment::Index(idx), Value::Array(arr)) => match element_slot(arr, *idx) {
            Some(slot) => *slot = value,
            None => trace!("set: index {idx} out of range in {}", display_path(path)),
        },
        _ => trace!("set: misaddressed final segment in {}", display_path(path)),
    }
}

/// Element at `idx`, pushing a null when `idx` is one past the end.
fn element_slot(arr: &mut Vec<Value>, idx: usize) -> Option<&mut Value> {
    if idx == arr.len() {
        arr.push(Value::Null);
    }
    arr.get_mut(idx)
}

/// Remove the value at `path`.
///
/// Array elements are spliced out so later elements shift down; object keys
/// are removed keeping the order of the remaining keys.
pub fn remove(tree: &mut Value, path: &[PathSegment]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut cur = tree;
    for seg in parents {
        let next = match (seg, cur) {
            (PathSegment::Key(k), Value::Object(map)) => map.get_mut(k),
            (PathSegment::Index(i), Value::Array(arr)) => arr.get_mut(*i),
            _ => None,
        };
        match next {
            Some(v) => cur = v,
            None => return,
        }
    }

    match (last, cur) {
        (PathSegment::Key(k), Value::Object(map)) => {
            map.shift_remove(k);
        }
        (PathSegment::Index(i), Value::Array(arr)) if *i < arr.len() => {
            arr.remove(*i);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_set_creates_containers_from_next_segment() {
        let mut tree = json!({});
        set(&mut tree, &path!["a", "b", 0usize], json!("x"));
        assert_eq!(tree, json!({"a": {"b": ["x"]}}));

        remove(&mut tree, &path!["a", "b", 0usize]);
        assert_eq!(tree, json!({"a": {"b": []}}));
    }

    #[test]
    fn test_set_nested_array_of_objects() {
        let mut tree = json!({});
        set(&mut tree, &path!["list", 0usize, "name"], json!("n"));
        set(&mut tree, &path!["list", 1usize, "name"], json!("m"));
        assert_eq!(tree, json!({"list": [{"name": "n"}, {"name": "m"}]}));
    }

    #[test]
    fn test_set_overwrites_existing_leaf() {
        let mut tree = json!({"slack": {"enabled": true, "botToken": "a"}});
        set(&mut tree, &path!["slack", "botToken"], json!("b"));
        assert_eq!(tree, json!({"slack": {"enabled": true, "botToken": "b"}}));
    }

    #[test]
    fn test_misaddressed_writes_are_ignored() {
        let mut tree = json!({"arr": [1, 2], "obj": {"k": 1}, "s": "text"});
        let before = tree.clone();

        set(&mut tree, &path!["arr", "key"], json!(1));
        set(&mut tree, &path!["obj", 0usize], json!(1));
        set(&mut tree, &path!["s", "inner", "deep"], json!(1));
        set(&mut tree, &[], json!(1));

        assert_eq!(tree, before);
    }

    #[test]
    fn test_index_past_end_is_ignored() {
        let mut tree = json!({"arr": [1, 2]});
        let before = tree.clone();

        set(&mut tree, &parse_path("arr.18446744073709551615"), json!(1));
        set(&mut tree, &path!["arr", 3usize], json!(1));
        set(&mut tree, &path!["arr", 4000000000usize, "x"], json!(1));
        assert_eq!(tree, before);

        let mut tree = json!({});
        set(&mut tree, &parse_path("a.18446744073709551615"), json!(1));
        assert_eq!(tree, json!({"a": []}));

        set(&mut tree, &path!["a", 0usize], json!(1));
        set(&mut tree, &path!["a", 1usize], json!(2));
        assert_eq!(tree, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_remove_missing_intermediate_is_noop() {
        let mut tree = json!({"a": {"b": 1}});
        let before = tree.clone();
        remove(&mut tree, &path!["x", "y"]);
        remove(&mut tree, &path!["a", "b", "c"]);
        remove(&mut tree, &path!["a", 3usize]);
        remove(&mut tree, &[]);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_remove_shifts_array_and_keeps_key_order() {
        let mut tree = json!({"z": 1, "a": [1, 2, 3], "m": 2});
        remove(&mut tree, &path!["a", 0usize]);
        remove(&mut tree, &path!["z"]);
        assert_eq!(tree, json!({"a": [2, 3], "m": 2}));
        let keys: Vec<_> = tree.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "m"]);
    }

    #[test]
    fn test_get_and_parse() {
        let tree = json!({"slack": {"channels": [{"name": "general"}]}});
        let p = parse_path("slack.channels.0.name");
        assert_eq!(p, path!["slack", "channels", 0usize, "name"]);
        assert_eq!(get(&tree, &p), Some(&json!("general")));
        assert_eq!(get(&tree, &parse_path("slack.missing")), None);
        assert_eq!(get(&tree, &[]), Some(&tree));
    }

    #[test]
    fn test_path_keys() {
        let p = path!["discord", "guilds", 2usize, "id"];
        assert_eq!(path_key(&p), "discord.guilds.*.id");
        assert_eq!(display_path(&p), "discord.guilds.2.id");
        assert_eq!(path_key(&[]), ROOT_KEY);
    }
}
