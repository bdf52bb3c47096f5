//! `copy-from` inheritance for raw game-data objects.
//!
//! A child names its parent with `copy-from`. The parent is resolved first,
//! then the child's `delete` and `extend` blocks are applied to it, then the
//! child's own keys overwrite. Cycles stop the chain with a warning.

use serde_json::{Map, Value};
use std::collections::HashSet;

type Object = Map<String, Value>;

/// Keys that steer inheritance and never copy into the result.
const CONTROL_KEYS: [&str; 3] = ["copy-from", "extend", "delete"];

/// Identity of a raw object for cycle detection: `(mod, id)`.
fn identity(object: &Object) -> (String, String) {
    let mod_id = object.get("_mod_id").and_then(Value::as_str).unwrap_or_default();
    let id = object
        .get("id")
        .and_then(|v| v.as_str().or_else(|| v.as_array().and_then(|a| a.first()).and_then(Value::as_str)))
        .or_else(|| object.get("abstract").and_then(Value::as_str))
        .unwrap_or_default();
    (mod_id.to_string(), id.to_string())
}

/// Resolve the full `copy-from` chain of `object`.
///
/// `lookup(parent_id, child)` returns the raw parent definition; the child
/// is passed so a self-named `copy-from` can reach a lower-priority mod.
pub fn resolve_copy_from<'a, F>(object: &'a Object, lookup: &F) -> Object
where
    F: Fn(&str, &'a Object) -> Option<&'a Object>,
{
    let mut visited = HashSet::new();
    resolve_inner(object, lookup, &mut visited)
}

fn resolve_inner<'a, F>(object: &'a Object, lookup: &F, visited: &mut HashSet<(String, String)>) -> Object
where
    F: Fn(&str, &'a Object) -> Option<&'a Object>,
{
    visited.insert(identity(object));

    let Some(parent_id) = object.get("copy-from").and_then(Value::as_str) else {
        return strip_control(object);
    };
    let Some(parent) = lookup(parent_id, object) else {
        tracing::warn!("copy-from target '{}' of '{}' not found", parent_id, identity(object).1);
        return strip_control(object);
    };
    if visited.contains(&identity(parent)) {
        tracing::warn!("copy-from cycle at '{}'", parent_id);
        return strip_control(object);
    }

    let mut result = resolve_inner(parent, lookup, visited);
    result.remove("abstract");

    if let Some(Value::Object(delete)) = object.get("delete") {
        apply_delete(&mut result, delete);
    }
    if let Some(Value::Object(extend)) = object.get("extend") {
        apply_extend(&mut result, extend);
    }
    for (key, value) in object {
        if !CONTROL_KEYS.contains(&key.as_str()) {
            result.insert(key.clone(), value.clone());
        }
    }
    result
}

fn strip_control(object: &Object) -> Object {
    object.iter().filter(|(k, _)| !CONTROL_KEYS.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// True when every field of `pattern` is present and equal in `item`.
fn matches_pattern(item: &Value, pattern: &Value) -> bool {
    match (item, pattern) {
        (Value::Object(item), Value::Object(pattern)) => {
            pattern.iter().all(|(k, v)| item.get(k).is_some_and(|iv| matches_pattern(iv, v)))
        }
        _ => item == pattern,
    }
}

fn apply_delete(target: &mut Object, delete: &Object) {
    for (key, removal) in delete {
        let Some(existing) = target.get_mut(key) else {
            continue;
        };
        match (existing, removal) {
            (Value::Array(items), Value::Array(patterns)) => {
                items.retain(|item| !patterns.iter().any(|p| matches_pattern(item, p)));
            }
            (Value::Array(items), pattern) => items.retain(|item| !matches_pattern(item, pattern)),
            (Value::Object(fields), Value::Array(keys)) => {
                for k in keys.iter().filter_map(Value::as_str) {
                    fields.remove(k);
                }
            }
            (Value::Object(fields), Value::Object(nested)) => apply_delete(fields, nested),
            (Value::Object(fields), Value::String(k)) => {
                fields.remove(k);
            }
            _ => {}
        }
    }
}

fn apply_extend(target: &mut Object, extend: &Object) {
    for (key, addition) in extend {
        match (target.get_mut(key), addition) {
            (Some(Value::Array(items)), Value::Array(more)) => items.extend(more.iter().cloned()),
            (Some(Value::Array(items)), single) => items.push(single.clone()),
            (Some(Value::Object(fields)), Value::Object(more)) => {
                for (k, v) in more {
                    fields.insert(k.clone(), v.clone());
                }
            }
            (Some(_), _) => {}
            (None, value) => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    fn resolve(objects: &HashMap<&str, Object>, id: &str) -> Object {
        let lookup = |parent: &str, _: &Object| objects.get(parent);
        resolve_copy_from(&objects[id], &lookup)
    }

    #[test]
    fn test_child_overwrites_parent() {
        let mut objects = HashMap::new();
        objects.insert("base", obj(json!({"abstract": "base", "symbol": "#", "color": "red", "_mod_id": "dda"})));
        objects.insert(
            "t_child",
            obj(json!({"id": "t_child", "copy-from": "base", "color": "blue", "_mod_id": "modA"})),
        );
        let result = resolve(&objects, "t_child");
        assert_eq!(result["symbol"], "#");
        assert_eq!(result["color"], "blue");
        assert_eq!(result["_mod_id"], "modA");
        assert!(!result.contains_key("copy-from"));
        assert!(!result.contains_key("abstract"));
    }

    #[test]
    fn test_extend_and_delete() {
        let mut objects = HashMap::new();
        objects.insert(
            "parent",
            obj(json!({"id": "parent", "flags": ["A", "B"], "pairs": [{"k": 1, "v": 2}, {"k": 3}], "map": {"x": 1, "y": 2}})),
        );
        objects.insert(
            "child",
            obj(json!({
                "id": "child",
                "copy-from": "parent",
                "delete": {"flags": ["A"], "pairs": [{"k": 1}], "map": ["x"]},
                "extend": {"flags": ["C"], "map": {"z": 3}, "connects_to": "WALL"}
            })),
        );
        let result = resolve(&objects, "child");
        assert_eq!(result["flags"], json!(["B", "C"]));
        assert_eq!(result["pairs"], json!([{"k": 3}]));
        assert_eq!(result["map"], json!({"y": 2, "z": 3}));
        assert_eq!(result["connects_to"], "WALL");
        assert!(!result.contains_key("delete"));
    }

    #[test]
    fn test_multi_level_chain() {
        let mut objects = HashMap::new();
        objects.insert("a", obj(json!({"id": "a", "symbol": "a", "color": "red"})));
        objects.insert("b", obj(json!({"id": "b", "copy-from": "a", "symbol": "b"})));
        objects.insert("c", obj(json!({"id": "c", "copy-from": "b"})));
        let result = resolve(&objects, "c");
        assert_eq!(result["symbol"], "b");
        assert_eq!(result["color"], "red");
        assert_eq!(result["id"], "c");
    }

    #[test]
    fn test_cycle_terminates() {
        let mut objects = HashMap::new();
        objects.insert("a", obj(json!({"id": "a", "copy-from": "b", "symbol": "a"})));
        objects.insert("b", obj(json!({"id": "b", "copy-from": "a", "color": "red"})));
        let result = resolve(&objects, "a");
        assert_eq!(result["symbol"], "a");
        assert_eq!(result["color"], "red");
    }

    #[test]
    fn test_missing_parent_keeps_child() {
        let mut objects = HashMap::new();
        objects.insert("a", obj(json!({"id": "a", "copy-from": "ghost", "symbol": "a"})));
        let result = resolve(&objects, "a");
        assert_eq!(result["symbol"], "a");
        assert!(!result.contains_key("copy-from"));
    }
}
