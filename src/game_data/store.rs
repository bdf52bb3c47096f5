//! In-memory game-data index across the base game and mods.

use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::{discover_json_files, discover_mod_dirs, LoadError, LoadReport};
use crate::models::CORE_MOD;

use super::inheritance::resolve_copy_from;
use super::object::ResolvedObject;
use super::ObjectResolver;

type Object = Map<String, Value>;

/// Put the base game last in a priority list, adding it when missing.
/// Repeated mods keep their first position.
pub fn mod_priority(active: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut priority: Vec<String> =
        active.iter().filter(|m| m.as_str() != CORE_MOD && seen.insert(m.as_str())).cloned().collect();
    priority.push(CORE_MOD.to_string());
    priority
}

/// Ids an object is registered under: `id` (string or list) or `abstract`.
fn object_ids(object: &Object) -> Vec<String> {
    match object.get("id") {
        Some(Value::String(id)) => vec![id.clone()],
        Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => object.get("abstract").and_then(Value::as_str).map(|id| vec![id.to_string()]).unwrap_or_default(),
    }
}

/// Objects of one JSON file, whether it holds one object or an array.
fn read_objects(path: &Path) -> Result<Vec<Object>, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let value: Value =
        serde_json::from_str(&text).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter_map(|v| v.as_object().cloned()).collect(),
        Value::Object(object) => vec![object],
        _ => Vec::new(),
    })
}

/// Raw game objects keyed by `(mod, id)`.
#[derive(Debug, Default, Clone)]
pub struct GameDataStore {
    objects: HashMap<(String, String), Object>,
    mods: Vec<String>,
}

impl GameDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<game>/data/json` as the base game and every directory under
    /// `<game>/data/mods` as a mod named after the directory.
    ///
    /// Files parse on a pool of `jobs` threads; unreadable files become
    /// warnings.
    pub fn load(game_path: &Path, jobs: usize) -> Result<(Self, LoadReport), LoadError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        let core_dir = game_path.join("data").join("json");
        if core_dir.is_dir() {
            files.extend(discover_json_files(&core_dir)?.into_iter().map(|f| (CORE_MOD.to_string(), f)));
        }
        for mod_dir in discover_mod_dirs(game_path)? {
            let mod_id = mod_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            files.extend(discover_json_files(&mod_dir)?.into_iter().map(|f| (mod_id.clone(), f)));
        }

        let parsed: Vec<_> =
            pool.install(|| files.par_iter().map(|(mod_id, path)| (mod_id, path, read_objects(path))).collect());

        let mut store = Self::new();
        let mut report = LoadReport::default();
        for (mod_id, path, result) in parsed {
            match result {
                Ok(objects) => {
                    for object in objects {
                        store.insert(mod_id, object);
                    }
                }
                Err(e) => report.warn(format!("Skipping game data {}: {}", path.display(), e)),
            }
        }
        tracing::info!("Loaded {} game objects from {} mods", store.len(), store.mods.len());
        Ok((store, report))
    }

    /// Register a raw object under each of its ids. Later inserts for the
    /// same `(mod, id)` replace earlier ones.
    pub fn insert(&mut self, mod_id: &str, mut object: Object) {
        let ids = object_ids(&object);
        if ids.is_empty() {
            return;
        }
        object.insert("_mod_id".to_string(), Value::String(mod_id.to_string()));
        if !self.mods.iter().any(|m| m == mod_id) {
            self.mods.push(mod_id.to_string());
        }
        for id in ids {
            let mut entry = object.clone();
            if entry.get("id").is_some_and(Value::is_array) {
                entry.insert("id".to_string(), Value::String(id.clone()));
            }
            self.objects.insert((mod_id.to_string(), id), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Mods with at least one object, in load order.
    pub fn mods(&self) -> &[String] {
        &self.mods
    }

    pub fn get_from_mod(&self, mod_id: &str, id: &str) -> Option<&Object> {
        self.objects.get(&(mod_id.to_string(), id.to_string()))
    }

    /// The search order for `preferred`: the list itself, or every loaded
    /// mod newest first with the base game last when it is empty.
    fn search_order(&self, preferred: &[String]) -> Vec<String> {
        if preferred.is_empty() {
            let mut all: Vec<String> = self.mods.iter().rev().cloned().collect();
            all.retain(|m| m != CORE_MOD);
            mod_priority(&all)
        } else {
            preferred.to_vec()
        }
    }

    /// Raw definition from the highest-priority mod defining `id`.
    pub fn get_raw(&self, id: &str, preferred: &[String]) -> Option<&Object> {
        self.search_order(preferred).iter().find_map(|m| self.get_from_mod(m, id))
    }

    /// Raw definition after inheritance.
    pub fn resolve_raw(&self, id: &str, preferred: &[String]) -> Option<Object> {
        let order = self.search_order(preferred);
        let object = order.iter().find_map(|m| self.get_from_mod(m, id))?;

        let resolved = resolve_copy_from(object, &|parent_id, child| {
            let child_id = object_ids(child).into_iter().next().unwrap_or_default();
            if parent_id == child_id {
                // Self-named parent: the next definition below the child's mod.
                let child_mod = child.get("_mod_id").and_then(Value::as_str).unwrap_or_default();
                let start = order.iter().position(|m| m == child_mod)? + 1;
                order[start..].iter().find_map(|m| self.get_from_mod(m, parent_id))
            } else {
                order.iter().find_map(|m| self.get_from_mod(m, parent_id))
            }
        });
        Some(resolved)
    }
}

impl ObjectResolver for GameDataStore {
    fn resolve(&self, object_id: &str, preferred_mods: &[String]) -> Option<ResolvedObject> {
        let raw = self.resolve_raw(object_id, preferred_mods)?;
        match ResolvedObject::from_map(&raw) {
            Ok(mut object) => {
                object.id = object_id.to_string();
                Some(object)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed game object '{}': {}", object_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    fn prefs(mods: &[&str]) -> Vec<String> {
        mods.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_mod_priority_moves_core_last() {
        assert_eq!(mod_priority(&prefs(&["dda", "modA"])), prefs(&["modA", "dda"]));
        assert_eq!(mod_priority(&prefs(&["modA"])), prefs(&["modA", "dda"]));
        assert_eq!(mod_priority(&[]), prefs(&["dda"]));
        assert_eq!(mod_priority(&prefs(&["a", "b", "a", "dda", "b"])), prefs(&["a", "b", "dda"]));
    }

    #[test]
    fn test_list_ids_expand() {
        let mut store = GameDataStore::new();
        store.insert("dda", obj(json!({"type": "terrain", "id": ["t_a", "t_b"], "symbol": "."})));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_from_mod("dda", "t_b").unwrap()["id"], "t_b");
    }

    #[test]
    fn test_priority_lookup() {
        let mut store = GameDataStore::new();
        store.insert("dda", obj(json!({"id": "t_floor", "symbol": "."})));
        store.insert("modA", obj(json!({"id": "t_floor", "symbol": "_"})));

        let core_first = store.resolve("t_floor", &prefs(&["dda", "modA"])).unwrap();
        assert_eq!(core_first.symbol_for(crate::models::Season::Spring), ".");
        let mod_first = store.resolve("t_floor", &prefs(&["modA", "dda"])).unwrap();
        assert_eq!(mod_first.symbol_for(crate::models::Season::Spring), "_");
        assert_eq!(mod_first.mod_id, "modA");
        assert!(store.resolve("t_floor", &prefs(&["other"])).is_none());
    }

    #[test]
    fn test_self_named_copy_from_reaches_lower_mod() {
        let mut store = GameDataStore::new();
        store.insert("dda", obj(json!({"id": "t_wall", "symbol": "#", "color": "gray"})));
        store.insert("modA", obj(json!({"id": "t_wall", "copy-from": "t_wall", "color": "red"})));
        let raw = store.resolve_raw("t_wall", &prefs(&["modA", "dda"])).unwrap();
        assert_eq!(raw["symbol"], "#");
        assert_eq!(raw["color"], "red");
        assert_eq!(raw["_mod_id"], "modA");
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let core = temp.path().join("data/json/furniture");
        let mod_dir = temp.path().join("data/mods/extra");
        fs::create_dir_all(&core).unwrap();
        fs::create_dir_all(&mod_dir).unwrap();
        fs::write(core.join("f.json"), r##"[{"type": "furniture", "id": "f_chair", "symbol": "#"}]"##).unwrap();
        fs::write(mod_dir.join("m.json"), r#"{"type": "furniture", "id": "f_sofa", "copy-from": "f_chair"}"#).unwrap();
        fs::write(mod_dir.join("bad.json"), "{").unwrap();

        let (store, report) = GameDataStore::load(temp.path(), 2).unwrap();
        assert_eq!(report.warnings.len(), 1);
        let sofa = store.resolve("f_sofa", &prefs(&["extra", "dda"])).unwrap();
        assert_eq!(sofa.object_type, "furniture");
        assert_eq!(sofa.symbol_for(crate::models::Season::Spring), "#");
    }
}
