//! Registry of loaded tileset metadata, in load order.

use std::collections::HashMap;

use crate::models::Tileset;

use super::traits::Registry;

/// Tilesets keyed by folder name. Iteration follows registration order.
#[derive(Debug, Default, Clone)]
pub struct TilesetRegistry {
    tilesets: HashMap<String, Tileset>,
    order: Vec<String>,
}

impl TilesetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tileset, replacing any previous one with the same folder name.
    pub fn register(&mut self, tileset: Tileset) {
        let name = tileset.folder_name.clone();
        if !self.tilesets.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tilesets.insert(name, tileset);
    }

    pub fn get_by_short_name(&self, short_name: &str) -> Option<&Tileset> {
        self.iter().find(|ts| ts.short_name == short_name)
    }

    /// Resolve a name as a folder name first, then as a short name.
    /// Returns the folder name.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some(ts) = self.tilesets.get(name) {
            return Some(&ts.folder_name);
        }
        self.get_by_short_name(name).map(|ts| ts.folder_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tileset> {
        self.order.iter().filter_map(|name| self.tilesets.get(name))
    }
}

impl Registry<Tileset> for TilesetRegistry {
    fn contains(&self, name: &str) -> bool {
        self.tilesets.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&Tileset> {
        self.tilesets.get(name)
    }

    fn len(&self) -> usize {
        self.tilesets.len()
    }

    fn clear(&mut self) {
        self.tilesets.clear();
        self.order.clear();
    }

    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        Box::new(self.order.iter())
    }
}
