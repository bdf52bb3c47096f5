//! Common trait for registries that store named items.

/// Common trait for registries that map names to values.
///
/// # Example
///
/// ```
/// use tilesrc::models::Tileset;
/// use tilesrc::registry::{Registry, TilesetRegistry};
///
/// let mut registry = TilesetRegistry::new();
/// registry.register(Tileset::new("ChibiUltica"));
///
/// assert!(registry.contains("ChibiUltica"));
/// assert_eq!(registry.len(), 1);
/// ```
pub trait Registry<V> {
    /// Check if an item with the given name exists in the registry.
    fn contains(&self, name: &str) -> bool;

    /// Get an item by name.
    fn get(&self, name: &str) -> Option<&V>;

    /// Get the number of items in the registry.
    fn len(&self) -> usize;

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all items from the registry.
    fn clear(&mut self);

    /// Get an iterator over all names in the registry.
    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_>;
}
