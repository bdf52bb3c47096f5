//! Game-data objects as seen by the renderer.
//!
//! The renderer only needs a handful of fields from each object:
//! connectivity groups, flags, the ASCII symbol and color, `looks_like`.
//! [`ObjectResolver`] is the seam it reads them through; [`GameDataStore`]
//! is the in-memory implementation backed by the game's JSON files.

mod inheritance;
mod object;
mod store;

use std::collections::HashMap;

pub use inheritance::resolve_copy_from;
pub use object::{ObjectError, ResolvedObject, Seasonal};
pub use store::{mod_priority, GameDataStore};

/// Source of inheritance-resolved game objects.
///
/// Implementations must be deterministic: the same id and mod priority
/// always produce the same object.
pub trait ObjectResolver {
    fn resolve(&self, object_id: &str, preferred_mods: &[String]) -> Option<ResolvedObject>;
}

/// A fixed set of already-resolved objects, ignoring mod priority.
impl ObjectResolver for HashMap<String, ResolvedObject> {
    fn resolve(&self, object_id: &str, _preferred_mods: &[String]) -> Option<ResolvedObject> {
        self.get(object_id).cloned()
    }
}
