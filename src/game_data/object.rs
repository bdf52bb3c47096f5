//! Typed view over a resolved game-data object.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::Season;

/// Malformed field in a game-data object.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ObjectError {
    #[error("Game object is not a JSON object")]
    NotAnObject,
    #[error("Game object has no id")]
    MissingId,
    #[error("Field '{field}' of '{id}' should be {expected}")]
    WrongType { id: String, field: &'static str, expected: &'static str },
}

/// A display attribute that is either fixed or given per season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seasonal {
    Fixed(String),
    /// Spring, summer, autumn, winter. Shorter lists repeat their last entry.
    BySeason(Vec<String>),
}

impl Seasonal {
    pub fn for_season(&self, season: Season) -> Option<&str> {
        match self {
            Seasonal::Fixed(value) => Some(value),
            Seasonal::BySeason(values) => values.get(season.index()).or_else(|| values.last()).map(String::as_str),
        }
    }
}

/// A game object after inheritance, with the fields rendering depends on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedObject {
    pub id: String,
    pub object_type: String,
    pub mod_id: String,
    pub flags: BTreeSet<String>,
    pub connects_to: BTreeSet<String>,
    pub rotates_to: BTreeSet<String>,
    pub connect_groups: BTreeSet<String>,
    pub symbol: Option<Seasonal>,
    pub color: Option<Seasonal>,
    pub looks_like: Option<String>,
    pub workbench: bool,
}

impl ResolvedObject {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self { id: id.into(), object_type: object_type.into(), ..Default::default() }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Fallback glyph for a season; `?` when undeclared.
    pub fn symbol_for(&self, season: Season) -> &str {
        self.symbol.as_ref().and_then(|s| s.for_season(season)).unwrap_or("?")
    }

    /// Fallback color for a season; `white` when undeclared.
    pub fn color_for(&self, season: Season) -> &str {
        self.color.as_ref().and_then(|c| c.for_season(season)).unwrap_or("white")
    }

    /// Build the typed view from raw JSON.
    pub fn from_value(value: &Value) -> Result<Self, ObjectError> {
        let map = value.as_object().ok_or(ObjectError::NotAnObject)?;
        Self::from_map(map)
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ObjectError> {
        let id = match map.get("id").or_else(|| map.get("abstract")) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Array(ids)) => ids.iter().find_map(Value::as_str).ok_or(ObjectError::MissingId)?.to_string(),
            _ => return Err(ObjectError::MissingId),
        };

        let object_type = optional_string(map, &id, "type")?.unwrap_or_default();
        let mod_id = optional_string(map, &id, "_mod_id")?.unwrap_or_default();
        let looks_like = optional_string(map, &id, "looks_like")?;
        let color = match map.get("color") {
            Some(_) => seasonal(map, &id, "color")?,
            None => seasonal(map, &id, "bgcolor")?,
        };

        Ok(Self {
            flags: string_set(map, &id, "flags")?,
            connects_to: string_set(map, &id, "connects_to")?,
            rotates_to: string_set(map, &id, "rotates_to")?,
            connect_groups: string_set(map, &id, "connect_groups")?,
            symbol: seasonal(map, &id, "symbol")?,
            color,
            looks_like,
            workbench: map.get("workbench").is_some_and(|w| !matches!(w, Value::Null | Value::Bool(false))),
            object_type,
            mod_id,
            id,
        })
    }
}

fn wrong(id: &str, field: &'static str, expected: &'static str) -> ObjectError {
    ObjectError::WrongType { id: id.to_string(), field, expected }
}

fn optional_string(map: &Map<String, Value>, id: &str, field: &'static str) -> Result<Option<String>, ObjectError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong(id, field, "a string")),
    }
}

/// A string or list of strings, normalized to a set.
fn string_set(map: &Map<String, Value>, id: &str, field: &'static str) -> Result<BTreeSet<String>, ObjectError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::String(s)) => Ok(BTreeSet::from([s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| wrong(id, field, "a list of strings")))
            .collect(),
        Some(_) => Err(wrong(id, field, "a string or list of strings")),
    }
}

fn seasonal(map: &Map<String, Value>, id: &str, field: &'static str) -> Result<Option<Seasonal>, ObjectError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(Seasonal::Fixed(s.clone()))),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| wrong(id, field, "a list of strings")))
            .collect::<Result<Vec<_>, _>>()
            .map(|values| Some(Seasonal::BySeason(values))),
        Some(_) => Err(wrong(id, field, "a string or seasonal list")),
    }
}
