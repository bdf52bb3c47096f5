//! Brightness and transparency of z-levels drawn around the current one.
//!
//! Levels above and below the current level are dimmed (or lit) and faded
//! by a per-level step, applied either linearly (`add`) or geometrically
//! (`magnify`). The current level is always drawn unmodified.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound for `levels_above` and `levels_below`.
pub const MAX_LEVELS: u32 = 10;

/// How the per-level step accumulates with distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepMethod {
    /// `step * |offset|`
    #[default]
    Add,
    /// `1 - (1 - step)^|offset|`
    Magnify,
    None,
}

/// Direction of the brightness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessOperation {
    #[default]
    Darken,
    Lighten,
    None,
}

/// Multi-z-level rendering settings, the `[zlevel]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZLevelSettings {
    pub enabled: bool,
    pub levels_above: u32,
    pub levels_below: u32,
    pub brightness_method: StepMethod,
    /// Percent per level, 0..=100.
    pub brightness_step: f32,
    pub brightness_above: BrightnessOperation,
    pub brightness_below: BrightnessOperation,
    pub transparency_method: StepMethod,
    /// Percent per level, 0..=100.
    pub transparency_step: f32,
}

impl Default for ZLevelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            levels_above: 1,
            levels_below: 1,
            brightness_method: StepMethod::Add,
            brightness_step: 20.0,
            brightness_above: BrightnessOperation::Darken,
            brightness_below: BrightnessOperation::Darken,
            transparency_method: StepMethod::Add,
            transparency_step: 20.0,
        }
    }
}

fn step_fraction(percent: f32) -> f32 {
    percent.clamp(0.0, 100.0) / 100.0
}

impl ZLevelSettings {
    /// Offsets relative to the current level, lowest first. Only the
    /// current level when disabled.
    pub fn level_range(&self) -> std::ops::RangeInclusive<i32> {
        if !self.enabled {
            return 0..=0;
        }
        let below = self.levels_below.min(MAX_LEVELS) as i32;
        let above = self.levels_above.min(MAX_LEVELS) as i32;
        -below..=above
    }

    /// Brightness operation configured for a level offset.
    pub fn operation_for(&self, z_offset: i32) -> BrightnessOperation {
        match z_offset.signum() {
            1 => self.brightness_above,
            -1 => self.brightness_below,
            _ => BrightnessOperation::None,
        }
    }

    /// Brightness multiplier: 0 is black, 1 unchanged, above 1 brighter.
    pub fn brightness_factor(&self, z_offset: i32, operation: BrightnessOperation) -> f32 {
        if z_offset == 0 || operation == BrightnessOperation::None {
            return 1.0;
        }
        let distance = z_offset.unsigned_abs() as i32;
        let step = step_fraction(self.brightness_step);
        let adjustment = match self.brightness_method {
            StepMethod::Add => step * distance as f32,
            StepMethod::Magnify => 1.0 - (1.0 - step).powi(distance),
            StepMethod::None => return 1.0,
        };
        match operation {
            BrightnessOperation::Darken => (1.0 - adjustment).max(0.0),
            BrightnessOperation::Lighten => 1.0 + adjustment,
            BrightnessOperation::None => 1.0,
        }
    }

    /// Opacity multiplier: 0 invisible, 1 opaque.
    pub fn transparency_factor(&self, z_offset: i32) -> f32 {
        if z_offset == 0 {
            return 1.0;
        }
        let distance = z_offset.unsigned_abs() as i32;
        let step = step_fraction(self.transparency_step);
        match self.transparency_method {
            StepMethod::Add => (1.0 - step * distance as f32).max(0.0),
            StepMethod::Magnify => (1.0 - step).powi(distance),
            StepMethod::None => 1.0,
        }
    }

    /// `(brightness, transparency)` for a level offset, using the operation
    /// configured for its side.
    pub fn factors(&self, z_offset: i32) -> (f32, f32) {
        (self.brightness_factor(z_offset, self.operation_for(z_offset)), self.transparency_factor(z_offset))
    }

    /// Factors for every offset in `-max_levels..=max_levels`.
    pub fn preview_values(&self, max_levels: u32) -> BTreeMap<i32, (f32, f32)> {
        let max = max_levels as i32;
        (-max..=max).map(|offset| (offset, self.factors(offset))).collect()
    }

    /// Human-readable validation problems.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.levels_above > MAX_LEVELS {
            errors.push(format!("zlevel.levels_above must be at most {MAX_LEVELS}"));
        }
        if self.levels_below > MAX_LEVELS {
            errors.push(format!("zlevel.levels_below must be at most {MAX_LEVELS}"));
        }
        if !(0.0..=100.0).contains(&self.brightness_step) {
            errors.push("zlevel.brightness_step must be between 0 and 100".to_string());
        }
        if !(0.0..=100.0).contains(&self.transparency_step) {
            errors.push("zlevel.transparency_step must be between 0 and 100".to_string());
        }
        errors
    }
}
