//! Tile animation: per-tile-type frame state and the shared clock.
//!
//! Every animated tile id has one [`AnimationState`]; all on-screen copies
//! of that tile read it and offset the frame by a hash of their position.
//!
//! [`AnimationClock`] is an explicitly owned scheduler. Views register a
//! controller with their requested interval; the clock ticks at the
//! shortest active interval. Ticking never renders. It marks controllers
//! whose redraw should run on the next loop iteration, and a controller
//! whose previous redraw is still pending or in flight skips the tick.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::WeightedSprite;
use crate::selector::position_hash;

/// Consecutive skipped ticks before an overload warning.
const OVERLOAD_WARN_AT: u32 = 10;
/// Skipped ticks after which recovery is logged.
const RECOVERY_LOG_ABOVE: u32 = 5;
/// Smoothing factor for the frame delta average.
const FRAME_DELTA_ALPHA: f64 = 0.2;
/// Frame deltas below this are treated as coalesced ticks.
const MIN_FRAME_DELTA_MS: f64 = 2.0;

/// Frame state shared by every instance of one animated tile id.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub tile_id: String,
    pub frames: Vec<WeightedSprite>,
    pub current_frame: usize,
    pub ticks_remaining: i64,
}

impl AnimationState {
    pub fn new(tile_id: impl Into<String>, frames: Vec<WeightedSprite>) -> Self {
        let ticks_remaining = frames.first().map_or(0, |f| i64::from(f.weight));
        Self { tile_id: tile_id.into(), frames, current_frame: 0, ticks_remaining }
    }

    /// Count down one tick; on reaching zero move to the next frame and
    /// reload the counter from its weight.
    pub fn tick(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.ticks_remaining -= 1;
        if self.ticks_remaining <= 0 {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
            self.ticks_remaining = i64::from(self.frames[self.current_frame].weight);
        }
    }

    /// Current frame as seen from grid position `(x, y)`.
    pub fn frame_at(&self, x: i32, y: i32) -> Option<&WeightedSprite> {
        let n = self.frames.len();
        if n == 0 {
            return None;
        }
        let offset = (position_hash(x, y) % n as u64) as usize;
        self.frames.get((self.current_frame + offset) % n)
    }
}

/// Animation states keyed by tile id.
#[derive(Debug, Default, Clone)]
pub struct AnimationStates {
    states: HashMap<String, AnimationState>,
}

impl AnimationStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a tile id. Repeat registrations keep the first frames.
    pub fn register(&mut self, tile_id: &str, frames: &[WeightedSprite]) {
        if !self.states.contains_key(tile_id) {
            tracing::debug!("Registered animated tile '{}' with {} frames", tile_id, frames.len());
            self.states.insert(tile_id.to_string(), AnimationState::new(tile_id, frames.to_vec()));
        }
    }

    pub fn get(&self, tile_id: &str) -> Option<&AnimationState> {
        self.states.get(tile_id)
    }

    pub fn frame_for_position(&self, tile_id: &str, x: i32, y: i32) -> Option<&WeightedSprite> {
        self.states.get(tile_id)?.frame_at(x, y)
    }

    pub fn tick(&mut self) {
        for state in self.states.values_mut() {
            state.tick();
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
        tracing::debug!("Cleared animation states");
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Handle to a controller registered with an [`AnimationClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(usize);

/// One animation consumer, typically a map view.
#[derive(Debug, Clone)]
pub struct AnimationController {
    interval: Duration,
    active: bool,
    states: AnimationStates,
    render_pending: bool,
    rendering: bool,
    skipped_ticks: u32,
    last_frame_at: Option<Instant>,
    frame_delta_ms: f64,
}

impl AnimationController {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
            states: AnimationStates::new(),
            render_pending: false,
            rendering: false,
            skipped_ticks: 0,
            last_frame_at: None,
            frame_delta_ms: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn states(&self) -> &AnimationStates {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut AnimationStates {
        &mut self.states
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_pending
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Consecutive ticks dropped since the last accepted one.
    pub fn skipped_ticks(&self) -> u32 {
        self.skipped_ticks
    }

    /// Smoothed time between completed redraws, in milliseconds.
    pub fn frame_delta_ms(&self) -> u64 {
        self.frame_delta_ms as u64
    }

    /// Returns true when the tick was accepted and a redraw is now pending.
    fn handle_tick(&mut self) -> bool {
        if self.rendering || self.render_pending {
            self.skipped_ticks += 1;
            if self.skipped_ticks == OVERLOAD_WARN_AT {
                tracing::warn!("Animation overload: {} consecutive ticks skipped", self.skipped_ticks);
            } else if self.skipped_ticks > OVERLOAD_WARN_AT && self.skipped_ticks % 100 == 0 {
                tracing::warn!("Animation still overloaded: {} skips", self.skipped_ticks);
            }
            return false;
        }

        if self.skipped_ticks > RECOVERY_LOG_ABOVE {
            tracing::info!("Animation recovered after {} skipped ticks", self.skipped_ticks);
        }
        self.skipped_ticks = 0;
        self.states.tick();
        self.render_pending = true;
        true
    }

    fn begin_redraw(&mut self) -> bool {
        if self.rendering {
            self.render_pending = false;
            return false;
        }
        self.rendering = true;
        true
    }

    fn finish_redraw(&mut self, now: Instant) {
        if let Some(last) = self.last_frame_at {
            let delta = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
            let min_delta = MIN_FRAME_DELTA_MS.max(self.interval.as_secs_f64() * 1000.0 / 2.0);
            if delta >= min_delta {
                self.frame_delta_ms = if self.frame_delta_ms > 0.0 {
                    (FRAME_DELTA_ALPHA * delta + (1.0 - FRAME_DELTA_ALPHA) * self.frame_delta_ms).trunc()
                } else {
                    delta.trunc()
                };
            }
        }
        self.last_frame_at = Some(now);
        self.rendering = false;
        self.render_pending = false;
    }
}

/// Shared animation timer for any number of controllers.
#[derive(Debug, Default)]
pub struct AnimationClock {
    controllers: Vec<Option<AnimationController>>,
    next_tick: Option<Instant>,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inactive controller requesting `interval` between ticks.
    pub fn register(&mut self, interval: Duration) -> ControllerId {
        let controller = AnimationController::new(interval);
        let id = match self.controllers.iter().position(Option::is_none) {
            Some(slot) => {
                self.controllers[slot] = Some(controller);
                slot
            }
            None => {
                self.controllers.push(Some(controller));
                self.controllers.len() - 1
            }
        };
        tracing::debug!("Animation controller registered, total: {}", self.controller_count());
        ControllerId(id)
    }

    pub fn unregister(&mut self, id: ControllerId) {
        if let Some(slot) = self.controllers.get_mut(id.0) {
            *slot = None;
        }
        tracing::debug!("Animation controller unregistered, total: {}", self.controller_count());
        self.stop_if_idle();
    }

    pub fn controller(&self, id: ControllerId) -> Option<&AnimationController> {
        self.controllers.get(id.0)?.as_ref()
    }

    pub fn controller_mut(&mut self, id: ControllerId) -> Option<&mut AnimationController> {
        self.controllers.get_mut(id.0)?.as_mut()
    }

    pub fn states_mut(&mut self, id: ControllerId) -> Option<&mut AnimationStates> {
        self.controller_mut(id).map(AnimationController::states_mut)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.iter().flatten().count()
    }

    /// Activate a controller and start the timer if it is not running.
    pub fn start(&mut self, id: ControllerId, now: Instant) {
        if let Some(controller) = self.controller_mut(id) {
            controller.active = true;
        }
        if self.next_tick.is_none() {
            self.next_tick = self.interval().map(|i| now + i);
            tracing::debug!("Animation timer started, interval {:?}", self.interval());
        }
    }

    pub fn stop(&mut self, id: ControllerId) {
        if let Some(controller) = self.controller_mut(id) {
            controller.active = false;
        }
        self.stop_if_idle();
    }

    /// Change a controller's requested interval.
    pub fn set_interval(&mut self, id: ControllerId, interval: Duration) {
        if let Some(controller) = self.controller_mut(id) {
            controller.interval = interval;
        }
    }

    fn stop_if_idle(&mut self) {
        if self.next_tick.is_some() && !self.controllers.iter().flatten().any(|c| c.active) {
            self.next_tick = None;
            tracing::debug!("No active animation controllers, timer stopped");
        }
    }

    /// Shortest interval among active controllers.
    pub fn interval(&self) -> Option<Duration> {
        self.controllers.iter().flatten().filter(|c| c.active).map(|c| c.interval).min()
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// When the next tick is due, if the timer runs.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Fire a tick if one is due at `now`. Returns the controllers whose
    /// redraw should run on the next loop iteration.
    pub fn poll(&mut self, now: Instant) -> Vec<ControllerId> {
        match self.next_tick {
            Some(due) if now >= due => self.tick(now),
            _ => Vec::new(),
        }
    }

    /// Tick every active controller now and schedule the following tick.
    pub fn tick(&mut self, now: Instant) -> Vec<ControllerId> {
        let mut ready = Vec::new();
        for (i, slot) in self.controllers.iter_mut().enumerate() {
            if let Some(controller) = slot.as_mut().filter(|c| c.active) {
                if controller.handle_tick() {
                    ready.push(ControllerId(i));
                }
            }
        }
        self.next_tick = self.interval().map(|i| now + i);
        ready
    }

    /// Mark a pending redraw as started. False when one is already running.
    pub fn begin_redraw(&mut self, id: ControllerId) -> bool {
        self.controller_mut(id).is_some_and(AnimationController::begin_redraw)
    }

    /// Mark a redraw as finished at `now`, updating frame timing.
    pub fn finish_redraw(&mut self, id: ControllerId, now: Instant) {
        if let Some(controller) = self.controller_mut(id) {
            controller.finish_redraw(now);
        }
    }
}
