//! Device state snapshots and the nine per-source event streams.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::events::{KeyboardEvent, MouseButton, PointerEvent, TouchPoint, Vector2, WheelEvent};
use super::observable::Observable;

/// Live device state owned by one input source.
///
/// Buttons absent from `buttons` were never pressed and read as released.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    pub pointer_position: Vector2,
    pub buttons: HashMap<MouseButton, bool>,
    /// Active touch set keyed by touch id; ordered so queries are deterministic.
    pub touches: BTreeMap<i32, TouchPoint>,
    pub keys: HashSet<String>,
}

impl DeviceState {
    pub fn is_pointer_down(&self, button: Option<MouseButton>) -> bool {
        match button {
            Some(button) => self.buttons.get(&button).copied().unwrap_or(false),
            None => self.buttons.values().any(|pressed| *pressed),
        }
    }

    pub fn active_touches(&self) -> Vec<TouchPoint> {
        self.touches.values().copied().collect()
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        self.buttons.insert(button, pressed);
    }

    pub fn upsert_touches(&mut self, touches: &[TouchPoint]) {
        for touch in touches {
            self.touches.insert(touch.id, *touch);
        }
    }

    pub fn remove_touches(&mut self, touches: &[TouchPoint]) {
        for touch in touches {
            self.touches.remove(&touch.id);
        }
    }

    /// Back to origin with nothing pressed or touching.
    pub fn clear(&mut self) {
        self.pointer_position = Vector2::ZERO;
        self.buttons.clear();
        self.touches.clear();
        self.keys.clear();
    }
}

/// The nine event streams every input source exposes.
#[derive(Debug, Default)]
pub struct DeviceStreams {
    pub pointer_move: Observable<PointerEvent>,
    pub pointer_down: Observable<PointerEvent>,
    pub pointer_up: Observable<PointerEvent>,
    pub wheel: Observable<WheelEvent>,
    pub touch_start: Observable<Vec<TouchPoint>>,
    pub touch_move: Observable<Vec<TouchPoint>>,
    pub touch_end: Observable<Vec<TouchPoint>>,
    pub key_down: Observable<KeyboardEvent>,
    pub key_up: Observable<KeyboardEvent>,
}

impl DeviceStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every subscriber on every stream.
    pub fn clear_all(&self) {
        self.pointer_move.clear();
        self.pointer_down.clear();
        self.pointer_up.clear();
        self.wheel.clear();
        self.touch_start.clear();
        self.touch_move.clear();
        self.touch_end.clear();
        self.key_down.clear();
        self.key_up.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.pointer_move.len()
            + self.pointer_down.len()
            + self.pointer_up.len()
            + self.wheel.len()
            + self.touch_start.len()
            + self.touch_move.len()
            + self.touch_end.len()
            + self.key_down.len()
            + self.key_up.len()
    }
}
