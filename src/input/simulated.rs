//! Input source driven entirely by synthetic events.
//!
//! Used for tests, automation, and replay. It exposes the same streams and
//! queries as the live source, so downstream bridging cannot tell them apart.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;

use super::error::InputError;
use super::events::{
    DeviceType, KeyboardEvent, MouseButton, PointerEvent, TouchPoint, Vector2, WheelEvent,
};
use super::modifiers::KeyModifiers;
use super::source::{InputSource, SourceKind};
use super::state::{DeviceState, DeviceStreams};
use crate::surface::Surface;

/// Pointer id reported for every synthetic mouse sample.
pub const SIMULATED_POINTER_ID: i32 = 1;

/// Touch ids used by [`SimulatedInputSource::simulate_pinch`].
pub const PINCH_TOUCH_IDS: [i32; 2] = [0, 1];

const PRESSED_PRESSURE: f64 = 0.5;

/// Synthetic input backend.
#[derive(Default)]
pub struct SimulatedInputSource {
    state: RefCell<DeviceState>,
    streams: DeviceStreams,
    surface: RefCell<Option<Rc<dyn Surface>>>,
    disposed: Cell<bool>,
}

impl SimulatedInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_attached(&self) -> Result<(), InputError> {
        if self.surface.borrow().is_none() {
            return Err(InputError::NotAttached);
        }
        Ok(())
    }

    fn pointer_event(&self, button: MouseButton, pressure: f64) -> PointerEvent {
        let position = self.state.borrow().pointer_position;
        PointerEvent {
            x: position.x,
            y: position.y,
            button,
            device_type: DeviceType::Mouse,
            pointer_id: SIMULATED_POINTER_ID,
            is_primary: true,
            pressure,
        }
    }

    pub fn simulate_mouse_move(&self, x: f64, y: f64) -> Result<(), InputError> {
        self.ensure_attached()?;
        let pressure = {
            let mut state = self.state.borrow_mut();
            state.pointer_position = Vector2::new(x, y);
            if state.is_pointer_down(None) {
                PRESSED_PRESSURE
            } else {
                0.0
            }
        };
        let event = self.pointer_event(MouseButton::Left, pressure);
        self.streams.pointer_move.notify(&event);
        Ok(())
    }

    /// Presses `button` at the current position. No-op if it is already held.
    pub fn simulate_mouse_down(&self, button: MouseButton) -> Result<(), InputError> {
        self.ensure_attached()?;
        {
            let mut state = self.state.borrow_mut();
            if state.is_pointer_down(Some(button)) {
                return Ok(());
            }
            state.set_button(button, true);
        }
        let event = self.pointer_event(button, PRESSED_PRESSURE);
        self.streams.pointer_down.notify(&event);
        Ok(())
    }

    /// Releases `button`. No-op if it is not held.
    pub fn simulate_mouse_up(&self, button: MouseButton) -> Result<(), InputError> {
        self.ensure_attached()?;
        {
            let mut state = self.state.borrow_mut();
            if !state.is_pointer_down(Some(button)) {
                return Ok(());
            }
            state.set_button(button, false);
        }
        let event = self.pointer_event(button, 0.0);
        self.streams.pointer_up.notify(&event);
        Ok(())
    }

    pub fn simulate_wheel(&self, delta_y: f64, delta_x: f64) -> Result<(), InputError> {
        self.ensure_attached()?;
        self.streams.wheel.notify(&WheelEvent {
            delta_x,
            delta_y,
            delta_z: 0.0,
            delta_mode: 0,
        });
        Ok(())
    }

    /// Starts (or overwrites) the given touches.
    pub fn simulate_touch_start(&self, touches: &[TouchPoint]) -> Result<(), InputError> {
        self.ensure_attached()?;
        self.state.borrow_mut().upsert_touches(touches);
        self.streams.touch_start.notify(&touches.to_vec());
        Ok(())
    }

    /// Moves active touches. Fails without side effects if any id is not active.
    pub fn simulate_touch_move(&self, touches: &[TouchPoint]) -> Result<(), InputError> {
        self.ensure_attached()?;
        {
            let mut state = self.state.borrow_mut();
            if let Some(unknown) = touches.iter().find(|t| !state.touches.contains_key(&t.id)) {
                return Err(InputError::UnknownTouch(unknown.id));
            }
            state.upsert_touches(touches);
        }
        self.streams.touch_move.notify(&touches.to_vec());
        Ok(())
    }

    /// Ends active touches by id, reporting their last known points.
    pub fn simulate_touch_end(&self, ids: &[i32]) -> Result<(), InputError> {
        self.ensure_attached()?;
        let ended: Vec<TouchPoint> = {
            let mut state = self.state.borrow_mut();
            if let Some(unknown) = ids.iter().find(|id| !state.touches.contains_key(*id)) {
                return Err(InputError::UnknownTouch(*unknown));
            }
            ids.iter()
                .filter_map(|id| state.touches.remove(id))
                .collect()
        };
        self.streams.touch_end.notify(&ended);
        Ok(())
    }

    /// Presses `key`. No-op if it is already held.
    pub fn simulate_key_down(&self, key: &str, modifiers: KeyModifiers) -> Result<(), InputError> {
        self.ensure_attached()?;
        if !self.state.borrow_mut().keys.insert(key.to_string()) {
            return Ok(());
        }
        self.streams
            .key_down
            .notify(&keyboard_event(key, modifiers));
        Ok(())
    }

    /// Releases `key`. No-op if it is not held.
    pub fn simulate_key_up(&self, key: &str) -> Result<(), InputError> {
        self.ensure_attached()?;
        if !self.state.borrow_mut().keys.remove(key) {
            return Ok(());
        }
        self.streams
            .key_up
            .notify(&keyboard_event(key, KeyModifiers::new()));
        Ok(())
    }

    /// Move to the start, press left, walk `steps` interpolated moves to the end, release.
    pub fn simulate_drag(
        &self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        steps: u32,
    ) -> Result<(), InputError> {
        let start = Vector2::new(x0, y0);
        let end = Vector2::new(x1, y1);

        self.simulate_mouse_move(x0, y0)?;
        self.simulate_mouse_down(MouseButton::Left)?;
        for step in 1..=steps {
            let point = start.lerp(end, f64::from(step) / f64::from(steps));
            self.simulate_mouse_move(point.x, point.y)?;
        }
        self.simulate_mouse_up(MouseButton::Left)
    }

    /// Two touches symmetric about the center on the x axis, spread from `d0` to `d1` apart.
    pub fn simulate_pinch(
        &self,
        cx: f64,
        cy: f64,
        d0: f64,
        d1: f64,
        steps: u32,
    ) -> Result<(), InputError> {
        let pair = |distance: f64| {
            let half = distance / 2.0;
            [
                TouchPoint::new(PINCH_TOUCH_IDS[0], cx - half, cy),
                TouchPoint::new(PINCH_TOUCH_IDS[1], cx + half, cy),
            ]
        };

        self.simulate_touch_start(&pair(d0))?;
        for step in 1..=steps {
            let distance = d0 + (d1 - d0) * f64::from(step) / f64::from(steps);
            self.simulate_touch_move(&pair(distance))?;
        }
        self.simulate_touch_end(&PINCH_TOUCH_IDS)
    }

    /// Clears device state; subscriptions stay in place.
    pub fn reset(&self) {
        self.state.borrow_mut().clear();
    }

    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.borrow().keys.iter().cloned().collect();
        keys.sort();
        keys
    }
}

fn keyboard_event(key: &str, modifiers: KeyModifiers) -> KeyboardEvent {
    KeyboardEvent {
        key: key.to_string(),
        code: code_for_key(key),
        ctrl_key: modifiers.ctrl,
        shift_key: modifiers.shift,
        alt_key: modifiers.alt,
        meta_key: modifiers.meta,
    }
}

/// Physical key code for a key value (`"z"` → `"KeyZ"`, `"1"` → `"Digit1"`).
fn code_for_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        (Some(c), None) if c.is_ascii_digit() => format!("Digit{c}"),
        (Some(' '), None) => "Space".to_string(),
        _ => key.to_string(),
    }
}

impl InputSource for SimulatedInputSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    fn streams(&self) -> &DeviceStreams {
        &self.streams
    }

    fn pointer_position(&self) -> Vector2 {
        self.state.borrow().pointer_position
    }

    fn is_pointer_down(&self, button: Option<MouseButton>) -> bool {
        self.state.borrow().is_pointer_down(button)
    }

    fn active_touches(&self) -> Vec<TouchPoint> {
        self.state.borrow().active_touches()
    }

    fn is_attached(&self) -> bool {
        self.surface.borrow().is_some()
    }

    fn attach(&self, surface: Rc<dyn Surface>) -> Result<(), InputError> {
        if self.disposed.get() {
            return Err(InputError::Disposed);
        }
        *self.surface.borrow_mut() = Some(surface);
        debug!("Simulated input source attached");
        Ok(())
    }

    fn detach(&self) {
        if self.surface.borrow_mut().take().is_some() {
            debug!("Simulated input source detached");
        }
    }

    fn dispose(&self) {
        self.detach();
        self.streams.clear_all();
        self.state.borrow_mut().clear();
        self.disposed.set(true);
    }

    fn as_simulated(&self) -> Option<&SimulatedInputSource> {
        Some(self)
    }
}

#[cfg(test)]
mod tests;
