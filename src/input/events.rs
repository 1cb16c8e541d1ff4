//! Generic input event types shared by every input source.

use serde::{Deserialize, Serialize};

/// 2-D position in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `t` of 0.0 yields `self`, 1.0 yields `other`.
    pub fn lerp(self, other: Vector2, t: f64) -> Vector2 {
        Vector2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (primary button)
    #[default]
    Left,
    /// Middle mouse button (wheel click)
    Middle,
    /// Right mouse button (context button)
    Right,
}

impl MouseButton {
    /// Maps a native button code (`0`, `1`, `2`) to a button, defaulting to `Left`.
    pub fn from_native(code: i32) -> Self {
        match code {
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }

    pub fn all() -> [MouseButton; 3] {
        [MouseButton::Left, MouseButton::Middle, MouseButton::Right]
    }
}

/// Device class that produced a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Mouse,
    Touch,
    Keyboard,
}

/// A single pointer sample, produced per move/down/up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: MouseButton,
    pub device_type: DeviceType,
    pub pointer_id: i32,
    pub is_primary: bool,
    /// Normalized pressure in `[0, 1]`.
    pub pressure: f64,
}

impl PointerEvent {
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// One contact point of a touch interaction. Identity is `id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    pub id: i32,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f64>,
}

impl TouchPoint {
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            radius_x: None,
            radius_y: None,
            force: None,
        }
    }
}

/// One wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: i32,
}

/// A key transition together with the modifier state at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEvent {
    pub key: String,
    pub code: String,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

// ============================================================================
// Native payloads delivered by the hosting render engine and surface
// ============================================================================

/// Subtype tag of the engine's pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativePointerKind {
    Move,
    Down,
    Up,
    Wheel,
}

/// Raw pointer (or wheel) payload as surfaced by the render engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NativePointerEvent {
    pub kind: NativePointerKind,
    pub x: f64,
    pub y: f64,
    /// Native button code: 0 left, 1 middle, 2 right.
    pub button: i32,
    /// `"mouse"`, `"touch"`, `"pen"`...
    pub pointer_type: String,
    pub pointer_id: i32,
    pub is_primary: bool,
    pub pressure: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: i32,
}

impl NativePointerEvent {
    /// Mouse sample with neutral wheel fields; handy for hosts and tests.
    pub fn mouse(kind: NativePointerKind, x: f64, y: f64, button: i32) -> Self {
        Self {
            kind,
            x,
            y,
            button,
            pointer_type: "mouse".to_string(),
            pointer_id: 1,
            is_primary: true,
            pressure: 0.0,
            delta_x: 0.0,
            delta_y: 0.0,
            delta_mode: 0,
        }
    }

    pub fn wheel(delta_x: f64, delta_y: f64, delta_mode: i32) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_mode,
            ..Self::mouse(NativePointerKind::Wheel, 0.0, 0.0, 0)
        }
    }
}

/// Subtype tag of the engine's keyboard stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKeyKind {
    Down,
    Up,
}

/// Raw keyboard payload as surfaced by the render engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeKeyboardEvent {
    pub kind: NativeKeyKind,
    pub key: String,
    pub code: String,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Native touch listener categories registered on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    pub fn all() -> [TouchPhase; 4] {
        [
            TouchPhase::Start,
            TouchPhase::Move,
            TouchPhase::End,
            TouchPhase::Cancel,
        ]
    }

    /// DOM-style listener name.
    pub fn event_name(self) -> &'static str {
        match self {
            TouchPhase::Start => "touchstart",
            TouchPhase::Move => "touchmove",
            TouchPhase::End => "touchend",
            TouchPhase::Cancel => "touchcancel",
        }
    }
}

/// One entry of a native touch list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeTouch {
    pub identifier: i32,
    pub client_x: f64,
    pub client_y: f64,
    pub radius_x: Option<f64>,
    pub radius_y: Option<f64>,
    pub force: Option<f64>,
}

impl From<&NativeTouch> for TouchPoint {
    fn from(touch: &NativeTouch) -> Self {
        TouchPoint {
            id: touch.identifier,
            x: touch.client_x,
            y: touch.client_y,
            radius_x: touch.radius_x,
            radius_y: touch.radius_y,
            force: touch.force,
        }
    }
}

/// Native touch event; `changed_touches` names the contacts affected by this phase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeTouchEvent {
    pub changed_touches: Vec<NativeTouch>,
}

impl NativeTouchEvent {
    /// Flattens the native touch list, preserving source order.
    pub fn touch_points(&self) -> Vec<TouchPoint> {
        self.changed_touches.iter().map(TouchPoint::from).collect()
    }
}
