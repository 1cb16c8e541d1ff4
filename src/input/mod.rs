//! Input sources and the device event model.
//!
//! This module normalizes pointer, wheel, touch, and keyboard activity into
//! nine per-source event streams plus queryable device state. Two backends
//! share one contract ([`InputSource`]): the live source adapts a hosting
//! engine, the simulated source is driven by synthetic calls.

pub mod error;
pub mod events;
pub mod live;
pub mod modifiers;
pub mod observable;
pub mod simulated;
pub mod source;
pub mod state;

// Re-export commonly used types at module level
pub use error::InputError;
pub use events::{
    DeviceType, KeyboardEvent, MouseButton, PointerEvent, TouchPoint, Vector2, WheelEvent,
};
pub use live::LiveInputSource;
pub use modifiers::{KeyModifiers, Shortcut};
pub use observable::{Observable, SubscriptionId};
pub use simulated::SimulatedInputSource;
pub use source::{InputSource, SourceKind};
pub use state::{DeviceState, DeviceStreams};
