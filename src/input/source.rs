//! The contract shared by live and simulated input sources.

use std::rc::Rc;

use super::error::InputError;
use super::events::{MouseButton, TouchPoint, Vector2};
use super::simulated::SimulatedInputSource;
use super::state::DeviceStreams;
use crate::surface::Surface;

/// Which backend drives an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Adapts a hosting engine's native event stream.
    Live,
    /// Driven by synthetic `simulate_*` calls.
    Simulated,
}

/// Normalized device events plus the device state they imply.
///
/// Every source owns its [`DeviceStreams`] and device state; consumers only
/// subscribe and query. All methods take `&self` because sources live on a
/// single event-loop thread and are shared through `Rc`.
pub trait InputSource {
    fn kind(&self) -> SourceKind;

    /// The nine event streams (pointer move/down/up, wheel, touch start/move/end, key down/up).
    fn streams(&self) -> &DeviceStreams;

    fn pointer_position(&self) -> Vector2;

    /// `None` asks whether any button is held.
    fn is_pointer_down(&self, button: Option<MouseButton>) -> bool;

    fn active_touches(&self) -> Vec<TouchPoint>;

    fn is_attached(&self) -> bool;

    /// Binds the source to a surface. Re-attaching replaces the previous binding.
    fn attach(&self, surface: Rc<dyn Surface>) -> Result<(), InputError>;

    /// Releases the surface binding; subscribers and state are kept.
    fn detach(&self);

    /// Detaches, drops every subscriber, and clears device state. Safe to call twice.
    fn dispose(&self);

    fn as_simulated(&self) -> Option<&SimulatedInputSource> {
        None
    }
}
