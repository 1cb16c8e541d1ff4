//! Seams to the hosting render engine and the target surface.
//!
//! The render engine is treated as an opaque event source exposing pointer and
//! keyboard observables ([`RenderScene`]); the surface supplies native touch
//! listeners and optional pointer lock ([`Surface`]). In-memory implementations
//! of both are provided for headless hosts, the CLI, and tests.

use std::cell::Cell;

use thiserror::Error;

use crate::input::events::{NativeKeyboardEvent, NativePointerEvent, NativeTouchEvent, TouchPhase};
use crate::input::observable::{Observable, SubscriptionId};

/// Handle returned when registering a native touch listener.
pub type ListenerId = SubscriptionId;

/// Native touch callback registered on a surface.
pub type TouchListener = Box<dyn FnMut(&NativeTouchEvent)>;

/// Errors reported by a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface rejected {0} listener")]
    ListenerRejected(String),

    #[error("pointer lock is not supported by this surface")]
    PointerLockUnavailable,

    #[error("pointer lock request denied: {0}")]
    PointerLockDenied(String),
}

/// Abstraction over the element input is attached to.
pub trait Surface {
    fn add_touch_listener(
        &self,
        phase: TouchPhase,
        listener: TouchListener,
    ) -> Result<ListenerId, SurfaceError>;

    fn remove_touch_listener(&self, phase: TouchPhase, id: ListenerId);

    fn request_pointer_lock(&self) -> Result<(), SurfaceError> {
        Err(SurfaceError::PointerLockUnavailable)
    }

    fn exit_pointer_lock(&self) {}
}

/// Abstraction over the hosting engine's pointer and keyboard streams.
pub trait RenderScene {
    fn pointer_events(&self) -> &Observable<NativePointerEvent>;
    fn keyboard_events(&self) -> &Observable<NativeKeyboardEvent>;
}

/// In-memory surface that stores listeners and lets callers fire native touches.
#[derive(Debug, Default)]
pub struct VirtualSurface {
    touch_start: Observable<NativeTouchEvent>,
    touch_move: Observable<NativeTouchEvent>,
    touch_end: Observable<NativeTouchEvent>,
    touch_cancel: Observable<NativeTouchEvent>,
    pointer_lock_supported: bool,
    pointer_locked: Cell<bool>,
    rejecting: Cell<bool>,
}

impl VirtualSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pointer_lock() -> Self {
        Self {
            pointer_lock_supported: true,
            ..Self::default()
        }
    }

    /// When set, every subsequent listener registration fails.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.set(rejecting);
    }

    pub fn dispatch_touch(&self, phase: TouchPhase, event: &NativeTouchEvent) {
        self.listeners(phase).notify(event);
    }

    pub fn listener_count(&self) -> usize {
        TouchPhase::all()
            .into_iter()
            .map(|phase| self.listeners(phase).len())
            .sum()
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked.get()
    }

    fn listeners(&self, phase: TouchPhase) -> &Observable<NativeTouchEvent> {
        match phase {
            TouchPhase::Start => &self.touch_start,
            TouchPhase::Move => &self.touch_move,
            TouchPhase::End => &self.touch_end,
            TouchPhase::Cancel => &self.touch_cancel,
        }
    }
}

impl Surface for VirtualSurface {
    fn add_touch_listener(
        &self,
        phase: TouchPhase,
        mut listener: TouchListener,
    ) -> Result<ListenerId, SurfaceError> {
        if self.rejecting.get() {
            return Err(SurfaceError::ListenerRejected(phase.event_name().to_string()));
        }
        Ok(self.listeners(phase).subscribe(move |event| listener(event)))
    }

    fn remove_touch_listener(&self, phase: TouchPhase, id: ListenerId) {
        self.listeners(phase).unsubscribe(id);
    }

    fn request_pointer_lock(&self) -> Result<(), SurfaceError> {
        if !self.pointer_lock_supported {
            return Err(SurfaceError::PointerLockUnavailable);
        }
        self.pointer_locked.set(true);
        Ok(())
    }

    fn exit_pointer_lock(&self) {
        self.pointer_locked.set(false);
    }
}

/// In-memory engine scene whose streams are fired by the host.
#[derive(Debug, Default)]
pub struct VirtualScene {
    pointer: Observable<NativePointerEvent>,
    keyboard: Observable<NativeKeyboardEvent>,
}

impl VirtualScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire_pointer(&self, event: NativePointerEvent) {
        self.pointer.notify(&event);
    }

    pub fn fire_keyboard(&self, event: NativeKeyboardEvent) {
        self.keyboard.notify(&event);
    }
}

impl RenderScene for VirtualScene {
    fn pointer_events(&self) -> &Observable<NativePointerEvent> {
        &self.pointer
    }

    fn keyboard_events(&self) -> &Observable<NativeKeyboardEvent> {
        &self.keyboard
    }
}
