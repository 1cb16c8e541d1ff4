//! Input source backed by a hosting render engine.
//!
//! Pointer, wheel, and keyboard events come from the engine's observables.
//! Touches bypass the engine and come from native listeners on the surface,
//! because the engine does not surface multi-touch.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

use super::error::InputError;
use super::events::{
    DeviceType, KeyboardEvent, MouseButton, NativeKeyKind, NativeKeyboardEvent,
    NativePointerEvent, NativePointerKind, NativeTouchEvent, PointerEvent, TouchPhase, TouchPoint,
    Vector2, WheelEvent,
};
use super::observable::SubscriptionId;
use super::source::{InputSource, SourceKind};
use super::state::{DeviceState, DeviceStreams};
use crate::surface::{ListenerId, RenderScene, Surface};

struct LiveShared {
    state: RefCell<DeviceState>,
    streams: DeviceStreams,
}

struct Attachment {
    surface: Rc<dyn Surface>,
    touch_listeners: Vec<(TouchPhase, ListenerId)>,
    pointer_subscription: SubscriptionId,
    keyboard_subscription: SubscriptionId,
}

/// Adapts engine pointer/keyboard streams and native touch listeners.
pub struct LiveInputSource {
    scene: Rc<dyn RenderScene>,
    shared: Rc<LiveShared>,
    attachment: RefCell<Option<Attachment>>,
    disposed: Cell<bool>,
}

impl LiveInputSource {
    pub fn new(scene: Rc<dyn RenderScene>) -> Self {
        Self {
            scene,
            shared: Rc::new(LiveShared {
                state: RefCell::new(DeviceState::default()),
                streams: DeviceStreams::new(),
            }),
            attachment: RefCell::new(None),
            disposed: Cell::new(false),
        }
    }

    fn register_touch_listeners(
        &self,
        surface: &Rc<dyn Surface>,
    ) -> Result<Vec<(TouchPhase, ListenerId)>, InputError> {
        let mut registered = Vec::with_capacity(4);
        for phase in TouchPhase::all() {
            let weak = Rc::downgrade(&self.shared);
            let listener = Box::new(move |event: &NativeTouchEvent| {
                if let Some(shared) = weak.upgrade() {
                    shared.handle_touch(phase, event);
                }
            });
            match surface.add_touch_listener(phase, listener) {
                Ok(id) => registered.push((phase, id)),
                Err(err) => {
                    for (phase, id) in registered {
                        surface.remove_touch_listener(phase, id);
                    }
                    return Err(err.into());
                }
            }
        }
        Ok(registered)
    }
}

impl LiveShared {
    fn handle_pointer(&self, native: &NativePointerEvent) {
        if native.kind == NativePointerKind::Wheel {
            self.streams.wheel.notify(&WheelEvent {
                delta_x: native.delta_x,
                delta_y: native.delta_y,
                delta_z: 0.0,
                delta_mode: native.delta_mode,
            });
            return;
        }

        let event = convert_pointer(native);
        match native.kind {
            NativePointerKind::Move => {
                self.state.borrow_mut().pointer_position = event.position();
                self.streams.pointer_move.notify(&event);
            }
            NativePointerKind::Down => {
                self.state.borrow_mut().set_button(event.button, true);
                self.streams.pointer_down.notify(&event);
            }
            NativePointerKind::Up => {
                self.state.borrow_mut().set_button(event.button, false);
                self.streams.pointer_up.notify(&event);
            }
            NativePointerKind::Wheel => {}
        }
    }

    fn handle_keyboard(&self, native: &NativeKeyboardEvent) {
        let event = KeyboardEvent {
            key: native.key.clone(),
            code: native.code.clone(),
            ctrl_key: native.ctrl_key,
            shift_key: native.shift_key,
            alt_key: native.alt_key,
            meta_key: native.meta_key,
        };
        match native.kind {
            NativeKeyKind::Down => {
                self.state.borrow_mut().keys.insert(event.key.clone());
                self.streams.key_down.notify(&event);
            }
            NativeKeyKind::Up => {
                self.state.borrow_mut().keys.remove(&event.key);
                self.streams.key_up.notify(&event);
            }
        }
    }

    fn handle_touch(&self, phase: TouchPhase, native: &NativeTouchEvent) {
        let touches: Vec<TouchPoint> = native.touch_points();
        match phase {
            TouchPhase::Start => {
                self.state.borrow_mut().upsert_touches(&touches);
                self.streams.touch_start.notify(&touches);
            }
            TouchPhase::Move => {
                self.state.borrow_mut().upsert_touches(&touches);
                self.streams.touch_move.notify(&touches);
            }
            TouchPhase::End | TouchPhase::Cancel => {
                self.state.borrow_mut().remove_touches(&touches);
                self.streams.touch_end.notify(&touches);
            }
        }
    }
}

fn convert_pointer(native: &NativePointerEvent) -> PointerEvent {
    PointerEvent {
        x: native.x,
        y: native.y,
        button: MouseButton::from_native(native.button),
        device_type: if native.pointer_type == "touch" {
            DeviceType::Touch
        } else {
            DeviceType::Mouse
        },
        pointer_id: native.pointer_id,
        is_primary: native.is_primary,
        pressure: native.pressure.clamp(0.0, 1.0),
    }
}

impl InputSource for LiveInputSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn streams(&self) -> &DeviceStreams {
        &self.shared.streams
    }

    fn pointer_position(&self) -> Vector2 {
        self.shared.state.borrow().pointer_position
    }

    fn is_pointer_down(&self, button: Option<MouseButton>) -> bool {
        self.shared.state.borrow().is_pointer_down(button)
    }

    fn active_touches(&self) -> Vec<TouchPoint> {
        self.shared.state.borrow().active_touches()
    }

    fn is_attached(&self) -> bool {
        self.attachment.borrow().is_some()
    }

    fn attach(&self, surface: Rc<dyn Surface>) -> Result<(), InputError> {
        if self.disposed.get() {
            return Err(InputError::Disposed);
        }
        self.detach();

        let touch_listeners = self.register_touch_listeners(&surface)?;

        let weak: Weak<LiveShared> = Rc::downgrade(&self.shared);
        let pointer_subscription = self.scene.pointer_events().subscribe(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_pointer(event);
            }
        });
        let weak: Weak<LiveShared> = Rc::downgrade(&self.shared);
        let keyboard_subscription = self.scene.keyboard_events().subscribe(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_keyboard(event);
            }
        });

        debug!("Live input source attached");
        *self.attachment.borrow_mut() = Some(Attachment {
            surface,
            touch_listeners,
            pointer_subscription,
            keyboard_subscription,
        });
        Ok(())
    }

    fn detach(&self) {
        let Some(attachment) = self.attachment.borrow_mut().take() else {
            return;
        };
        for (phase, id) in attachment.touch_listeners {
            attachment.surface.remove_touch_listener(phase, id);
        }
        self.scene
            .pointer_events()
            .unsubscribe(attachment.pointer_subscription);
        self.scene
            .keyboard_events()
            .unsubscribe(attachment.keyboard_subscription);
        debug!("Live input source detached");
    }

    fn dispose(&self) {
        self.detach();
        self.shared.streams.clear_all();
        self.shared.state.borrow_mut().clear();
        self.disposed.set(true);
    }
}
