//! Bridging of device events onto the application event sink.
//!
//! Each of the nine streams gets one forwarding handler: gated on the enabled
//! flag, optionally appended to the recording log, then published under a
//! fixed semantic name. A second key-down handler derives shortcuts.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::input::modifiers::Shortcut;
use crate::input::observable::Observable;
use crate::input::source::InputSource;
use crate::recording::{RecordedEvent, serialize_payload};
use crate::sink::EventSink;

/// Semantic names of the nine bridged device streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgedEvent {
    PointerMove,
    PointerDown,
    PointerUp,
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    KeyDown,
    KeyUp,
}

impl BridgedEvent {
    pub const ALL: [BridgedEvent; 9] = [
        BridgedEvent::PointerMove,
        BridgedEvent::PointerDown,
        BridgedEvent::PointerUp,
        BridgedEvent::Wheel,
        BridgedEvent::TouchStart,
        BridgedEvent::TouchMove,
        BridgedEvent::TouchEnd,
        BridgedEvent::KeyDown,
        BridgedEvent::KeyUp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BridgedEvent::PointerMove => "input:pointer-move",
            BridgedEvent::PointerDown => "input:pointer-down",
            BridgedEvent::PointerUp => "input:pointer-up",
            BridgedEvent::Wheel => "input:wheel",
            BridgedEvent::TouchStart => "input:touch-start",
            BridgedEvent::TouchMove => "input:touch-move",
            BridgedEvent::TouchEnd => "input:touch-end",
            BridgedEvent::KeyDown => "input:key-down",
            BridgedEvent::KeyUp => "input:key-up",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

/// State shared between the coordinator and its bridge handlers.
#[derive(Debug, Default)]
pub(crate) struct BridgeState {
    pub enabled: bool,
    pub recording: bool,
    /// Recorded (or most recently loaded) log; append-only while recording.
    pub events: Vec<RecordedEvent>,
}

impl BridgeState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }
}

/// Subscribes the forwarding and shortcut handlers to every stream of `source`.
pub(crate) fn install(
    source: &dyn InputSource,
    state: &Rc<RefCell<BridgeState>>,
    sink: &Rc<dyn EventSink>,
) {
    let streams = source.streams();
    forward(&streams.pointer_move, BridgedEvent::PointerMove, state, sink);
    forward(&streams.pointer_down, BridgedEvent::PointerDown, state, sink);
    forward(&streams.pointer_up, BridgedEvent::PointerUp, state, sink);
    forward(&streams.wheel, BridgedEvent::Wheel, state, sink);
    forward(&streams.touch_start, BridgedEvent::TouchStart, state, sink);
    forward(&streams.touch_move, BridgedEvent::TouchMove, state, sink);
    forward(&streams.touch_end, BridgedEvent::TouchEnd, state, sink);
    forward(&streams.key_down, BridgedEvent::KeyDown, state, sink);
    forward(&streams.key_up, BridgedEvent::KeyUp, state, sink);

    let state = Rc::clone(state);
    let sink = Rc::clone(sink);
    streams.key_down.subscribe(move |event| {
        if !state.borrow().enabled {
            return;
        }
        if let Some(shortcut) = Shortcut::from_key_down(event) {
            sink.publish(shortcut.event_name(), json!({}));
        }
    });
}

fn forward<T: Serialize + 'static>(
    stream: &Observable<T>,
    kind: BridgedEvent,
    state: &Rc<RefCell<BridgeState>>,
    sink: &Rc<dyn EventSink>,
) {
    let state = Rc::clone(state);
    let sink = Rc::clone(sink);
    stream.subscribe(move |payload: &T| {
        {
            let mut bridge = state.borrow_mut();
            if !bridge.enabled {
                return;
            }
            if bridge.recording {
                let record =
                    RecordedEvent::new(Utc::now().timestamp_millis(), kind.name(), serialize_payload(payload));
                bridge.events.push(record);
            }
        }
        sink.publish(kind.name(), serialize_payload(payload));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for event in BridgedEvent::ALL {
            assert_eq!(BridgedEvent::from_name(event.name()), Some(event));
        }
        assert_eq!(BridgedEvent::from_name("input:undo"), None);
    }
}
