//! Timed replay of recorded logs through a simulated input source.

use log::{debug, warn};
use serde_json::Value;
use tokio::time::{Duration, Instant, sleep};

use crate::bridge::BridgedEvent;
use crate::input::error::InputError;
use crate::input::events::{MouseButton, TouchPoint};
use crate::input::modifiers::KeyModifiers;
use crate::input::simulated::SimulatedInputSource;
use crate::recording::RecordedEvent;
use crate::recording::serialize::{array_items, bool_field, number_field, string_field};

/// Replays `events` in log order, re-anchored at the first event's timestamp.
///
/// Each event waits only for its own offset from the replay start, so events
/// whose gap was already consumed dispatch back-to-back. Returns how many
/// events were dispatched; unknown or malformed records are skipped.
///
/// # Errors
/// Any `simulate_*` failure aborts the replay, e.g. [`InputError::NotAttached`]
/// once the source has been disposed mid-replay.
pub async fn replay_events(
    source: &SimulatedInputSource,
    events: &[RecordedEvent],
) -> Result<usize, InputError> {
    let Some(first) = events.first() else {
        return Ok(0);
    };
    let anchor = first.timestamp;
    let started = Instant::now();
    let mut dispatched = 0;

    for event in events {
        let Some(delta) = event.timestamp.checked_sub(anchor) else {
            warn!(
                "Skipping {} record: timestamp {} is out of range of anchor {anchor}",
                event.event_type, event.timestamp
            );
            continue;
        };
        let offset = Duration::from_millis(u64::try_from(delta).unwrap_or(0));
        let elapsed = started.elapsed();
        if elapsed < offset {
            sleep(offset - elapsed).await;
        }
        if dispatch_recorded(source, event)? {
            dispatched += 1;
        }
    }

    Ok(dispatched)
}

/// Reconstructs one record into the matching `simulate_*` call.
///
/// Returns `Ok(false)` when the record is not replayable.
pub fn dispatch_recorded(
    source: &SimulatedInputSource,
    event: &RecordedEvent,
) -> Result<bool, InputError> {
    let Some(kind) = BridgedEvent::from_name(&event.event_type) else {
        debug!("Skipping non-replayable event {}", event.event_type);
        return Ok(false);
    };
    let data = &event.data;

    match kind {
        BridgedEvent::PointerMove => {
            let (Some(x), Some(y)) = (number_field(data, "x"), number_field(data, "y")) else {
                return Ok(skip_malformed(event));
            };
            source.simulate_mouse_move(x, y)?;
        }
        BridgedEvent::PointerDown => source.simulate_mouse_down(button_field(data))?,
        BridgedEvent::PointerUp => source.simulate_mouse_up(button_field(data))?,
        BridgedEvent::Wheel => source.simulate_wheel(
            number_field(data, "deltaY").unwrap_or(0.0),
            number_field(data, "deltaX").unwrap_or(0.0),
        )?,
        BridgedEvent::TouchStart | BridgedEvent::TouchMove | BridgedEvent::TouchEnd => {
            let Some(touches) = touch_points(data) else {
                return Ok(skip_malformed(event));
            };
            match kind {
                BridgedEvent::TouchStart => source.simulate_touch_start(&touches)?,
                BridgedEvent::TouchMove => source.simulate_touch_move(&touches)?,
                _ => {
                    let ids: Vec<i32> = touches.iter().map(|touch| touch.id).collect();
                    source.simulate_touch_end(&ids)?;
                }
            }
        }
        BridgedEvent::KeyDown => {
            let Some(key) = string_field(data, "key") else {
                return Ok(skip_malformed(event));
            };
            let modifiers = KeyModifiers {
                ctrl: bool_field(data, "ctrlKey").unwrap_or(false),
                shift: bool_field(data, "shiftKey").unwrap_or(false),
                alt: bool_field(data, "altKey").unwrap_or(false),
                meta: bool_field(data, "metaKey").unwrap_or(false),
            };
            source.simulate_key_down(key, modifiers)?;
        }
        BridgedEvent::KeyUp => {
            let Some(key) = string_field(data, "key") else {
                return Ok(skip_malformed(event));
            };
            source.simulate_key_up(key)?;
        }
    }

    Ok(true)
}

fn skip_malformed(event: &RecordedEvent) -> bool {
    warn!(
        "Skipping malformed {} record at {}",
        event.event_type, event.timestamp
    );
    false
}

fn button_field(data: &Value) -> MouseButton {
    match string_field(data, "button") {
        Some("middle") => MouseButton::Middle,
        Some("right") => MouseButton::Right,
        _ => MouseButton::Left,
    }
}

fn touch_points(data: &Value) -> Option<Vec<TouchPoint>> {
    array_items(data)?
        .iter()
        .map(|item| {
            Some(TouchPoint {
                id: i32::try_from(item.get("id")?.get("value")?.as_i64()?).ok()?,
                x: number_field(item, "x")?,
                y: number_field(item, "y")?,
                radius_x: number_field(item, "radiusX"),
                radius_y: number_field(item, "radiusY"),
                force: number_field(item, "force"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::input::source::InputSource;
    use crate::recording::serialize_payload;
    use crate::surface::VirtualSurface;

    fn attached() -> SimulatedInputSource {
        let source = SimulatedInputSource::new();
        source.attach(Rc::new(VirtualSurface::new())).unwrap();
        source
    }

    fn record(timestamp: i64, kind: BridgedEvent, data: Value) -> RecordedEvent {
        RecordedEvent::new(timestamp, kind.name(), data)
    }

    #[test]
    fn reconstructs_pointer_touch_and_key_records() {
        let source = attached();
        let touches = vec![TouchPoint::new(4, 1.0, 2.0), TouchPoint::new(5, 3.0, 4.0)];

        let log = vec![
            record(0, BridgedEvent::PointerMove, json!({ "x": { "value": 7.0 }, "y": { "value": 9.0 } })),
            record(0, BridgedEvent::PointerDown, json!({ "button": { "value": "right" } })),
            record(0, BridgedEvent::TouchStart, serialize_payload(&touches)),
            record(0, BridgedEvent::KeyDown, json!({ "key": { "value": "k" }, "shiftKey": { "value": true } })),
        ];
        for event in &log {
            assert!(dispatch_recorded(&source, event).unwrap());
        }

        assert_eq!((source.pointer_position().x, source.pointer_position().y), (7.0, 9.0));
        assert!(source.is_pointer_down(Some(MouseButton::Right)));
        assert_eq!(source.active_touches(), touches);
        assert_eq!(source.active_keys(), vec!["k".to_string()]);

        let end = record(0, BridgedEvent::TouchEnd, serialize_payload(&touches));
        assert!(dispatch_recorded(&source, &end).unwrap());
        assert!(source.active_touches().is_empty());
    }

    #[test]
    fn wheel_record_swaps_into_simulate_argument_order() {
        let source = attached();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        source
            .streams()
            .wheel
            .subscribe(move |event| sink.borrow_mut().push((event.delta_x, event.delta_y)));

        let event = record(
            0,
            BridgedEvent::Wheel,
            json!({ "deltaX": { "value": 1.0 }, "deltaY": { "value": -4.0 } }),
        );
        dispatch_recorded(&source, &event).unwrap();
        assert_eq!(*seen.borrow(), vec![(1.0, -4.0)]);
    }

    #[test]
    fn unknown_and_malformed_records_are_skipped() {
        let source = attached();
        let future = RecordedEvent::new(0, "input:gamepad", json!({}));
        assert!(!dispatch_recorded(&source, &future).unwrap());

        let broken = record(0, BridgedEvent::PointerMove, json!({ "x": 1 }));
        assert!(!dispatch_recorded(&source, &broken).unwrap());
    }

    #[test]
    fn touch_move_for_unknown_id_propagates() {
        let source = attached();
        let event = record(
            0,
            BridgedEvent::TouchMove,
            serialize_payload(&vec![TouchPoint::new(9, 0.0, 0.0)]),
        );
        assert!(matches!(
            dispatch_recorded(&source, &event),
            Err(InputError::UnknownTouch(9))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn replay_waits_for_relative_offsets() {
        let source = attached();
        let times = Rc::new(RefCell::new(Vec::new()));
        let sink = times.clone();
        let started = Instant::now();
        source
            .streams()
            .pointer_move
            .subscribe(move |_| sink.borrow_mut().push(started.elapsed()));

        let log: Vec<RecordedEvent> = [5_000, 5_100, 5_100, 5_350]
            .into_iter()
            .map(|ts| {
                record(
                    ts,
                    BridgedEvent::PointerMove,
                    json!({ "x": { "value": 1.0 }, "y": { "value": 1.0 } }),
                )
            })
            .collect();

        let dispatched = replay_events(&source, &log).await.unwrap();
        assert_eq!(dispatched, 4);

        let millis: Vec<u128> = times.borrow().iter().map(Duration::as_millis).collect();
        assert_eq!(millis, vec![0, 100, 100, 350]);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_timestamps_are_skipped() {
        let source = attached();
        let log: Vec<RecordedEvent> = [i64::MIN, i64::MAX, i64::MIN + 5]
            .into_iter()
            .map(|ts| {
                record(
                    ts,
                    BridgedEvent::PointerMove,
                    json!({ "x": { "value": 2.0 }, "y": { "value": 3.0 } }),
                )
            })
            .collect();

        let started = Instant::now();
        assert_eq!(replay_events(&source, &log).await.unwrap(), 2);
        assert_eq!(started.elapsed().as_millis(), 5);
        assert_eq!(source.pointer_position().x, 2.0);
    }

    #[tokio::test]
    async fn replay_of_empty_log_is_a_no_op() {
        let source = attached();
        assert_eq!(replay_events(&source, &[]).await.unwrap(), 0);
    }
}
