use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::surface::VirtualSurface;

fn attached_source() -> SimulatedInputSource {
    let source = SimulatedInputSource::new();
    source.attach(Rc::new(VirtualSurface::new())).unwrap();
    source
}

/// Collects `(stream, x, y)` for every pointer event in emission order.
fn record_pointer(source: &SimulatedInputSource) -> Rc<RefCell<Vec<(&'static str, f64, f64)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let streams = source.streams();
    let sink = log.clone();
    streams
        .pointer_move
        .subscribe(move |e| sink.borrow_mut().push(("move", e.x, e.y)));
    let sink = log.clone();
    streams
        .pointer_down
        .subscribe(move |e| sink.borrow_mut().push(("down", e.x, e.y)));
    let sink = log.clone();
    streams
        .pointer_up
        .subscribe(move |e| sink.borrow_mut().push(("up", e.x, e.y)));
    log
}

#[test]
fn every_simulate_call_requires_attach() {
    let source = SimulatedInputSource::new();
    let touch = [TouchPoint::new(1, 0.0, 0.0)];

    assert!(matches!(source.simulate_mouse_move(1.0, 1.0), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_mouse_down(MouseButton::Left), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_mouse_up(MouseButton::Left), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_wheel(1.0, 0.0), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_touch_start(&touch), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_touch_move(&touch), Err(InputError::NotAttached)));
    assert!(matches!(source.simulate_touch_end(&[1]), Err(InputError::NotAttached)));
    assert!(matches!(
        source.simulate_key_down("a", KeyModifiers::new()),
        Err(InputError::NotAttached)
    ));
    assert!(matches!(source.simulate_key_up("a"), Err(InputError::NotAttached)));

    source.attach(Rc::new(VirtualSurface::new())).unwrap();
    assert!(source.simulate_mouse_move(1.0, 1.0).is_ok());
}

#[test]
fn repeated_mouse_down_fires_once() {
    let source = attached_source();
    let log = record_pointer(&source);

    source.simulate_mouse_down(MouseButton::Left).unwrap();
    source.simulate_mouse_down(MouseButton::Left).unwrap();
    source.simulate_mouse_up(MouseButton::Left).unwrap();
    source.simulate_mouse_up(MouseButton::Left).unwrap();

    let names: Vec<_> = log.borrow().iter().map(|(name, _, _)| *name).collect();
    assert_eq!(names, vec!["down", "up"]);
}

#[test]
fn repeated_key_down_fires_once() {
    let source = attached_source();
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    source
        .streams()
        .key_down
        .subscribe(move |_| *sink.borrow_mut() += 1);

    source.simulate_key_down("z", KeyModifiers::ctrl()).unwrap();
    source.simulate_key_down("z", KeyModifiers::ctrl()).unwrap();
    assert_eq!(*count.borrow(), 1);
    assert_eq!(source.active_keys(), vec!["z".to_string()]);

    source.simulate_key_up("z").unwrap();
    source.simulate_key_up("z").unwrap();
    assert!(source.active_keys().is_empty());
}

#[test]
fn key_events_carry_code_and_modifiers() {
    let source = attached_source();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    source
        .streams()
        .key_down
        .subscribe(move |e| *sink.borrow_mut() = Some(e.clone()));

    source
        .simulate_key_down(
            "a",
            KeyModifiers {
                ctrl: true,
                shift: true,
                ..KeyModifiers::default()
            },
        )
        .unwrap();

    let event = seen.borrow().clone().unwrap();
    assert_eq!(event.code, "KeyA");
    assert!(event.ctrl_key && event.shift_key);
    assert!(!event.alt_key && !event.meta_key);
}

#[test]
fn pointer_state_follows_most_recent_transition() {
    let source = attached_source();
    source.simulate_mouse_down(MouseButton::Left).unwrap();
    source.simulate_mouse_down(MouseButton::Right).unwrap();
    source.simulate_mouse_up(MouseButton::Left).unwrap();

    assert!(!source.is_pointer_down(Some(MouseButton::Left)));
    assert!(source.is_pointer_down(Some(MouseButton::Right)));
    assert!(!source.is_pointer_down(Some(MouseButton::Middle)));
    assert!(source.is_pointer_down(None));
}

#[test]
fn touch_move_and_end_reject_unknown_ids() {
    let source = attached_source();
    source
        .simulate_touch_start(&[TouchPoint::new(3, 1.0, 1.0)])
        .unwrap();

    let err = source
        .simulate_touch_move(&[TouchPoint::new(3, 2.0, 2.0), TouchPoint::new(8, 0.0, 0.0)])
        .unwrap_err();
    assert!(matches!(err, InputError::UnknownTouch(8)));
    // Rejected batch leaves the known touch untouched.
    assert_eq!(source.active_touches()[0].x, 1.0);

    assert!(matches!(
        source.simulate_touch_end(&[3, 5]),
        Err(InputError::UnknownTouch(5))
    ));
    assert_eq!(source.active_touches().len(), 1);

    source.simulate_touch_end(&[3]).unwrap();
    assert!(source.active_touches().is_empty());
}

#[test]
fn touch_start_overwrites_existing_id() {
    let source = attached_source();
    source
        .simulate_touch_start(&[TouchPoint::new(1, 1.0, 1.0), TouchPoint::new(2, 5.0, 5.0)])
        .unwrap();
    source
        .simulate_touch_start(&[TouchPoint::new(1, 9.0, 9.0)])
        .unwrap();
    source.simulate_touch_end(&[2]).unwrap();

    let touches = source.active_touches();
    assert_eq!(touches.len(), 1);
    assert_eq!((touches[0].id, touches[0].x), (1, 9.0));
}

#[test]
fn drag_emits_move_down_steps_up() {
    let source = attached_source();
    let log = record_pointer(&source);

    source.simulate_drag(0.0, 0.0, 100.0, 100.0, 5).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 8);
    let names: Vec<_> = log.iter().map(|(name, _, _)| *name).collect();
    assert_eq!(
        names,
        vec!["move", "down", "move", "move", "move", "move", "move", "up"]
    );
    let last_move = log.iter().rev().find(|(name, _, _)| *name == "move").unwrap();
    assert_eq!((last_move.1, last_move.2), (100.0, 100.0));
    assert_eq!((log[2].1, log[2].2), (20.0, 20.0));
    assert!(!source.is_pointer_down(None));
}

#[test]
fn pinch_uses_two_touches_throughout() {
    let source = attached_source();
    let starts = Rc::new(RefCell::new(Vec::new()));
    let moves = Rc::new(RefCell::new(Vec::new()));
    let ends = Rc::new(RefCell::new(Vec::new()));
    let (s, m, e) = (starts.clone(), moves.clone(), ends.clone());
    source
        .streams()
        .touch_start
        .subscribe(move |t| s.borrow_mut().push(t.clone()));
    source
        .streams()
        .touch_move
        .subscribe(move |t| m.borrow_mut().push(t.clone()));
    source
        .streams()
        .touch_end
        .subscribe(move |t| e.borrow_mut().push(t.clone()));

    source.simulate_pinch(50.0, 50.0, 20.0, 60.0, 4).unwrap();

    let starts = starts.borrow();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].len(), 2);
    assert_eq!((starts[0][0].x, starts[0][1].x), (40.0, 60.0));

    let moves = moves.borrow();
    assert_eq!(moves.len(), 4);
    assert!(moves.iter().all(|batch| batch.len() == 2));
    let last = &moves[3];
    assert_eq!((last[0].x, last[1].x), (20.0, 80.0));

    let ends = ends.borrow();
    assert_eq!(ends.len(), 1);
    let ids: Vec<_> = ends[0].iter().map(|t| t.id).collect();
    assert_eq!(ids, PINCH_TOUCH_IDS.to_vec());
    assert!(source.active_touches().is_empty());
}

#[test]
fn reset_clears_state_but_keeps_subscriptions() {
    let source = attached_source();
    let log = record_pointer(&source);

    source.simulate_mouse_move(30.0, 40.0).unwrap();
    source.simulate_mouse_down(MouseButton::Middle).unwrap();
    source
        .simulate_touch_start(&[TouchPoint::new(1, 1.0, 1.0)])
        .unwrap();
    source.simulate_key_down("q", KeyModifiers::new()).unwrap();

    source.reset();

    assert_eq!(source.pointer_position(), Vector2::ZERO);
    assert!(!source.is_pointer_down(None));
    assert!(source.active_touches().is_empty());
    assert!(source.active_keys().is_empty());

    source.simulate_mouse_move(1.0, 2.0).unwrap();
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn dispose_tears_down_and_detaches() {
    let source = attached_source();
    let log = record_pointer(&source);
    source.dispose();
    source.dispose();

    assert_eq!(source.streams().subscriber_count(), 0);
    assert!(matches!(
        source.simulate_mouse_move(1.0, 1.0),
        Err(InputError::NotAttached)
    ));
    assert!(log.borrow().is_empty());
}
