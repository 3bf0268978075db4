use serde_json::json;
use wd_actions::testing::RecordingHost;
use wd_actions::{
    ActionError, ActionSession, ActionsConfig, HostError, InputSourceId, InputState,
    KeyEventKind, MouseEventKind, Platform, PointerType, SourceKind, ELEMENT_KEY,
};

fn session(platform: Platform) -> ActionSession {
    ActionSession::new(ActionsConfig {
        platform,
        ..ActionsConfig::default()
    })
}

fn key_state(session: &ActionSession, id: &str) -> wd_actions::KeyState {
    session
        .input_state(&InputSourceId::new(id))
        .and_then(|state| state.as_key().cloned())
        .expect("key source registered")
}

#[tokio::test]
async fn key_down_then_up_leaves_nothing_pressed() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{
                "type": "key",
                "id": "kbd",
                "actions": [
                    { "type": "keyDown", "value": "a" },
                    { "type": "keyUp", "value": "a" }
                ]
            }]),
            &host,
        )
        .await
        .unwrap();

    let kinds: Vec<_> = host.key_events().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![KeyEventKind::KeyDown, KeyEventKind::KeyPress, KeyEventKind::KeyUp]
    );
    assert!(key_state(&session, "kbd").pressed.is_empty());
}

#[tokio::test]
async fn pressing_a_held_key_again_sets_repeat() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{
                "type": "key",
                "id": "kbd",
                "actions": [
                    { "type": "keyDown", "value": "x" },
                    { "type": "keyDown", "value": "x" }
                ]
            }]),
            &host,
        )
        .await
        .unwrap();

    let downs: Vec<_> = host
        .key_events()
        .into_iter()
        .filter(|event| event.kind == KeyEventKind::KeyDown)
        .collect();
    assert_eq!(downs.len(), 2);
    assert!(!downs[0].repeat);
    assert!(downs[1].repeat);
    assert_eq!(session.pending_len(), 2);
}

#[tokio::test]
async fn key_up_of_an_unpressed_key_injects_nothing() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{ "type": "key", "id": "kbd", "actions": [{ "type": "keyUp", "value": "q" }] }]),
            &host,
        )
        .await
        .unwrap();

    assert!(host.events().is_empty());
}

#[tokio::test]
async fn shift_remaps_the_injected_key_but_not_the_pressed_set() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{
                "type": "key",
                "id": "kbd",
                "actions": [
                    { "type": "keyDown", "value": "\u{E008}" },
                    { "type": "keyDown", "value": "a" }
                ]
            }]),
            &host,
        )
        .await
        .unwrap();

    let events = host.key_events();
    assert_eq!(events[0].key, "Shift");
    assert_eq!(events[0].code, "ShiftLeft");
    assert_eq!(events[0].kind, KeyEventKind::KeyDown);

    let letter = &events[1];
    assert_eq!(letter.key, "A");
    assert_eq!(letter.code, "KeyA");
    assert!(letter.modifiers.shift);
    assert_eq!(events[2].kind, KeyEventKind::KeyPress);

    let state = key_state(&session, "kbd");
    assert!(state.is_pressed("a"));
    assert!(state.is_pressed("Shift"));
    assert!(!state.is_pressed("A"));
}

#[tokio::test]
async fn control_suppresses_the_derived_keypress() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{
                "type": "key",
                "id": "kbd",
                "actions": [
                    { "type": "keyDown", "value": "\u{E009}" },
                    { "type": "keyDown", "value": "c" }
                ]
            }]),
            &host,
        )
        .await
        .unwrap();

    assert!(host
        .key_events()
        .iter()
        .all(|event| event.kind == KeyEventKind::KeyDown));
}

#[tokio::test]
async fn mouse_events_carry_modifiers_of_every_key_source() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([
                { "type": "key", "id": "k1", "actions": [
                    { "type": "keyDown", "value": "\u{E009}" }, { "type": "pause" }
                ]},
                { "type": "key", "id": "k2", "actions": [
                    { "type": "keyDown", "value": "\u{E008}" }, { "type": "pause" }
                ]},
                { "type": "pointer", "id": "mouse", "actions": [
                    { "type": "pause" }, { "type": "pointerDown", "button": 0 }
                ]}
            ]),
            &host,
        )
        .await
        .unwrap();

    let mouse = host.mouse_events();
    assert_eq!(mouse.len(), 1);
    let down = &mouse[0];
    assert_eq!(down.kind, MouseEventKind::MouseDown);
    assert!(down.modifiers.ctrl && down.modifiers.shift);
    assert_eq!(down.button, 0);
    assert_eq!(down.buttons, 1);
    assert_eq!(down.click_count, 1);
}

#[tokio::test]
async fn secondary_button_opens_the_context_menu() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{ "type": "pointer", "id": "mouse", "actions": [
                { "type": "pointerDown", "button": 2 },
                { "type": "pointerUp", "button": 2 }
            ]}]),
            &host,
        )
        .await
        .unwrap();

    let kinds: Vec<_> = host.mouse_events().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MouseEventKind::MouseDown,
            MouseEventKind::ContextMenu,
            MouseEventKind::MouseUp
        ]
    );
}

#[tokio::test]
async fn ctrl_click_on_mac_becomes_a_context_click() {
    let session = session(Platform::Mac);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([
                { "type": "key", "id": "kbd", "actions": [
                    { "type": "keyDown", "value": "\u{E009}" }, { "type": "pause" }
                ]},
                { "type": "pointer", "id": "mouse", "actions": [
                    { "type": "pause" }, { "type": "pointerDown", "button": 0 }
                ]}
            ]),
            &host,
        )
        .await
        .unwrap();

    let mouse = host.mouse_events();
    assert_eq!(mouse.len(), 2);
    assert_eq!(mouse[0].kind, MouseEventKind::MouseDown);
    assert_eq!(mouse[0].button, 2);
    assert_eq!(mouse[1].kind, MouseEventKind::ContextMenu);
    assert_eq!(host.click_resets(), 1);
}

#[tokio::test]
async fn ctrl_click_elsewhere_is_a_plain_click() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([
                { "type": "key", "id": "kbd", "actions": [
                    { "type": "keyDown", "value": "\u{E009}" }, { "type": "pause" }
                ]},
                { "type": "pointer", "id": "mouse", "actions": [
                    { "type": "pause" }, { "type": "pointerDown", "button": 0 }
                ]}
            ]),
            &host,
        )
        .await
        .unwrap();

    let mouse = host.mouse_events();
    assert_eq!(mouse.len(), 1);
    assert_eq!(mouse[0].button, 0);
    assert_eq!(host.click_resets(), 0);
}

#[tokio::test]
async fn host_double_click_bumps_the_click_count() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();
    host.set_double_click(true);

    session
        .dispatch(
            &json!([{ "type": "pointer", "id": "mouse", "actions": [
                { "type": "pointerDown", "button": 0 },
                { "type": "pointerUp", "button": 0 }
            ]}]),
            &host,
        )
        .await
        .unwrap();

    assert!(host.mouse_events().iter().all(|event| event.click_count == 2));
}

#[tokio::test]
async fn pressing_a_held_button_is_a_no_op() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{ "type": "pointer", "id": "mouse", "actions": [
                { "type": "pointerDown", "button": 0 },
                { "type": "pointerDown", "button": 0 },
                { "type": "pointerUp", "button": 1 }
            ]}]),
            &host,
        )
        .await
        .unwrap();

    assert_eq!(host.mouse_events().len(), 1);
    assert_eq!(session.pending_len(), 1);
}

#[tokio::test]
async fn pointer_cancel_is_rejected_before_anything_is_registered() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    let err = session
        .dispatch(
            &json!([
                { "type": "key", "id": "kbd", "actions": [{ "type": "keyDown", "value": "a" }] },
                { "type": "pointer", "id": "mouse", "actions": [{ "type": "pointerCancel" }] }
            ]),
            &host,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::UnsupportedOperation(_)));
    assert!(session.input_state(&InputSourceId::new("kbd")).is_none());
    assert!(session.input_state(&InputSourceId::new("mouse")).is_none());
    assert!(host.events().is_empty());
}

#[tokio::test]
async fn reusing_an_id_with_another_kind_fails_validation() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{ "type": "key", "id": "dev", "actions": [{ "type": "pause" }] }]),
            &host,
        )
        .await
        .unwrap();

    let err = session
        .dispatch(
            &json!([{ "type": "pointer", "id": "dev", "actions": [
                { "type": "pointerDown", "button": 0 }
            ]}]),
            &host,
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "invalid argument");
    assert!(err.to_string().contains("dev"));
    assert_eq!(
        session.input_state(&InputSourceId::new("dev")).map(|s| s.kind()),
        Some(SourceKind::Key)
    );
    assert!(host.events().is_empty());
}

#[tokio::test]
async fn pen_sources_register_but_fail_when_used() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    let err = session
        .dispatch(
            &json!([{
                "type": "pointer",
                "id": "stylus",
                "parameters": { "pointerType": "pen" },
                "actions": [{ "type": "pointerDown", "button": 0 }]
            }]),
            &host,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::UnsupportedOperation(_)));
    match session.input_state(&InputSourceId::new("stylus")) {
        Some(InputState::Pointer(pointer)) => {
            assert_eq!(pointer.subtype, PointerType::Pen);
            assert!(pointer.pressed.is_empty());
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn unsupported_source_keeps_sibling_actions_and_stops_later_ticks() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    let err = session
        .dispatch(
            &json!([
                { "type": "key", "id": "kbd", "actions": [
                    { "type": "keyDown", "value": "a" },
                    { "type": "keyDown", "value": "b" }
                ]},
                { "type": "pointer", "id": "stylus", "parameters": { "pointerType": "pen" }, "actions": [
                    { "type": "pointerDown", "button": 0 },
                    { "type": "pointerUp", "button": 0 }
                ]}
            ]),
            &host,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::UnsupportedOperation(_)));
    let keys: Vec<_> = host
        .key_events()
        .into_iter()
        .filter(|event| event.kind == KeyEventKind::KeyDown)
        .map(|event| event.key)
        .collect();
    assert_eq!(keys, vec!["a"]);
    assert!(host.mouse_events().is_empty());

    let kbd = key_state(&session, "kbd");
    assert!(kbd.is_pressed("a"));
    assert!(!kbd.is_pressed("b"));
    assert_eq!(session.pending_len(), 1);
}

#[tokio::test]
async fn out_of_bounds_move_keeps_sibling_actions_and_stops_later_ticks() {
    let session = session(Platform::Other);
    let host = RecordingHost::new(wd_actions::Viewport::new(200, 100));

    let err = session
        .dispatch(
            &json!([
                { "type": "key", "id": "kbd", "actions": [
                    { "type": "keyDown", "value": "a" },
                    { "type": "keyDown", "value": "b" }
                ]},
                { "type": "pointer", "id": "mouse", "actions": [
                    { "type": "pointerMove", "x": 5000, "y": 0 },
                    { "type": "pointerDown", "button": 0 }
                ]}
            ]),
            &host,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::MoveTargetOutOfBounds(_)));
    let keys: Vec<_> = host
        .key_events()
        .into_iter()
        .filter(|event| event.kind == KeyEventKind::KeyDown)
        .map(|event| event.key)
        .collect();
    assert_eq!(keys, vec!["a"]);
    assert!(host.mouse_events().is_empty());
    assert!(key_state(&session, "kbd").is_pressed("a"));
    assert!(!key_state(&session, "kbd").is_pressed("b"));
}

#[tokio::test]
async fn element_origin_uses_the_selected_centre_mode() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();
    host.add_element("el-1", wd_actions::Point::new(50, 60), wd_actions::Point::new(10, 20));

    let payload = json!([{ "type": "pointer", "id": "mouse", "actions": [
        { "type": "pointerMove", "origin": { ELEMENT_KEY: "el-1" }, "x": 5, "y": -10 }
    ]}]);

    session.dispatch(&payload, &host).await.unwrap();
    session
        .dispatch_with(&payload, &host, wd_actions::CenterMode::Legacy)
        .await
        .unwrap();

    assert_eq!(
        host.moves(),
        vec![wd_actions::Point::new(55, 50), wd_actions::Point::new(15, 10)]
    );
}

#[tokio::test]
async fn unknown_element_surfaces_the_host_error() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    let err = session
        .dispatch(
            &json!([{ "type": "pointer", "id": "mouse", "actions": [
                { "type": "pointerMove", "origin": { ELEMENT_KEY: "gone" } }
            ]}]),
            &host,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Host(HostError::NoSuchElement(_))));
    assert_eq!(err.code(), "no such element");
}

#[tokio::test]
async fn injection_failures_propagate_unmodified() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();
    host.fail_next(HostError::Injection("target closed".into()));

    let err = session
        .dispatch(
            &json!([{ "type": "key", "id": "kbd", "actions": [{ "type": "keyDown", "value": "a" }] }]),
            &host,
        )
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::Host(HostError::Injection("target closed".into())));
    // the press is recorded before injection, so it can still be released
    assert_eq!(session.pending_len(), 1);
}

#[tokio::test]
async fn reset_forgets_sources_and_pending_entries() {
    let session = session(Platform::Other);
    let host = RecordingHost::default();

    session
        .dispatch(
            &json!([{ "type": "key", "id": "kbd", "actions": [{ "type": "keyDown", "value": "a" }] }]),
            &host,
        )
        .await
        .unwrap();
    assert_eq!(session.pending_len(), 1);

    session.reset_input_state();
    assert_eq!(session.pending_len(), 0);
    assert!(session.input_state(&InputSourceId::new("kbd")).is_none());

    session
        .dispatch(
            &json!([{ "type": "pointer", "id": "kbd", "actions": [{ "type": "pause" }] }]),
            &host,
        )
        .await
        .unwrap();
}
