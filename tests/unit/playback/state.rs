use std::{cell::RefCell, rc::Rc};

use super::*;

const ALL: [RendererState; 6] = [
    RendererState::Idle,
    RendererState::Ready,
    RendererState::Playing,
    RendererState::Paused,
    RendererState::Stopped,
    RendererState::Destroyed,
];

#[test]
fn allowed_graph() {
    use RendererState::*;

    let allowed = [
        (Idle, Ready),
        (Ready, Playing),
        (Ready, Destroyed),
        (Playing, Paused),
        (Playing, Stopped),
        (Playing, Destroyed),
        (Paused, Playing),
        (Paused, Stopped),
        (Paused, Destroyed),
        (Stopped, Ready),
        (Stopped, Destroyed),
    ];
    for from in ALL {
        for to in ALL {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn rejected_transition_keeps_state() {
    let sm = PlaybackStateMachine::new();
    let err = sm.transition(RendererState::Playing).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::InvalidStateTransition {
            from: RendererState::Idle,
            to: RendererState::Playing
        }
    ));
    assert_eq!(err.to_string(), "invalid state transition: idle -> playing");
    assert_eq!(sm.state(), RendererState::Idle);
}

#[test]
fn destroyed_is_absorbing() {
    let sm = PlaybackStateMachine::new();
    sm.transition(RendererState::Ready).unwrap();
    sm.transition(RendererState::Destroyed).unwrap();
    for to in ALL {
        assert!(!sm.can_transition(to));
        assert!(sm.transition(to).is_err());
    }
}

#[test]
fn subscribers_see_each_change() {
    let sm = PlaybackStateMachine::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let id = sm.subscribe(move |c| s.borrow_mut().push((c.previous, c.current)));

    sm.transition(RendererState::Ready).unwrap();
    let change = sm.transition(RendererState::Playing).unwrap();
    assert_eq!(change.previous, RendererState::Ready);
    assert!(change.timestamp <= SystemTime::now());

    assert!(sm.unsubscribe(id));
    sm.transition(RendererState::Paused).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            (RendererState::Idle, RendererState::Ready),
            (RendererState::Ready, RendererState::Playing),
        ]
    );
}
