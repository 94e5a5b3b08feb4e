use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tessera_core::{Key, MouseButton, Result, SystemEvent, Vec2};
use tessera_engine::{Engine, EngineSettings, ManualClock};
use tessera_rendering::HeadlessTarget;
use tessera_scene::{Scene, SceneBehaviour, SceneState};

static ENGINES: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    ENGINES.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Listener {
    seen: Rc<RefCell<Vec<SystemEvent>>>,
}

impl SceneBehaviour for Listener {
    fn on_handle_event(&mut self, _: &mut SceneState, event: &SystemEvent) -> Result<()> {
        self.seen.borrow_mut().push(event.clone());
        Ok(())
    }
}

fn run_one_frame(events: Vec<SystemEvent>) -> Vec<SystemEvent> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut target = HeadlessTarget::new(Vec2::new(64.0, 64.0));
    for event in events {
        target.push_event(event);
    }

    let mut engine = Engine::new().expect("engine");
    engine
        .initialize(EngineSettings::default(), Box::new(target))
        .expect("initialize");
    engine.set_clock(Box::new(ManualClock::new(0.01)));
    engine.push_scene(Scene::new(
        "touch",
        Listener {
            seen: Rc::clone(&seen),
        },
    ));
    engine.start().expect("start");
    assert!(engine.frame().expect("frame"));

    seen.take()
}

#[test]
fn first_finger_touches_reach_scenes_as_left_clicks() {
    let _serial = serial();

    let seen = run_one_frame(vec![
        SystemEvent::TouchBegan {
            finger: 0,
            x: 10,
            y: 20,
        },
        SystemEvent::TouchBegan {
            finger: 3,
            x: 40,
            y: 50,
        },
    ]);

    assert_eq!(
        seen,
        vec![SystemEvent::MouseButtonPressed {
            button: MouseButton::Left,
            x: 10,
            y: 20,
        }]
    );
}

#[test]
fn a_whole_first_finger_gesture_becomes_mouse_input() {
    let _serial = serial();

    let seen = run_one_frame(vec![
        SystemEvent::TouchBegan {
            finger: 0,
            x: 1,
            y: 1,
        },
        SystemEvent::TouchMoved {
            finger: 0,
            x: 5,
            y: 6,
        },
        SystemEvent::TouchMoved {
            finger: 1,
            x: 9,
            y: 9,
        },
        SystemEvent::TouchEnded {
            finger: 0,
            x: 5,
            y: 6,
        },
        SystemEvent::KeyPressed {
            key: Key::A,
        },
    ]);

    assert_eq!(
        seen,
        vec![
            SystemEvent::MouseButtonPressed {
                button: MouseButton::Left,
                x: 1,
                y: 1,
            },
            SystemEvent::MouseMoved { x: 5, y: 6 },
            SystemEvent::MouseButtonReleased {
                button: MouseButton::Left,
                x: 5,
                y: 6,
            },
            SystemEvent::KeyPressed {
                key: Key::A,
            },
        ]
    );
}
