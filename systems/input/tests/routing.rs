use std::{cell::RefCell, rc::Rc};

use tessera_core::{IVec2, Key, MouseButton, SystemEvent, SystemEventHandler};
use tessera_system_input::InputManager;

#[test]
fn first_finger_drives_the_left_button() {
    let mut input = InputManager::new();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    let _ = input
        .mouse()
        .on_button_down(move |button, position| sink.borrow_mut().push((button, position)));

    input.handle_event(&SystemEvent::TouchBegan {
        finger: 0,
        x: 5,
        y: 6,
    });
    input.handle_event(&SystemEvent::TouchBegan {
        finger: 1,
        x: 50,
        y: 60,
    });

    assert_eq!(*clicks.borrow(), vec![(MouseButton::Left, IVec2::new(5, 6))]);
    assert!(input.mouse().is_button_pressed(MouseButton::Left));

    input.handle_event(&SystemEvent::TouchEnded {
        finger: 0,
        x: 5,
        y: 6,
    });
    assert!(!input.mouse().is_button_pressed(MouseButton::Left));
}

#[test]
fn update_drives_held_callbacks_on_every_device() {
    let mut input = InputManager::new();
    let held = Rc::new(RefCell::new(Vec::new()));
    let (keys, buttons, pads) = (Rc::clone(&held), Rc::clone(&held), Rc::clone(&held));
    let _ = input
        .keyboard()
        .on_key_held(move |key| keys.borrow_mut().push(format!("{key:?}")));
    let _ = input
        .mouse()
        .on_button_held(move |button, _| buttons.borrow_mut().push(format!("{button:?}")));
    let _ = input
        .joystick()
        .on_button_held(move |joystick, button| pads.borrow_mut().push(format!("{joystick}/{button}")));

    input.handle_event(&SystemEvent::KeyPressed { key: Key::Space });
    input.handle_event(&SystemEvent::MouseButtonPressed {
        button: MouseButton::Middle,
        x: 0,
        y: 0,
    });
    input.handle_event(&SystemEvent::JoystickConnected { joystick: 0 });
    input.handle_event(&SystemEvent::JoystickButtonPressed {
        joystick: 0,
        button: 3,
    });
    input.update();

    assert_eq!(*held.borrow(), vec!["Space", "Middle", "0/3"]);

    held.borrow_mut().clear();
    input.set_all_enabled(false);
    input.update();
    assert!(held.borrow().is_empty());
    assert!(input.keyboard().is_key_pressed(Key::Space));
}
