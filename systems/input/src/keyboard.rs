//! Keyboard device.

use tessera_core::{EventEmitter, Key, ListenerId, SystemEvent};

use crate::buttons::Buttons;

const PRESS: &str = "press";
const RELEASE: &str = "release";
const HELD: &str = "held";
const TEXT: &str = "textEntered";

#[derive(Clone, Copy, Debug)]
enum KeyboardEvent {
    Key(Key),
    Text(char),
}

/// Keyboard state and key subscriptions.
///
/// Press callbacks fire once per down edge, release callbacks once per up
/// edge, and held callbacks once per [`Keyboard::update`] for every key that
/// is down. Platform key repeat does not produce extra presses.
pub struct Keyboard {
    keys: Buttons<Key>,
    emitter: EventEmitter<KeyboardEvent>,
    enabled: bool,
}

impl std::fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboard")
            .field("down", &self.keys.down())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    /// Creates an enabled keyboard with no key down.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Buttons::default(),
            emitter: EventEmitter::new(),
            enabled: true,
        }
    }

    /// Enables or disables callbacks. Polling keeps working while disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Reports whether callbacks fire.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports whether `key` is currently down.
    #[must_use]
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys.is_down(key)
    }

    /// Keys currently down, oldest first.
    #[must_use]
    pub fn pressed_keys(&self) -> &[Key] {
        self.keys.down()
    }

    /// Calls `callback` when any key goes down.
    pub fn on_key_down<F: FnMut(Key) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe(PRESS, None, callback)
    }

    /// Calls `callback` when any key goes up.
    pub fn on_key_up<F: FnMut(Key) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe(RELEASE, None, callback)
    }

    /// Calls `callback` on every update for each key that is down.
    pub fn on_key_held<F: FnMut(Key) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe(HELD, None, callback)
    }

    /// Calls `callback` when `key` goes down.
    pub fn on_key_press<F: FnMut(Key) + 'static>(&self, key: Key, callback: F) -> ListenerId {
        self.subscribe(PRESS, Some(key), callback)
    }

    /// Calls `callback` when `key` goes up.
    pub fn on_key_release<F: FnMut(Key) + 'static>(&self, key: Key, callback: F) -> ListenerId {
        self.subscribe(RELEASE, Some(key), callback)
    }

    /// Calls `callback` on every update while `key` is down.
    pub fn on_key_hold<F: FnMut(Key) + 'static>(&self, key: Key, callback: F) -> ListenerId {
        self.subscribe(HELD, Some(key), callback)
    }

    /// Calls `callback` with every character typed.
    pub fn on_text_entered<F: FnMut(char) + 'static>(&self, mut callback: F) -> ListenerId {
        self.emitter.add_listener(TEXT, move |event| {
            if let KeyboardEvent::Text(character) = event {
                callback(*character);
            }
        })
    }

    fn subscribe<F>(&self, name: &str, only: Option<Key>, mut callback: F) -> ListenerId
    where
        F: FnMut(Key) + 'static,
    {
        self.emitter.add_listener(name, move |event| {
            if let KeyboardEvent::Key(key) = event {
                if only.map_or(true, |only| only == *key) {
                    callback(*key);
                }
            }
        })
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.emitter.remove_listener(id)
    }

    /// Removes every subscription.
    pub fn clear_subscriptions(&self) {
        self.emitter.clear();
    }

    /// Consumes keyboard events; other events are ignored.
    pub fn handle_event(&mut self, event: &SystemEvent) {
        match event {
            SystemEvent::KeyPressed { key } => {
                if self.keys.press(*key) {
                    self.emit(PRESS, KeyboardEvent::Key(*key));
                }
            }
            SystemEvent::KeyReleased { key } => {
                if self.keys.release(*key) {
                    self.emit(RELEASE, KeyboardEvent::Key(*key));
                }
            }
            SystemEvent::TextEntered { character } => {
                self.emit(TEXT, KeyboardEvent::Text(*character));
            }
            _ => {}
        }
    }

    /// Fires the held callbacks for every key that is down.
    pub fn update(&mut self) {
        if !self.enabled {
            return;
        }
        let down = self.keys.down().to_vec();
        for key in down {
            self.emitter.emit(HELD, &KeyboardEvent::Key(key));
        }
    }

    fn emit(&self, name: &str, event: KeyboardEvent) {
        if self.enabled {
            self.emitter.emit(name, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn auto_repeat_does_not_press_twice() {
        let mut keyboard = Keyboard::new();
        let presses = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&presses);
        let _ = keyboard.on_key_down(move |key| sink.borrow_mut().push(key));

        keyboard.handle_event(&SystemEvent::KeyPressed { key: Key::A });
        keyboard.handle_event(&SystemEvent::KeyPressed { key: Key::A });
        keyboard.handle_event(&SystemEvent::KeyReleased { key: Key::A });
        keyboard.handle_event(&SystemEvent::KeyPressed { key: Key::A });

        assert_eq!(*presses.borrow(), vec![Key::A, Key::A]);
    }

    #[test]
    fn per_key_subscriptions_filter() {
        let mut keyboard = Keyboard::new();
        let releases = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&releases);
        let _ = keyboard.on_key_release(Key::Space, move |_| *sink.borrow_mut() += 1);

        for key in [Key::Space, Key::Enter] {
            keyboard.handle_event(&SystemEvent::KeyPressed { key });
            keyboard.handle_event(&SystemEvent::KeyReleased { key });
        }

        assert_eq!(*releases.borrow(), 1);
    }

    #[test]
    fn held_fires_every_update_while_down() {
        let mut keyboard = Keyboard::new();
        let held = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&held);
        let _ = keyboard.on_key_hold(Key::W, move |_| *sink.borrow_mut() += 1);

        keyboard.handle_event(&SystemEvent::KeyPressed { key: Key::W });
        keyboard.update();
        keyboard.update();
        keyboard.handle_event(&SystemEvent::KeyReleased { key: Key::W });
        keyboard.update();

        assert_eq!(*held.borrow(), 2);
    }

    #[test]
    fn disabled_keyboard_still_polls() {
        let mut keyboard = Keyboard::new();
        let typed = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&typed);
        let _ = keyboard.on_text_entered(move |character| sink.borrow_mut().push(character));
        keyboard.set_enabled(false);

        keyboard.handle_event(&SystemEvent::KeyPressed { key: Key::B });
        keyboard.handle_event(&SystemEvent::TextEntered { character: 'b' });

        assert!(keyboard.is_key_pressed(Key::B));
        assert!(typed.borrow().is_empty());

        keyboard.set_enabled(true);
        keyboard.handle_event(&SystemEvent::TextEntered { character: 'c' });
        assert_eq!(*typed.borrow(), "c");
    }
}
