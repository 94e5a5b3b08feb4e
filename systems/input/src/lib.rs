#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keyboard, mouse and joystick state with edge-triggered callbacks.
//!
//! Every scene owns an [`InputManager`]. The scene routes each normalized
//! [`SystemEvent`] to it and calls [`InputManager::update`] once per frame so
//! that held callbacks fire.

mod buttons;
mod joystick;
mod keyboard;
mod mouse;

pub use joystick::Joystick;
pub use keyboard::Keyboard;
pub use mouse::Mouse;

use tessera_core::{SystemEvent, SystemEventHandler};

/// The three input devices of a scene.
#[derive(Debug, Default)]
pub struct InputManager {
    keyboard: Keyboard,
    mouse: Mouse,
    joystick: Joystick,
}

impl InputManager {
    /// Creates a manager with every device enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyboard device.
    #[must_use]
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Mutable keyboard device.
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// Mouse device.
    #[must_use]
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    /// Mutable mouse device.
    pub fn mouse_mut(&mut self) -> &mut Mouse {
        &mut self.mouse
    }

    /// Joystick device.
    #[must_use]
    pub fn joystick(&self) -> &Joystick {
        &self.joystick
    }

    /// Mutable joystick device.
    pub fn joystick_mut(&mut self) -> &mut Joystick {
        &mut self.joystick
    }

    /// Enables or disables the callbacks of all three devices.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.keyboard.set_enabled(enabled);
        self.mouse.set_enabled(enabled);
        self.joystick.set_enabled(enabled);
    }

    /// Fires held callbacks on every device.
    pub fn update(&mut self) {
        self.keyboard.update();
        self.mouse.update();
        self.joystick.update();
    }
}

impl SystemEventHandler for InputManager {
    fn handle_event(&mut self, event: &SystemEvent) {
        let Some(event) = event.clone().normalize() else {
            return;
        };
        self.keyboard.handle_event(&event);
        self.mouse.handle_event(&event);
        self.joystick.handle_event(&event);
    }
}
