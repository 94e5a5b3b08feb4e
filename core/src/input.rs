//! Platform-neutral system events.
//!
//! Rendering backends translate whatever their windowing layer produces into
//! [`SystemEvent`]s. Scenes, input devices and widgets only ever see these.

use serde::{Deserialize, Serialize};

/// Keyboard keys understood by the framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Key {
    Unknown,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Delete,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    Left,
    Right,
    Up,
    Down,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// First extra button.
    Extra1,
    /// Second extra button.
    Extra2,
}

/// Axis of a mouse wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseWheel {
    /// Regular wheel.
    Vertical,
    /// Tilt wheel or horizontal scroll.
    Horizontal,
}

/// Identification reported by a connected joystick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickIdentification {
    /// Human-readable device name.
    pub name: String,
    /// USB vendor identifier.
    pub vendor_id: u32,
    /// USB product identifier.
    pub product_id: u32,
}

/// Discriminant of a [`SystemEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SystemEventKind {
    Closed,
    Resized,
    LostFocus,
    GainedFocus,
    TextEntered,
    KeyPressed,
    KeyReleased,
    MouseWheelScrolled,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseEntered,
    MouseLeft,
    JoystickButtonPressed,
    JoystickButtonReleased,
    JoystickMoved,
    JoystickConnected,
    JoystickDisconnected,
    TouchBegan,
    TouchMoved,
    TouchEnded,
}

/// Window and input event delivered to scenes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SystemEvent {
    /// The window was asked to close.
    Closed,
    /// The window was resized.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The window lost focus.
    LostFocus,
    /// The window gained focus.
    GainedFocus,
    /// A character was typed.
    TextEntered {
        /// The typed character.
        character: char,
    },
    /// A key went down.
    KeyPressed {
        /// Key that went down.
        key: Key,
    },
    /// A key went up.
    KeyReleased {
        /// Key that went up.
        key: Key,
    },
    /// A mouse wheel moved.
    MouseWheelScrolled {
        /// Wheel that moved.
        wheel: MouseWheel,
        /// Scroll amount, positive is up or right.
        delta: f32,
        /// Cursor x position.
        x: i32,
        /// Cursor y position.
        y: i32,
    },
    /// A mouse button went down.
    MouseButtonPressed {
        /// Button that went down.
        button: MouseButton,
        /// Cursor x position.
        x: i32,
        /// Cursor y position.
        y: i32,
    },
    /// A mouse button went up.
    MouseButtonReleased {
        /// Button that went up.
        button: MouseButton,
        /// Cursor x position.
        x: i32,
        /// Cursor y position.
        y: i32,
    },
    /// The cursor moved inside the window.
    MouseMoved {
        /// Cursor x position.
        x: i32,
        /// Cursor y position.
        y: i32,
    },
    /// The cursor entered the window.
    MouseEntered,
    /// The cursor left the window.
    MouseLeft,
    /// A joystick button went down.
    JoystickButtonPressed {
        /// Joystick index.
        joystick: u32,
        /// Button index.
        button: u32,
    },
    /// A joystick button went up.
    JoystickButtonReleased {
        /// Joystick index.
        joystick: u32,
        /// Button index.
        button: u32,
    },
    /// A joystick axis moved.
    JoystickMoved {
        /// Joystick index.
        joystick: u32,
        /// Axis index.
        axis: u32,
        /// New axis position in `[-100, 100]`.
        position: f32,
    },
    /// A joystick was connected.
    JoystickConnected {
        /// Joystick index.
        joystick: u32,
    },
    /// A joystick was disconnected.
    JoystickDisconnected {
        /// Joystick index.
        joystick: u32,
    },
    /// A finger touched the screen.
    TouchBegan {
        /// Finger index.
        finger: u32,
        /// Touch x position.
        x: i32,
        /// Touch y position.
        y: i32,
    },
    /// A finger moved on the screen.
    TouchMoved {
        /// Finger index.
        finger: u32,
        /// Touch x position.
        x: i32,
        /// Touch y position.
        y: i32,
    },
    /// A finger left the screen.
    TouchEnded {
        /// Finger index.
        finger: u32,
        /// Touch x position.
        x: i32,
        /// Touch y position.
        y: i32,
    },
}

impl SystemEvent {
    /// Discriminant of the event.
    #[must_use]
    pub const fn kind(&self) -> SystemEventKind {
        match self {
            SystemEvent::Closed => SystemEventKind::Closed,
            SystemEvent::Resized { .. } => SystemEventKind::Resized,
            SystemEvent::LostFocus => SystemEventKind::LostFocus,
            SystemEvent::GainedFocus => SystemEventKind::GainedFocus,
            SystemEvent::TextEntered { .. } => SystemEventKind::TextEntered,
            SystemEvent::KeyPressed { .. } => SystemEventKind::KeyPressed,
            SystemEvent::KeyReleased { .. } => SystemEventKind::KeyReleased,
            SystemEvent::MouseWheelScrolled { .. } => SystemEventKind::MouseWheelScrolled,
            SystemEvent::MouseButtonPressed { .. } => SystemEventKind::MouseButtonPressed,
            SystemEvent::MouseButtonReleased { .. } => SystemEventKind::MouseButtonReleased,
            SystemEvent::MouseMoved { .. } => SystemEventKind::MouseMoved,
            SystemEvent::MouseEntered => SystemEventKind::MouseEntered,
            SystemEvent::MouseLeft => SystemEventKind::MouseLeft,
            SystemEvent::JoystickButtonPressed { .. } => SystemEventKind::JoystickButtonPressed,
            SystemEvent::JoystickButtonReleased { .. } => SystemEventKind::JoystickButtonReleased,
            SystemEvent::JoystickMoved { .. } => SystemEventKind::JoystickMoved,
            SystemEvent::JoystickConnected { .. } => SystemEventKind::JoystickConnected,
            SystemEvent::JoystickDisconnected { .. } => SystemEventKind::JoystickDisconnected,
            SystemEvent::TouchBegan { .. } => SystemEventKind::TouchBegan,
            SystemEvent::TouchMoved { .. } => SystemEventKind::TouchMoved,
            SystemEvent::TouchEnded { .. } => SystemEventKind::TouchEnded,
        }
    }

    /// Maps touch input onto mouse input.
    ///
    /// The first finger becomes the left mouse button; other fingers are
    /// dropped. Every other event passes through unchanged.
    #[must_use]
    pub fn normalize(self) -> Option<SystemEvent> {
        match self {
            SystemEvent::TouchBegan { finger: 0, x, y } => Some(SystemEvent::MouseButtonPressed {
                button: MouseButton::Left,
                x,
                y,
            }),
            SystemEvent::TouchMoved { finger: 0, x, y } => Some(SystemEvent::MouseMoved { x, y }),
            SystemEvent::TouchEnded { finger: 0, x, y } => {
                Some(SystemEvent::MouseButtonReleased {
                    button: MouseButton::Left,
                    x,
                    y,
                })
            }
            SystemEvent::TouchBegan { .. }
            | SystemEvent::TouchMoved { .. }
            | SystemEvent::TouchEnded { .. } => None,
            other => Some(other),
        }
    }
}

/// Participant that reacts to system events routed by a scene.
pub trait SystemEventHandler {
    /// Handles a single event.
    fn handle_event(&mut self, event: &SystemEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_finger_becomes_the_left_mouse_button() {
        let pressed = SystemEvent::TouchBegan { finger: 0, x: 4, y: 9 }.normalize();
        assert_eq!(
            pressed,
            Some(SystemEvent::MouseButtonPressed {
                button: MouseButton::Left,
                x: 4,
                y: 9
            })
        );
        assert_eq!(
            SystemEvent::TouchMoved { finger: 0, x: 1, y: 2 }.normalize(),
            Some(SystemEvent::MouseMoved { x: 1, y: 2 })
        );
        assert_eq!(
            SystemEvent::TouchEnded { finger: 1, x: 0, y: 0 }.normalize(),
            None
        );
    }

    #[test]
    fn other_events_pass_through() {
        let event = SystemEvent::KeyPressed { key: Key::Space };
        assert_eq!(event.clone().normalize(), Some(event.clone()));
        assert_eq!(event.kind(), SystemEventKind::KeyPressed);
    }
}
