//! Translation of macroquad input state into [`SystemEvent`]s.
//!
//! Macroquad exposes input as per-frame state rather than an event queue, so
//! the target samples it once per frame and synthesizes the edges.

use macroquad::input::{KeyCode, MouseButton as MacroquadButton};
use tessera_core::{Key, MouseButton, MouseWheel, SystemEvent};

/// Keys sampled every frame together with their framework counterpart.
pub(crate) const KEY_MAP: [(KeyCode, Key); 64] = [
    (KeyCode::A, Key::A),
    (KeyCode::B, Key::B),
    (KeyCode::C, Key::C),
    (KeyCode::D, Key::D),
    (KeyCode::E, Key::E),
    (KeyCode::F, Key::F),
    (KeyCode::G, Key::G),
    (KeyCode::H, Key::H),
    (KeyCode::I, Key::I),
    (KeyCode::J, Key::J),
    (KeyCode::K, Key::K),
    (KeyCode::L, Key::L),
    (KeyCode::M, Key::M),
    (KeyCode::N, Key::N),
    (KeyCode::O, Key::O),
    (KeyCode::P, Key::P),
    (KeyCode::Q, Key::Q),
    (KeyCode::R, Key::R),
    (KeyCode::S, Key::S),
    (KeyCode::T, Key::T),
    (KeyCode::U, Key::U),
    (KeyCode::V, Key::V),
    (KeyCode::W, Key::W),
    (KeyCode::X, Key::X),
    (KeyCode::Y, Key::Y),
    (KeyCode::Z, Key::Z),
    (KeyCode::Key0, Key::Num0),
    (KeyCode::Key1, Key::Num1),
    (KeyCode::Key2, Key::Num2),
    (KeyCode::Key3, Key::Num3),
    (KeyCode::Key4, Key::Num4),
    (KeyCode::Key5, Key::Num5),
    (KeyCode::Key6, Key::Num6),
    (KeyCode::Key7, Key::Num7),
    (KeyCode::Key8, Key::Num8),
    (KeyCode::Key9, Key::Num9),
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::Space, Key::Space),
    (KeyCode::Tab, Key::Tab),
    (KeyCode::Backspace, Key::Backspace),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::LeftShift, Key::LShift),
    (KeyCode::RightShift, Key::RShift),
    (KeyCode::LeftControl, Key::LControl),
    (KeyCode::RightControl, Key::RControl),
    (KeyCode::LeftAlt, Key::LAlt),
    (KeyCode::RightAlt, Key::RAlt),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::F1, Key::F1),
    (KeyCode::F2, Key::F2),
    (KeyCode::F3, Key::F3),
    (KeyCode::F4, Key::F4),
    (KeyCode::F5, Key::F5),
    (KeyCode::F6, Key::F6),
    (KeyCode::F7, Key::F7),
    (KeyCode::F8, Key::F8),
    (KeyCode::F9, Key::F9),
    (KeyCode::F10, Key::F10),
    (KeyCode::F11, Key::F11),
    (KeyCode::F12, Key::F12),
];

/// Mouse buttons macroquad reports.
pub(crate) const BUTTON_MAP: [(MacroquadButton, MouseButton); 3] = [
    (MacroquadButton::Left, MouseButton::Left),
    (MacroquadButton::Right, MouseButton::Right),
    (MacroquadButton::Middle, MouseButton::Middle),
];

/// Events for one frame of wheel movement; one per axis that moved.
pub(crate) fn wheel_events(delta: (f32, f32), cursor: (i32, i32)) -> Vec<SystemEvent> {
    let (horizontal, vertical) = delta;
    let (x, y) = cursor;
    let mut events = Vec::new();
    if vertical != 0.0 {
        events.push(SystemEvent::MouseWheelScrolled {
            wheel: MouseWheel::Vertical,
            delta: vertical,
            x,
            y,
        });
    }
    if horizontal != 0.0 {
        events.push(SystemEvent::MouseWheelScrolled {
            wheel: MouseWheel::Horizontal,
            delta: horizontal,
            x,
            y,
        });
    }
    events
}

/// Rounds a macroquad cursor position to whole pixels.
pub(crate) fn pixel(position: (f32, f32)) -> (i32, i32) {
    (position.0.round() as i32, position.1.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_key(code: KeyCode) -> Key {
        KEY_MAP
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map_or(Key::Unknown, |(_, key)| *key)
    }

    #[test]
    fn letters_digits_and_arrows_translate() {
        assert_eq!(translate_key(KeyCode::W), Key::W);
        assert_eq!(translate_key(KeyCode::Key7), Key::Num7);
        assert_eq!(translate_key(KeyCode::Left), Key::Left);
        assert_eq!(translate_key(KeyCode::LeftShift), Key::LShift);
        assert_eq!(translate_key(KeyCode::Unknown), Key::Unknown);
    }

    #[test]
    fn every_mapped_key_is_distinct() {
        for (index, (_, key)) in KEY_MAP.iter().enumerate() {
            assert!(KEY_MAP[index + 1..]
                .iter()
                .all(|(_, other)| other != key));
        }
    }

    #[test]
    fn wheel_axes_produce_separate_events() {
        assert!(wheel_events((0.0, 0.0), (1, 2)).is_empty());

        let events = wheel_events((-1.0, 2.0), (3, 4));

        assert_eq!(
            events,
            vec![
                SystemEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Vertical,
                    delta: 2.0,
                    x: 3,
                    y: 4,
                },
                SystemEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Horizontal,
                    delta: -1.0,
                    x: 3,
                    y: 4,
                },
            ]
        );
    }

    #[test]
    fn cursor_positions_round_to_pixels() {
        assert_eq!(pixel((10.4, 19.6)), (10, 20));
    }
}
