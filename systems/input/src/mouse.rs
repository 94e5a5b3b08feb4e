//! Mouse device.

use tessera_core::{EventEmitter, IVec2, ListenerId, MouseButton, MouseWheel, SystemEvent};

use crate::buttons::Buttons;

const PRESS: &str = "press";
const RELEASE: &str = "release";
const HELD: &str = "held";
const MOVE: &str = "move";
const WHEEL: &str = "wheelScroll";
const ENTER: &str = "enter";
const LEAVE: &str = "leave";

#[derive(Clone, Copy, Debug)]
enum MouseEvent {
    Button(MouseButton, IVec2),
    Moved(IVec2),
    Wheel(MouseWheel, f32, IVec2),
    Window,
}

/// Mouse state and subscriptions.
///
/// Button callbacks follow the same edge rules as the keyboard. The cursor
/// position is the last position any mouse event reported, in window
/// coordinates.
pub struct Mouse {
    buttons: Buttons<MouseButton>,
    position: IVec2,
    inside: bool,
    emitter: EventEmitter<MouseEvent>,
    enabled: bool,
}

impl std::fmt::Debug for Mouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mouse")
            .field("down", &self.buttons.down())
            .field("position", &self.position)
            .field("inside", &self.inside)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new()
    }
}

impl Mouse {
    /// Creates an enabled mouse with no button down.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buttons: Buttons::default(),
            position: IVec2::ZERO,
            inside: false,
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

    /// Reports whether `button` is currently down.
    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.is_down(button)
    }

    /// Last known cursor position.
    #[must_use]
    pub fn position(&self) -> IVec2 {
        self.position
    }

    /// Reports whether the cursor is inside the window.
    #[must_use]
    pub fn is_inside_window(&self) -> bool {
        self.inside
    }

    /// Calls `callback` with the button and cursor position on a down edge.
    pub fn on_button_down<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(MouseButton, IVec2) + 'static,
    {
        self.subscribe_button(PRESS, callback)
    }

    /// Calls `callback` with the button and cursor position on an up edge.
    pub fn on_button_up<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(MouseButton, IVec2) + 'static,
    {
        self.subscribe_button(RELEASE, callback)
    }

    /// Calls `callback` on every update for each button that is down.
    pub fn on_button_held<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(MouseButton, IVec2) + 'static,
    {
        self.subscribe_button(HELD, callback)
    }

    fn subscribe_button<F>(&self, name: &str, mut callback: F) -> ListenerId
    where
        F: FnMut(MouseButton, IVec2) + 'static,
    {
        self.emitter.add_listener(name, move |event| {
            if let MouseEvent::Button(button, position) = event {
                callback(*button, *position);
            }
        })
    }

    /// Calls `callback` with the new cursor position whenever it moves.
    pub fn on_move<F: FnMut(IVec2) + 'static>(&self, mut callback: F) -> ListenerId {
        self.emitter.add_listener(MOVE, move |event| {
            if let MouseEvent::Moved(position) = event {
                callback(*position);
            }
        })
    }

    /// Calls `callback` with the wheel, the scroll amount and the cursor
    /// position whenever a wheel moves.
    pub fn on_wheel_scroll<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(MouseWheel, f32, IVec2) + 'static,
    {
        self.emitter.add_listener(WHEEL, move |event| {
            if let MouseEvent::Wheel(wheel, delta, position) = event {
                callback(*wheel, *delta, *position);
            }
        })
    }

    /// Calls `callback` when the cursor enters the window.
    pub fn on_mouse_enter<F: FnMut() + 'static>(&self, mut callback: F) -> ListenerId {
        self.emitter.add_listener(ENTER, move |_| callback())
    }

    /// Calls `callback` when the cursor leaves the window.
    pub fn on_mouse_leave<F: FnMut() + 'static>(&self, mut callback: F) -> ListenerId {
        self.emitter.add_listener(LEAVE, move |_| callback())
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.emitter.remove_listener(id)
    }

    /// Removes every subscription.
    pub fn clear_subscriptions(&self) {
        self.emitter.clear();
    }

    /// Consumes mouse events; other events are ignored.
    pub fn handle_event(&mut self, event: &SystemEvent) {
        match *event {
            SystemEvent::MouseButtonPressed { button, x, y } => {
                self.position = IVec2::new(x, y);
                if self.buttons.press(button) {
                    self.emit(PRESS, MouseEvent::Button(button, self.position));
                }
            }
            SystemEvent::MouseButtonReleased { button, x, y } => {
                self.position = IVec2::new(x, y);
                if self.buttons.release(button) {
                    self.emit(RELEASE, MouseEvent::Button(button, self.position));
                }
            }
            SystemEvent::MouseMoved { x, y } => {
                self.position = IVec2::new(x, y);
                self.emit(MOVE, MouseEvent::Moved(self.position));
            }
            SystemEvent::MouseWheelScrolled { wheel, delta, x, y } => {
                self.position = IVec2::new(x, y);
                self.emit(WHEEL, MouseEvent::Wheel(wheel, delta, self.position));
            }
            SystemEvent::MouseEntered => {
                self.inside = true;
                self.emit(ENTER, MouseEvent::Window);
            }
            SystemEvent::MouseLeft => {
                self.inside = false;
                self.emit(LEAVE, MouseEvent::Window);
            }
            _ => {}
        }
    }

    /// Fires the held callbacks for every button that is down.
    pub fn update(&mut self) {
        if !self.enabled {
            return;
        }
        let down = self.buttons.down().to_vec();
        for button in down {
            self.emitter
                .emit(HELD, &MouseEvent::Button(button, self.position));
        }
    }

    fn emit(&self, name: &str, event: MouseEvent) {
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
    fn tracks_position_and_buttons() {
        let mut mouse = Mouse::new();
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        let _ = mouse.on_button_down(move |button, position| {
            sink.borrow_mut().push((button, position));
        });

        mouse.handle_event(&SystemEvent::MouseMoved { x: 3, y: 4 });
        mouse.handle_event(&SystemEvent::MouseButtonPressed {
            button: MouseButton::Right,
            x: 10,
            y: 12,
        });

        assert_eq!(mouse.position(), IVec2::new(10, 12));
        assert!(mouse.is_button_pressed(MouseButton::Right));
        assert_eq!(
            *clicks.borrow(),
            vec![(MouseButton::Right, IVec2::new(10, 12))]
        );
    }

    #[test]
    fn window_and_wheel_callbacks() {
        let mut mouse = Mouse::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (enter, leave, wheel) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        let _ = mouse.on_mouse_enter(move || enter.borrow_mut().push("enter".to_owned()));
        let _ = mouse.on_mouse_leave(move || leave.borrow_mut().push("leave".to_owned()));
        let _ = mouse.on_wheel_scroll(move |_, delta, _| {
            wheel.borrow_mut().push(format!("wheel:{delta}"));
        });

        mouse.handle_event(&SystemEvent::MouseEntered);
        assert!(mouse.is_inside_window());
        mouse.handle_event(&SystemEvent::MouseWheelScrolled {
            wheel: MouseWheel::Vertical,
            delta: -1.0,
            x: 0,
            y: 0,
        });
        mouse.handle_event(&SystemEvent::MouseLeft);

        assert_eq!(*log.borrow(), vec!["enter", "wheel:-1", "leave"]);
        assert!(!mouse.is_inside_window());
    }
}
