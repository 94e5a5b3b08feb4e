//! Joystick device.

use std::collections::BTreeMap;

use tessera_core::{EventEmitter, JoystickIdentification, ListenerId, SystemEvent};

use crate::buttons::Buttons;

const PRESS: &str = "press";
const RELEASE: &str = "release";
const HELD: &str = "held";
const AXIS: &str = "axisMove";
const CONNECT: &str = "connect";
const DISCONNECT: &str = "disconnect";

#[derive(Clone, Copy, Debug)]
enum JoystickEvent {
    Button { joystick: u32, button: u32 },
    Axis { joystick: u32, axis: u32, position: f32 },
    Connection { joystick: u32 },
}

/// State of every joystick the platform reported, and subscriptions.
///
/// Disconnecting a joystick releases its buttons silently and forgets its
/// axes and identification.
pub struct Joystick {
    buttons: Buttons<(u32, u32)>,
    axes: BTreeMap<(u32, u32), f32>,
    connected: BTreeMap<u32, JoystickIdentification>,
    emitter: EventEmitter<JoystickEvent>,
    enabled: bool,
}

impl std::fmt::Debug for Joystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joystick")
            .field("connected", &self.connected)
            .field("down", &self.buttons.down())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Joystick {
    fn default() -> Self {
        Self::new()
    }
}

impl Joystick {
    /// Creates an enabled device without connected joysticks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buttons: Buttons::default(),
            axes: BTreeMap::new(),
            connected: BTreeMap::new(),
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

    /// Reports whether `joystick` is connected.
    #[must_use]
    pub fn is_connected(&self, joystick: u32) -> bool {
        self.connected.contains_key(&joystick)
    }

    /// Indices of connected joysticks in ascending order.
    pub fn connected(&self) -> impl Iterator<Item = u32> + '_ {
        self.connected.keys().copied()
    }

    /// Identification of a connected joystick.
    #[must_use]
    pub fn identification(&self, joystick: u32) -> Option<&JoystickIdentification> {
        self.connected.get(&joystick)
    }

    /// Records the identification the platform reports for `joystick`.
    ///
    /// Ignored for joysticks that are not connected.
    pub fn set_identification(&mut self, joystick: u32, identification: JoystickIdentification) {
        if let Some(entry) = self.connected.get_mut(&joystick) {
            *entry = identification;
        }
    }

    /// Reports whether `button` of `joystick` is down.
    #[must_use]
    pub fn is_button_pressed(&self, joystick: u32, button: u32) -> bool {
        self.buttons.is_down((joystick, button))
    }

    /// Last reported position of an axis, in `[-100, 100]`. Zero when the
    /// axis never moved.
    #[must_use]
    pub fn axis_position(&self, joystick: u32, axis: u32) -> f32 {
        self.axes.get(&(joystick, axis)).copied().unwrap_or(0.0)
    }

    /// Calls `callback` with the joystick and button on a down edge.
    pub fn on_button_press<F: FnMut(u32, u32) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe_button(PRESS, callback)
    }

    /// Calls `callback` with the joystick and button on an up edge.
    pub fn on_button_release<F: FnMut(u32, u32) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe_button(RELEASE, callback)
    }

    /// Calls `callback` on every update for each button that is down.
    pub fn on_button_held<F: FnMut(u32, u32) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe_button(HELD, callback)
    }

    fn subscribe_button<F>(&self, name: &str, mut callback: F) -> ListenerId
    where
        F: FnMut(u32, u32) + 'static,
    {
        self.emitter.add_listener(name, move |event| {
            if let JoystickEvent::Button { joystick, button } = event {
                callback(*joystick, *button);
            }
        })
    }

    /// Calls `callback` with the joystick, axis and position when an axis
    /// moves.
    pub fn on_axis_move<F>(&self, mut callback: F) -> ListenerId
    where
        F: FnMut(u32, u32, f32) + 'static,
    {
        self.emitter.add_listener(AXIS, move |event| {
            if let JoystickEvent::Axis {
                joystick,
                axis,
                position,
            } = event
            {
                callback(*joystick, *axis, *position);
            }
        })
    }

    /// Calls `callback` with the joystick index when one connects.
    pub fn on_connect<F: FnMut(u32) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe_connection(CONNECT, callback)
    }

    /// Calls `callback` with the joystick index when one disconnects.
    pub fn on_disconnect<F: FnMut(u32) + 'static>(&self, callback: F) -> ListenerId {
        self.subscribe_connection(DISCONNECT, callback)
    }

    fn subscribe_connection<F>(&self, name: &str, mut callback: F) -> ListenerId
    where
        F: FnMut(u32) + 'static,
    {
        self.emitter.add_listener(name, move |event| {
            if let JoystickEvent::Connection { joystick } = event {
                callback(*joystick);
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

    /// Consumes joystick events; other events are ignored.
    pub fn handle_event(&mut self, event: &SystemEvent) {
        match *event {
            SystemEvent::JoystickButtonPressed { joystick, button } => {
                if self.buttons.press((joystick, button)) {
                    self.emit(PRESS, JoystickEvent::Button { joystick, button });
                }
            }
            SystemEvent::JoystickButtonReleased { joystick, button } => {
                if self.buttons.release((joystick, button)) {
                    self.emit(RELEASE, JoystickEvent::Button { joystick, button });
                }
            }
            SystemEvent::JoystickMoved {
                joystick,
                axis,
                position,
            } => {
                let _ = self.axes.insert((joystick, axis), position);
                self.emit(
                    AXIS,
                    JoystickEvent::Axis {
                        joystick,
                        axis,
                        position,
                    },
                );
            }
            SystemEvent::JoystickConnected { joystick } => {
                if self
                    .connected
                    .insert(joystick, JoystickIdentification::default())
                    .is_none()
                {
                    log::debug!("joystick {joystick} connected");
                    self.emit(CONNECT, JoystickEvent::Connection { joystick });
                }
            }
            SystemEvent::JoystickDisconnected { joystick } => {
                if self.connected.remove(&joystick).is_some() {
                    log::debug!("joystick {joystick} disconnected");
                    self.buttons.release_where(|(owner, _)| *owner == joystick);
                    self.axes.retain(|(owner, _), _| *owner != joystick);
                    self.emit(DISCONNECT, JoystickEvent::Connection { joystick });
                }
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
        for (joystick, button) in down {
            self.emitter
                .emit(HELD, &JoystickEvent::Button { joystick, button });
        }
    }

    fn emit(&self, name: &str, event: JoystickEvent) {
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
    fn connection_lifecycle() {
        let mut joystick = Joystick::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (connect, disconnect) = (Rc::clone(&log), Rc::clone(&log));
        let _ = joystick.on_connect(move |index| connect.borrow_mut().push(format!("+{index}")));
        let _ =
            joystick.on_disconnect(move |index| disconnect.borrow_mut().push(format!("-{index}")));

        joystick.handle_event(&SystemEvent::JoystickConnected { joystick: 1 });
        joystick.set_identification(
            1,
            JoystickIdentification {
                name: "pad".to_owned(),
                vendor_id: 7,
                product_id: 9,
            },
        );
        joystick.handle_event(&SystemEvent::JoystickButtonPressed {
            joystick: 1,
            button: 0,
        });
        joystick.handle_event(&SystemEvent::JoystickMoved {
            joystick: 1,
            axis: 2,
            position: 55.0,
        });

        assert!(joystick.is_connected(1));
        assert_eq!(
            joystick.identification(1).map(|id| id.name.as_str()),
            Some("pad")
        );
        assert!(joystick.is_button_pressed(1, 0));
        assert_eq!(joystick.axis_position(1, 2), 55.0);

        joystick.handle_event(&SystemEvent::JoystickDisconnected { joystick: 1 });

        assert!(!joystick.is_connected(1));
        assert!(!joystick.is_button_pressed(1, 0));
        assert_eq!(joystick.axis_position(1, 2), 0.0);
        assert_eq!(*log.borrow(), vec!["+1", "-1"]);
    }
}
