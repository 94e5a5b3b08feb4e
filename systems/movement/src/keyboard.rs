//! Grid movement driven by the keyboard.

use tessera_core::{Direction, Key, SystemEvent, SystemEventHandler};
use tessera_world::{ObjectHandle, Updatable, World};

use crate::GridMover;

/// Keys mapped to the four cardinal directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    /// Key moving left.
    pub left: Key,
    /// Key moving right.
    pub right: Key,
    /// Key moving up.
    pub up: Key,
    /// Key moving down.
    pub down: Key,
}

impl KeyBindings {
    /// The arrow keys.
    pub const ARROWS: KeyBindings = KeyBindings::new(Key::Left, Key::Right, Key::Up, Key::Down);

    /// The W, A, S and D keys.
    pub const WASD: KeyBindings = KeyBindings::new(Key::A, Key::D, Key::W, Key::S);

    /// Custom bindings.
    #[must_use]
    pub const fn new(left: Key, right: Key, up: Key, down: Key) -> Self {
        Self {
            left,
            right,
            up,
            down,
        }
    }

    /// Direction bound to `key`, if any.
    #[must_use]
    pub fn direction(&self, key: Key) -> Option<Direction> {
        match key {
            key if key == self.left => Some(Direction::Left),
            key if key == self.right => Some(Direction::Right),
            key if key == self.up => Some(Direction::Up),
            key if key == self.down => Some(Direction::Down),
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::ARROWS
    }
}

/// When a bound key produces a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveTrigger {
    /// One move per key press.
    #[default]
    OnKeyDown,
    /// Moves keep coming while the key is held.
    OnKeyHeld,
}

/// [`GridMover`] steered by key events.
///
/// Key events only record intent; the move is requested on the next update,
/// which is where the mover has access to the world. With
/// [`MoveTrigger::OnKeyHeld`] the most recently pressed key that is still
/// held wins.
#[derive(Debug, Default)]
pub struct KeyboardGridMover {
    mover: GridMover,
    bindings: KeyBindings,
    trigger: MoveTrigger,
    pending: Option<Direction>,
    held: Vec<Key>,
}

impl KeyboardGridMover {
    /// Creates a keyboard mover controlling `target` with arrow bindings.
    pub fn new(world: &mut World, target: ObjectHandle) -> Self {
        Self {
            mover: GridMover::with_target(world, target),
            ..Self::default()
        }
    }

    /// Replaces the key bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replaces the trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: MoveTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Key bindings in use.
    #[must_use]
    pub fn bindings(&self) -> KeyBindings {
        self.bindings
    }

    /// Changes the key bindings and forgets held keys.
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
        self.held.clear();
        self.pending = None;
    }

    /// Trigger in use.
    #[must_use]
    pub fn trigger(&self) -> MoveTrigger {
        self.trigger
    }

    /// Changes the trigger.
    pub fn set_trigger(&mut self, trigger: MoveTrigger) {
        self.trigger = trigger;
    }

    /// Underlying mover.
    #[must_use]
    pub fn mover(&self) -> &GridMover {
        &self.mover
    }

    /// Mutable underlying mover.
    pub fn mover_mut(&mut self) -> &mut GridMover {
        &mut self.mover
    }

    /// Advances the mover, first requesting any move the keyboard asked for.
    pub fn update(&mut self, dt: f32, world: &mut World) {
        if self.mover.is_idle() {
            let direction = match self.trigger {
                MoveTrigger::OnKeyDown => self.pending.take(),
                MoveTrigger::OnKeyHeld => self
                    .held
                    .last()
                    .and_then(|key| self.bindings.direction(*key)),
            };
            if let Some(direction) = direction {
                let _ = self.mover.request_move(world, direction);
            }
        }
        self.mover.update(dt, world);
    }
}

impl SystemEventHandler for KeyboardGridMover {
    fn handle_event(&mut self, event: &SystemEvent) {
        match event {
            SystemEvent::KeyPressed { key } => {
                let Some(direction) = self.bindings.direction(*key) else {
                    return;
                };
                if !self.held.contains(key) {
                    self.held.push(*key);
                    self.pending = Some(direction);
                }
            }
            SystemEvent::KeyReleased { key } => self.held.retain(|held| held != key),
            SystemEvent::LostFocus => {
                self.held.clear();
                self.pending = None;
            }
            _ => {}
        }
    }
}

impl Updatable for KeyboardGridMover {
    fn update(&mut self, dt: f32, world: &mut World) {
        KeyboardGridMover::update(self, dt, world);
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::{Index, Vec2};
    use tessera_world::{Grid, GridObject};

    use super::*;

    fn setup() -> (World, ObjectHandle) {
        let mut world = World::new();
        let grid = world.add_grid(Grid::new(5, 5, Vec2::splat(10.0), '.'));
        let object = world.spawn(GridObject::new(Vec2::splat(10.0)).with_speed(Vec2::splat(100.0)));
        assert!(world.add_child(grid, object, Index::new(2, 2)));
        (world, object)
    }

    #[test]
    fn key_down_moves_one_tile_per_press() {
        let (mut world, object) = setup();
        let mut player = KeyboardGridMover::new(&mut world, object).with_bindings(KeyBindings::WASD);

        player.handle_event(&SystemEvent::KeyPressed { key: Key::D });
        for _ in 0..3 {
            player.update(0.1, &mut world);
        }

        assert_eq!(world.child_tile(object), Some(Index::new(2, 3)));
    }

    #[test]
    fn held_keys_keep_moving_until_released() {
        let (mut world, object) = setup();
        let mut player =
            KeyboardGridMover::new(&mut world, object).with_trigger(MoveTrigger::OnKeyHeld);

        player.handle_event(&SystemEvent::KeyPressed { key: Key::Up });
        player.update(0.1, &mut world);
        player.update(0.1, &mut world);
        assert_eq!(world.child_tile(object), Some(Index::new(0, 2)));

        player.handle_event(&SystemEvent::KeyReleased { key: Key::Up });
        player.update(0.1, &mut world);
        assert_eq!(world.child_tile(object), Some(Index::new(0, 2)));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let (mut world, object) = setup();
        let mut player = KeyboardGridMover::new(&mut world, object);

        player.handle_event(&SystemEvent::KeyPressed { key: Key::Q });
        player.update(0.1, &mut world);

        assert_eq!(world.child_tile(object), Some(Index::new(2, 2)));
    }
}
