#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile-by-tile movement of grid objects.
//!
//! A [`GridMover`] drives one target object from tile to tile. It accepts a
//! direction while idle, checks the destination tile against the grid border,
//! collidable tiles and obstacles, and then animates the target towards the
//! destination centre over the following updates.
//!
//! The destination tile is recorded for the target the moment a move begins,
//! while its world position keeps animating from the old tile. Spatial
//! queries made during a move therefore already report the new tile.

mod keyboard;
mod random;
mod target;

use std::rc::Rc;

pub use keyboard::{KeyBindings, KeyboardGridMover, MoveTrigger};
pub use random::RandomGridMover;
pub use target::{Destination, TargetGridMover};

use tessera_core::{
    names, Direction, Event, EventEmitter, Index, MoveRestriction, Object, ObjectId, Property,
    Vec2,
};
use tessera_world::{can_collide, GridObject, ObjectHandle, Updatable, World};

/// What stops a target from entering a neighbouring tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// The tile lies outside the grid.
    Border(Index),
    /// The tile is collidable.
    Tile(Index),
    /// The tile holds an obstacle the target may not pass.
    Object(ObjectHandle),
}

/// State machine moving a single [`GridObject`] one tile at a time.
///
/// The mover is idle while it has no direction, committed once a direction
/// was accepted, and in transit while the target animates towards the
/// destination tile. The mover's own [`Object`] carries the
/// `GridMover_*` events; the target receives the matching `GridObject_*`
/// events.
#[derive(Debug)]
pub struct GridMover {
    object: Object,
    target: Option<ObjectHandle>,
    target_direction: Direction,
    current_direction: Direction,
    prev_direction: Direction,
    target_tile: Index,
    prev_tile: Index,
    moving: bool,
    frozen: bool,
    speed_multiplier: f32,
    move_restriction: MoveRestriction,
    alive: Rc<()>,
}

impl Default for GridMover {
    fn default() -> Self {
        Self::new()
    }
}

impl GridMover {
    /// Creates a mover without a target.
    #[must_use]
    pub fn new() -> Self {
        Self {
            object: Object::with_tag("GridMover"),
            target: None,
            target_direction: Direction::Unknown,
            current_direction: Direction::Unknown,
            prev_direction: Direction::Unknown,
            target_tile: Index::INVALID,
            prev_tile: Index::INVALID,
            moving: false,
            frozen: false,
            speed_multiplier: 1.0,
            move_restriction: MoveRestriction::None,
            alive: Rc::new(()),
        }
    }

    /// Creates a mover controlling `target`.
    ///
    /// The mover is returned without a target if `target` cannot be attached.
    pub fn with_target(world: &mut World, target: ObjectHandle) -> Self {
        let mut mover = Self::new();
        let _ = mover.set_target(world, Some(target));
        mover
    }

    /// Identity of the mover.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// The mover's own object.
    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Emitter carrying the `GridMover_*` events.
    #[must_use]
    pub fn events(&self) -> &EventEmitter<Event> {
        self.object.events()
    }

    /// Controlled object, if any.
    #[must_use]
    pub fn target(&self) -> Option<ObjectHandle> {
        self.target
    }

    /// Attaches the mover to `target`, or detaches it when `target` is `None`.
    ///
    /// A previous target that is mid-move is teleported onto its destination
    /// tile before it is released. Returns `false` when `target` no longer
    /// exists or is already controlled by another mover.
    pub fn set_target(&mut self, world: &mut World, target: Option<ObjectHandle>) -> bool {
        if target.is_some() && target == self.target {
            return true;
        }
        if let Some(handle) = target {
            let Some(object) = world.object(handle) else {
                log::warn!("mover {} cannot attach to a destroyed object", self.id());
                return false;
            };
            if object.mover().is_some_and(|mover| mover != self.id()) {
                log::warn!(
                    "mover {} cannot attach to {}: already controlled",
                    self.id(),
                    object.id()
                );
                return false;
            }
        }

        let previous = self.release_target(world);
        let current = target.and_then(|handle| {
            let object = world.object_mut(handle)?;
            let _ = object.attach_mover(self.id(), &self.alive);
            Some(object.id())
        });

        self.target = target;
        self.reset_state();
        let tile = target
            .and_then(|handle| world.child_tile(handle))
            .unwrap_or(Index::INVALID);
        self.target_tile = tile;
        self.prev_tile = tile;

        self.object.events().emit(
            names::GRID_MOVER_TARGET_CHANGE,
            &Event::TargetChanged { previous, current },
        );
        true
    }

    fn release_target(&mut self, world: &mut World) -> Option<ObjectId> {
        let handle = self.target?;
        self.teleport_target_to_destination(world);
        self.target = None;

        let object = world.object_mut(handle)?;
        let _ = object.detach_mover(self.id());
        Some(object.id())
    }

    fn reset_state(&mut self) {
        self.target_direction = Direction::Unknown;
        self.current_direction = Direction::Unknown;
        self.prev_direction = Direction::Unknown;
        self.moving = false;
    }

    /// Direction accepted by the last successful [`GridMover::request_move`],
    /// until the move ends or is rejected.
    #[must_use]
    pub fn target_direction(&self) -> Direction {
        self.target_direction
    }

    /// Direction of the current or last move.
    #[must_use]
    pub fn current_direction(&self) -> Direction {
        self.current_direction
    }

    /// Direction of the move before the current one.
    #[must_use]
    pub fn prev_direction(&self) -> Direction {
        self.prev_direction
    }

    /// Tile the target is heading to, or occupies when idle.
    #[must_use]
    pub fn target_tile(&self) -> Index {
        self.target_tile
    }

    /// Tile the target left when the current move began.
    #[must_use]
    pub fn prev_tile(&self) -> Index {
        self.prev_tile
    }

    /// Reports whether the target is between two tiles.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Reports whether a direction may be requested right now.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.moving && self.target_direction.is_unknown()
    }

    /// Tile the target stands on, or is leaving while a move is in progress.
    #[must_use]
    pub fn current_tile_index(&self, world: &World) -> Index {
        if self.moving {
            return self.prev_tile;
        }
        self.target
            .and_then(|target| world.child_tile(target))
            .unwrap_or(Index::INVALID)
    }

    /// Stops updates from advancing the target until [`GridMover::unfreeze`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Lets updates advance the target again.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Reports whether the mover is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Factor applied to the target's speed. Negative values are clamped to
    /// zero.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier.max(0.0);
        self.object.emit_change(Property::with_value(
            "speedMultiplier",
            self.speed_multiplier,
        ));
    }

    /// Factor applied to the target's speed.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Restricts the directions [`GridMover::request_move`] accepts.
    pub fn set_move_restriction(&mut self, restriction: MoveRestriction) {
        self.move_restriction = restriction;
    }

    /// Directions [`GridMover::request_move`] accepts.
    #[must_use]
    pub fn move_restriction(&self) -> MoveRestriction {
        self.move_restriction
    }

    /// Asks the mover to move its target one tile in `direction`.
    ///
    /// Only accepted while idle and when the move restriction permits the
    /// direction. On success the target faces `direction` and
    /// `GridMover_directionChange` fires; the move itself starts on the next
    /// update.
    pub fn request_move(&mut self, world: &mut World, direction: Direction) -> bool {
        if !self.is_idle() || !self.move_restriction.permits(direction) {
            return false;
        }
        let Some(target) = self.target.and_then(|target| world.object_mut(target)) else {
            return false;
        };

        self.target_direction = direction;
        target.set_direction(direction);
        self.object.events().emit(
            names::GRID_MOVER_DIRECTION_CHANGE,
            &Event::DirectionChanged { direction },
        );
        true
    }

    /// Reports what would stop the target from moving in `direction` from
    /// its current tile, if anything.
    #[must_use]
    pub fn blocker_in_direction(&self, world: &World, direction: Direction) -> Option<Blocker> {
        let handle = self.target?;
        let target = world.object(handle)?;
        let grid = world.grid(target.grid()?)?;
        let next = self.current_tile_index(world).neighbour(direction);

        if !grid.is_index_valid(next) {
            return Some(Blocker::Border(next));
        }
        if grid.tile(next).collidable {
            return Some(Blocker::Tile(next));
        }
        grid.children_in_tile(next)
            .into_iter()
            .filter(|other| *other != handle)
            .find(|other| {
                world.object(*other).is_some_and(|obstacle| {
                    obstacle.is_obstacle()
                        && obstacle.is_active()
                        && can_collide(target, obstacle)
                        && !target.passes_obstacle_group(obstacle.collidable().group())
                })
            })
            .map(Blocker::Object)
    }

    /// Reports whether a move in `direction` would be rejected.
    #[must_use]
    pub fn is_blocked_in_direction(&self, world: &World, direction: Direction) -> bool {
        self.blocker_in_direction(world, direction).is_some()
    }

    /// Rolls the destination back to the tile the target came from.
    ///
    /// A target in transit is snapped back onto that tile. Emits
    /// `GridMover_targetTileReset`.
    pub fn reset_target_tile(&mut self, world: &mut World) {
        if self.moving {
            if let Some(target) = self.target {
                let _ = world.change_child_tile(target, self.prev_tile);
            }
            self.moving = false;
            self.current_direction = self.prev_direction;
        }
        self.target_tile = self.prev_tile;
        self.target_direction = Direction::Unknown;
        self.object.events().emit(
            names::GRID_MOVER_TARGET_TILE_RESET,
            &Event::TargetTileReset {
                index: self.prev_tile,
            },
        );
    }

    /// Completes a move in progress instantly, placing the target on its
    /// destination tile centre.
    pub fn teleport_target_to_destination(&mut self, world: &mut World) {
        let Some(handle) = self.target else {
            return;
        };
        if !self.moving {
            return;
        }
        let Some(centre) = world
            .tile_occupied_by(handle)
            .map(tessera_world::Tile::centre)
        else {
            self.moving = false;
            self.target_direction = Direction::Unknown;
            return;
        };
        self.finish_move(world, handle, centre);
    }

    /// Copies the kinematic state of `other` so both movers advance in
    /// lockstep.
    ///
    /// Direction, tile bookkeeping, speed multiplier and the speed of the
    /// controlled object are copied.
    pub fn sync_with(&mut self, world: &mut World, other: &GridMover) {
        self.target_direction = other.target_direction;
        self.current_direction = other.current_direction;
        self.prev_direction = other.prev_direction;
        self.target_tile = other.target_tile;
        self.prev_tile = other.prev_tile;
        self.moving = other.moving;
        self.speed_multiplier = other.speed_multiplier;

        let speed = other
            .target
            .and_then(|handle| world.object(handle))
            .map(GridObject::speed);
        if let (Some(speed), Some(target)) =
            (speed, self.target.and_then(|handle| world.object_mut(handle)))
        {
            target.set_speed(speed);
        }
    }

    /// Advances the state machine by `dt` seconds.
    ///
    /// Does nothing without a target or while frozen. A target destroyed in
    /// the meantime is forgotten.
    pub fn update(&mut self, dt: f32, world: &mut World) {
        let Some(handle) = self.target else {
            return;
        };
        if self.frozen {
            return;
        }
        if !world.contains(handle) {
            log::debug!("mover {} lost its target", self.id());
            self.target = None;
            self.reset_state();
            return;
        }

        if !self.moving {
            if self.target_direction.is_unknown() {
                return;
            }
            if !self.begin_move(world, handle) {
                return;
            }
        }
        self.advance(dt, world, handle);
    }

    fn begin_move(&mut self, world: &mut World, handle: ObjectHandle) -> bool {
        let Some(current) = world.child_tile(handle) else {
            log::warn!("mover {} target is not in a grid", self.id());
            self.target_direction = Direction::Unknown;
            return false;
        };
        self.prev_tile = current;
        self.target_tile = current;

        if let Some(blocker) = self.blocker_in_direction(world, self.target_direction) {
            self.notify_blocked(world, handle, blocker);
            self.reset_target_tile(world);
            return false;
        }

        let next = current.neighbour(self.target_direction);
        let Some(position) = world.object(handle).map(GridObject::position) else {
            return false;
        };
        if !world.change_child_tile(handle, next) {
            self.reset_target_tile(world);
            return false;
        }
        let Some(target) = world.object_mut(handle) else {
            return false;
        };
        target.set_position(position);

        self.prev_direction = self.current_direction;
        self.current_direction = self.target_direction;
        self.target_tile = next;
        self.moving = true;

        let event = Event::MoveBegan {
            from: current,
            to: next,
        };
        self.object.events().emit(names::GRID_MOVER_MOVE_BEGIN, &event);
        target.events().emit(names::GRID_OBJECT_MOVE_BEGIN, &event);
        true
    }

    fn notify_blocked(&self, world: &World, handle: ObjectHandle, blocker: Blocker) {
        let Some(target) = world.object(handle) else {
            return;
        };
        match blocker {
            Blocker::Border(index) => {
                let event = Event::BorderCollision { index };
                self.object
                    .events()
                    .emit(names::GRID_MOVER_BORDER_COLLISION, &event);
                target
                    .events()
                    .emit(names::GRID_OBJECT_BORDER_COLLISION, &event);
            }
            Blocker::Tile(index) => {
                let event = Event::TileCollision { index };
                self.object
                    .events()
                    .emit(names::GRID_MOVER_TILE_COLLISION, &event);
                target.events().emit(names::GRID_OBJECT_TILE_COLLISION, &event);
            }
            Blocker::Object(obstacle) => self.notify_object_collision(world, handle, obstacle),
        }
    }

    fn notify_object_collision(&self, world: &World, handle: ObjectHandle, other: ObjectHandle) {
        let (Some(target), Some(obstacle)) = (world.object(handle), world.object(other)) else {
            return;
        };
        let event = Event::ObjectCollision {
            mover: target.id(),
            obstacle: obstacle.id(),
        };
        self.object
            .events()
            .emit(names::GRID_MOVER_OBJECT_COLLISION, &event);
        target
            .events()
            .emit(names::GRID_OBJECT_OBJECT_COLLISION, &event);
        obstacle
            .events()
            .emit(names::GRID_OBJECT_OBJECT_COLLISION, &event);
    }

    fn advance(&mut self, dt: f32, world: &mut World, handle: ObjectHandle) {
        let Some(centre) = world
            .tile_occupied_by(handle)
            .map(tessera_world::Tile::centre)
        else {
            self.moving = false;
            self.target_direction = Direction::Unknown;
            return;
        };
        let Some(target) = world.object(handle) else {
            return;
        };
        let speed = target.speed();
        debug_assert!(
            !self.move_restriction.allows_diagonal() || speed.x == speed.y,
            "diagonal movement requires equal horizontal and vertical speed"
        );

        let delta = self.current_direction.delta().as_vec2();
        let step = speed * dt * self.speed_multiplier;
        let remaining = centre - target.position();
        let arrived_x = delta.x == 0.0 || remaining.x.abs() <= step.x.abs();
        let arrived_y = delta.y == 0.0 || remaining.y.abs() <= step.y.abs();

        if arrived_x && arrived_y {
            self.finish_move(world, handle, centre);
            return;
        }

        let Some(target) = world.object_mut(handle) else {
            return;
        };
        target.events().emit(
            names::GRID_OBJECT_PRE_MOVE,
            &Event::PreMove {
                position: target.position(),
            },
        );
        target.translate(step * delta);
        target.events().emit(
            names::GRID_OBJECT_POST_MOVE,
            &Event::PostMove {
                position: target.position(),
            },
        );
    }

    fn finish_move(&mut self, world: &mut World, handle: ObjectHandle, centre: Vec2) {
        if let Some(target) = world.object_mut(handle) {
            target.set_position(centre);
        }
        self.moving = false;
        self.target_direction = Direction::Unknown;
        let index = self.target_tile;

        let others: Vec<ObjectHandle> = world
            .object(handle)
            .and_then(GridObject::grid)
            .map(|grid| world.children_in_tile(grid, index))
            .unwrap_or_default();
        for other in others.into_iter().filter(|other| *other != handle) {
            let collides = match (world.object(handle), world.object(other)) {
                (Some(target), Some(other)) => can_collide(target, other),
                _ => false,
            };
            if collides {
                self.notify_object_collision(world, handle, other);
            }
        }

        let event = Event::MoveEnded { index };
        self.object.events().emit(names::GRID_MOVER_MOVE_END, &event);
        if let Some(target) = world.object(handle) {
            target.events().emit(names::GRID_OBJECT_MOVE_END, &event);
        }
    }
}

impl Updatable for GridMover {
    fn update(&mut self, dt: f32, world: &mut World) {
        GridMover::update(self, dt, world);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tessera_world::Grid;

    use super::*;

    fn setup() -> (World, ObjectHandle, GridMover) {
        let mut world = World::new();
        let grid = world.add_grid(Grid::new(3, 3, Vec2::splat(32.0), '.'));
        let object = world.spawn(GridObject::new(Vec2::splat(16.0)).with_speed(Vec2::splat(32.0)));
        assert!(world.add_child(grid, object, Index::new(1, 1)));
        let mover = GridMover::with_target(&mut world, object);
        (world, object, mover)
    }

    #[test]
    fn committed_mover_rejects_further_requests() {
        let (mut world, _, mut mover) = setup();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _ = mover
            .events()
            .add_listener(names::GRID_MOVER_DIRECTION_CHANGE, move |_| {
                *sink.borrow_mut() += 1;
            });

        assert!(mover.request_move(&mut world, Direction::Left));
        assert!(!mover.request_move(&mut world, Direction::Up));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(mover.target_direction(), Direction::Left);
    }

    #[test]
    fn restriction_filters_requests() {
        let (mut world, _, mut mover) = setup();
        mover.set_move_restriction(MoveRestriction::Vertical);

        assert!(!mover.request_move(&mut world, Direction::Left));
        assert!(mover.request_move(&mut world, Direction::Up));
    }

    #[test]
    fn moves_reparent_immediately_and_arrive_later() {
        let (mut world, object, mut mover) = setup();
        assert!(mover.request_move(&mut world, Direction::Right));

        mover.update(0.25, &mut world);
        assert!(mover.is_moving());
        assert_eq!(world.child_tile(object), Some(Index::new(1, 2)));
        assert_eq!(mover.current_tile_index(&world), Index::new(1, 1));
        let position = world.object(object).expect("target").position();
        assert!((position.x - 56.0).abs() < 1e-4);

        for _ in 0..4 {
            mover.update(0.25, &mut world);
        }
        assert!(!mover.is_moving());
        assert!(mover.is_idle());
        let position = world.object(object).expect("target").position();
        assert_eq!(position, Vec2::new(80.0, 48.0));
    }

    #[test]
    fn border_blocks_and_resets() {
        let (mut world, object, mut mover) = setup();
        assert!(mover.request_move(&mut world, Direction::Up));
        mover.update(1.0, &mut world);
        assert!(mover.request_move(&mut world, Direction::Up));

        let borders = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&borders);
        let _ = mover
            .events()
            .add_listener(names::GRID_MOVER_BORDER_COLLISION, move |event| {
                if let Event::BorderCollision { index } = event {
                    sink.borrow_mut().push(*index);
                }
            });
        mover.update(1.0, &mut world);

        assert_eq!(*borders.borrow(), vec![Index::new(-1, 1)]);
        assert!(mover.is_idle());
        assert_eq!(world.child_tile(object), Some(Index::new(0, 1)));
    }

    #[test]
    fn frozen_mover_does_not_advance() {
        let (mut world, object, mut mover) = setup();
        assert!(mover.request_move(&mut world, Direction::Down));
        mover.freeze();
        mover.update(1.0, &mut world);
        assert!(!mover.is_moving());
        assert_eq!(world.child_tile(object), Some(Index::new(1, 1)));

        mover.unfreeze();
        mover.update(1.0, &mut world);
        assert_eq!(world.child_tile(object), Some(Index::new(2, 1)));
    }

    #[test]
    fn second_mover_cannot_steal_a_target() {
        let (mut world, object, mover) = setup();
        let mut thief = GridMover::new();

        assert!(!thief.set_target(&mut world, Some(object)));
        assert_eq!(
            world.object(object).expect("target").mover(),
            Some(mover.id())
        );

        drop(mover);
        assert!(thief.set_target(&mut world, Some(object)));
    }

    #[test]
    fn retargeting_teleports_the_previous_target() {
        let (mut world, object, mut mover) = setup();
        assert!(mover.request_move(&mut world, Direction::Left));
        mover.update(0.1, &mut world);
        assert!(mover.is_moving());

        assert!(mover.set_target(&mut world, None));

        let released = world.object(object).expect("target");
        assert_eq!(released.position(), Vec2::new(16.0, 48.0));
        assert_eq!(released.mover(), None);
    }

    #[test]
    fn destroyed_target_is_forgotten() {
        let (mut world, object, mut mover) = setup();
        assert!(world.destroy(object));

        mover.update(0.1, &mut world);

        assert_eq!(mover.target(), None);
    }
}
