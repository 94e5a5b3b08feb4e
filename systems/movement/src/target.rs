//! Grid movement following a computed path.

use std::collections::VecDeque;

use tessera_core::{names, Direction, Event, Index};
use tessera_system_pathfinding::{
    AdjacencyList, AdjacencyOptions, BfsPathFinder, PathFinderStrategy,
};
use tessera_world::{ObjectHandle, Updatable, World};

use crate::GridMover;

/// Where a [`TargetGridMover`] is heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    /// Nowhere; the mover stands still.
    #[default]
    None,
    /// A fixed tile.
    Tile(Index),
    /// Whatever tile an object currently occupies.
    Object(ObjectHandle),
}

/// [`GridMover`] walking a path towards a tile or an object.
///
/// The path is planned with breadth-first search unless another strategy is
/// installed, avoiding collidable tiles and blocking obstacles. It is
/// re-planned when the destination changes, when a chased object moves to
/// another tile, and when the next step turns out to be blocked.
pub struct TargetGridMover {
    mover: GridMover,
    destination: Destination,
    strategy: Box<dyn PathFinderStrategy>,
    path: VecDeque<Index>,
    planned_for: Option<Index>,
    diagonal: bool,
    reached: bool,
}

impl std::fmt::Debug for TargetGridMover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetGridMover")
            .field("mover", &self.mover)
            .field("destination", &self.destination)
            .field("path", &self.path)
            .field("reached", &self.reached)
            .finish_non_exhaustive()
    }
}

impl TargetGridMover {
    /// Creates a path follower controlling `target`, without a destination.
    pub fn new(world: &mut World, target: ObjectHandle) -> Self {
        Self {
            mover: GridMover::with_target(world, target),
            destination: Destination::None,
            strategy: Box::new(BfsPathFinder),
            path: VecDeque::new(),
            planned_for: None,
            diagonal: false,
            reached: false,
        }
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

    /// Replaces the search strategy. The current path is dropped.
    pub fn set_path_finder(&mut self, strategy: Box<dyn PathFinderStrategy>) {
        self.strategy = strategy;
        self.forget_path();
    }

    /// Lets planned paths take diagonal steps when the move restriction
    /// permits them.
    pub fn set_diagonal_movement(&mut self, diagonal: bool) {
        self.diagonal = diagonal;
        self.forget_path();
    }

    /// Heads for `destination`.
    pub fn set_destination(&mut self, destination: Destination) {
        if self.destination != destination {
            self.destination = destination;
            self.reached = false;
            self.forget_path();
        }
    }

    /// Current destination.
    #[must_use]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Tile the mover is heading for right now.
    #[must_use]
    pub fn destination_index(&self, world: &World) -> Option<Index> {
        match self.destination {
            Destination::None => None,
            Destination::Tile(index) => Some(index),
            Destination::Object(handle) => world.child_tile(handle),
        }
    }

    /// Remaining steps of the planned path.
    #[must_use]
    pub fn path(&self) -> &VecDeque<Index> {
        &self.path
    }

    /// Reports whether the destination was reached and not left since.
    #[must_use]
    pub fn has_reached_destination(&self) -> bool {
        self.reached
    }

    fn forget_path(&mut self) {
        self.path.clear();
        self.planned_for = None;
    }

    /// Plans a path from the target's tile to the destination and emits
    /// `TargetGridMover_pathChange`. Returns the number of steps.
    pub fn replan(&mut self, world: &World) -> usize {
        self.forget_path();
        let Some(destination) = self.destination_index(world) else {
            return 0;
        };
        let Some(handle) = self.mover.target() else {
            return 0;
        };
        let Some(grid) = world.object(handle).and_then(|object| object.grid()) else {
            return 0;
        };

        let restriction = self.mover.move_restriction();
        let mut options = AdjacencyOptions {
            diagonal: self.diagonal && restriction.allows_diagonal(),
            avoid_obstacles: true,
            ignore: vec![handle],
        };
        if let Destination::Object(chased) = self.destination {
            options.ignore.push(chased);
        }
        let graph = AdjacencyList::from_grid(world, grid, &options);
        let source = self.mover.current_tile_index(world);
        self.path = self
            .strategy
            .find_path(&graph, source, destination)
            .into_iter()
            .collect();
        self.planned_for = Some(destination);

        let length = self.path.len();
        log::trace!(
            "mover {} planned {length} steps from {source} to {destination}",
            self.mover.id()
        );
        self.mover.events().emit(
            names::TARGET_GRID_MOVER_PATH_CHANGE,
            &Event::PathChanged { length },
        );
        length
    }

    /// Takes the next step of the path if idle, then advances the mover.
    pub fn update(&mut self, dt: f32, world: &mut World) {
        if self.mover.is_idle() {
            self.step(world);
        }
        self.mover.update(dt, world);
        if self.mover.is_idle() {
            self.check_arrival(world);
        }
    }

    fn step(&mut self, world: &mut World) {
        let Some(destination) = self.destination_index(world) else {
            return;
        };
        let current = self.mover.current_tile_index(world);
        if current == destination {
            return;
        }
        self.reached = false;

        if self.planned_for != Some(destination) || self.path.is_empty() {
            let _ = self.replan(world);
        }
        let direction = match self.open_step(world, current) {
            Some(direction) => direction,
            None => {
                let _ = self.replan(world);
                let Some(direction) = self.open_step(world, current) else {
                    return;
                };
                direction
            }
        };
        if self.mover.request_move(world, direction) {
            let _ = self.path.pop_front();
        }
    }

    fn open_step(&self, world: &World, current: Index) -> Option<Direction> {
        self.next_direction(current)
            .filter(|direction| !self.mover.is_blocked_in_direction(world, *direction))
    }

    fn next_direction(&self, current: Index) -> Option<Direction> {
        let next = *self.path.front()?;
        let direction = current.direction_to(next);
        self.mover
            .move_restriction()
            .permits(direction)
            .then_some(direction)
    }

    fn check_arrival(&mut self, world: &World) {
        let Some(destination) = self.destination_index(world) else {
            return;
        };
        if self.reached || self.mover.current_tile_index(world) != destination {
            return;
        }
        self.reached = true;
        self.forget_path();
        log::debug!("mover {} reached {destination}", self.mover.id());
        self.mover.events().emit(
            names::TARGET_GRID_MOVER_DESTINATION_REACHED,
            &Event::DestinationReached { index: destination },
        );
    }
}

impl Updatable for TargetGridMover {
    fn update(&mut self, dt: f32, world: &mut World) {
        TargetGridMover::update(self, dt, world);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tessera_core::Vec2;
    use tessera_system_pathfinding::DfsPathFinder;
    use tessera_world::{Grid, GridObject, GridParser};

    use super::*;

    fn maze() -> (World, tessera_world::GridHandle, ObjectHandle) {
        let map = GridParser::new()
            .parse(
                ".,.,.\n\
                 #,#,.\n\
                 .,.,.",
            )
            .expect("valid map");
        let mut grid = Grid::from_map(&map, Vec2::splat(10.0)).expect("rectangular");
        grid.set_collidable_by_id('#', true);
        let mut world = World::new();
        let grid = world.add_grid(grid);
        let chaser = world.spawn(GridObject::new(Vec2::splat(10.0)).with_speed(Vec2::splat(100.0)));
        assert!(world.add_child(grid, chaser, Index::new(0, 0)));
        (world, grid, chaser)
    }

    #[test]
    fn follows_the_path_and_reports_arrival_once() {
        let (mut world, _, chaser) = maze();
        let mut follower = TargetGridMover::new(&mut world, chaser);
        let reached = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reached);
        let _ = follower.mover().events().add_listener(
            names::TARGET_GRID_MOVER_DESTINATION_REACHED,
            move |event| {
                if let Event::DestinationReached { index } = event {
                    sink.borrow_mut().push(*index);
                }
            },
        );

        follower.set_destination(Destination::Tile(Index::new(2, 0)));
        for _ in 0..10 {
            follower.update(0.1, &mut world);
        }

        assert_eq!(world.child_tile(chaser), Some(Index::new(2, 0)));
        assert_eq!(*reached.borrow(), vec![Index::new(2, 0)]);
        assert!(follower.has_reached_destination());
    }

    #[test]
    fn chases_an_object_that_moves() {
        let (mut world, grid, chaser) = maze();
        let prey = world.spawn(GridObject::new(Vec2::splat(10.0)));
        assert!(world.add_child(grid, prey, Index::new(0, 2)));
        let mut follower = TargetGridMover::new(&mut world, chaser);
        follower.set_destination(Destination::Object(prey));

        follower.update(0.1, &mut world);
        assert_eq!(follower.path().len(), 1);

        assert!(world.change_child_tile(prey, Index::new(2, 2)));
        for _ in 0..10 {
            follower.update(0.1, &mut world);
        }

        assert_eq!(world.child_tile(chaser), Some(Index::new(2, 2)));
    }

    #[test]
    fn unreachable_destinations_leave_the_mover_idle() {
        let (mut world, _, chaser) = maze();
        let lengths = Rc::new(RefCell::new(Vec::new()));
        let mut follower = TargetGridMover::new(&mut world, chaser);
        let sink = Rc::clone(&lengths);
        let _ = follower
            .mover()
            .events()
            .add_listener(names::TARGET_GRID_MOVER_PATH_CHANGE, move |event| {
                if let Event::PathChanged { length } = event {
                    sink.borrow_mut().push(*length);
                }
            });

        follower.set_destination(Destination::Tile(Index::new(1, 0)));
        follower.update(0.1, &mut world);

        assert_eq!(world.child_tile(chaser), Some(Index::new(0, 0)));
        assert!(lengths.borrow().iter().all(|length| *length == 0));
    }

    #[test]
    fn depth_first_strategy_also_arrives() {
        let (mut world, _, chaser) = maze();
        let mut follower = TargetGridMover::new(&mut world, chaser);
        follower.set_path_finder(Box::new(DfsPathFinder));
        follower.set_destination(Destination::Tile(Index::new(2, 2)));

        for _ in 0..20 {
            follower.update(0.1, &mut world);
        }

        assert_eq!(world.child_tile(chaser), Some(Index::new(2, 2)));
    }
}
