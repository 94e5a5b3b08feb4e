//! Grid movement wandering in random directions.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::Direction;
use tessera_world::{ObjectHandle, Updatable, World};

use crate::GridMover;

/// [`GridMover`] that picks a random open direction whenever it is idle.
///
/// Directions leading into a border, a collidable tile or a blocking obstacle
/// are never picked. Turning back is avoided unless it is the only open
/// direction. The generator is seeded, so a seed reproduces a walk exactly.
#[derive(Debug)]
pub struct RandomGridMover {
    mover: GridMover,
    rng: ChaCha8Rng,
    enabled: bool,
}

impl RandomGridMover {
    /// Creates a wanderer controlling `target`.
    pub fn new(world: &mut World, target: ObjectHandle, seed: u64) -> Self {
        Self {
            mover: GridMover::with_target(world, target),
            rng: ChaCha8Rng::seed_from_u64(seed),
            enabled: true,
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

    /// Starts or stops picking new directions. A move in progress finishes
    /// either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Reports whether new directions are picked.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open directions the wanderer may pick from its current tile.
    #[must_use]
    pub fn open_directions(&self, world: &World) -> Vec<Direction> {
        let restriction = self.mover.move_restriction();
        let candidates: &[Direction] = if restriction.allows_diagonal()
            && !restriction.permits(Direction::Left)
        {
            &Direction::ALL
        } else {
            &Direction::CARDINAL
        };
        candidates
            .iter()
            .copied()
            .filter(|direction| restriction.permits(*direction))
            .filter(|direction| !self.mover.is_blocked_in_direction(world, *direction))
            .collect()
    }

    /// Picks a direction if idle, then advances the mover.
    pub fn update(&mut self, dt: f32, world: &mut World) {
        if self.enabled && self.mover.is_idle() {
            let open = self.open_directions(world);
            let back = self.mover.current_direction().opposite();
            let forward: Vec<Direction> = open
                .iter()
                .copied()
                .filter(|direction| *direction != back)
                .collect();
            let pool = if forward.is_empty() { &open } else { &forward };
            if let Some(direction) = pool.choose(&mut self.rng) {
                let _ = self.mover.request_move(world, *direction);
            }
        }
        self.mover.update(dt, world);
    }
}

impl Updatable for RandomGridMover {
    fn update(&mut self, dt: f32, world: &mut World) {
        RandomGridMover::update(self, dt, world);
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::{Index, Vec2};
    use tessera_world::{Grid, GridObject};

    use super::*;

    fn corridor() -> (World, ObjectHandle) {
        let mut world = World::new();
        let grid = world.add_grid(Grid::new(1, 4, Vec2::splat(10.0), '.'));
        let object = world.spawn(GridObject::new(Vec2::splat(10.0)).with_speed(Vec2::splat(100.0)));
        assert!(world.add_child(grid, object, Index::new(0, 0)));
        (world, object)
    }

    #[test]
    fn walks_a_corridor_without_turning_back() {
        let (mut world, object) = corridor();
        let mut wanderer = RandomGridMover::new(&mut world, object, 7);

        for expected in 1..4 {
            wanderer.update(0.1, &mut world);
            assert_eq!(world.child_tile(object), Some(Index::new(0, expected)));
        }

        wanderer.update(0.1, &mut world);
        assert_eq!(world.child_tile(object), Some(Index::new(0, 2)));
    }

    #[test]
    fn equal_seeds_give_equal_walks() {
        let walk = |seed| {
            let mut world = World::new();
            let grid = world.add_grid(Grid::new(6, 6, Vec2::splat(10.0), '.'));
            let object =
                world.spawn(GridObject::new(Vec2::splat(10.0)).with_speed(Vec2::splat(100.0)));
            assert!(world.add_child(grid, object, Index::new(3, 3)));
            let mut wanderer = RandomGridMover::new(&mut world, object, seed);
            (0..20)
                .map(|_| {
                    wanderer.update(0.1, &mut world);
                    world.child_tile(object).expect("in grid")
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(walk(42), walk(42));
    }

    #[test]
    fn disabled_wanderer_stays_put() {
        let (mut world, object) = corridor();
        let mut wanderer = RandomGridMover::new(&mut world, object, 1);
        wanderer.set_enabled(false);

        wanderer.update(0.1, &mut world);

        assert_eq!(world.child_tile(object), Some(Index::new(0, 0)));
    }
}
