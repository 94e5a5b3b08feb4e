use std::{cell::RefCell, rc::Rc};

use tessera_core::{names, Direction, Event, Index, Vec2};
use tessera_system_movement::GridMover;
use tessera_world::{Grid, GridHandle, GridObject, ObjectHandle, World};

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, emitter: &tessera_core::EventEmitter<Event>, prefix: &'static str) {
    for name in [
        names::GRID_MOVER_DIRECTION_CHANGE,
        names::GRID_MOVER_MOVE_BEGIN,
        names::GRID_MOVER_MOVE_END,
        names::GRID_MOVER_TILE_COLLISION,
        names::GRID_MOVER_OBJECT_COLLISION,
        names::GRID_OBJECT_OBJECT_COLLISION,
    ] {
        let sink = Rc::clone(log);
        let _ = emitter.add_listener(name, move |event| {
            let entry = match event {
                Event::DirectionChanged { direction } => format!("{prefix}:direction:{direction:?}"),
                Event::MoveBegan { to, .. } => format!("{prefix}:begin:{to}"),
                Event::MoveEnded { index } => format!("{prefix}:end:{index}"),
                Event::TileCollision { index } => format!("{prefix}:tile:{index}"),
                Event::ObjectCollision { .. } => format!("{prefix}:object"),
                other => format!("{prefix}:unexpected:{other:?}"),
            };
            sink.borrow_mut().push(entry);
        });
    }
}

fn three_by_three() -> (World, GridHandle, ObjectHandle) {
    let mut world = World::new();
    let grid = world.add_grid(Grid::new(3, 3, Vec2::splat(32.0), '.'));
    let walker = world.spawn(GridObject::new(Vec2::splat(32.0)).with_speed(Vec2::splat(64.0)));
    assert!(world.add_child(grid, walker, Index::new(1, 1)));
    (world, grid, walker)
}

#[test]
fn collidable_tile_blocks_the_move() {
    let (mut world, grid, walker) = three_by_three();
    assert!(world
        .grid_mut(grid)
        .expect("grid")
        .set_collidable(Index::new(1, 2), true));
    let mut mover = GridMover::with_target(&mut world, walker);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    record(&log, mover.events(), "mover");

    assert!(mover.request_move(&mut world, Direction::Right));
    assert_eq!(*log.borrow(), vec!["mover:direction:Right"]);

    mover.update(0.016, &mut world);

    assert_eq!(
        *log.borrow(),
        vec!["mover:direction:Right", "mover:tile:(1, 2)"]
    );
    assert_eq!(world.child_tile(walker), Some(Index::new(1, 1)));
    assert_eq!(
        world.object(walker).expect("walker").position(),
        Vec2::new(48.0, 48.0)
    );
    assert_eq!(mover.target_direction(), Direction::Unknown);
    assert!(mover.is_idle());
}

fn place_wall(world: &mut World, grid: GridHandle) -> ObjectHandle {
    let wall = world.spawn(
        GridObject::new(Vec2::splat(32.0))
            .with_obstacle(true)
            .with_collision_group("wall"),
    );
    assert!(world.add_child(grid, wall, Index::new(1, 2)));
    wall
}

#[test]
fn filtered_obstacle_is_passed_with_a_collision_event() {
    let (mut world, grid, walker) = three_by_three();
    let wall = place_wall(&mut world, grid);
    world
        .object_mut(walker)
        .expect("walker")
        .add_obstacle_collision_filter("wall");
    let mut mover = GridMover::with_target(&mut world, walker);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    record(&log, mover.events(), "mover");
    record(&log, world.object(wall).expect("wall").events(), "wall");

    assert!(mover.request_move(&mut world, Direction::Right));
    mover.update(0.25, &mut world);
    assert!(mover.is_moving());
    mover.update(0.25, &mut world);

    assert_eq!(world.child_tile(walker), Some(Index::new(1, 2)));
    assert_eq!(
        *log.borrow(),
        vec![
            "mover:direction:Right",
            "mover:begin:(1, 2)",
            "mover:object",
            "wall:object",
            "mover:end:(1, 2)",
        ]
    );
}

#[test]
fn unfiltered_obstacle_blocks_with_a_collision_event() {
    let (mut world, grid, walker) = three_by_three();
    let wall = place_wall(&mut world, grid);
    let mut mover = GridMover::with_target(&mut world, walker);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    record(&log, mover.events(), "mover");
    record(&log, world.object(wall).expect("wall").events(), "wall");

    assert!(mover.request_move(&mut world, Direction::Right));
    mover.update(0.25, &mut world);

    assert_eq!(world.child_tile(walker), Some(Index::new(1, 1)));
    assert_eq!(
        *log.borrow(),
        vec!["mover:direction:Right", "mover:object", "wall:object"]
    );
    assert!(mover.is_idle());
}
