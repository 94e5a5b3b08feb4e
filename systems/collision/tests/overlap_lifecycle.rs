use std::{cell::RefCell, rc::Rc};

use tessera_core::{names, Event, Vec2};
use tessera_system_collision::CollisionDispatcher;
use tessera_world::{GridObject, ObjectHandle, World};

type Log = Rc<RefCell<Vec<String>>>;

fn spawn_box(world: &mut World, left: f32, top: f32, label: &'static str, log: &Log) -> ObjectHandle {
    let mut object = GridObject::new(Vec2::new(10.0, 10.0));
    object.set_position(Vec2::new(left + 5.0, top + 5.0));
    for name in [
        names::COLLIDABLE_OVERLAP_START,
        names::COLLIDABLE_OVERLAP_STAY,
        names::COLLIDABLE_OVERLAP_END,
    ] {
        let sink = Rc::clone(log);
        let _ = object.events().add_listener(name, move |event| {
            let entry = match event {
                Event::OverlapStarted { iou, .. } => format!("{label}:start:{iou:.3}"),
                Event::OverlapStayed { iou, .. } => format!("{label}:stay:{iou:.3}"),
                Event::OverlapEnded { .. } => format!("{label}:end"),
                other => format!("{label}:unexpected:{other:?}"),
            };
            sink.borrow_mut().push(entry);
        });
    }
    world.spawn(object)
}

fn move_to(world: &mut World, handle: ObjectHandle, left: f32, top: f32) {
    world
        .object_mut(handle)
        .expect("live object")
        .set_position(Vec2::new(left + 5.0, top + 5.0));
}

#[test]
fn overlap_start_stay_and_end_fire_on_both_sides() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::new();
    let a = spawn_box(&mut world, 0.0, 0.0, "a", &log);
    let b = spawn_box(&mut world, 20.0, 0.0, "b", &log);
    let collidables = [a, b];
    let mut dispatcher = CollisionDispatcher::new();

    dispatcher.dispatch(&mut world, &collidables);
    assert!(log.borrow().is_empty());

    move_to(&mut world, b, 5.0, 0.0);
    dispatcher.dispatch(&mut world, &collidables);
    assert_eq!(*log.borrow(), vec!["a:start:0.333", "b:start:0.333"]);
    assert_eq!(world.object(a).expect("a").collidable().peers(), &[b]);
    assert_eq!(world.object(b).expect("b").collidable().peers(), &[a]);

    log.borrow_mut().clear();
    dispatcher.dispatch(&mut world, &collidables);
    assert_eq!(*log.borrow(), vec!["a:stay:0.333", "b:stay:0.333"]);

    log.borrow_mut().clear();
    move_to(&mut world, b, 100.0, 0.0);
    dispatcher.dispatch(&mut world, &collidables);
    assert_eq!(*log.borrow(), vec!["a:end", "b:end"]);
    assert!(world.object(a).expect("a").collidable().peers().is_empty());
    assert!(world.object(b).expect("b").collidable().peers().is_empty());
}

#[test]
fn destroying_a_peer_clears_the_survivor() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::new();
    let a = spawn_box(&mut world, 0.0, 0.0, "a", &log);
    let b = spawn_box(&mut world, 5.0, 0.0, "b", &log);
    let mut dispatcher = CollisionDispatcher::new();
    dispatcher.dispatch(&mut world, &[a, b]);

    assert!(world.destroy(b));

    assert!(world.object(a).expect("a").collidable().peers().is_empty());
}
