use mosaic_ecs::{EcsError, Entity, World};

#[derive(Debug, Clone, PartialEq)]
struct Label(String);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Opacity(f32);

#[derive(Debug, Clone, PartialEq)]
struct Children(Vec<Entity>);

// ---------------------------------------------------------------------------
// Stale handles after despawn + respawn
// ---------------------------------------------------------------------------

#[test]
fn stale_handles_never_alias_new_entities() {
    let mut world = World::new();
    let old = world.spawn();
    world.insert(old, Label("old".into())).unwrap();
    world.despawn(old);

    let new = world.spawn();
    world.insert(new, Label("new".into())).unwrap();

    assert_eq!(old.index(), new.index());
    assert!(!world.is_alive(old));
    assert!(world.get::<Label>(old).is_none());
    assert_eq!(world.get::<Label>(new), Some(&Label("new".into())));
    assert_eq!(world.insert(old, Opacity(1.0)), Err(EcsError::DeadEntity(old)));
    assert!(world.remove::<Label>(old).is_none());
}

// ---------------------------------------------------------------------------
// Tree of entities kept through handle lists
// ---------------------------------------------------------------------------

#[test]
fn recursive_despawn_through_handle_lists() {
    let mut world = World::new();
    let root = world.spawn();
    let a = world.spawn();
    let b = world.spawn();
    let leaf = world.spawn();
    world.insert(root, Children(vec![a, b])).unwrap();
    world.insert(a, Children(vec![leaf])).unwrap();
    for e in [root, a, b, leaf] {
        world.insert(e, Opacity(0.5)).unwrap();
    }

    fn despawn_tree(world: &mut World, entity: Entity) {
        if let Some(Children(children)) = world.remove::<Children>(entity) {
            for child in children {
                despawn_tree(world, child);
            }
        }
        world.despawn(entity);
    }

    despawn_tree(&mut world, root);
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.count::<Opacity>(), 0);
    assert_eq!(world.count::<Children>(), 0);
}

// ---------------------------------------------------------------------------
// Independent worlds
// ---------------------------------------------------------------------------

#[test]
fn worlds_share_nothing() {
    let mut first = World::new();
    let mut second = World::new();
    first.insert_resource(1u32);
    let e = first.spawn();
    first.insert(e, Label("first".into())).unwrap();

    assert!(!second.has_resource::<u32>());
    assert_eq!(second.count::<Label>(), 0);
    let other = second.spawn();
    assert_eq!(other.index(), e.index());
    assert!(second.get::<Label>(other).is_none());
}

#[test]
fn iter_entities_skips_dead_slots() {
    let mut world = World::new();
    let entities: Vec<_> = (0..4).map(|_| world.spawn()).collect();
    world.despawn(entities[2]);

    let alive: Vec<_> = world.iter_entities().collect();
    assert_eq!(alive, vec![entities[0], entities[1], entities[3]]);
}
