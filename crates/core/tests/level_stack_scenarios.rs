use delve_core::{
    Blocker, Cell, Direction, DungeonError, FeatureKind, LevelConfig, LevelEvent, LevelId,
    LevelStack, MonsterKind, OccupantKind, Pos, StackManifest, UsageError,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tempfile::tempdir;

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    slice[rng.next_u64() as usize % slice.len()]
}

fn new_stack(seed: u64) -> LevelStack {
    LevelStack::new(LevelConfig::default(), seed).expect("default config is valid")
}

#[test]
fn test_random_walk_leaves_no_trace_once_removed() {
    let mut runner = TestRunner::new(ProptestConfig { cases: 48, ..ProptestConfig::default() });

    runner
        .run(&(any::<u64>(), any::<u64>()), |(map_seed, walk_seed)| {
            let mut stack = new_stack(map_seed);
            let id = LevelId::dungeon(1);
            let pristine = stack.level_at(id).unwrap().canonical_bytes();
            let player = stack.register(OccupantKind::Player);
            stack.spawn_at_entry(id, player).unwrap();

            let mut rng = ChaCha8Rng::seed_from_u64(walk_seed);
            let mut directions = Direction::ALL_MOVES.to_vec();
            directions.push(Direction::None);
            for step in 0..200 {
                let direction = choose(&mut rng, &directions);
                let before = stack.location_of(player);
                match stack.move_occupant(id, player, direction) {
                    Ok(changes) if direction == Direction::None => {
                        if !changes.is_empty() || stack.location_of(player) != before {
                            return Err(TestCaseError::fail("no-op move changed something"));
                        }
                    }
                    Ok(changes) => {
                        if changes.len() != 2 {
                            return Err(TestCaseError::fail(format!("step {step}: {changes:?}")));
                        }
                    }
                    Err(DungeonError::Blocked { .. } | DungeonError::OutOfBounds { .. }) => {
                        if stack.location_of(player) != before {
                            return Err(TestCaseError::fail("refused move relocated the player"));
                        }
                    }
                    Err(other) => {
                        return Err(TestCaseError::fail(format!("step {step}: {other}")));
                    }
                }
                let level = stack.peek(id).unwrap();
                level.audit().map_err(TestCaseError::fail)?;
                if level.grid().count(|cell| matches!(cell, Cell::Occupant(_))) != 1 {
                    return Err(TestCaseError::fail("occupant cell count drifted"));
                }
            }

            stack.remove(id, player).unwrap();
            if stack.peek(id).unwrap().canonical_bytes() != pristine {
                return Err(TestCaseError::fail("grid differs after the walker left"));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_walking_over_a_feature_hides_then_restores_it() {
    let mut stack = new_stack(31);
    let id = LevelId::dungeon(1);
    let level = stack.level_at(id).unwrap();
    let entry = level.entry();
    let stairs = level.cell_at(entry);
    assert!(matches!(stairs, Cell::Object(f) if f.kind == FeatureKind::UpStairs && f.visible));

    let player = stack.register(OccupantKind::Player);
    stack.spawn(id, entry, player).unwrap();
    let level = stack.peek(id).unwrap();
    assert_eq!(level.covered_by(player), Some(stairs));
    let hidden = level.occupants().next().unwrap().covered();
    assert!(matches!(hidden, Cell::Object(f) if f.kind == FeatureKind::UpStairs && !f.visible));

    let change = stack.remove(id, player).unwrap();
    assert_eq!(change.pos, entry);
    assert_eq!(change.cell, stairs);
}

#[test]
fn test_spawning_on_a_wall_is_refused_and_logged() {
    let mut stack = new_stack(8);
    let id = LevelId::volcano(1);
    let before = stack.level_at(id).unwrap().canonical_bytes();
    let snake = stack.register(OccupantKind::Monster(MonsterKind::Snake));
    stack.drain_events();

    let wall = Pos { y: 0, x: 5 };
    assert_eq!(
        stack.spawn(id, wall, snake),
        Err(DungeonError::Blocked { pos: wall, blocker: Blocker::Wall })
    );
    assert_eq!(stack.peek(id).unwrap().canonical_bytes(), before);
    assert_eq!(stack.location_of(snake), None);
    assert!(matches!(stack.events(), [LevelEvent::Refused { occupant, .. }] if *occupant == snake));
}

#[test]
fn test_two_occupants_cannot_share_a_cell() {
    let mut stack = new_stack(5);
    let player = stack.register(OccupantKind::Player);
    let goblin = stack.register(OccupantKind::Monster(MonsterKind::Goblin));
    stack.spawn(LevelId::HOME, Pos { y: 5, x: 5 }, player).unwrap();
    stack.spawn(LevelId::HOME, Pos { y: 5, x: 6 }, goblin).unwrap();

    assert_eq!(
        stack.move_occupant(LevelId::HOME, player, Direction::East),
        Err(DungeonError::Blocked {
            pos: Pos { y: 5, x: 6 },
            blocker: Blocker::Occupant(goblin)
        })
    );
    let late = stack.register(OccupantKind::Player);
    assert_eq!(
        stack.spawn(LevelId::HOME, Pos { y: 5, x: 6 }, late),
        Err(DungeonError::Blocked {
            pos: Pos { y: 5, x: 6 },
            blocker: Blocker::Occupant(goblin)
        })
    );
}

#[test]
fn test_descending_through_every_dungeon_depth() {
    let mut stack = new_stack(2_024);
    let player = stack.register(OccupantKind::Player);
    stack.spawn_at_entry(LevelId::HOME, player).unwrap();

    for depth in 1..=10 {
        let next = LevelId::dungeon(depth);
        let entry = stack.level_at(next).unwrap().entry();
        stack.transfer(player, next, entry).unwrap();
        stack.set_active(next).unwrap();
        assert_eq!(stack.location_of(player), Some((next, entry)));

        let level = stack.current_map().unwrap();
        assert_eq!(level.down_stairs().is_some(), depth < 10, "depth {depth}");
    }
    assert!(matches!(
        stack.level_at(LevelId::dungeon(11)),
        Err(DungeonError::InvalidDepth { max: 10, .. })
    ));
}

#[test]
fn test_reset_changes_the_layout_but_keeps_other_levels() {
    let mut stack = new_stack(99);
    let target = LevelId::dungeon(3);
    let neighbour = LevelId::dungeon(4);
    let old = stack.level_at(target).unwrap().fingerprint();
    let kept = stack.level_at(neighbour).unwrap().fingerprint();

    assert_eq!(stack.reset_level(target), Ok(Vec::new()));

    assert_ne!(stack.level_at(target).unwrap().fingerprint(), old);
    assert_eq!(stack.level_at(neighbour).unwrap().fingerprint(), kept);
    assert!(matches!(
        stack.events().last(),
        Some(LevelEvent::Reset { level, epoch: 1, .. }) if *level == target
    ));
}

#[test]
fn test_usage_errors_surface_as_errors() {
    let mut stack = new_stack(1);
    let bat = stack.register(OccupantKind::Monster(MonsterKind::Bat));

    assert_eq!(
        stack.remove(LevelId::HOME, bat),
        Err(DungeonError::InvalidUsage(UsageError::NotPlaced(bat)))
    );
    assert_eq!(
        stack.transfer(bat, LevelId::dungeon(1), Pos { y: 1, x: 1 }),
        Err(DungeonError::InvalidUsage(UsageError::NotPlaced(bat)))
    );
    stack.unregister(bat).unwrap();
    assert_eq!(
        stack.unregister(bat),
        Err(DungeonError::InvalidUsage(UsageError::UnknownOccupant(bat)))
    );
}

#[test]
fn test_manifest_file_restores_reset_levels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");

    let mut original = new_stack(4_242);
    original.reset_level(LevelId::volcano(9)).unwrap();
    original.reset_level(LevelId::volcano(9)).unwrap();
    let expected = original.level_at(LevelId::volcano(9)).unwrap().fingerprint();
    original.manifest().write_atomic(&path).unwrap();

    let manifest = StackManifest::load(&path).unwrap();
    let mut restored = LevelStack::from_manifest(&manifest).unwrap();

    assert_eq!(restored.epoch_of(LevelId::volcano(9)), 2);
    assert_eq!(restored.level_at(LevelId::volcano(9)).unwrap().fingerprint(), expected);
}

#[test]
fn test_manifest_with_out_of_range_level_is_rejected() {
    let mut manifest = new_stack(3).manifest();
    manifest.active = LevelId::dungeon(40);
    assert!(LevelStack::from_manifest(&manifest).is_err());
}
