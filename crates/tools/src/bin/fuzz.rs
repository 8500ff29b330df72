use anyhow::{Result, bail};
use clap::Parser;
use delve_core::{
    Cell, Direction, DungeonError, LevelConfig, LevelId, LevelStack, MonsterKind, OccupantId,
    OccupantKind, Pos,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short = 'n', long, default_value_t = 5000)]
    steps: u32,
    #[arg(short, long, default_value_t = 6)]
    occupants: usize,
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Spawn,
    Move,
    Remove,
    Transfer,
    Reset,
}

const MONSTERS: [MonsterKind; 7] = [
    MonsterKind::Rat,
    MonsterKind::Bat,
    MonsterKind::Goblin,
    MonsterKind::Snake,
    MonsterKind::Troll,
    MonsterKind::FireImp,
    MonsterKind::Dragon,
];

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_level(rng: &mut ChaCha8Rng, config: &LevelConfig) -> LevelId {
    match rng.next_u64() % 3 {
        0 => LevelId::HOME,
        1 => LevelId::dungeon(1 + (rng.next_u64() % u64::from(config.dungeon_depths)) as u8),
        _ => LevelId::volcano(1 + (rng.next_u64() % u64::from(config.volcano_depths)) as u8),
    }
}

fn random_pos(rng: &mut ChaCha8Rng, config: &LevelConfig) -> Pos {
    // One cell of slack on each side so out-of-bounds requests get exercised too.
    let x = (rng.next_u64() % (config.width as u64 + 2)) as i32 - 1;
    let y = (rng.next_u64() % (config.height as u64 + 2)) as i32 - 1;
    Pos { y, x }
}

fn check_invariants(stack: &LevelStack, roster: &[OccupantId]) -> Result<()> {
    let mut placed = 0;
    for id in [LevelId::HOME]
        .into_iter()
        .chain((1..=stack.config().dungeon_depths).map(LevelId::dungeon))
        .chain((1..=stack.config().volcano_depths).map(LevelId::volcano))
    {
        let Some(level) = stack.peek(id) else { continue };
        if let Err(reason) = level.audit() {
            bail!("Invariant failed on {id:?}: {reason}");
        }
        let occupant_cells = level.grid().count(|cell| matches!(cell, Cell::Occupant(_)));
        if occupant_cells != level.occupant_count() {
            bail!(
                "Invariant failed on {id:?}: {occupant_cells} occupant cells, {} records",
                level.occupant_count()
            );
        }
        placed += occupant_cells;
    }
    let located = roster.iter().filter(|&&id| stack.location_of(id).is_some()).count();
    if located != placed {
        bail!("Invariant failed: {located} located occupants but {placed} on grids");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting placement fuzz on seed {} for {} steps...", args.seed, args.steps);
    let mut stack = LevelStack::new(LevelConfig::default(), args.seed)?;
    let config = stack.config().clone();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut roster = vec![stack.register(OccupantKind::Player)];
    for _ in 1..args.occupants {
        roster.push(stack.register(OccupantKind::Monster(choose(&mut rng, &MONSTERS))));
    }

    let actions = [
        Action::Spawn,
        Action::Move,
        Action::Move,
        Action::Move,
        Action::Remove,
        Action::Transfer,
        Action::Reset,
    ];
    let mut refusals = 0_u32;
    for step in 0..args.steps {
        let id = choose(&mut rng, &roster);
        let action = choose(&mut rng, &actions);
        let result = match action {
            Action::Spawn => {
                let level = random_level(&mut rng, &config);
                let pos = random_pos(&mut rng, &config);
                stack.spawn(level, pos, id).map(drop)
            }
            Action::Move => match stack.location_of(id) {
                Some((level, _)) => {
                    let direction = choose(&mut rng, &Direction::ALL_MOVES);
                    stack.move_occupant(level, id, direction).map(drop)
                }
                None => Ok(()),
            },
            Action::Remove => match stack.location_of(id) {
                Some((level, _)) => stack.remove(level, id).map(drop),
                None => Ok(()),
            },
            Action::Transfer => {
                let level = random_level(&mut rng, &config);
                let pos = random_pos(&mut rng, &config);
                stack.transfer(id, level, pos).map(drop)
            }
            Action::Reset => {
                // Resets are rare; they wipe everyone on the level.
                if rng.next_u64() % 20 == 0 {
                    let level = random_level(&mut rng, &config);
                    stack.reset_level(level).map(drop)
                } else {
                    Ok(())
                }
            }
        };

        match result {
            Ok(()) => {}
            Err(err) if err.is_gameplay_refusal() => refusals += 1,
            Err(DungeonError::InvalidUsage(_)) => {}
            Err(err) => bail!("Step {step}: {action:?} on {id:?} failed unexpectedly: {err}"),
        }
        check_invariants(&stack, &roster)?;
        stack.drain_events();
    }

    println!("Fuzzing completed successfully ({refusals} refusals).");
    Ok(())
}
