//! Owner of every level and every occupant: cache-or-generate access, resets, and the
//! placement facade that keeps each occupant on at most one level.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::mem;

use slotmap::{SecondaryMap, SlotMap};

use crate::config::{ConfigError, LevelConfig};
use crate::error::{DungeonError, UsageError};
use crate::level::Level;
use crate::manifest::{LevelEpoch, MANIFEST_FORMAT_VERSION, StackManifest};
use crate::mapgen::{deepest, generate_level, home_level};
use crate::tracker::CellChange;
use crate::types::{Direction, LevelId, LevelKind, Occupant, OccupantId, OccupantKind, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    Generated { level: LevelId, epoch: u32, fingerprint: u64 },
    Reset { level: LevelId, epoch: u32, evicted: Vec<OccupantId> },
    Spawned { level: LevelId, occupant: OccupantId, pos: Pos },
    Moved { level: LevelId, occupant: OccupantId, from: Pos, to: Pos },
    Removed { level: LevelId, occupant: OccupantId, pos: Pos },
    Refused { level: LevelId, occupant: OccupantId, error: DungeonError },
}

pub struct LevelStack {
    config: LevelConfig,
    run_seed: u64,
    levels: BTreeMap<LevelId, Level>,
    epochs: BTreeMap<LevelId, u32>,
    roster: SlotMap<OccupantId, OccupantKind>,
    locations: SecondaryMap<OccupantId, LevelId>,
    active: LevelId,
    log: Vec<LevelEvent>,
}

impl LevelStack {
    /// Builds the home level immediately; every other level waits for first access.
    pub fn new(config: LevelConfig, run_seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let home = Level::new(LevelId::HOME, home_level(&config));
        Ok(Self {
            config,
            run_seed,
            levels: BTreeMap::from([(LevelId::HOME, home)]),
            epochs: BTreeMap::new(),
            roster: SlotMap::with_key(),
            locations: SecondaryMap::new(),
            active: LevelId::HOME,
            log: Vec::new(),
        })
    }

    pub fn from_manifest(manifest: &StackManifest) -> Result<Self, ConfigError> {
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported manifest version {}",
                manifest.format_version
            )));
        }
        let mut stack = Self::new(manifest.config.clone(), manifest.run_seed)?;
        for record in &manifest.epochs {
            stack
                .check_depth(record.level)
                .map_err(|err| ConfigError::Invalid(format!("manifest epoch: {err}")))?;
            stack.epochs.insert(record.level, record.epoch);
        }
        stack
            .check_depth(manifest.active)
            .map_err(|err| ConfigError::Invalid(format!("manifest active level: {err}")))?;
        stack.active = manifest.active;
        Ok(stack)
    }

    /// Everything needed to regenerate identical grids later.
    pub fn manifest(&self) -> StackManifest {
        StackManifest {
            format_version: MANIFEST_FORMAT_VERSION,
            run_seed: self.run_seed,
            config: self.config.clone(),
            epochs: self
                .epochs
                .iter()
                .map(|(&level, &epoch)| LevelEpoch { level, epoch })
                .collect(),
            active: self.active,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    pub fn epoch_of(&self, level: LevelId) -> u32 {
        self.epochs.get(&level).copied().unwrap_or(0)
    }

    pub fn is_generated(&self, level: LevelId) -> bool {
        self.levels.contains_key(&level)
    }

    /// A level that already exists, without generating anything.
    pub fn peek(&self, level: LevelId) -> Option<&Level> {
        self.levels.get(&level)
    }

    /// The authoritative level for `level`, generated on first access.
    pub fn level_at(&mut self, level: LevelId) -> Result<&Level, DungeonError> {
        self.level_mut(level).map(|level| &*level)
    }

    pub fn active(&self) -> LevelId {
        self.active
    }

    pub fn set_active(&mut self, level: LevelId) -> Result<(), DungeonError> {
        self.level_mut(level)?;
        self.active = level;
        Ok(())
    }

    pub fn current_map(&mut self) -> Result<&Level, DungeonError> {
        self.level_at(self.active)
    }

    /// Throws away the level and regenerates it under the next epoch. Occupants on it
    /// become unplaced and are returned. Fails without side effects if generation fails.
    pub fn reset_level(&mut self, level: LevelId) -> Result<Vec<OccupantId>, DungeonError> {
        self.check_depth(level)?;
        let epoch = self.epoch_of(level) + 1;
        let fresh = build_level(&self.config, self.run_seed, level, epoch, &mut self.log)?;
        self.epochs.insert(level, epoch);

        let evicted: Vec<OccupantId> = match self.levels.insert(level, fresh) {
            Some(old) => old.occupants().map(|placement| placement.occupant().id).collect(),
            None => Vec::new(),
        };
        for &id in &evicted {
            self.locations.remove(id);
        }
        self.log.push(LevelEvent::Reset { level, epoch, evicted: evicted.clone() });
        Ok(evicted)
    }

    pub fn register(&mut self, kind: OccupantKind) -> OccupantId {
        self.roster.insert(kind)
    }

    /// Forgets an occupant, taking it off the grid first if it is placed.
    pub fn unregister(&mut self, id: OccupantId) -> Result<Option<CellChange>, DungeonError> {
        if !self.roster.contains_key(id) {
            return Err(UsageError::UnknownOccupant(id).into());
        }
        let change = match self.locations.get(id).copied() {
            Some(level) => Some(self.remove(level, id)?),
            None => None,
        };
        self.roster.remove(id);
        Ok(change)
    }

    pub fn kind_of(&self, id: OccupantId) -> Option<OccupantKind> {
        self.roster.get(id).copied()
    }

    pub fn location_of(&self, id: OccupantId) -> Option<(LevelId, Pos)> {
        let level = *self.locations.get(id)?;
        let pos = self.levels.get(&level)?.position_of(id)?;
        Some((level, pos))
    }

    pub fn spawn(
        &mut self,
        level: LevelId,
        pos: Pos,
        id: OccupantId,
    ) -> Result<CellChange, DungeonError> {
        let occupant = self.occupant(id)?;
        if self.locations.contains_key(id) {
            return Err(UsageError::AlreadyPlaced(id).into());
        }
        let result = self.level_mut(level)?.spawn(pos, occupant);
        match result {
            Ok(change) => {
                self.locations.insert(id, level);
                self.log.push(LevelEvent::Spawned { level, occupant: id, pos });
                Ok(change)
            }
            Err(error) => Err(self.refuse(level, id, error)),
        }
    }

    /// Places an occupant at the level's entry (up stairs, or the middle of home).
    pub fn spawn_at_entry(
        &mut self,
        level: LevelId,
        id: OccupantId,
    ) -> Result<CellChange, DungeonError> {
        let entry = self.level_at(level)?.entry();
        self.spawn(level, entry, id)
    }

    pub fn move_occupant(
        &mut self,
        level: LevelId,
        id: OccupantId,
        direction: Direction,
    ) -> Result<Vec<CellChange>, DungeonError> {
        self.occupant(id)?;
        if self.locations.get(id) != Some(&level) {
            return Err(UsageError::NotPlaced(id).into());
        }
        let result = self.level_mut(level)?.move_occupant(id, direction);
        match result {
            Ok(changes) => {
                if let [from, to] = changes.as_slice() {
                    self.log.push(LevelEvent::Moved {
                        level,
                        occupant: id,
                        from: from.pos,
                        to: to.pos,
                    });
                }
                Ok(changes)
            }
            Err(error) => Err(self.refuse(level, id, error)),
        }
    }

    pub fn remove(&mut self, level: LevelId, id: OccupantId) -> Result<CellChange, DungeonError> {
        self.occupant(id)?;
        if self.locations.get(id) != Some(&level) {
            return Err(UsageError::NotPlaced(id).into());
        }
        let change = self.level_mut(level)?.remove(id)?;
        self.locations.remove(id);
        self.log.push(LevelEvent::Removed { level, occupant: id, pos: change.pos });
        Ok(change)
    }

    /// Moves a placed occupant to `pos` on another (or the same) level. If the destination
    /// refuses, the occupant is put back exactly where it was.
    pub fn transfer(
        &mut self,
        id: OccupantId,
        to: LevelId,
        pos: Pos,
    ) -> Result<CellChange, DungeonError> {
        let Some((from, old_pos)) = self.location_of(id) else {
            return Err(UsageError::NotPlaced(id).into());
        };
        self.level_mut(to)?;
        self.remove(from, id)?;
        match self.spawn(to, pos, id) {
            Ok(change) => Ok(change),
            Err(error) => {
                self.spawn(from, old_pos, id)?;
                Err(error)
            }
        }
    }

    pub fn events(&self) -> &[LevelEvent] {
        &self.log
    }

    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        mem::take(&mut self.log)
    }

    fn occupant(&self, id: OccupantId) -> Result<Occupant, DungeonError> {
        match self.roster.get(id) {
            Some(&kind) => Ok(Occupant { id, kind }),
            None => Err(UsageError::UnknownOccupant(id).into()),
        }
    }

    fn refuse(&mut self, level: LevelId, id: OccupantId, error: DungeonError) -> DungeonError {
        if error.is_gameplay_refusal() {
            self.log.push(LevelEvent::Refused { level, occupant: id, error });
        }
        error
    }

    fn check_depth(&self, level: LevelId) -> Result<(), DungeonError> {
        let max = deepest(&self.config, level.kind);
        let valid = match level.kind {
            LevelKind::Home => level.depth == 0,
            LevelKind::Dungeon | LevelKind::Volcano => (1..=max).contains(&level.depth),
        };
        if valid {
            Ok(())
        } else {
            Err(DungeonError::InvalidDepth { kind: level.kind, depth: level.depth, max })
        }
    }

    fn level_mut(&mut self, level: LevelId) -> Result<&mut Level, DungeonError> {
        self.check_depth(level)?;
        let epoch = self.epoch_of(level);
        match self.levels.entry(level) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let built = build_level(&self.config, self.run_seed, level, epoch, &mut self.log)?;
                Ok(entry.insert(built))
            }
        }
    }
}

fn build_level(
    config: &LevelConfig,
    run_seed: u64,
    level: LevelId,
    epoch: u32,
    log: &mut Vec<LevelEvent>,
) -> Result<Level, DungeonError> {
    let generated = generate_level(config, run_seed, level, epoch)?;
    let built = Level::new(level, generated);
    log.push(LevelEvent::Generated { level, epoch, fingerprint: built.fingerprint() });
    Ok(built)
}
