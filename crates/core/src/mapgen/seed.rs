//! Deterministic per-level seed mixing and uniform picks from an injected RNG.

use rand_chacha::rand_core::Rng;

use crate::types::{LevelId, LevelKind};

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

pub fn derive_level_seed(run_seed: u64, level: LevelId, epoch: u32) -> u64 {
    let mut mixed = run_seed ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= kind_code(level.kind).wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^= (level.depth as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= (epoch as u64).wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

fn kind_code(kind: LevelKind) -> u64 {
    match kind {
        LevelKind::Home => 0,
        LevelKind::Dungeon => 1,
        LevelKind::Volcano => 2,
    }
}
