//! Deterministic node identities
//!
//! Substituted value copies need fresh uuids. They are drawn from a seeded
//! xorshift generator so assembling the same rotation twice gives
//! byte-identical output.

use alloc::format;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

use crate::types::Uuid;

/// XorShift64 generator: fast, deterministic, not cryptographic
#[derive(Debug, Clone, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// The state is never 0, which would lock the generator at 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Mints version-4-shaped uuid strings from an [`XorShiftRng`]
#[derive(Debug, Clone)]
pub struct IdMinter {
    rng: XorShiftRng,
}

impl IdMinter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShiftRng::seed_from_u64(seed),
        }
    }

    pub fn next_uuid(&mut self) -> Uuid {
        let hi = self.rng.next_u64();
        let lo = self.rng.next_u64();
        // Version nibble 4, variant bits 10
        let time_hi = ((hi & 0xffff) & 0x0fff) | 0x4000;
        let clock = ((lo >> 48) & 0x3fff) | 0x8000;
        Uuid::new(format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (hi >> 32) as u32,
            (hi >> 16) & 0xffff,
            time_hi,
            clock,
            lo & 0xffff_ffff_ffff,
        ))
    }
}
