//! Deterministic randomness for the Monte Carlo simulator.
//!
//! The simulator only talks to [`rand::RngCore`]; [`Mulberry32`] is the generator behind it,
//! chosen so that a given 32-bit seed yields the same stream on every platform.

use chrono::Utc;
use rand::{Error, RngCore, SeedableRng};

use crate::domain::Seed;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const GOLDEN_GAMMA: u32 = 0x9E37_79B9;

/// Mulberry32: 32-bit Weyl sequence followed by an xorshift-multiply mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let t = self.state;
        let mut x = (t ^ (t >> 15)).wrapping_mul(1 | t);
        x ^= x.wrapping_add((x ^ (x >> 7)).wrapping_mul(61 | x));
        x ^ (x >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}

/// Uniform draw in [0, 1) with 32 bits of resolution.
pub fn unit<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.next_u32()) / 4_294_967_296.0
}

/// FNV-1a (32-bit) over the UTF-16 code units of `text`.
pub fn fnv1a_32(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// 32-bit seed for a run.
///
/// Numbers are truncated to their low 32 bits, text is hashed, and a missing seed is taken
/// from the wall clock mixed with entropy, so unseeded runs are not reproducible.
pub fn derive_seed(seed: Option<&Seed>) -> u32 {
    match seed {
        Some(Seed::Number(n)) => *n as u32,
        Some(Seed::Text(text)) => fnv1a_32(text),
        None => (Utc::now().timestamp_millis() as u32) ^ rand::random::<u32>(),
    }
}

/// Independent stream seed for one iteration of a run.
pub fn iteration_seed(seed: u32, iteration: usize) -> u32 {
    seed ^ (iteration as u32).wrapping_mul(GOLDEN_GAMMA)
}
