use rand::SeedableRng;

use crate::generic::minimal_pcg::MinimalPCG32;
use crate::mrf::MRF;

use super::GenericMRFState;

/// A solve state which uses [MinimalPCG32] as its source of randomness.
pub type MRFState<'a> = GenericMRFState<'a, MinimalPCG32>;

impl<'a> MRFState<'a> {
    /// Builds a fresh, zeroed state over `mrf`, seeded deterministically from `seed`.
    ///
    /// Every atom starts `false`/unfixed and every constraint starts active with `nsat = 0`;
    /// callers must follow with [reset](GenericMRFState::reset) or
    /// [evaluate_costs](GenericMRFState::evaluate_costs) before reading costs or flipping.
    pub fn from_mrf(mrf: &'a MRF, seed: u64) -> Self {
        GenericMRFState::new(mrf, MinimalPCG32::from_seed(seed.to_le_bytes()))
    }
}
