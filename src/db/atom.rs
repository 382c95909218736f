/*!
The mutable per-atom scratch state a [MRFState](crate::state::MRFState) maintains (§3).

One [AtomRecord] exists per atom of the owning [MRF](crate::mrf::MRF), indexed by atom id. The
invariant [MRFState](crate::state::MRFState) is responsible for keeping correct on every
[flip](crate::state::MRFState::flip) is:

- `break_cost` is the sum of weights of constraints currently satisfied *only* by this atom's
  literal (flipping the atom would violate them).
- `make_cost` is the sum of weights of constraints currently violated that flipping this atom
  would satisfy.
*/

use crate::generic::weight::{Cost, Delta};
use crate::structures::atom::FixedValue;

/// Iteration number used as a sentinel meaning "never flipped" — far enough in the past that no
/// tabu window (§4.3) could possibly still cover it.
pub const NEVER_FLIPPED: i64 = i64::MIN / 2;

/// Mutable per-atom state (§3 "Atom").
#[derive(Clone, Debug)]
pub struct AtomRecord {
    /// Current Boolean truth value.
    pub state: bool,

    /// The truth value saved when the best-so-far cost was recorded.
    pub low_state: bool,

    /// Whether (and how) this atom is pinned.
    pub fixed_value: FixedValue,

    /// Sum of weights of constraints satisfied only by this atom's literal.
    pub break_cost: Cost,

    /// Sum of weights of constraints this atom's flip would satisfy.
    pub make_cost: Cost,

    /// Iteration at which this atom was last flipped, used for the tabu window (§4.3).
    pub last_flip: i64,

    /// Sampling counter incremented once per MC-SAT sample in which the atom is true (§4.4).
    pub trues_counter: u64,
}

impl AtomRecord {
    /// A fresh, unfixed, unflipped atom record with the given initial truth value.
    pub fn new(state: bool) -> AtomRecord {
        AtomRecord {
            state,
            low_state: state,
            fixed_value: FixedValue::Free,
            break_cost: Cost::ZERO,
            make_cost: Cost::ZERO,
            last_flip: NEVER_FLIPPED,
            trues_counter: 0,
        }
    }

    /// `break_cost − make_cost`: the change in total cost were this atom flipped.
    pub fn delta(&self) -> Delta {
        Delta::new(self.break_cost, self.make_cost)
    }

    /// `true` if this atom may currently be flipped (it is not pinned).
    pub fn is_free(&self) -> bool {
        !self.fixed_value.is_fixed()
    }

    /// `true` if `iteration` falls outside this atom's tabu window of length `tabu_length`
    /// (§4.3: "iteration − last_flip > tabu_length").
    pub fn outside_tabu(&self, iteration: i64, tabu_length: i64) -> bool {
        iteration.saturating_sub(self.last_flip) > tabu_length
    }
}
