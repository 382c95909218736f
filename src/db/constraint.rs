/*!
The mutable per-constraint scratch state a [MRFState](crate::state::MRFState) maintains (§3).

One [ConstraintRecord] exists per constraint of the owning [MRF](crate::mrf::MRF), indexed by
constraint id, holding everything that changes as atoms are flipped: the satisfied-literal
count, slice/fixed-satisfaction flags, the cost-formula selector, and the opportunistic watch
indices.
*/

use crate::structures::constraint::ConstraintMode;

/// Mutable per-constraint state (§3 "Constraint").
#[derive(Clone, Debug)]
pub struct ConstraintRecord {
    /// Number of currently-true literals.
    pub nsat: u32,

    /// Excluded from the current MC-SAT slice (§4.1 "Slice selection").
    pub inactive: bool,

    /// A pinned atom already satisfies this constraint; solvers skip it.
    pub is_satisfied_by_fixed: bool,

    /// Selects the per-constraint cost formula (§3).
    pub mode: ConstraintMode,

    /// Index (into the constraint's literal array) of a literal known to satisfy it, if any.
    pub watch1: Option<usize>,

    /// A second such index, tracked opportunistically to speed up rescans (§4.1 step 3).
    pub watch2: Option<usize>,

    /// Precomputed `1 − e^{−|weight|}`, the probability [select_some_sat_constraints] keeps this
    /// constraint active in a slice (§4.1).
    ///
    /// [select_some_sat_constraints]: crate::state::MRFState::select_some_sat_constraints
    pub threshold: f64,
}

impl ConstraintRecord {
    /// A fresh, active, non-fixed record with no recorded satisfying literals.
    pub fn new(threshold: f64) -> ConstraintRecord {
        ConstraintRecord {
            nsat: 0,
            inactive: false,
            is_satisfied_by_fixed: false,
            mode: ConstraintMode::MaxWalkSat,
            watch1: None,
            watch2: None,
            threshold,
        }
    }

    /// `true` iff the constraint currently has at least one satisfied literal.
    pub fn is_satisfied(&self) -> bool {
        self.nsat > 0
    }

    /// `true` iff the constraint currently contributes to `total_cost` — it is active, not
    /// satisfied by a fixed atom, and its `nsat` count is on the "violated" side for its
    /// polarity (§3's cost table).
    pub fn is_active(&self) -> bool {
        !self.inactive && !self.is_satisfied_by_fixed
    }
}
