use std::collections::{HashSet, VecDeque};

use rand::Rng;

use crate::db::{AtomRecord, ConstraintRecord};
use crate::generic::weight::Cost;
use crate::misc::log::targets::PROPAGATION;
use crate::mrf::{ConstraintId, UnsatIndex, MRF};
use crate::structures::atom::{Atom, FixedValue, NO_ATOM};
use crate::structures::constraint::{ConstraintDef, ConstraintMode};
use crate::structures::literal::Literal;
use crate::types::err::ErrorKind;

/// The cost a constraint currently contributes to `total_cost` (§3 "Cost of a constraint").
fn cost_of(constraint: &ConstraintDef, mode: ConstraintMode, nsat: u32) -> Cost {
    let violated = if constraint.is_positive() {
        nsat == 0
    } else {
        nsat > 0
    };
    if !violated {
        return Cost::ZERO;
    }
    match mode {
        ConstraintMode::MaxWalkSat => constraint.magnitude(),
        ConstraintMode::SampleSat => Cost::ONE,
    }
}

/// `1 − e^{−|weight|}`, the probability [select_some_sat_constraints](GenericMRFState::select_some_sat_constraints)
/// keeps a satisfied soft constraint active in a slice.
fn slice_threshold(constraint: &ConstraintDef, weight_hard: Cost) -> f64 {
    let magnitude = if constraint.is_hard() {
        weight_hard.to_f64()
    } else {
        constraint.weight().abs()
    };
    1.0 - (-magnitude).exp()
}

/// The mutable state of one solve over a [MRF], parameterised over its source of randomness.
///
/// See [crate::state] for the module-level description; [MRFState](super::MRFState) is the
/// concrete alias most callers want.
pub struct GenericMRFState<'a, R: Rng> {
    mrf: &'a MRF,
    atoms: Vec<AtomRecord>,
    constraints: Vec<ConstraintRecord>,
    unsat: UnsatIndex,
    priority_buffer: VecDeque<ConstraintId>,
    total_cost: Cost,
    low_cost: Cost,
    dirty: HashSet<Atom>,
    rng: R,
}

impl<'a, R: Rng> GenericMRFState<'a, R> {
    /// Builds a fresh, zeroed state over `mrf` using the given source of randomness.
    pub fn new(mrf: &'a MRF, rng: R) -> Self {
        let atom_slots = mrf.atom_count() as usize + 1;
        let atoms = (0..atom_slots).map(|_| AtomRecord::new(false)).collect();
        let constraints = mrf
            .constraints()
            .iter()
            .map(|c| ConstraintRecord::new(slice_threshold(c, mrf.weight_hard())))
            .collect();

        GenericMRFState {
            mrf,
            atoms,
            constraints,
            unsat: UnsatIndex::new(mrf.num_constraints()),
            priority_buffer: VecDeque::new(),
            total_cost: Cost::ZERO,
            low_cost: Cost::ZERO,
            dirty: HashSet::new(),
            rng,
        }
    }

    /// The network this state was built over.
    pub fn mrf(&self) -> &'a MRF {
        self.mrf
    }

    /// The current total cost (sum of violated constraints' weights).
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// The lowest total cost observed since the last [reset](Self::reset).
    pub fn low_cost(&self) -> Cost {
        self.low_cost
    }

    /// An atom's current truth value.
    pub fn state(&self, atom: Atom) -> bool {
        self.atoms[atom as usize].state
    }

    /// An atom's truth value at the point `low_cost` was last recorded.
    pub fn low_state(&self, atom: Atom) -> bool {
        self.atoms[atom as usize].low_state
    }

    /// An atom's sampling counter (§4.4).
    pub fn trues_counter(&self, atom: Atom) -> u64 {
        self.atoms[atom as usize].trues_counter
    }

    /// An atom's fixed status.
    pub fn fixed_value(&self, atom: Atom) -> FixedValue {
        self.atoms[atom as usize].fixed_value
    }

    /// Read-only access to an atom's full scratch record.
    pub fn atom_record(&self, atom: Atom) -> &AtomRecord {
        &self.atoms[atom as usize]
    }

    /// Read-only access to a constraint's full scratch record.
    pub fn constraint_record(&self, cid: ConstraintId) -> &ConstraintRecord {
        &self.constraints[cid]
    }

    /// Sets every constraint's cost-formula selector (§4.4 phase transitions between MaxWalkSAT
    /// and MC-SAT's sampling phase).
    pub fn set_mode_all(&mut self, mode: ConstraintMode) {
        for record in &mut self.constraints {
            record.mode = mode;
        }
    }

    /// Pins `atom` to `value`. Used by the external caller (§3) as well as
    /// [unit_propagation](Self::unit_propagation) internally.
    pub fn fix_atom(&mut self, atom: Atom, value: bool) -> Result<(), ErrorKind> {
        self.pin_atom(atom, value)
    }

    /// Clears every atom's fixed status and every constraint's `is_satisfied_by_fixed` flag.
    pub fn unfix_all(&mut self) {
        for atom in 1..=self.mrf.atom_count() {
            self.atoms[atom as usize].fixed_value = FixedValue::Free;
        }
        for record in &mut self.constraints {
            record.is_satisfied_by_fixed = false;
        }
    }

    fn mark_dirty(&mut self, atom: Atom) {
        self.dirty.insert(atom);
    }

    fn snapshot_low_state(&mut self) {
        self.low_cost = self.total_cost;
        for atom in self.dirty.drain() {
            self.atoms[atom as usize].low_state = self.atoms[atom as usize].state;
        }
    }

    fn pin_atom(&mut self, atom: Atom, value: bool) -> Result<(), ErrorKind> {
        match self.atoms[atom as usize].fixed_value.pinned_value() {
            Some(existing) if existing != value => Err(ErrorKind::Contradiction(atom)),
            Some(_) => Ok(()),
            None => {
                self.atoms[atom as usize].fixed_value = FixedValue::pinning(value);
                self.atoms[atom as usize].state = value;
                self.mark_dirty(atom);
                Ok(())
            }
        }
    }

    fn pin_literal_true(&mut self, literal: Literal) -> Result<(), ErrorKind> {
        self.pin_atom(literal.atom(), literal.polarity())
    }

    fn pin_literal_false(&mut self, literal: Literal) -> Result<(), ErrorKind> {
        self.pin_atom(literal.atom(), !literal.polarity())
    }

    /// Full initial pass: sets every active constraint's `nsat`/watches and every atom's
    /// `break_cost`/`make_cost` from scratch, and rebuilds `total_cost` and the [UnsatIndex].
    pub fn evaluate_costs(&mut self) {
        self.total_cost = Cost::ZERO;
        self.unsat = UnsatIndex::new(self.mrf.num_constraints());
        self.priority_buffer.clear();

        for cid in 0..self.mrf.num_constraints() {
            if !self.constraints[cid].is_active() {
                continue;
            }
            let constraint = self.mrf.constraint(cid);
            let mode = self.constraints[cid].mode;

            let mut nsat = 0u32;
            let mut watch1 = None;
            let mut watch2 = None;
            for (idx, literal) in constraint.literals().iter().enumerate() {
                if literal.is_satisfied_by(self.atoms[literal.atom() as usize].state) {
                    nsat += 1;
                    if watch1.is_none() {
                        watch1 = Some(idx);
                    } else if watch2.is_none() {
                        watch2 = Some(idx);
                    }
                }
            }

            let cost = cost_of(constraint, mode, nsat);
            self.total_cost = self.total_cost + cost;
            if !cost.is_zero() {
                self.unsat.insert(cid, constraint.is_hard());
            }

            if nsat == 0 {
                for literal in constraint.literals() {
                    let record = &mut self.atoms[literal.atom() as usize];
                    record.make_cost = record.make_cost + constraint.magnitude();
                }
            } else if nsat == 1 {
                let atom = constraint.literals()[watch1.unwrap()].atom();
                let record = &mut self.atoms[atom as usize];
                record.break_cost = record.break_cost + constraint.magnitude();
            }

            let record = &mut self.constraints[cid];
            record.nsat = nsat;
            record.watch1 = watch1;
            record.watch2 = watch2;
        }

        self.low_cost = self.total_cost;
    }

    /// Applies the cost-table transition for one constraint's `nsat` change, keeping
    /// `total_cost`, the [UnsatIndex], and the hard-priority buffer consistent.
    fn transition_cost(&mut self, cid: ConstraintId, old_nsat: u32, new_nsat: u32) {
        let constraint = self.mrf.constraint(cid);
        let mode = self.constraints[cid].mode;
        let old_cost = cost_of(constraint, mode, old_nsat);
        let new_cost = cost_of(constraint, mode, new_nsat);

        if old_cost != new_cost {
            self.total_cost = self.total_cost + new_cost - old_cost;
        }

        let was_unsat = !old_cost.is_zero();
        let now_unsat = !new_cost.is_zero();
        if now_unsat && !was_unsat {
            self.unsat.insert(cid, constraint.is_hard());
            if constraint.is_hard() {
                self.priority_buffer.push_back(cid);
            }
        } else if !now_unsat && was_unsat {
            self.unsat.remove(cid, constraint.is_hard());
            if constraint.is_hard() {
                self.priority_buffer.retain(|&other| other != cid);
            }
        }
    }

    fn find_satisfying_atom_excluding(&self, cid: ConstraintId, excluded: Atom) -> Option<Atom> {
        let constraint = self.mrf.constraint(cid);
        constraint
            .literals()
            .iter()
            .find(|literal| {
                literal.atom() != excluded
                    && literal.is_satisfied_by(self.atoms[literal.atom() as usize].state)
            })
            .map(|literal| literal.atom())
    }

    fn becoming_satisfied(&mut self, cid: ConstraintId, flipped_atom: Atom) {
        if !self.constraints[cid].is_active() {
            return;
        }
        let old_nsat = self.constraints[cid].nsat;
        let new_nsat = old_nsat + 1;
        self.constraints[cid].nsat = new_nsat;
        self.transition_cost(cid, old_nsat, new_nsat);

        let constraint = self.mrf.constraint(cid);
        if new_nsat == 1 {
            let magnitude = constraint.magnitude();
            for literal in constraint.literals() {
                let record = &mut self.atoms[literal.atom() as usize];
                record.make_cost = record.make_cost - magnitude;
            }
            let record = &mut self.atoms[flipped_atom as usize];
            record.break_cost = record.break_cost + magnitude;
            let watch1 = constraint
                .literals()
                .iter()
                .position(|literal| literal.atom() == flipped_atom);
            self.constraints[cid].watch1 = watch1;
            self.constraints[cid].watch2 = None;
        } else if new_nsat == 2 {
            if let Some(other) = self.find_satisfying_atom_excluding(cid, flipped_atom) {
                let magnitude = self.mrf.constraint(cid).magnitude();
                let record = &mut self.atoms[other as usize];
                record.break_cost = record.break_cost - magnitude;
            }
            let constraint = self.mrf.constraint(cid);
            self.constraints[cid].watch2 = constraint
                .literals()
                .iter()
                .position(|literal| literal.atom() == flipped_atom);
        }
    }

    fn becoming_unsatisfied(&mut self, cid: ConstraintId, flipped_atom: Atom) {
        if !self.constraints[cid].is_active() {
            return;
        }
        let old_nsat = self.constraints[cid].nsat;
        let new_nsat = old_nsat - 1;
        self.constraints[cid].nsat = new_nsat;
        self.transition_cost(cid, old_nsat, new_nsat);

        let constraint = self.mrf.constraint(cid);
        if new_nsat == 0 {
            let magnitude = constraint.magnitude();
            for literal in constraint.literals() {
                let record = &mut self.atoms[literal.atom() as usize];
                record.make_cost = record.make_cost + magnitude;
            }
            let record = &mut self.atoms[flipped_atom as usize];
            record.break_cost = record.break_cost - magnitude;
            self.constraints[cid].watch1 = None;
            self.constraints[cid].watch2 = None;
        } else if new_nsat == 1 {
            if let Some(remaining) = self.find_satisfying_atom_excluding(cid, flipped_atom) {
                let magnitude = self.mrf.constraint(cid).magnitude();
                let record = &mut self.atoms[remaining as usize];
                record.break_cost = record.break_cost + magnitude;
                let constraint = self.mrf.constraint(cid);
                self.constraints[cid].watch1 = constraint
                    .literals()
                    .iter()
                    .position(|literal| literal.atom() == remaining);
            }
        }
    }

    /// Single-atom mutation: toggles `atom`'s truth value and incrementally repairs every
    /// invariant [evaluate_costs](Self::evaluate_costs) would otherwise have to recompute from
    /// scratch (§4.1 `flip`). Runs in time proportional to `atom`'s constraint degree.
    pub fn flip(&mut self, atom: Atom, iteration: i64) {
        let new_state = !self.atoms[atom as usize].state;
        self.atoms[atom as usize].state = new_state;
        self.atoms[atom as usize].last_flip = iteration;
        self.mark_dirty(atom);

        let (becoming_satisfied, becoming_unsatisfied) = if new_state {
            (
                self.mrf.positive_constraints_of(atom),
                self.mrf.negative_constraints_of(atom),
            )
        } else {
            (
                self.mrf.negative_constraints_of(atom),
                self.mrf.positive_constraints_of(atom),
            )
        };
        let becoming_satisfied = becoming_satisfied.to_vec();
        let becoming_unsatisfied = becoming_unsatisfied.to_vec();

        for cid in becoming_satisfied {
            self.becoming_satisfied(cid, atom);
        }
        for cid in becoming_unsatisfied {
            self.becoming_unsatisfied(cid, atom);
        }

        if self.total_cost < self.low_cost {
            self.snapshot_low_state();
        }
    }

    /// Randomises every unfixed atom, optionally runs [unit_propagation](Self::unit_propagation),
    /// then re-evaluates costs from scratch and saves the result as the low state (§4.1 `reset`).
    pub fn reset(&mut self, tabu_length: i64, with_unit_propagation: bool) -> Result<(), ErrorKind> {
        for atom in 1..=self.mrf.atom_count() {
            let record = &mut self.atoms[atom as usize];
            if record.fixed_value == FixedValue::Free {
                record.state = self.rng.gen_bool(0.5);
            }
            record.last_flip = -(tabu_length + 1);
            record.break_cost = Cost::ZERO;
            record.make_cost = Cost::ZERO;
        }
        self.dirty.clear();
        self.priority_buffer.clear();

        if with_unit_propagation {
            self.unit_propagation()?;
        }
        self.evaluate_costs();

        for atom in 1..=self.mrf.atom_count() {
            self.atoms[atom as usize].low_state = self.atoms[atom as usize].state;
        }
        Ok(())
    }

    /// Fix-point unit propagation over the *hard* constraints only (§4.1 `unit_propagation`):
    /// soft clauses are, by construction, allowed to be violated, so propagating consequences
    /// from them would contradict their purpose. Negative hard clauses force every literal
    /// false; positive hard clauses are then driven to a fixed point the usual BCP way.
    pub fn unit_propagation(&mut self) -> Result<(), ErrorKind> {
        self.unfix_all();

        for cid in 0..self.mrf.num_constraints() {
            let constraint = self.mrf.constraint(cid);
            if !constraint.is_hard() || constraint.is_positive() {
                continue;
            }
            if !self.constraints[cid].is_active() {
                continue;
            }
            let literals: Vec<Literal> = constraint.literals().to_vec();
            for literal in literals {
                log::trace!(target: PROPAGATION, "negative hard constraint {cid} forces atom {} false", literal.atom());
                self.pin_literal_false(literal)?;
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for cid in 0..self.mrf.num_constraints() {
                let constraint = self.mrf.constraint(cid);
                if !constraint.is_hard() || !constraint.is_positive() {
                    continue;
                }
                if !self.constraints[cid].is_active() || self.constraints[cid].is_satisfied_by_fixed {
                    continue;
                }

                let mut satisfied = false;
                let mut unpinned: Option<Literal> = None;
                let mut multiple_unpinned = false;
                for literal in constraint.literals() {
                    match self.atoms[literal.atom() as usize].fixed_value.pinned_value() {
                        Some(value) => {
                            if literal.is_satisfied_by(value) {
                                satisfied = true;
                                break;
                            }
                        }
                        None if unpinned.is_some() => multiple_unpinned = true,
                        None => unpinned = Some(*literal),
                    }
                }

                if satisfied {
                    self.constraints[cid].is_satisfied_by_fixed = true;
                    changed = true;
                } else if !multiple_unpinned {
                    match unpinned {
                        Some(literal) => {
                            log::trace!(
                                target: PROPAGATION,
                                "constraint {cid} forces atom {} to {}",
                                literal.atom(),
                                literal.polarity()
                            );
                            self.pin_literal_true(literal)?;
                            changed = true;
                        }
                        // every literal pinned false and none satisfies the clause: the hard
                        // clause set is jointly unsatisfiable.
                        None => return Err(ErrorKind::Contradiction(NO_ATOM)),
                    }
                }
            }
        }
        Ok(())
    }

    /// Deactivates every soft constraint, keeping only the hard ones active (§4.1 "Slice
    /// selection").
    pub fn select_only_hard_constraints(&mut self) {
        for cid in 0..self.mrf.num_constraints() {
            let hard = self.mrf.constraint(cid).is_hard();
            self.constraints[cid].inactive = !hard;
        }
    }

    /// Activates every constraint.
    pub fn select_all_constraints(&mut self) {
        for record in &mut self.constraints {
            record.inactive = false;
        }
    }

    /// For each currently-satisfied constraint, keeps it active if hard or a uniform draw falls
    /// within its precomputed threshold; deactivates it otherwise. Unsatisfied constraints are
    /// always kept active, since a sample must still be free to resolve them.
    pub fn select_some_sat_constraints(&mut self) {
        for cid in 0..self.mrf.num_constraints() {
            if !self.constraints[cid].is_satisfied() {
                self.constraints[cid].inactive = false;
                continue;
            }
            let hard = self.mrf.constraint(cid).is_hard();
            let threshold = self.constraints[cid].threshold.clamp(0.0, 1.0);
            let keep = hard || self.rng.gen_bool(threshold);
            self.constraints[cid].inactive = !keep;
        }
    }

    /// Selection policy for SAT solvers (§4.1 `get_random_unsat_constraint`). `hard_priority`
    /// selects between plain uniform sampling and the hard-priority policy that favours
    /// constraints the most recent flip just broke.
    pub fn get_random_unsat_constraint(&mut self, hard_priority: bool) -> Option<ConstraintId> {
        if !hard_priority {
            return self.unsat.get_random(&mut self.rng);
        }
        while let Some(cid) = self.priority_buffer.pop_front() {
            if self.unsat.contains(cid) {
                return Some(cid);
            }
        }
        if self.unsat.num_hard() > 0 {
            let mrf = self.mrf;
            return self
                .unsat
                .get_random_hard(&mut self.rng, |cid| mrf.constraint(cid).is_hard());
        }
        self.unsat.get_random(&mut self.rng)
    }

    /// Restores every atom to the truth value recorded when `low_cost` was last set.
    pub fn restore_low_state(&mut self) {
        for atom in 1..=self.mrf.atom_count() {
            self.atoms[atom as usize].state = self.atoms[atom as usize].low_state;
        }
    }

    /// `true` iff `atom` is currently the sole satisfier of some active hard constraint, i.e.
    /// flipping it would violate that hard constraint (§4.4 SA-step eligibility).
    pub fn would_break_hard_constraint(&self, atom: Atom) -> bool {
        let adjacency = if self.atoms[atom as usize].state {
            self.mrf.positive_constraints_of(atom)
        } else {
            self.mrf.negative_constraints_of(atom)
        };
        adjacency.iter().any(|&cid| {
            self.constraints[cid].is_active()
                && self.constraints[cid].nsat == 1
                && self.mrf.constraint(cid).is_hard()
        })
    }

    /// Increments `trues_counter` for every atom currently `true` (§4.4 phase 3d "count").
    pub fn count_trues(&mut self) {
        for atom in 1..=self.mrf.atom_count() {
            if self.atoms[atom as usize].state {
                self.atoms[atom as usize].trues_counter += 1;
            }
        }
    }

    /// The underlying source of randomness, for solvers that need a raw draw (e.g. simulated
    /// annealing acceptance, §4.4).
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// The current cost as a plain float, for reporting and target-cost comparisons.
    pub fn cost_as_f64(&self) -> f64 {
        self.total_cost.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::RawConstraint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_mrf() -> MRF {
        // a ∨ b (soft, weight 2), ¬a (soft, weight 1): MAP is a=false, b=true.
        let raw = vec![
            RawConstraint::new(2.0, vec![1, 2]),
            RawConstraint::new(1.0, vec![-1]),
        ];
        MRF::new(2, raw, (1, 2), 1_000.0).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn evaluate_costs_flags_violated_constraints() {
        let mrf = tiny_mrf();
        let mut state = GenericMRFState::new(&mrf, rng());
        state.atoms[1].state = false;
        state.atoms[2].state = false;
        state.evaluate_costs();
        // a ∨ b violated (cost 2), ¬a satisfied (cost 0): total = 2.
        assert_eq!(state.total_cost(), Cost::from_weight(2.0));
    }

    #[test]
    fn flip_matches_full_reevaluation() {
        let mrf = tiny_mrf();
        let mut incremental = GenericMRFState::new(&mrf, rng());
        incremental.atoms[1].state = false;
        incremental.atoms[2].state = false;
        incremental.evaluate_costs();
        incremental.flip(2, 1);

        let mut from_scratch = GenericMRFState::new(&mrf, rng());
        from_scratch.atoms[1].state = false;
        from_scratch.atoms[2].state = true;
        from_scratch.evaluate_costs();

        assert_eq!(incremental.total_cost(), from_scratch.total_cost());
        assert_eq!(
            incremental.constraint_record(0).nsat,
            from_scratch.constraint_record(0).nsat
        );
    }

    #[test]
    fn flip_to_zero_cost_snapshots_low_state() {
        let mrf = tiny_mrf();
        let mut state = GenericMRFState::new(&mrf, rng());
        state.atoms[1].state = false;
        state.atoms[2].state = false;
        state.evaluate_costs();
        state.flip(2, 1);
        assert_eq!(state.total_cost(), Cost::ZERO);
        assert_eq!(state.low_cost(), Cost::ZERO);
        assert!(state.low_state(2));
    }

    #[test]
    fn unit_propagation_pins_hard_unit_clause() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1])];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let mut state = GenericMRFState::new(&mrf, rng());
        state.unit_propagation().unwrap();
        assert_eq!(state.fixed_value(1).pinned_value(), Some(true));
    }

    #[test]
    fn unit_propagation_detects_contradiction() {
        let raw = vec![
            RawConstraint::new(f64::INFINITY, vec![1]),
            RawConstraint::new(f64::INFINITY, vec![-1]),
        ];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let mut state = GenericMRFState::new(&mrf, rng());
        assert!(state.unit_propagation().is_err());
    }

    #[test]
    fn unit_propagation_pins_negative_hard_clause_literals_false() {
        let raw = vec![RawConstraint::new(f64::NEG_INFINITY, vec![1, 2])];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let mut state = GenericMRFState::new(&mrf, rng());
        state.unit_propagation().unwrap();
        assert_eq!(state.fixed_value(1).pinned_value(), Some(false));
        assert_eq!(state.fixed_value(2).pinned_value(), Some(false));
    }

    #[test]
    fn reset_makes_every_atom_flippable() {
        let mrf = tiny_mrf();
        let mut state = GenericMRFState::new(&mrf, rng());
        state.reset(10, false).unwrap();
        assert!(state.atom_record(1).outside_tabu(0, 10));
        assert!(state.atom_record(2).outside_tabu(0, 10));
    }
}
