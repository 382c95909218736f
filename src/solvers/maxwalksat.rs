/*!
MaxWalkSAT: stochastic local search for the MAP assignment (§4.3).

Each trial starts from a fresh random assignment and repeatedly flips an atom chosen by
[walksat_step], alternating greedy (minimise delta) and noisy (uniform) moves, until the cost
floor is reached or the flip budget runs out. The lowest-cost assignment seen is left in the
state's `low_state` for the caller to read.
*/

use std::cmp::Ordering;

use rand::Rng;

use crate::config::MaxWalkSatConfig;
use crate::generic::weight::{Cost, Delta};
use crate::misc::log::targets::MAXWALKSAT;
use crate::state::MRFState;
use crate::structures::atom::Atom;
use crate::structures::constraint::ConstraintDef;
use crate::types::err::ErrorKind;

/// Runs MaxWalkSAT to completion over `state`, per `config` (§4.3's pseudocode).
///
/// On return the lowest-cost assignment found across all trials is the current `low_state` of
/// `state`; [restore_low_state](MRFState::restore_low_state) has already been called.
pub fn max_walk_sat(state: &mut MRFState<'_>, config: &MaxWalkSatConfig) -> Result<(), ErrorKind> {
    if config.sat_hard_unit {
        satisfy_hard_unit_clauses(state)?;
    }

    let tabu_length = config.tabu_length.value;
    let target_cost = Cost::from_weight(config.target_cost.value);

    'trials: for trial in 0..config.max_tries.value {
        state.reset(tabu_length, false)?;
        log::debug!(target: MAXWALKSAT, "trial {trial} starting, cost {}", state.cost_as_f64());

        let mut iteration: i64 = 0;
        while (iteration as u64) < config.max_flips.value {
            iteration += 1;
            if state.total_cost() <= target_cost {
                log::debug!(
                    target: MAXWALKSAT,
                    "trial {trial} reached target cost {} after {iteration} flips",
                    state.cost_as_f64()
                );
                break 'trials;
            }
            if let Some(atom) = walksat_step(state, iteration, config) {
                state.flip(atom, iteration);
            }
        }
        log::debug!(target: MAXWALKSAT, "trial {trial} ended at cost {}", state.cost_as_f64());
    }

    state.restore_low_state();
    Ok(())
}

fn satisfy_hard_unit_clauses(state: &mut MRFState<'_>) -> Result<(), ErrorKind> {
    for cid in 0..state.mrf().num_constraints() {
        let constraint = state.mrf().constraint(cid);
        if constraint.is_hard() && constraint.is_unit() {
            let literal = constraint.literals()[0];
            state.fix_atom(literal.atom(), literal.polarity())?;
        }
    }
    Ok(())
}

/// One move: picks an unsatisfied constraint, then a greedy or noisy flip among its literals'
/// atoms. Returns `None` if no constraint is violated or no eligible atom exists.
pub(crate) fn walksat_step(state: &mut MRFState<'_>, iteration: i64, config: &MaxWalkSatConfig) -> Option<Atom> {
    let cid = state.get_random_unsat_constraint(config.sat_hard_priority)?;
    let constraint: &ConstraintDef = state.mrf().constraint(cid);
    let positive = constraint.is_positive();
    let tabu_length = config.tabu_length.value;

    let eligible = move |state: &MRFState<'_>, atom: Atom| -> bool {
        let record = state.atom_record(atom);
        !record.fixed_value.is_fixed()
            && (record.break_cost.is_zero() || record.outside_tabu(iteration, tabu_length))
    };

    if state.rng_mut().gen_bool(config.p_best.value) {
        let scan_atoms: Vec<Atom> = if positive {
            constraint.literals().iter().map(|l| l.atom()).collect()
        } else {
            constraint
                .literals()
                .iter()
                .filter(|l| l.is_satisfied_by(state.state(l.atom())))
                .map(|l| l.atom())
                .collect()
        };
        pick_min_delta(state, &scan_atoms, eligible)
    } else {
        let scan_atoms: Vec<Atom> = constraint.literals().iter().map(|l| l.atom()).collect();
        pick_uniform_eligible(state, &scan_atoms, eligible)
    }
}

fn pick_min_delta(
    state: &mut MRFState<'_>,
    atoms: &[Atom],
    eligible: impl Fn(&MRFState<'_>, Atom) -> bool,
) -> Option<Atom> {
    let mut best: Option<Delta> = None;
    let mut ties: Vec<Atom> = Vec::new();

    for &atom in atoms {
        if !eligible(state, atom) {
            continue;
        }
        let delta = state.atom_record(atom).delta();
        match best {
            None => {
                best = Some(delta);
                ties = vec![atom];
            }
            Some(current) => match delta.cmp(&current) {
                Ordering::Less => {
                    best = Some(delta);
                    ties = vec![atom];
                }
                Ordering::Equal => ties.push(atom),
                Ordering::Greater => {}
            },
        }
    }

    if ties.is_empty() {
        return None;
    }
    let idx = state.rng_mut().gen_range(0..ties.len());
    Some(ties[idx])
}

fn pick_uniform_eligible(
    state: &mut MRFState<'_>,
    atoms: &[Atom],
    eligible: impl Fn(&MRFState<'_>, Atom) -> bool,
) -> Option<Atom> {
    let candidates: Vec<Atom> = atoms.iter().copied().filter(|&a| eligible(state, a)).collect();
    if candidates.is_empty() {
        return None;
    }
    let idx = state.rng_mut().gen_range(0..candidates.len());
    Some(candidates[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::{RawConstraint, MRF};

    #[test]
    fn solves_trivial_conjunction() {
        // a ∧ b, both hard: the only MAP is a=true, b=true.
        let raw = vec![
            RawConstraint::new(f64::INFINITY, vec![1]),
            RawConstraint::new(f64::INFINITY, vec![2]),
        ];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let mut state = MRFState::from_mrf(&mrf, 42);
        let config = MaxWalkSatConfig::default();
        max_walk_sat(&mut state, &config).unwrap();
        assert!(state.state(1));
        assert!(state.state(2));
        assert_eq!(state.low_cost(), Cost::ZERO);
    }

    #[test]
    fn resolves_a_soft_conflict_by_weight() {
        // a (weight 3) vs ¬a (weight 1), both unit: MAP keeps the heavier constraint satisfied.
        let raw = vec![
            RawConstraint::new(3.0, vec![1]),
            RawConstraint::new(1.0, vec![-1]),
        ];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let mut state = MRFState::from_mrf(&mrf, 7);
        let config = MaxWalkSatConfig::default();
        max_walk_sat(&mut state, &config).unwrap();
        assert!(state.state(1));
    }

    #[test]
    fn hard_priority_still_finds_a_solution() {
        let raw = vec![
            RawConstraint::new(f64::INFINITY, vec![1, 2]),
            RawConstraint::new(f64::INFINITY, vec![-1, -2]),
        ];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let mut state = MRFState::from_mrf(&mrf, 3);
        let mut config = MaxWalkSatConfig::default();
        config.sat_hard_priority = true;
        max_walk_sat(&mut state, &config).unwrap();
        assert_eq!(state.low_cost(), Cost::ZERO);
    }
}
