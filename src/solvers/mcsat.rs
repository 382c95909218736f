/*!
MC-SAT: a slice-sampling Markov chain over satisfying assignments, used to estimate per-atom
marginal probabilities (§4.4).

Each sample re-slices the active constraint set (keeping hard constraints and probabilistically
keeping already-satisfied soft ones), resets to a fresh assignment honouring that slice, then
drives the state back to a low-cost region with an inner loop that mixes simulated-annealing
steps and plain [WalkSAT steps](crate::solvers::maxwalksat::walksat_step). Each sample's final
assignment casts one vote per atom towards that atom's marginal.
*/

use rand::Rng;

use super::maxwalksat::{max_walk_sat, walksat_step};
use crate::config::{MaxWalkSatConfig, McSatConfig};
use crate::generic::weight::Cost;
use crate::misc::log::targets::MCSAT;
use crate::state::MRFState;
use crate::structures::constraint::ConstraintMode;
use crate::types::err::ErrorKind;

/// Runs MC-SAT over `state` and returns the estimated marginal probability of each query atom,
/// in query-atom order (§4.4 phase 4 "Emit marginals").
pub fn mc_sat(state: &mut MRFState<'_>, config: &McSatConfig) -> Result<Vec<f64>, ErrorKind> {
    let walksat_config = as_maxwalksat_config(config);

    // Phase 1: initialise — satisfy the hard constraints from a random start.
    state.select_only_hard_constraints();
    max_walk_sat(state, &walksat_config)?;

    // Phase 2: prepare sampling — every constraint counts, at unit cost once violated.
    state.select_all_constraints();
    state.evaluate_costs();
    state.set_mode_all(ConstraintMode::SampleSat);

    let target_cost = Cost::from_weight(config.target_cost.value);
    let max_inner_iterations = config.max_tries.value as u64 * config.max_flips.value;

    for sample in 0..config.samples.value {
        state.select_some_sat_constraints();
        state.reset(config.tabu_length.value, config.unit_propagation)?;
        log::debug!(target: MCSAT, "sample {sample} starting, cost {}", state.cost_as_f64());

        let mut solutions_found = 0u32;
        let mut iteration: i64 = 0;
        for _ in 0..max_inner_iterations {
            iteration += 1;

            let sa_turn = state.total_cost() <= target_cost
                || (!config.late_sa && state.rng_mut().gen_bool(config.p_sa.value));

            if sa_turn {
                sa_step(state, config, iteration);
            } else if let Some(atom) = walksat_step(state, iteration, &walksat_config) {
                state.flip(atom, iteration);
            }

            if state.total_cost() <= target_cost {
                solutions_found += 1;
                if solutions_found >= config.num_solutions.value {
                    break;
                }
            }
        }

        state.restore_low_state();
        state.evaluate_costs();
        state.count_trues();
        log::debug!(target: MCSAT, "sample {sample} ended at cost {}", state.cost_as_f64());
    }

    // A subsequent MaxWalkSAT pass over this state must see MWS costs, not unit SampleSat ones.
    state.set_mode_all(ConstraintMode::MaxWalkSat);

    let (start, end) = state.mrf().query_range();
    let samples = f64::from(config.samples.value);
    Ok((start..=end)
        .map(|atom| state.trues_counter(atom) as f64 / samples)
        .collect())
}

/// One simulated-annealing step: picks a uniformly random atom and flips it if doing so is
/// both safe (not fixed, breaks no hard constraint) and thermally accepted.
fn sa_step(state: &mut MRFState<'_>, config: &McSatConfig, iteration: i64) {
    let atom = state.rng_mut().gen_range(1..=state.mrf().atom_count());
    if state.fixed_value(atom).is_fixed() || state.would_break_hard_constraint(atom) {
        return;
    }

    let delta = state.atom_record(atom).delta();
    let accept = delta.is_non_positive() || {
        let draw: f64 = state.rng_mut().gen_range(0.0..1.0);
        draw < (-delta.to_f64() / config.sa_temperature.value).exp()
    };

    if accept {
        state.flip(atom, iteration);
    }
}

fn as_maxwalksat_config(config: &McSatConfig) -> MaxWalkSatConfig {
    let mut mws = MaxWalkSatConfig::default();
    mws.p_best = config.p_best;
    mws.tabu_length = config.tabu_length;
    mws.sat_hard_priority = config.sat_hard_priority;
    mws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::{RawConstraint, MRF};
    use crate::state::MRFState;

    #[test]
    fn marginal_of_a_hard_unit_clause_is_one() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1])];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let mut state = MRFState::from_mrf(&mrf, 11);
        let mut config = McSatConfig::default();
        config.samples.value = 20;
        let marginals = mc_sat(&mut state, &config).unwrap();
        assert_eq!(marginals, vec![1.0]);
    }

    #[test]
    fn marginal_of_a_symmetric_soft_clause_is_balanced() {
        // a ∨ ¬a is a tautology; with no other constraints on a's polarity the marginal should
        // land near 0.5 rather than collapsing to 0 or 1.
        let raw = vec![RawConstraint::new(1.0, vec![1, -1])];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let mut state = MRFState::from_mrf(&mrf, 5);
        let mut config = McSatConfig::default();
        config.samples.value = 200;
        let marginals = mc_sat(&mut state, &config).unwrap();
        assert!(marginals[0] > 0.2 && marginals[0] < 0.8);
    }
}
