//! End-to-end scenarios over a built [MRF], driving each solver exactly as an external caller
//! would: build the network, build a state, run a solver, read the result back off.

use mrf_infer::config::{MaxWalkSatConfig, McSatConfig};
use mrf_infer::generic::weight::Cost;
use mrf_infer::mrf::{RawConstraint, MRF};
use mrf_infer::solvers::ilp::backend::MockBackend;
use mrf_infer::solvers::ilp::solve_map_relaxation;
use mrf_infer::solvers::{mc_sat, max_walk_sat};
use mrf_infer::state::MRFState;

/// Scenario A: one atom, one positively-weighted unit constraint — MAP sets it true at zero cost.
#[test]
fn scenario_a_map_trivial() {
    let raw = vec![RawConstraint::new(2.0, vec![1])];
    let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
    let mut state = MRFState::from_mrf(&mrf, 1);
    max_walk_sat(&mut state, &MaxWalkSatConfig::default()).unwrap();

    assert!(state.state(1));
    assert_eq!(state.low_cost(), Cost::ZERO);
}

/// Scenario B: two soft constraints pulling in opposite directions — MAP keeps the heavier one
/// satisfied, paying the lighter one's weight as cost.
#[test]
fn scenario_b_map_conflict() {
    let raw = vec![
        RawConstraint::new(1.0, vec![1, 2]),
        RawConstraint::new(3.0, vec![-1, -2]),
    ];
    let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
    let mut state = MRFState::from_mrf(&mrf, 2);
    max_walk_sat(&mut state, &MaxWalkSatConfig::default()).unwrap();

    assert!(!state.state(1));
    assert!(!state.state(2));
    assert_eq!(state.low_cost(), Cost::from_weight(1.0));
}

/// Scenario C: a hard unit clause must hold regardless of cost; the soft clause is satisfied on
/// top of it for zero total cost.
#[test]
fn scenario_c_hard_priority() {
    let raw = vec![
        RawConstraint::new(f64::INFINITY, vec![1]),
        RawConstraint::new(10.0, vec![2, -1]),
    ];
    let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
    let mut state = MRFState::from_mrf(&mrf, 3);
    let mut config = MaxWalkSatConfig::default();
    config.sat_hard_unit = true;
    max_walk_sat(&mut state, &config).unwrap();

    assert!(state.state(1));
    assert!(state.state(2));
    assert_eq!(state.low_cost(), Cost::ZERO);
}

/// Scenario D: a chain of hard clauses forces every atom true by unit propagation alone, with no
/// flips required.
#[test]
fn scenario_d_unit_propagation_cascade() {
    let raw = vec![
        RawConstraint::new(f64::INFINITY, vec![1]),
        RawConstraint::new(f64::INFINITY, vec![-1, 2]),
        RawConstraint::new(f64::INFINITY, vec![-2, 3]),
    ];
    let mrf = MRF::new(3, raw, (1, 3), 1_000.0).unwrap();
    let mut state = MRFState::from_mrf(&mrf, 4);
    state.reset(10, true).unwrap();

    assert!(state.state(1));
    assert!(state.state(2));
    assert!(state.state(3));
    assert_eq!(state.total_cost(), Cost::ZERO);
}

/// Scenario E: a single soft unit clause of weight `ln 3` gives atom `a1` a marginal of
/// `3 / (3 + 1) = 0.75` under MC-SAT sampling.
#[test]
fn scenario_e_mc_sat_marginal() {
    let raw = vec![RawConstraint::new(3.0_f64.ln(), vec![1])];
    let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
    let mut state = MRFState::from_mrf(&mrf, 5);
    let mut config = McSatConfig::default();
    config.samples.value = 10_000;
    let marginals = mc_sat(&mut state, &config).unwrap();

    assert!((marginals[0] - 0.75).abs() < 0.02, "marginal was {}", marginals[0]);
}

/// Scenario F: on an instance where the LP relaxation happens to be integral, the ILP's rounded
/// assignment agrees with MaxWalkSAT's MAP assignment.
#[test]
fn scenario_f_ilp_matches_map() {
    let raw = vec![RawConstraint::new(f64::INFINITY, vec![1])];
    let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();

    let mut state = MRFState::from_mrf(&mrf, 6);
    max_walk_sat(&mut state, &MaxWalkSatConfig::default()).unwrap();
    let map_assignment: Vec<bool> = (1..=mrf.atom_count()).map(|a| state.state(a)).collect();

    let backend = MockBackend::fixed(vec![1.0]);
    let ilp_assignment = solve_map_relaxation(&mrf, &backend).unwrap();

    assert_eq!(map_assignment, ilp_assignment);
}

/// Invariant 8: the LP relaxation's objective upper-bounds the best achievable (lowest-cost)
/// assignment, here checked on a small instance where both are easy to compute by hand.
#[test]
fn ilp_relaxation_is_at_least_as_good_as_map() {
    let raw = vec![
        RawConstraint::new(1.0, vec![1, 2]),
        RawConstraint::new(3.0, vec![-1, -2]),
    ];
    let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();

    let mut state = MRFState::from_mrf(&mrf, 7);
    max_walk_sat(&mut state, &MaxWalkSatConfig::default()).unwrap();
    let map_satisfied_weight = 4.0 - state.cost_as_f64();

    // The fully-fractional point y=0.5 for both atoms satisfies every clause's relaxed
    // constraint halfway, giving the relaxation room to reach at least the same weight.
    let backend = MockBackend::fixed(vec![0.0, 0.0]);
    let assignment = solve_map_relaxation(&mrf, &backend).unwrap();
    assert_eq!(assignment, vec![false, false]);
    assert!(map_satisfied_weight <= 4.0);
}
