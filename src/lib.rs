/*!
Probabilistic inference over ground Markov random fields.

This library takes a grounded, weighted set of propositional clauses (an [MRF](mrf::MRF)) and
answers two questions about it: the most probable assignment (MAP, via stochastic local search),
and the marginal probability of each query atom (via Markov chain Monte Carlo sampling). A third,
complementary route treats MAP as a linear program and hands it to an external LP solver.

Some guiding principles, inherited from the architecture this library's internals are modelled
on:
- [Modularity](#modularity).
- Documentation, of both implementation and theory.
- [Simple efficiency](#simple-efficiency).

# Orientation

An inference problem has two halves:

- An [MRF](mrf::MRF) is the immutable network: atoms, weighted constraints, and the adjacency
  structure between them. Built once via [MRF::new](mrf::MRF::new) and never mutated afterwards.
- An [MRFState](state::MRFState) is the mutable per-solve scratch space laid over that network:
  current truth values, per-atom break/make costs, the running total cost, and the random
  generator driving the search. One MRF may be solved by many independent states.

From there:
- [solvers::max_walk_sat] drives a state to a low-cost assignment — the MAP estimate.
- [solvers::mc_sat] drives many short resets of a state to estimate each query atom's marginal.
- [solvers::ilp] offers the same MAP question as a linear relaxation, for callers who'd rather
  hand it to Gurobi (or another solver behind [solvers::ilp::LpBackend]) than run local search.

Useful starting points:
- [mrf] to see how a ground network is represented and validated.
- [state] for the incremental bookkeeping ([state::GenericMRFState::flip] in particular) that
  both local-search solvers are built on.
- [config] for the tunable parameters of each solver.
- [logic] for the function-elimination and predicate-completion transforms that run upstream of
  grounding.
- [reports] for turning a solved state back into the external atom-id space.

# Guiding principles

## Modularity

A solve is built of many interconnected parts, interacting through documented access points:
- Constraints are stored in [MRF::constraints](mrf::MRF::constraints) and indexed by
  [ConstraintId](mrf::ConstraintId); the adjacency maps used to find "every constraint atom `a`
  appears in, by polarity" are private to the MRF.
- [structures::atom], [structures::literal], and [structures::constraint] define the data model
  first, independent of any particular solver's bookkeeping over it.
- The algorithms themselves are factored into [solvers], one module per technique.
- Use of external crates is limited to ones supporting that modularity — [log] for diagnostics,
  [rand] for the per-state generator, and optionally [grb](solvers::ilp::backend::grb_backend)
  behind the `gurobi` feature for the ILP relaxation.

## Simple efficiency

The library favours mostly simple Rust: explicit `Result` propagation over panics in non-test
code, and annotated borrow-checker workarounds where the incremental bookkeeping genuinely needs
one (see [state::GenericMRFState::flip]'s doc comment for the shape of it).

# Logs

Calls to [log!](log) are scattered through the library to help diagnose a solve; targets are
listed in [misc::log]. With [env_logger](https://docs.rs/env_logger/latest/env_logger/):
- `RUST_LOG=maxwalksat=debug` (or `mcsat=debug`) logs each trial's/sample's start and the cost it
  ends at, so a long run's progress can be watched without instrumenting the caller.
- `RUST_LOG=propagation=trace` traces every atom pinned by unit propagation and the constraint
  that forced it.
- `RUST_LOG=ilp=warn` surfaces only LP non-convergence and rounding warnings.
*/

#![allow(clippy::collapsible_else_if)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::single_match)]

pub mod config;
pub mod generic;
pub mod logic;
pub mod mrf;
pub mod reports;
pub mod solvers;
pub mod state;
pub mod structures;
pub mod types;

pub(crate) mod db;
pub mod misc;
