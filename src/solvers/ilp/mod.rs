/*!
ILP relaxation of the MAP problem (§4.5).

Rather than searching assignments directly, this builds a linear program over `y_a ∈ [0,1]` per
atom and `z_c ∈ [0,1]` per non-unit soft constraint, submits it to an [LpBackend], and thresholds
the fractional solution back to a Boolean assignment (`y_a >= 0.5 → true`). The backend is a
trait so the relaxation can be built and tested without a real solver installed; [backend::grb]
supplies a real one behind the `gurobi` feature.

Constraint translation per ground clause `c` (`χ(a) = y_a`, `χ(¬a) = 1 - y_a`):

- Hard: `Σ_ℓ χ(ℓ) ≥ 1`.
- Soft, positive weight, non-unit: `Σ_ℓ χ(ℓ) ≥ z_c`.
- Soft, negative weight, non-unit: `χ(ℓ) ≥ z_c` for every literal `ℓ` separately.
- Unit soft constraints contribute directly to the objective via their atom's `y_a`, never
  introduce a `z_c` (§4.5).
*/

pub mod backend;

pub use backend::LpBackend;

use crate::mrf::MRF;
use crate::types::err::ErrorKind;

/// One atom's coefficient `χ(ℓ) = ±y_a + const` contribution to a linear constraint.
///
/// `coefficient` is `+1.0` for a positive literal, `-1.0` for a negated one; `offset` carries the
/// constant term (`0` for positive, `1` for negated, since `χ(¬a) = 1 - y_a`).
#[derive(Clone, Copy, Debug)]
pub struct AtomTerm {
    pub atom_index: usize,
    pub coefficient: f64,
    pub offset: f64,
}

/// One linear constraint `Σ terms ≥ rhs`, optionally involving one `z_c` variable.
#[derive(Clone, Debug)]
pub struct LpConstraint {
    pub terms: Vec<AtomTerm>,
    pub z_var: Option<usize>,
    pub z_coefficient: f64,
    pub rhs: f64,
}

/// The full relaxation handed to an [LpBackend]: one `y` variable per atom, one `z` variable per
/// non-unit soft constraint, an objective over both, and the constraint list above.
#[derive(Clone, Debug, Default)]
pub struct LpModel {
    pub num_atoms: usize,
    pub num_z_vars: usize,
    /// `objective[atom_index]` is the coefficient of `y_{atom_index+1}` in the objective (unit
    /// soft constraints only; non-unit ones route through a `z` variable instead).
    pub y_objective: Vec<f64>,
    /// `z_objective[k]` is `|weight|` for the `k`-th `z` variable.
    pub z_objective: Vec<f64>,
    pub constraints: Vec<LpConstraint>,
}

fn atom_term(atom: crate::structures::atom::Atom, polarity: bool) -> AtomTerm {
    let atom_index = (atom - 1) as usize;
    if polarity {
        AtomTerm {
            atom_index,
            coefficient: 1.0,
            offset: 0.0,
        }
    } else {
        AtomTerm {
            atom_index,
            coefficient: -1.0,
            offset: 1.0,
        }
    }
}

/// Builds the LP relaxation of `mrf` (§4.5).
pub fn build_model(mrf: &MRF) -> LpModel {
    let num_atoms = mrf.atom_count() as usize;
    let mut model = LpModel {
        num_atoms,
        num_z_vars: 0,
        y_objective: vec![0.0; num_atoms],
        z_objective: Vec::new(),
        constraints: Vec::new(),
    };

    for constraint in mrf.constraints() {
        let terms: Vec<AtomTerm> = constraint
            .literals()
            .iter()
            .map(|l| atom_term(l.atom(), l.polarity()))
            .collect();

        if constraint.is_hard() {
            model.constraints.push(LpConstraint {
                terms,
                z_var: None,
                z_coefficient: 0.0,
                rhs: 1.0,
            });
            continue;
        }

        if constraint.weight() == 0.0 {
            // A zero-weight soft constraint is satisfied or violated for free; it contributes
            // nothing to the objective and needs neither a `y_objective` term nor a `z` variable.
            continue;
        }

        if constraint.is_unit() {
            let literal = constraint.literals()[0];
            let signed = if literal.polarity() {
                constraint.weight()
            } else {
                -constraint.weight()
            };
            model.y_objective[(literal.atom() - 1) as usize] += signed;
            continue;
        }

        let z_index = model.num_z_vars;
        model.num_z_vars += 1;
        model.z_objective.push(constraint.weight().abs());

        if constraint.is_positive() {
            model.constraints.push(LpConstraint {
                terms,
                z_var: Some(z_index),
                z_coefficient: -1.0,
                rhs: 0.0,
            });
        } else {
            for term in terms {
                model.constraints.push(LpConstraint {
                    terms: vec![term],
                    z_var: Some(z_index),
                    z_coefficient: -1.0,
                    rhs: 0.0,
                });
            }
        }
    }

    model
}

/// Solves the relaxation of `mrf` via `backend`, returning one Boolean per atom (1-indexed atom
/// `a` at index `a - 1`), thresholded at `y_a >= 0.5` (§4.5).
///
/// On LP non-convergence this logs a warning and returns all-false, per the fallback policy in
/// §7 rather than surfacing an error — a relaxation that fails to solve still owes the caller an
/// assignment.
pub fn solve_map_relaxation(mrf: &MRF, backend: &dyn LpBackend) -> Result<Vec<bool>, ErrorKind> {
    let model = build_model(mrf);
    match backend.solve(&model) {
        Ok(solution) => {
            let assignment: Vec<bool> = solution.y.iter().map(|&y| y >= 0.5).collect();
            let fractional = solution.y.iter().filter(|&&y| (y - y.round()).abs() > 1e-6).count();
            if fractional > 0 {
                log::warn!(
                    target: crate::misc::log::targets::ILP,
                    "LP relaxation returned {fractional} fractional atom(s); rounded by 0.5 threshold",
                );
            }
            Ok(assignment)
        }
        Err(reason) => {
            log::warn!(
                target: crate::misc::log::targets::ILP,
                "LP relaxation did not converge ({reason}); returning all-false",
            );
            Ok(vec![false; model.num_atoms])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::RawConstraint;

    #[test]
    fn hard_constraint_becomes_a_disjunction_row() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1, -2])];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let model = build_model(&mrf);
        assert_eq!(model.constraints.len(), 1);
        assert_eq!(model.constraints[0].rhs, 1.0);
        assert!(model.constraints[0].z_var.is_none());
    }

    #[test]
    fn unit_soft_constraint_feeds_the_objective_directly() {
        let raw = vec![RawConstraint::new(2.5, vec![1])];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let model = build_model(&mrf);
        assert!(model.constraints.is_empty());
        assert_eq!(model.num_z_vars, 0);
        assert_eq!(model.y_objective[0], 2.5);
    }

    #[test]
    fn non_unit_negative_soft_constraint_gets_one_row_per_literal() {
        let raw = vec![RawConstraint::new(-4.0, vec![1, 2, 3])];
        let mrf = MRF::new(3, raw, (1, 3), 1_000.0).unwrap();
        let model = build_model(&mrf);
        assert_eq!(model.num_z_vars, 1);
        assert_eq!(model.z_objective[0], 4.0);
        assert_eq!(model.constraints.len(), 3);
        assert!(model.constraints.iter().all(|c| c.z_var == Some(0)));
    }

    #[test]
    fn zero_weight_soft_constraint_is_excluded_entirely() {
        let raw = vec![RawConstraint::new(0.0, vec![1, 2])];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let model = build_model(&mrf);
        assert_eq!(model.num_z_vars, 0);
        assert!(model.constraints.is_empty());
        assert_eq!(model.y_objective, vec![0.0, 0.0]);
    }

    #[test]
    fn mock_backend_round_trip_thresholds_at_half() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1])];
        let mrf = MRF::new(1, raw, (1, 1), 1_000.0).unwrap();
        let backend = backend::MockBackend::fixed(vec![0.7]);
        let assignment = solve_map_relaxation(&mrf, &backend).unwrap();
        assert_eq!(assignment, vec![true]);
    }

    #[test]
    fn non_convergent_backend_falls_back_to_all_false() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1, 2])];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        let backend = backend::MockBackend::failing();
        let assignment = solve_map_relaxation(&mrf, &backend).unwrap();
        assert_eq!(assignment, vec![false, false]);
    }
}
