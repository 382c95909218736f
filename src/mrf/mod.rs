/*!
The ground Markov random field: an immutable network of atoms and weighted clauses (§3).

An [MRF] is built once by the grounder and then shared, read-only, by any number of
[MRFState](crate::state::MRFState) instances — each solve gets its own mutable scratch state, but
the atom count, clause literals, weights, and adjacency maps never change underneath it.
*/

pub mod unsat_index;

pub use unsat_index::UnsatIndex;

use crate::generic::weight::Cost;
use crate::structures::atom::{Atom, NO_ATOM};
use crate::structures::constraint::ConstraintDef;
use crate::structures::literal::Literal;
use crate::types::err::{ErrorKind, MalformedConstraint};

/// Index of a [ConstraintDef] within an [MRF]'s `constraints` table.
pub type ConstraintId = usize;

/// One ground clause as handed to [MRF::new]: a weight and its signed literals.
///
/// `weight` may carry `f64::INFINITY` / `f64::NEG_INFINITY` to mark a hard constraint; its
/// effective magnitude is then taken from the MRF's `weight_hard`, not from this value.
#[derive(Clone, Debug)]
pub struct RawConstraint {
    pub weight: f64,
    pub literals: Vec<i64>,
}

impl RawConstraint {
    pub fn new(weight: f64, literals: Vec<i64>) -> RawConstraint {
        RawConstraint { weight, literals }
    }
}

/// The immutable ground network (§3 "MRF").
#[derive(Debug)]
pub struct MRF {
    constraints: Vec<ConstraintDef>,

    /// Highest atom id appearing anywhere in the network.
    atom_count: Atom,

    /// `positive_adjacency[aid]` lists every constraint in which atom `aid` appears positively.
    positive_adjacency: Vec<Vec<ConstraintId>>,

    /// `negative_adjacency[aid]` lists every constraint in which atom `aid` appears negatively.
    negative_adjacency: Vec<Vec<ConstraintId>>,

    /// The inclusive range of atom ids the caller wants results for.
    query_start: Atom,
    query_end: Atom,

    /// The effective weight used in place of a hard constraint's `f64::INFINITY` sentinel.
    weight_hard: Cost,

    /// The largest literal array among all constraints, for sizing flip buffers.
    max_literals_per_constraint: usize,
}

impl MRF {
    /// Builds an MRF from raw constraints, validating each one (§7 "Malformed constraint",
    /// "Empty MRF").
    ///
    /// `atom_count` is the highest valid atom id; atoms are numbered `1..=atom_count` ( `0` is
    /// the reserved [NO_ATOM] sentinel). `query_range` is the inclusive `[queryStartID,
    /// queryEndID]` the caller wants results for.
    pub fn new(
        atom_count: Atom,
        raw_constraints: Vec<RawConstraint>,
        query_range: (Atom, Atom),
        weight_hard: f64,
    ) -> Result<MRF, ErrorKind> {
        if atom_count == NO_ATOM {
            return Err(ErrorKind::EmptyMRF);
        }

        let weight_hard = Cost::from_weight(weight_hard);
        let mut constraints = Vec::with_capacity(raw_constraints.len());
        let mut positive_adjacency = vec![Vec::new(); atom_count as usize + 1];
        let mut negative_adjacency = vec![Vec::new(); atom_count as usize + 1];
        let mut max_literals_per_constraint = 0;

        for raw in raw_constraints {
            if raw.weight.is_nan() {
                return Err(MalformedConstraint::NonFiniteWeight.into());
            }
            if raw.literals.is_empty() {
                return Err(MalformedConstraint::EmptyLiterals.into());
            }

            let mut literals = Vec::with_capacity(raw.literals.len());
            for signed in &raw.literals {
                if *signed == 0 {
                    return Err(MalformedConstraint::ZeroLiteral.into());
                }
                literals.push(Literal::try_from(*signed).expect("checked non-zero above"));
            }

            let magnitude = if raw.weight.is_infinite() {
                weight_hard
            } else {
                Cost::from_weight(raw.weight)
            };

            max_literals_per_constraint = max_literals_per_constraint.max(literals.len());
            let cid = constraints.len();
            for literal in &literals {
                let adjacency = if literal.polarity() {
                    &mut positive_adjacency
                } else {
                    &mut negative_adjacency
                };
                adjacency[literal.atom() as usize].push(cid);
            }

            constraints.push(ConstraintDef::new(raw.weight, magnitude, literals));
        }

        Ok(MRF {
            constraints,
            atom_count,
            positive_adjacency,
            negative_adjacency,
            query_start: query_range.0,
            query_end: query_range.1,
            weight_hard,
            max_literals_per_constraint,
        })
    }

    /// The full constraint table, indexed by [ConstraintId].
    pub fn constraints(&self) -> &[ConstraintDef] {
        &self.constraints
    }

    /// A single constraint by id.
    pub fn constraint(&self, cid: ConstraintId) -> &ConstraintDef {
        &self.constraints[cid]
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Highest valid atom id; atoms are numbered `1..=atom_count`.
    pub fn atom_count(&self) -> Atom {
        self.atom_count
    }

    /// Constraints in which `atom` appears as a positive literal.
    pub fn positive_constraints_of(&self, atom: Atom) -> &[ConstraintId] {
        &self.positive_adjacency[atom as usize]
    }

    /// Constraints in which `atom` appears as a negative literal.
    pub fn negative_constraints_of(&self, atom: Atom) -> &[ConstraintId] {
        &self.negative_adjacency[atom as usize]
    }

    /// The inclusive `[queryStartID, queryEndID]` range of atoms the caller wants results for.
    pub fn query_range(&self) -> (Atom, Atom) {
        (self.query_start, self.query_end)
    }

    /// `true` iff `atom` falls within the query range.
    pub fn is_query_atom(&self, atom: Atom) -> bool {
        atom >= self.query_start && atom <= self.query_end
    }

    /// The effective weight magnitude used by hard constraints.
    pub fn weight_hard(&self) -> Cost {
        self.weight_hard
    }

    /// The largest literal array among all constraints.
    pub fn max_literals_per_constraint(&self) -> usize {
        self.max_literals_per_constraint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mrf_is_rejected() {
        let err = MRF::new(0, vec![], (1, 0), 1_000.0).unwrap_err();
        assert_eq!(err, ErrorKind::EmptyMRF);
    }

    #[test]
    fn nan_weight_is_malformed() {
        let raw = vec![RawConstraint::new(f64::NAN, vec![1])];
        let err = MRF::new(1, raw, (1, 1), 1_000.0).unwrap_err();
        assert_eq!(
            err,
            ErrorKind::MalformedConstraint(MalformedConstraint::NonFiniteWeight)
        );
    }

    #[test]
    fn empty_literals_is_malformed() {
        let raw = vec![RawConstraint::new(1.0, vec![])];
        let err = MRF::new(1, raw, (1, 1), 1_000.0).unwrap_err();
        assert_eq!(
            err,
            ErrorKind::MalformedConstraint(MalformedConstraint::EmptyLiterals)
        );
    }

    #[test]
    fn zero_literal_is_malformed() {
        let raw = vec![RawConstraint::new(1.0, vec![0])];
        let err = MRF::new(1, raw, (1, 1), 1_000.0).unwrap_err();
        assert_eq!(
            err,
            ErrorKind::MalformedConstraint(MalformedConstraint::ZeroLiteral)
        );
    }

    #[test]
    fn adjacency_is_built_by_polarity() {
        let raw = vec![RawConstraint::new(1.0, vec![1, -2])];
        let mrf = MRF::new(2, raw, (1, 2), 1_000.0).unwrap();
        assert_eq!(mrf.positive_constraints_of(1), &[0]);
        assert_eq!(mrf.negative_constraints_of(2), &[0]);
        assert!(mrf.positive_constraints_of(2).is_empty());
    }

    #[test]
    fn hard_constraint_takes_mrf_hard_weight() {
        let raw = vec![RawConstraint::new(f64::INFINITY, vec![1])];
        let mrf = MRF::new(1, raw, (1, 1), 500.0).unwrap();
        assert_eq!(mrf.constraint(0).magnitude(), Cost::from_weight(500.0));
    }
}
