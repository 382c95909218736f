/*!
Ground constraints, i.e. weighted ground clauses.

A [ConstraintDef] is the immutable identity of one ground clause: its weight and its (sorted)
literals. The mutable bookkeeping layered over this during a solve — `nsat`, watches, slice
membership, and so on — lives in [crate::db::constraint] and is owned by a
[crate::state::MRFState], never by the constraint itself (§9: "target language should use
integer-indexed primitive arrays" rather than mutating shared objects in place).
*/

use crate::generic::weight::Cost;
use crate::structures::literal::Literal;

/// Selects which per-constraint cost formula applies (§3).
///
/// MaxWalkSAT weighs a violated constraint by its clause weight; MC-SAT's sampling phase
/// reinterprets every active constraint as unit cost once it switches into `SampleSat` mode
/// (§4.4 phase 2). The field exists precisely so this is a branch on an enum rather than a
/// virtual dispatch (§9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintMode {
    /// Cost of violation is `|weight|` (used by MaxWalkSAT, and MC-SAT's initial hard-satisfying
    /// phase).
    MaxWalkSat,

    /// Cost of violation is a flat `1` (used once MC-SAT begins sampling, §4.4 phase 2).
    SampleSat,
}

/// The immutable identity of one ground clause.
#[derive(Clone, Debug)]
pub struct ConstraintDef {
    /// The clause's signed weight. `+inf` or `-inf` denotes a hard constraint (see [Self::is_hard]);
    /// the *effective* hard weight used in cost arithmetic comes from [crate::mrf::MRF::weight_hard],
    /// not from this field.
    weight: f64,

    /// `|weight|` (or the MRF's hard weight, for hard constraints) cached as a [Cost].
    magnitude: Cost,

    /// Literals of the clause, sorted by atom then polarity.
    literals: Vec<Literal>,
}

impl ConstraintDef {
    /// Builds a constraint, sorting its literals for determinism.
    ///
    /// `magnitude` should be `Cost::from_weight(weight)` for soft constraints, or the MRF's
    /// `weight_hard` for hard ones — callers normally go through
    /// [MRF::new](crate::mrf::MRF::new) rather than constructing this directly.
    pub fn new(weight: f64, magnitude: Cost, mut literals: Vec<Literal>) -> ConstraintDef {
        literals.sort();
        ConstraintDef {
            weight,
            magnitude,
            literals,
        }
    }

    /// The clause's raw weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// `|weight|`, or the MRF's effective hard weight for hard constraints.
    pub fn magnitude(&self) -> Cost {
        self.magnitude
    }

    /// The clause's literals, in sorted order.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// `true` if this is a positively-weighted constraint (violated when `nsat == 0`).
    pub fn is_positive(&self) -> bool {
        self.weight > 0.0 || self.weight == f64::INFINITY
    }

    /// `true` if this is a hard constraint: `weight` carries the hard-weight sentinel.
    pub fn is_hard(&self) -> bool {
        self.weight.is_infinite()
    }

    /// `true` if the constraint has exactly one literal.
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}
