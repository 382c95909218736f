/*!
Error types used in the library.

Most of these are fatal: per §7 of the design, a contradiction during unit propagation, a
malformed constraint, or an empty MRF abort the solver rather than attempt recovery. The two
exceptions — LP non-convergence and atom decode failure — are recoverable and are surfaced as
`Ok` values carrying a warning rather than as an `Err` (see [crate::solvers::ilp] and [crate::reports]).
*/

use crate::structures::atom::Atom;

/// A union of the fatal error kinds produced while building or solving an MRF.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// Unit propagation attempted to pin an atom to a value opposite to its existing pin.
    Contradiction(Atom),

    /// A constraint given to [MRF::new](crate::mrf::MRF::new) was malformed.
    MalformedConstraint(MalformedConstraint),

    /// The MRF passed to a solver has zero atoms.
    EmptyMRF,
}

/// The ways in which a ground constraint may be malformed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MalformedConstraint {
    /// The constraint's weight is not a finite number (and is not the hard-weight sentinel).
    NonFiniteWeight,

    /// The constraint has no literals.
    EmptyLiterals,

    /// A literal in the constraint has magnitude zero, which is not a valid atom id.
    ZeroLiteral,
}

impl From<MalformedConstraint> for ErrorKind {
    fn from(e: MalformedConstraint) -> Self {
        ErrorKind::MalformedConstraint(e)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contradiction(atom) => {
                write!(f, "unit propagation contradiction pinning atom {atom}")
            }
            Self::MalformedConstraint(kind) => write!(f, "malformed constraint: {kind:?}"),
            Self::EmptyMRF => write!(f, "MRF has zero atoms"),
        }
    }
}

impl std::error::Error for ErrorKind {}
