/*!
Literals: atoms paired with a polarity.

A literal is a signed reference to an atom — positive meaning "this atom is true", negative
meaning "this atom is false" — exactly as in §1 of the design (`Literal — a signed atom id`).

The canonical representation aliases a literal to a signed integer, in the tradition of DIMACS
CNF: the absolute value is the atom, the sign is the polarity.
*/

use crate::structures::atom::Atom;

/// A signed reference to an atom.
///
/// `Literal::new(a, true)` reads "atom `a` is true"; `Literal::new(a, false)` reads "atom `a`
/// is false".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    atom: Atom,
    polarity: bool,
}

impl Literal {
    /// Builds a literal from an atom and a polarity.
    pub fn new(atom: Atom, polarity: bool) -> Literal {
        Literal { atom, polarity }
    }

    /// The atom this literal refers to.
    pub fn atom(&self) -> Atom {
        self.atom
    }

    /// The polarity of this literal: `true` for a positive literal, `false` for a negated one.
    pub fn polarity(&self) -> bool {
        self.polarity
    }

    /// The negation of this literal.
    pub fn negate(&self) -> Literal {
        Literal {
            atom: self.atom,
            polarity: !self.polarity,
        }
    }

    /// `true` iff the literal evaluates to true under `value` (the atom's current Boolean state).
    pub fn is_satisfied_by(&self, value: bool) -> bool {
        self.polarity == value
    }

    /// The signed-integer representation of the literal (positive = atom, negative = negated atom).
    pub fn as_signed(&self) -> i64 {
        if self.polarity {
            self.atom as i64
        } else {
            -(self.atom as i64)
        }
    }
}

impl TryFrom<i64> for Literal {
    type Error = ();

    /// Fails on `0`, which is not a valid atom id (`NO_ATOM` is reserved, §6).
    fn try_from(value: i64) -> Result<Literal, ()> {
        if value == 0 {
            Err(())
        } else {
            Ok(Literal::new(value.unsigned_abs() as Atom, value.is_positive()))
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.polarity {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "-{}", self.atom)
        }
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Literal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.atom
            .cmp(&other.atom)
            .then(self.polarity.cmp(&other.polarity))
    }
}
