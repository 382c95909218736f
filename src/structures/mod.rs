//! Key structures: atoms, literals, and ground constraints.
//!
//! An atom names a ground Boolean variable; a literal is a signed reference to one; a
//! constraint is a weighted disjunction of literals (a ground clause). The mutable bookkeeping
//! a solve layers over these — truth values, break/make costs, `nsat`, watches — is kept
//! separately in [crate::db], indexed by atom/constraint id, per the redesign note in §9.

pub mod atom;
pub mod constraint;
pub mod literal;
