//! Mutable per-atom and per-constraint scratch state.
//!
//! An [MRF](crate::mrf::MRF) is immutable once built; everything that changes during a solve —
//! truth values, break/make costs, `nsat`, watches — is held here, indexed by atom or constraint
//! id, and owned exclusively by the [MRFState](crate::state::MRFState) running the solve (§5).

pub mod atom;
pub mod constraint;

pub use atom::AtomRecord;
pub use constraint::ConstraintRecord;
