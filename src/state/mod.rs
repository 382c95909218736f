/*!
The mutable per-solve state layered over an immutable [MRF](crate::mrf::MRF) (§4.1).

An [MRFState] owns a [AtomRecord](crate::db::AtomRecord) and
[ConstraintRecord](crate::db::ConstraintRecord) per atom/constraint of the network it was built
from, plus the [UnsatIndex](crate::mrf::UnsatIndex) of currently-violated constraints. Every
solver in [crate::solvers] drives one of these through its single mutation entry point,
[flip](MRFState::flip), rather than touching atom or constraint fields directly.
*/

mod generic;
mod specific;

pub use generic::GenericMRFState;
pub use specific::MRFState;
