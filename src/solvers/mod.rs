//! The three solvers that drive an [MRFState](crate::state::MRFState) (§4.3, §4.4, §4.5).

pub mod maxwalksat;
pub mod mcsat;
pub mod ilp;

pub use maxwalksat::max_walk_sat;
pub use mcsat::mc_sat;
