//! Generic, domain-agnostic building blocks used throughout the library.

pub mod minimal_pcg;
pub use minimal_pcg::MinimalPCG32;

pub mod weight;
pub use weight::{Cost, Delta};
