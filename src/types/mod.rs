//! Error and result types shared across the library.

pub mod err;
