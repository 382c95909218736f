/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information for extending the library and/or fixing issues.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [unit propagation](crate::state::GenericMRFState::unit_propagation).
    pub const PROPAGATION: &str = "propagation";

    /// Logs related to [MaxWalkSAT](crate::solvers::maxwalksat).
    pub const MAXWALKSAT: &str = "maxwalksat";

    /// Logs related to [MC-SAT](crate::solvers::mcsat).
    pub const MCSAT: &str = "mcsat";

    /// Logs related to the [ILP relaxation](crate::solvers::ilp).
    pub const ILP: &str = "ilp";

    /// Logs related to [MRF construction](crate::mrf::MRF::new).
    pub const MRF_BUILD: &str = "mrf_build";

    /// Logs related to [incremental state bookkeeping](crate::state): flips, resets, cost
    /// tracking.
    pub const STATE: &str = "state";

    /// Logs related to [report formatting](crate::reports): atom decoding, output rendering.
    pub const REPORTS: &str = "reports";

    /// Logs related to the [logic formatter](crate::logic::formatter): function
    /// elimination/introduction.
    pub const FORMATTER: &str = "formatter";

    /// Logs related to [predicate completion](crate::logic::completion).
    pub const COMPLETION: &str = "completion";
}
