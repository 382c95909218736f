/*!
Configuration of the two local-search solvers (§4.3, §4.4).

Each numeric parameter is a [ConfigOption] recording its name and valid range alongside its
current value, so a front-end can validate user-supplied overrides against the same bounds the
solver itself assumes.
*/

mod config_option;
pub use config_option::ConfigOption;

/// Parameters for [MaxWalkSAT](crate::solvers::maxwalksat) (§4.3).
#[derive(Clone, Debug)]
pub struct MaxWalkSatConfig {
    /// Probability of a greedy (vs. noisy) move at each step.
    pub p_best: ConfigOption<f64>,

    /// Flips attempted per trial before giving up.
    pub max_flips: ConfigOption<u64>,

    /// Trials attempted, each starting from a fresh random assignment.
    pub max_tries: ConfigOption<u32>,

    /// Stop once `total_cost` falls to or below this value.
    pub target_cost: ConfigOption<f64>,

    /// Length of the tabu window after a flip.
    pub tabu_length: ConfigOption<i64>,

    /// Trivially satisfy hard unit clauses at startup rather than via the general solve.
    pub sat_hard_unit: bool,

    /// Prefer the hard-priority constraint-selection policy over plain uniform sampling.
    pub sat_hard_priority: bool,

    /// Emit every query atom in the result, rather than only the ones set `true`.
    pub output_all: bool,
}

impl Default for MaxWalkSatConfig {
    fn default() -> Self {
        MaxWalkSatConfig {
            p_best: ConfigOption {
                name: "p_best",
                min: 0.0,
                max: 1.0,
                value: 0.5,
            },
            max_flips: ConfigOption {
                name: "max_flips",
                min: 1,
                max: u64::MAX,
                value: 1_000_000,
            },
            max_tries: ConfigOption {
                name: "max_tries",
                min: 1,
                max: u32::MAX,
                value: 1,
            },
            target_cost: ConfigOption {
                name: "target_cost",
                min: 0.0,
                max: f64::MAX,
                value: 0.001,
            },
            tabu_length: ConfigOption {
                name: "tabu_length",
                min: 0,
                max: i64::MAX,
                value: 10,
            },
            sat_hard_unit: false,
            sat_hard_priority: false,
            output_all: true,
        }
    }
}

/// Parameters for [MC-SAT](crate::solvers::mcsat) (§4.4).
#[derive(Clone, Debug)]
pub struct McSatConfig {
    /// Probability of a greedy (vs. noisy) WalkSAT move within the inner sampling loop.
    pub p_best: ConfigOption<f64>,

    /// Probability of attempting a simulated-annealing step instead of a WalkSAT step.
    pub p_sa: ConfigOption<f64>,

    /// Flips attempted per sample before giving up.
    pub max_flips: ConfigOption<u64>,

    /// Trials attempted per sample.
    pub max_tries: ConfigOption<u32>,

    /// Cost floor at or below which a sample counts as a solution.
    pub target_cost: ConfigOption<f64>,

    /// Solutions to accept per sample before moving to the next one.
    pub num_solutions: ConfigOption<u32>,

    /// Temperature used in the simulated-annealing acceptance probability.
    pub sa_temperature: ConfigOption<f64>,

    /// Total samples drawn to estimate each query atom's marginal.
    pub samples: ConfigOption<u32>,

    /// Only attempt simulated annealing once the cost floor has first been reached.
    pub late_sa: bool,

    /// Run unit propagation before evaluating each sample's slice.
    pub unit_propagation: bool,

    /// Prefer the hard-priority constraint-selection policy within the inner WalkSAT step.
    pub sat_hard_priority: bool,

    /// Length of the tabu window after a flip, within the inner sampling loop.
    pub tabu_length: ConfigOption<i64>,
}

impl Default for McSatConfig {
    fn default() -> Self {
        McSatConfig {
            p_best: ConfigOption {
                name: "p_best",
                min: 0.0,
                max: 1.0,
                value: 0.5,
            },
            p_sa: ConfigOption {
                name: "p_sa",
                min: 0.0,
                max: 1.0,
                value: 0.1,
            },
            max_flips: ConfigOption {
                name: "max_flips",
                min: 1,
                max: u64::MAX,
                value: 100_000,
            },
            max_tries: ConfigOption {
                name: "max_tries",
                min: 1,
                max: u32::MAX,
                value: 1,
            },
            target_cost: ConfigOption {
                name: "target_cost",
                min: 0.0,
                max: f64::MAX,
                value: 0.001,
            },
            num_solutions: ConfigOption {
                name: "num_solutions",
                min: 1,
                max: u32::MAX,
                value: 10,
            },
            sa_temperature: ConfigOption {
                name: "sa_temperature",
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                value: 0.1,
            },
            samples: ConfigOption {
                name: "samples",
                min: 1,
                max: u32::MAX,
                value: 1_000,
            },
            late_sa: true,
            unit_propagation: true,
            sat_hard_priority: false,
            tabu_length: ConfigOption {
                name: "tabu_length",
                min: 0,
                max: i64::MAX,
                value: 10,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_their_own_bounds() {
        let mws = MaxWalkSatConfig::default();
        assert!(mws.p_best.is_valid());
        assert!(mws.max_flips.is_valid());
        assert!(mws.tabu_length.is_valid());

        let mcsat = McSatConfig::default();
        assert!(mcsat.p_sa.is_valid());
        assert!(mcsat.samples.is_valid());
    }
}
