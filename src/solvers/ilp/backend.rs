/*!
Pluggable LP solver backend for the ILP relaxation.

[LpBackend] exists so [super::solve_map_relaxation] can be exercised without a real solver: the
in-tree [MockBackend] returns a canned or failing solution for tests, while [grb]'s
[GurobiBackend] submits the model to Gurobi behind the `gurobi` feature.
*/

use super::LpModel;

/// A solved LP: one fractional value per atom, in atom order (`y_a` at index `a - 1`).
#[derive(Clone, Debug)]
pub struct LpSolution {
    pub y: Vec<f64>,
}

/// Something that can solve an [LpModel] and report why it couldn't, if it couldn't.
pub trait LpBackend {
    fn solve(&self, model: &LpModel) -> Result<LpSolution, String>;
}

/// A canned backend for tests: either returns a fixed `y` vector or always fails.
pub struct MockBackend {
    fixed_y: Option<Vec<f64>>,
}

impl MockBackend {
    /// Always returns `y` verbatim, regardless of the model submitted.
    pub fn fixed(y: Vec<f64>) -> MockBackend {
        MockBackend { fixed_y: Some(y) }
    }

    /// Simulates an LP solver that failed to converge.
    pub fn failing() -> MockBackend {
        MockBackend { fixed_y: None }
    }
}

impl LpBackend for MockBackend {
    fn solve(&self, model: &LpModel) -> Result<LpSolution, String> {
        match &self.fixed_y {
            Some(y) => Ok(LpSolution { y: y.clone() }),
            None => {
                let _ = model;
                Err("mock backend configured to fail".to_string())
            }
        }
    }
}

#[cfg(feature = "gurobi")]
pub mod grb_backend {
    //! Submits the relaxation to Gurobi via the [grb] crate.

    use grb::prelude::*;

    use super::{LpBackend, LpModel, LpSolution};

    /// An [LpBackend] that hands the model to a fresh Gurobi environment per call.
    #[derive(Default)]
    pub struct GurobiBackend;

    impl LpBackend for GurobiBackend {
        fn solve(&self, model: &LpModel) -> Result<LpSolution, String> {
            let mut gurobi_model = Model::new("mrf_map_relaxation").map_err(|e| e.to_string())?;
            gurobi_model.set_param(param::OutputFlag, 0).map_err(|e| e.to_string())?;

            let y_vars: Vec<Var> = (0..model.num_atoms)
                .map(|i| {
                    gurobi_model
                        .add_var(&format!("y_{i}"), Continuous, 0.0, 0.0, 1.0, &[], &[])
                        .map_err(|e| e.to_string())
                })
                .collect::<Result<_, _>>()?;

            let z_vars: Vec<Var> = (0..model.num_z_vars)
                .map(|i| {
                    gurobi_model
                        .add_var(&format!("z_{i}"), Continuous, 0.0, 0.0, 1.0, &[], &[])
                        .map_err(|e| e.to_string())
                })
                .collect::<Result<_, _>>()?;

            for constraint in &model.constraints {
                let mut expr = grb::expr::LinExpr::new();
                for term in &constraint.terms {
                    expr.add_term(term.coefficient, y_vars[term.atom_index]);
                    expr.add_constant(term.offset);
                }
                if let Some(z_index) = constraint.z_var {
                    expr.add_term(constraint.z_coefficient, z_vars[z_index]);
                }
                gurobi_model
                    .add_constr("", c!(expr >= constraint.rhs))
                    .map_err(|e| e.to_string())?;
            }

            let mut objective = grb::expr::LinExpr::new();
            for (i, &coeff) in model.y_objective.iter().enumerate() {
                if coeff != 0.0 {
                    objective.add_term(coeff, y_vars[i]);
                }
            }
            for (i, &coeff) in model.z_objective.iter().enumerate() {
                objective.add_term(coeff, z_vars[i]);
            }
            gurobi_model
                .set_objective(objective, Maximize)
                .map_err(|e| e.to_string())?;

            gurobi_model.optimize().map_err(|e| e.to_string())?;
            let status = gurobi_model.status().map_err(|e| e.to_string())?;
            if status != Status::Optimal {
                return Err(format!("gurobi returned status {status:?}"));
            }

            let y = y_vars
                .iter()
                .map(|v| gurobi_model.get_obj_attr(attr::X, v).map_err(|e| e.to_string()))
                .collect::<Result<Vec<f64>, _>>()?;
            Ok(LpSolution { y })
        }
    }
}

#[cfg(feature = "gurobi")]
pub use grb_backend::GurobiBackend;
