use tracing::{debug, info};

use crate::error::SolveError;
use crate::problem::LpProblem;
use crate::search::{BoundCoupling, DEFAULT_VARIABLE_CAP, IntegerSearch, SearchParams};
use crate::simplex::SimplexSolver;
use crate::solution::MipOutcome;

/// Which part of the problem the integer search sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Every constraint and every variable
    #[default]
    Full,
    /// First two constraints over the first two variables
    TwoVariable,
}

/// Relaxation first, integer search only when the relaxation is fractional
#[derive(Debug, Clone, Default)]
pub struct MipSolver {
    simplex: SimplexSolver,
    variable_cap: Option<u32>,
    projection: Projection,
    coupling: BoundCoupling,
}

impl MipSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simplex(mut self, simplex: SimplexSolver) -> Self {
        self.simplex = simplex;
        self
    }

    pub fn with_variable_cap(mut self, cap: u32) -> Self {
        self.variable_cap = Some(cap);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_coupling(mut self, coupling: BoundCoupling) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn variable_cap(&self) -> u32 {
        self.variable_cap.unwrap_or(DEFAULT_VARIABLE_CAP)
    }

    pub fn simplex(&self) -> &SimplexSolver {
        &self.simplex
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn coupling(&self) -> BoundCoupling {
        self.coupling
    }

    pub fn solve(&self, problem: &LpProblem) -> Result<MipOutcome, SolveError> {
        let relaxation = self.simplex.solve(problem)?;

        if self.simplex.is_integer_solution(&relaxation.row_values) {
            info!(objective = relaxation.objective_value, "relaxation is integral, skipping search");
            return Ok(MipOutcome::Integral { relaxation });
        }

        let params = match self.projection {
            Projection::Full => SearchParams::from_problem(problem)?,
            Projection::TwoVariable => SearchParams::two_variable(problem)?,
        }
        .with_coupling(self.coupling)?;

        debug!(
            variables = params.num_variables(),
            rows = params.num_rows(),
            coupling = ?params.coupling(),
            "relaxation is fractional, starting integer search"
        );
        let search = IntegerSearch::new(&params)
            .with_variable_cap(self.variable_cap())
            .search()?;

        Ok(MipOutcome::Searched { relaxation, search })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(rows: &[Vec<f64>], objective: Vec<f64>) -> LpProblem {
        LpProblem::from_rows(rows, objective).unwrap()
    }

    #[test]
    fn test_fractional_relaxation_runs_search() {
        let p = problem(&[vec![7.0, 44.0, 132.0], vec![13.0, 11.0, 250.0]], vec![3.0, 4.0]);
        let outcome = MipSolver::new()
            .with_projection(Projection::TwoVariable)
            .with_coupling(BoundCoupling::Legacy)
            .solve(&p)
            .unwrap();

        assert!(outcome.needed_search());
        let search = outcome.search().unwrap();
        assert_eq!(search.point, vec![18, 0]);
        assert_eq!(search.value, 54.0);
        assert!(search.value <= outcome.relaxation().objective_value);
    }

    #[test]
    fn test_integral_relaxation_skips_search() {
        let p = problem(&[vec![1.0, 0.0, 5.0], vec![0.0, 1.0, 5.0]], vec![1.0, 1.0]);
        let outcome = MipSolver::new().solve(&p).unwrap();

        assert!(!outcome.needed_search());
        assert!(outcome.search().is_none());
        assert_eq!(outcome.relaxation().values, vec![5.0, 5.0]);
    }

    #[test]
    fn test_zero_bound_reports_origin() {
        let p = problem(&[vec![1.0, 1.0, 0.0]], vec![3.0, 4.0]);
        let outcome = MipSolver::new().solve(&p).unwrap();
        assert_eq!(outcome.relaxation().objective_value, 0.0);
        assert!(!outcome.needed_search());

        let search = IntegerSearch::new(&SearchParams::from_problem(&p).unwrap())
            .search()
            .unwrap();
        assert_eq!(search.point, vec![0, 0]);
        assert_eq!(search.value, 0.0);
    }

    #[test]
    fn test_legacy_coupling_rejected_for_full_projection() {
        let p = problem(
            &[vec![2.0, 1.0, 1.0, 7.5], vec![1.0, 3.0, 2.0, 12.5]],
            vec![3.0, 2.0, 4.0],
        );
        let err = MipSolver::new()
            .with_coupling(BoundCoupling::Legacy)
            .solve(&p)
            .unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }

    #[test]
    fn test_errors_propagate() {
        let p = problem(&[vec![1.0, -1.0, 1.0]], vec![0.0, 1.0]);
        assert_eq!(MipSolver::new().solve(&p), Err(SolveError::Unbounded { column: 1 }));
    }
}
