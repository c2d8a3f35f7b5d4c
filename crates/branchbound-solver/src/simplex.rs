use tracing::{debug, trace};

use crate::error::SolveError;
use crate::problem::LpProblem;
use crate::solution::SimplexSolution;

/// Primal simplex solver for `max c.x` subject to `Ax <= b`, `x >= 0`, `b >= 0`
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for pivot eligibility and the optimality test
    tolerance: f64,
    /// Largest distance from an integer still counted as integral
    integrality_tolerance: f64,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            integrality_tolerance: 1e-6,
        }
    }
}

impl SimplexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Solve the problem starting from the all-slack basis.
    ///
    /// `row_values` of the result holds the right-hand side of each constraint
    /// row at the optimum (one entry per constraint, not per variable). Use
    /// `values` for the decision variables.
    pub fn solve(&self, problem: &LpProblem) -> Result<SimplexSolution, SolveError> {
        let mut tableau = self.initialize_tableau(problem)?;
        let mut iterations = 0;

        while let Some(pivot_col) = self.find_pivot_column(&tableau) {
            if iterations >= self.max_iterations {
                return Err(SolveError::NonConvergent { iterations });
            }
            let pivot_row = self.find_pivot_row(&tableau, pivot_col)?;
            debug!(
                iteration = iterations,
                row = pivot_row,
                column = pivot_col,
                pivot = tableau.get(pivot_row, pivot_col),
                "pivot"
            );
            self.perform_pivot(&mut tableau, pivot_row, pivot_col);
            iterations += 1;
        }

        debug!(iterations, objective = tableau.objective_value(), "simplex reached optimum");
        Ok(self.extract_solution(&tableau, iterations))
    }

    /// Solve and report whether the per-row result is integral
    pub fn has_integer_solution(&self, problem: &LpProblem) -> Result<bool, SolveError> {
        let solution = self.solve(problem)?;
        Ok(self.is_integer_solution(&solution.row_values))
    }

    pub fn is_integer_solution(&self, values: &[f64]) -> bool {
        values
            .iter()
            .all(|v| (v - v.round()).abs() <= self.integrality_tolerance)
    }

    /// Build the `(m+1) x (n+m+1)` starting tableau with slack variables basic.
    pub fn initialize_tableau(&self, problem: &LpProblem) -> Result<Tableau, SolveError> {
        problem.validate()?;

        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();
        let total_cols = n_vars + n_constraints + 1;
        let rhs_col = total_cols - 1;

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: (n_vars..n_vars + n_constraints).collect(),
            n_vars,
        };

        for (i, c) in problem.constraints.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&c.coefficients);
            tableau.data[i][n_vars + i] = 1.0;
            tableau.data[i][rhs_col] = c.rhs;
        }

        // Objective row holds -c so that negative entries mark improving columns
        for (j, &coef) in problem.objective.iter().enumerate() {
            tableau.data[n_constraints][j] = -coef;
        }

        Ok(tableau)
    }

    /// Most negative objective-row entry, first one on ties. `None` when optimal.
    pub fn find_pivot_column(&self, tableau: &Tableau) -> Option<usize> {
        let obj_row = tableau.objective_row();
        let mut min_val = -self.tolerance;
        let mut min_col = None;

        for (j, &val) in obj_row[..tableau.rhs_col()].iter().enumerate() {
            if val < min_val {
                min_val = val;
                min_col = Some(j);
            }
        }

        min_col
    }

    /// Minimum ratio test over rows with a positive entry in `col`, first one on ties.
    pub fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Result<usize, SolveError> {
        let rhs_col = tableau.rhs_col();
        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for i in 0..tableau.num_constraints() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = tableau.data[i][rhs_col] / val;
                trace!(row = i, ratio, "ratio test");
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row.ok_or(SolveError::Unbounded { column: col })
    }

    /// Gauss-Jordan step: scale the pivot row, then clear the column elsewhere.
    pub fn perform_pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for v in tableau.data[row].iter_mut() {
            *v /= pivot_val;
        }

        let pivot_row = tableau.data[row].clone();
        for i in 0..n_rows {
            if i != row {
                let factor = tableau.data[i][col];
                if factor != 0.0 {
                    for (v, p) in tableau.data[i].iter_mut().zip(&pivot_row) {
                        *v -= factor * p;
                    }
                }
            }
        }
    }

    pub fn is_optimal(&self, tableau: &Tableau) -> bool {
        self.find_pivot_column(tableau).is_none()
    }

    fn extract_solution(&self, tableau: &Tableau, iterations: usize) -> SimplexSolution {
        let rhs_col = tableau.rhs_col();
        let row_values: Vec<f64> = (0..tableau.num_constraints())
            .map(|i| tableau.row(i)[rhs_col])
            .collect();

        let mut values = vec![0.0; tableau.n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.n_vars {
                values[basic] = row_values[i];
            }
        }

        SimplexSolution {
            row_values,
            values,
            objective_value: tableau.objective_value(),
            basis: tableau.basic_vars.clone(),
            iterations,
        }
    }
}

/// Simplex tableau: one row per constraint plus the objective row.
///
/// Columns are the decision variables, then one slack per constraint, then the
/// right-hand side.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
}

impl Tableau {
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    pub fn num_cols(&self) -> usize {
        self.data[0].len()
    }

    pub fn num_constraints(&self) -> usize {
        self.data.len() - 1
    }

    pub fn rhs_col(&self) -> usize {
        self.num_cols() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.num_constraints()]
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_row()[self.rhs_col()]
    }

    /// Column basic in each constraint row
    pub fn basis(&self) -> &[usize] {
        &self.basic_vars
    }
}
