//! Depth-first enumeration of non-negative integer points.
//!
//! The search starts at the origin and branches by adding one to a single
//! variable. A child is kept only when it stays under the variable cap,
//! satisfies every bound, and strictly improves on the best value seen so far.
//! Pruning against the running incumbent makes this a heuristic: points that
//! are only reachable through worse intermediate points can be missed.

use tracing::debug;

use crate::error::SolveError;
use crate::problem::LpProblem;
use crate::solution::SearchResult;

pub const DEFAULT_VARIABLE_CAP: u32 = 100;

/// How the bound check reads the coefficient matrix
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundCoupling {
    /// Every row uses its own coefficients
    #[default]
    Independent,
    /// Two-variable compatibility mode: the second row reuses the first row's
    /// coefficient for the second variable (`a10*x1 + a01*x2 <= b1`)
    Legacy,
}

/// Coefficients the integer search evaluates points against
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    coefficients: Vec<Vec<f64>>,
    bounds: Vec<f64>,
    objective: Vec<f64>,
    coupling: BoundCoupling,
}

impl SearchParams {
    pub fn new(
        coefficients: Vec<Vec<f64>>,
        bounds: Vec<f64>,
        objective: Vec<f64>,
    ) -> Result<Self, SolveError> {
        let n = objective.len();
        if n == 0 {
            return Err(SolveError::invalid("search needs at least one variable"));
        }
        if coefficients.len() != bounds.len() {
            return Err(SolveError::invalid(format!(
                "{} coefficient rows but {} bounds",
                coefficients.len(),
                bounds.len()
            )));
        }
        if let Some(i) = coefficients.iter().position(|row| row.len() != n) {
            return Err(SolveError::invalid(format!(
                "bound row {} has {} coefficients, expected {}",
                i + 1,
                coefficients[i].len(),
                n
            )));
        }
        let all_finite = coefficients
            .iter()
            .flatten()
            .chain(&bounds)
            .chain(&objective)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(SolveError::invalid("search parameters contain a non-finite value"));
        }

        Ok(Self {
            coefficients,
            bounds,
            objective,
            coupling: BoundCoupling::Independent,
        })
    }

    /// Search over every variable and every constraint of the problem
    pub fn from_problem(problem: &LpProblem) -> Result<Self, SolveError> {
        Self::new(
            problem.constraints.iter().map(|c| c.coefficients.clone()).collect(),
            problem.constraints.iter().map(|c| c.rhs).collect(),
            problem.objective.clone(),
        )
    }

    /// Project the problem onto its first two constraints and first two variables
    pub fn two_variable(problem: &LpProblem) -> Result<Self, SolveError> {
        problem.validate()?;
        if problem.num_variables() < 2 || problem.num_constraints() < 2 {
            return Err(SolveError::invalid(format!(
                "two-variable search needs at least 2 constraints and 2 variables, got {} and {}",
                problem.num_constraints(),
                problem.num_variables()
            )));
        }
        Self::new(
            problem.constraints[..2].iter().map(|c| c.coefficients[..2].to_vec()).collect(),
            problem.constraints[..2].iter().map(|c| c.rhs).collect(),
            problem.objective[..2].to_vec(),
        )
    }

    /// `Legacy` coupling is only defined for two rows over two variables.
    pub fn with_coupling(mut self, coupling: BoundCoupling) -> Result<Self, SolveError> {
        let two_by_two = self.num_variables() == 2 && self.num_rows() == 2;
        if coupling == BoundCoupling::Legacy && !two_by_two {
            return Err(SolveError::invalid(format!(
                "legacy bound coupling needs 2 rows over 2 variables, got {} over {}",
                self.num_rows(),
                self.num_variables()
            )));
        }
        self.coupling = coupling;
        Ok(self)
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_rows(&self) -> usize {
        self.bounds.len()
    }

    pub fn coupling(&self) -> BoundCoupling {
        self.coupling
    }

    pub fn evaluate_objective(&self, point: &[u32]) -> f64 {
        self.objective.iter().zip(point).map(|(c, &x)| c * f64::from(x)).sum()
    }

    pub fn within_bounds(&self, point: &[u32]) -> bool {
        (0..self.num_rows()).all(|i| {
            let lhs: f64 = point
                .iter()
                .enumerate()
                .map(|(j, &x)| self.coefficient(i, j) * f64::from(x))
                .sum();
            lhs <= self.bounds[i]
        })
    }

    fn coefficient(&self, row: usize, var: usize) -> f64 {
        match (self.coupling, row, var) {
            (BoundCoupling::Legacy, 1, 1) => self.coefficients[0][1],
            _ => self.coefficients[row][var],
        }
    }
}

struct SearchNode {
    point: Vec<u32>,
    value: f64,
}

/// Stack-based branch-and-bound over the integer lattice
pub struct IntegerSearch<'a> {
    params: &'a SearchParams,
    variable_cap: u32,
}

impl<'a> IntegerSearch<'a> {
    pub fn new(params: &'a SearchParams) -> Self {
        Self {
            params,
            variable_cap: DEFAULT_VARIABLE_CAP,
        }
    }

    pub fn with_variable_cap(mut self, cap: u32) -> Self {
        self.variable_cap = cap;
        self
    }

    /// Run the search from the origin.
    ///
    /// Fails with `OutOfSearchBounds` only when the origin itself violates the
    /// bounds; otherwise the origin (value 0) is the fallback answer.
    pub fn search(&self) -> Result<SearchResult, SolveError> {
        let n = self.params.num_variables();
        let origin = vec![0; n];
        if !self.params.within_bounds(&origin) {
            return Err(SolveError::OutOfSearchBounds { cap: self.variable_cap });
        }

        let mut best = SearchResult {
            point: origin.clone(),
            value: 0.0,
            nodes_explored: 0,
            nodes_pruned: 0,
        };
        let mut nodes = vec![SearchNode {
            point: origin,
            value: 0.0,
        }];

        while let Some(current) = nodes.pop() {
            best.nodes_explored += 1;

            if current.value > best.value {
                debug!(value = current.value, point = ?current.point, "new incumbent");
                best.value = current.value;
                best.point = current.point.clone();
            }

            // Highest index first so the lowest index is popped first
            for var in (0..n).rev() {
                if current.point[var] >= self.variable_cap {
                    best.nodes_pruned += 1;
                    continue;
                }
                let mut point = current.point.clone();
                point[var] += 1;

                if !self.params.within_bounds(&point) {
                    best.nodes_pruned += 1;
                    continue;
                }
                let value = self.params.evaluate_objective(&point);
                if value > best.value {
                    nodes.push(SearchNode { point, value });
                } else {
                    best.nodes_pruned += 1;
                }
            }
        }

        debug!(
            value = best.value,
            explored = best.nodes_explored,
            pruned = best.nodes_pruned,
            "integer search finished"
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(coefficients: Vec<Vec<f64>>, bounds: Vec<f64>, objective: Vec<f64>) -> SearchParams {
        SearchParams::new(coefficients, bounds, objective).unwrap()
    }

    #[test]
    fn test_evaluate_and_bounds() {
        let p = params(vec![vec![7.0, 44.0], vec![13.0, 11.0]], vec![132.0, 250.0], vec![3.0, 4.0]);
        assert_eq!(p.evaluate_objective(&[2, 3]), 18.0);
        assert!(p.within_bounds(&[18, 0]));
        assert!(!p.within_bounds(&[19, 0]));
        assert!(!p.within_bounds(&[0, 4]));
    }

    #[test]
    fn test_legacy_coupling_reuses_first_row_coefficient() {
        let independent = params(vec![vec![1.0, 1.0], vec![1.0, 5.0]], vec![10.0, 10.0], vec![1.0, 2.0]);
        let legacy = independent.clone().with_coupling(BoundCoupling::Legacy).unwrap();

        // Second row reads 1*x1 + 1*x2 <= 10 instead of 1*x1 + 5*x2 <= 10
        assert!(!independent.within_bounds(&[5, 2]));
        assert!(legacy.within_bounds(&[5, 2]));

        let result = IntegerSearch::new(&independent).search().unwrap();
        assert_eq!(result.point, vec![10, 0]);
        assert_eq!(result.value, 10.0);

        let result = IntegerSearch::new(&legacy).search().unwrap();
        assert_eq!(result.point, vec![8, 2]);
        assert_eq!(result.value, 12.0);
    }

    #[test]
    fn test_legacy_coupling_requires_two_by_two() {
        let p = params(vec![vec![1.0, 1.0, 1.0]], vec![6.0], vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            p.with_coupling(BoundCoupling::Legacy),
            Err(SolveError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_scenario_fractional_relaxation() {
        let p = params(vec![vec![7.0, 44.0], vec![13.0, 11.0]], vec![132.0, 250.0], vec![3.0, 4.0]);
        for coupling in [BoundCoupling::Independent, BoundCoupling::Legacy] {
            let p = p.clone().with_coupling(coupling).unwrap();
            let result = IntegerSearch::new(&p).search().unwrap();
            assert_eq!(result.point, vec![18, 0], "{:?}", coupling);
            assert_eq!(result.value, 54.0, "{:?}", coupling);

            // Feeding the winner back reproduces the value and stays feasible
            assert_eq!(p.evaluate_objective(&result.point), result.value);
            assert!(p.within_bounds(&result.point));
        }
    }

    #[test]
    fn test_zero_bound_returns_origin() {
        let p = params(vec![vec![1.0, 1.0]], vec![0.0], vec![3.0, 4.0]);
        let result = IntegerSearch::new(&p).search().unwrap();
        assert_eq!(result.point, vec![0, 0]);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.nodes_explored, 1);
        assert_eq!(result.nodes_pruned, 2);
    }

    #[test]
    fn test_infeasible_origin() {
        let p = params(vec![vec![1.0, 1.0]], vec![-1.0], vec![3.0, 4.0]);
        let err = IntegerSearch::new(&p).with_variable_cap(7).search().unwrap_err();
        assert_eq!(err, SolveError::OutOfSearchBounds { cap: 7 });
    }

    #[test]
    fn test_variable_cap() {
        let p = params(vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec![1000.0, 1000.0], vec![1.0, 1.0]);

        let result = IntegerSearch::new(&p).search().unwrap();
        assert_eq!(result.point, vec![100, 100]);
        assert_eq!(result.value, 200.0);

        let result = IntegerSearch::new(&p).with_variable_cap(10).search().unwrap();
        assert_eq!(result.point, vec![10, 10]);
        assert_eq!(result.value, 20.0);
    }

    #[test]
    fn test_three_variables() {
        let p = params(
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
            vec![2.0, 3.0, 4.0],
            vec![1.0, 1.0, 1.0],
        );
        let result = IntegerSearch::new(&p).search().unwrap();
        assert_eq!(result.point, vec![2, 3, 4]);
        assert_eq!(result.value, 9.0);
    }

    #[test]
    fn test_negative_objective_coefficient_is_never_increased() {
        let p = params(vec![vec![1.0, 1.0]], vec![5.0], vec![-1.0, 2.0]);
        let result = IntegerSearch::new(&p).search().unwrap();
        assert_eq!(result.point, vec![0, 5]);
        assert_eq!(result.value, 10.0);
    }

    #[test]
    fn test_incumbent_pruning_can_lose_ground_as_cap_grows() {
        // With cap 8 the walk along x1 reaches (8, 1) = 76 first, and that
        // incumbent prunes (7, 2) = 71 on the way to (7, 5) = 83.
        let p = params(vec![vec![4.0, 1.0]], vec![33.0], vec![9.0, 4.0]);

        let capped = IntegerSearch::new(&p).with_variable_cap(7).search().unwrap();
        assert_eq!((capped.point.clone(), capped.value), (vec![7, 5], 83.0));

        let wider = IntegerSearch::new(&p).with_variable_cap(8).search().unwrap();
        assert_eq!((wider.point.clone(), wider.value), (vec![8, 1], 76.0));
    }

    #[test]
    fn test_two_variable_projection() {
        let problem = LpProblem::from_rows(
            &[
                vec![7.0, 44.0, 1.0, 132.0],
                vec![13.0, 11.0, 1.0, 250.0],
                vec![0.0, 0.0, 1.0, 1.0],
            ],
            vec![3.0, 4.0, 5.0],
        )
        .unwrap();
        let p = SearchParams::two_variable(&problem).unwrap();
        assert_eq!(p.num_variables(), 2);
        assert_eq!(p.num_rows(), 2);

        let small = LpProblem::from_rows(&[vec![1.0, 1.0, 4.0]], vec![1.0, 1.0]).unwrap();
        assert!(SearchParams::two_variable(&small).is_err());
    }
}
