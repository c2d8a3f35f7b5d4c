use crate::error::SolveError;

/// A maximization problem over non-negative variables with `<=` constraints
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Objective coefficients, one per decision variable (maximized)
    pub objective: Vec<f64>,
    /// Constraints, each read as `coefficients . x <= rhs`
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Right-hand side bound
    pub rhs: f64,
}

impl LpProblem {
    pub fn new(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    /// Build a problem from rows of `n` coefficients followed by the bound.
    ///
    /// Every row must have exactly `objective.len() + 1` entries.
    pub fn from_rows(rows: &[Vec<f64>], objective: Vec<f64>) -> Result<Self, SolveError> {
        let n = objective.len();
        let mut problem = Self::new(objective);
        for (i, row) in rows.iter().enumerate() {
            let Some((&rhs, coefficients)) = row.split_last() else {
                return Err(SolveError::invalid(format!("constraint {} is empty", i + 1)));
            };
            if row.len() != n + 1 {
                return Err(SolveError::invalid(format!(
                    "constraint {} has {} entries, expected {} coefficients and a bound",
                    i + 1,
                    row.len(),
                    n
                )));
            }
            problem.add_constraint(coefficients.to_vec(), rhs);
        }
        problem.validate()?;
        Ok(problem)
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, rhs: f64) {
        self.constraints.push(Constraint { coefficients, rhs });
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check dimensions and values before a tableau is built from this problem.
    ///
    /// Bounds must be non-negative: the solver starts from the all-slack basis
    /// and has no feasibility phase.
    pub fn validate(&self) -> Result<(), SolveError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(SolveError::invalid("objective has no variables"));
        }
        if self.constraints.is_empty() {
            return Err(SolveError::invalid("problem has no constraints"));
        }
        if let Some(j) = self.objective.iter().position(|c| !c.is_finite()) {
            return Err(SolveError::invalid(format!(
                "objective coefficient {} is not finite",
                j + 1
            )));
        }

        for (i, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n {
                return Err(SolveError::invalid(format!(
                    "constraint {} has {} coefficients, expected {}",
                    i + 1,
                    c.coefficients.len(),
                    n
                )));
            }
            if c.coefficients.iter().any(|a| !a.is_finite()) || !c.rhs.is_finite() {
                return Err(SolveError::invalid(format!(
                    "constraint {} contains a non-finite value",
                    i + 1
                )));
            }
            if c.rhs < 0.0 {
                return Err(SolveError::invalid(format!(
                    "constraint {} has negative bound {}",
                    i + 1,
                    c.rhs
                )));
            }
        }

        Ok(())
    }
}
