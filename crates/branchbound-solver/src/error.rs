use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Problem is unbounded: no row has a positive entry in pivot column {column}")]
    Unbounded { column: usize },
    #[error("Simplex did not converge within {iterations} iterations")]
    NonConvergent { iterations: usize },
    #[error("No feasible integer point within the variable cap of {cap}")]
    OutOfSearchBounds { cap: u32 },
}

impl SolveError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SolveError::InvalidInput(message.into())
    }
}
