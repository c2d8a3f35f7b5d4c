mod error;
mod mip;
mod problem;
mod search;
mod simplex;
mod solution;

pub use error::SolveError;
pub use mip::{MipSolver, Projection};
pub use problem::{Constraint, LpProblem};
pub use search::{BoundCoupling, DEFAULT_VARIABLE_CAP, IntegerSearch, SearchParams};
pub use simplex::{SimplexSolver, Tableau};
pub use solution::{MipOutcome, SearchResult, SimplexSolution};
