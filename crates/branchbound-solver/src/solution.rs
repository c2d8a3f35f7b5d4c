/// Optimum of the continuous relaxation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSolution {
    /// Right-hand side of each constraint row in the final tableau.
    /// Indexed by constraint, not by variable.
    pub row_values: Vec<f64>,
    /// Value of each decision variable (zero when non-basic)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Tableau column basic in each constraint row
    pub basis: Vec<usize>,
    /// Number of pivots performed
    pub iterations: usize,
}

/// Best integer point found by the search
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Integer value of each searched variable
    pub point: Vec<u32>,
    /// Objective value at `point`
    pub value: f64,
    /// Nodes popped from the work list
    pub nodes_explored: usize,
    /// Children discarded by the cap, the bounds or the incumbent
    pub nodes_pruned: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum MipOutcome {
    /// The relaxation is already integral; no search was run
    Integral { relaxation: SimplexSolution },
    /// The relaxation was fractional and the integer search ran
    Searched {
        relaxation: SimplexSolution,
        search: SearchResult,
    },
}

impl MipOutcome {
    pub fn relaxation(&self) -> &SimplexSolution {
        match self {
            MipOutcome::Integral { relaxation } | MipOutcome::Searched { relaxation, .. } => relaxation,
        }
    }

    pub fn search(&self) -> Option<&SearchResult> {
        match self {
            MipOutcome::Integral { .. } => None,
            MipOutcome::Searched { search, .. } => Some(search),
        }
    }

    pub fn needed_search(&self) -> bool {
        matches!(self, MipOutcome::Searched { .. })
    }
}
