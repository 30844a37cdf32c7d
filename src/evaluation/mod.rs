//! Feasibility and fitness evaluation.
//!
//! Two paths over the same route walk:
//!
//! - [`is_insertion_feasible`]: a hard yes/no gate. Engines call it before
//!   committing a mutation and revert on `false`.
//! - [`Evaluator`]: a continuous, always-computable score. Violations are
//!   charged as penalties so infeasible candidates can still be ranked.

mod feasibility;
mod fitness;

pub use feasibility::is_insertion_feasible;
pub use fitness::{
    violation_penalty, Evaluator, FitnessBreakdown, FitnessWeights, MIN_PENALTY, PENALTY_FACTOR,
};
