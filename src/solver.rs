use std::collections::HashSet;

use tracing::debug;
use varisat::{Lit, Solver, Var};

use crate::decoder::SolvedGrid;
use crate::encoder::Cnf;
use crate::error::SolveError;

/// The variables a satisfying assignment sets to true; every other variable is false.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Assignment {
    true_vars: HashSet<Var>,
}

impl Assignment {
    /// An assignment setting exactly `vars` to true.
    pub fn from_true_vars(vars: impl IntoIterator<Item = Var>) -> Self {
        Self { true_vars: vars.into_iter().collect() }
    }

    /// Build from a model in the form varisat (or any DIMACS solver) reports it: one literal per variable.
    pub fn from_model(model: &[Lit]) -> Self {
        Self::from_true_vars(model.iter().filter(|lit| lit.is_positive()).map(|lit| lit.var()))
    }

    /// Whether `var` is set to true.
    pub fn is_true(&self, var: Var) -> bool {
        self.true_vars.contains(&var)
    }

    /// The true variables, in no particular order.
    pub fn true_vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.true_vars.iter().copied()
    }
}

/// Answer of a [`SatBackend`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SatOutcome {
    /// Some assignment satisfies every clause.
    Satisfiable(Assignment),
    /// No assignment does.
    Unsatisfiable,
}

/// A SAT solver, treated as a black box: no timeouts, retries or access to its internals.
pub trait SatBackend {
    /// Decide `cnf`, returning a model if it is satisfiable.
    fn solve(&mut self, cnf: &Cnf) -> Result<SatOutcome, SolveError>;
}

/// [`SatBackend`] running the varisat CDCL solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct VarisatBackend;

impl SatBackend for VarisatBackend {
    fn solve(&mut self, cnf: &Cnf) -> Result<SatOutcome, SolveError> {
        debug!(vars = cnf.var_count(), clauses = cnf.len(), "handing instance to varisat");

        let mut solver = Solver::new();
        solver.add_formula(&cnf.to_formula());

        match solver.solve() {
            Ok(true) => {
                let model = solver.model().ok_or_else(|| SolveError::Backend("satisfiable but no model".into()))?;
                Ok(SatOutcome::Satisfiable(Assignment::from_model(&model)))
            }
            Ok(false) => Ok(SatOutcome::Unsatisfiable),
            Err(err) => Err(SolveError::Backend(err.to_string())),
        }
    }
}

/// Result of solving a well-formed puzzle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Every cell colored.
    Solved(SolvedGrid),
    /// No coloring satisfies the puzzle's constraints.
    Unsatisfiable,
}
