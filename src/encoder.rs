use std::fmt::{Display, Formatter};
use std::io;

use itertools::Itertools;
use tracing::{debug, trace};
use varisat::{CnfFormula, ExtendFormula, Lit};

use crate::color::ColorID;
use crate::grid::Grid;
use crate::indexer::VarIndexer;
use crate::location::{Location, Step};
use crate::logic::{exactly, exactly_one};

/// How bridge cells are constrained.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BridgeRule {
    /// Exactly two colors occupy a bridge, and each of them continues to exactly two neighbors, on any sides.
    #[default]
    Loose,
    /// Exactly two colors occupy a bridge, each passing straight through along its own axis (up-down or left-right).
    Straight,
}

/// Options for [`ClauseCompiler`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EncoderConfig {
    /// How paths may cross bridges.
    pub bridge_rule: BridgeRule,
}

/// A CNF instance: a conjunction of clauses over variables `1..=var_count`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cnf {
    var_count: usize,
    clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    /// An instance over `var_count` variables with no clauses yet.
    pub fn new(var_count: usize) -> Self {
        Self { var_count, clauses: Vec::new() }
    }

    /// Append `clauses`, keeping their order.
    pub fn extend(&mut self, clauses: impl IntoIterator<Item = Vec<Lit>>) {
        self.clauses.extend(clauses);
    }

    /// The clauses, in the order they were added.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// The number of variables, numbered `1..=var_count` in DIMACS.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// The number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether there are no clauses, in which case every assignment satisfies this instance.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Convert to a varisat formula.
    pub fn to_formula(&self) -> CnfFormula {
        let mut formula = CnfFormula::new();
        formula.set_var_count(self.var_count);
        for clause in &self.clauses {
            formula.add_clause(clause);
        }
        formula
    }

    /// Write this instance in DIMACS CNF format.
    pub fn write_dimacs(&self, mut target: impl io::Write) -> io::Result<()> {
        write!(target, "{self}")
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.var_count, self.clauses.len())?;
        for clause in &self.clauses {
            for lit in clause {
                write!(f, "{} ", lit.to_dimacs())?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

/// Compiles a [`Grid`] into CNF.
///
/// Variable `(cell, color)` (see [`VarIndexer`]) holds when a path of `color` occupies `cell`.
/// Two same-colored cells which are adjacent are taken to be consecutive on their path, so:
/// 1. an endpoint has its own color, no other, and exactly one neighbor of that color;
/// 2. a connecting cell has exactly one color;
/// 3. a connecting cell of color C has exactly two neighbors of color C;
/// 4. a bridge has exactly two colors, each continuing as in 3 or, under [`BridgeRule::Straight`], straight across.
///
/// Each family is generated independently; [`Self::compile`] concatenates them.
/// Paths are not prevented from closing into loops detached from their endpoints.
pub struct ClauseCompiler<'a> {
    grid: &'a Grid,
    indexer: VarIndexer,
    config: EncoderConfig,
}

impl<'a> ClauseCompiler<'a> {
    /// A compiler for `grid`.
    pub fn new(grid: &'a Grid, config: EncoderConfig) -> Self {
        Self {
            grid,
            indexer: VarIndexer::for_grid(grid),
            config,
        }
    }

    #[inline]
    fn lit(&self, location: Location, color: ColorID) -> Lit {
        self.indexer.encode(location, color).positive()
    }

    fn neighbor_lits(&self, location: Location, color: ColorID) -> Vec<Lit> {
        self.grid.neighbors(location)
            .into_iter()
            .map(|neighbor| self.lit(neighbor, color))
            .collect_vec()
    }

    fn color_lits(&self, location: Location) -> Vec<Lit> {
        self.grid.colors()
            .map(|color| self.lit(location, color))
            .collect_vec()
    }

    /// Rule 1, for every endpoint.
    pub fn endpoint_clauses(&self) -> Vec<Vec<Lit>> {
        let mut clauses = Vec::new();

        for (location, color) in self.grid.termini() {
            // the endpoint is its own color and no other
            clauses.extend(self.grid.colors()
                .map(|other| vec![self.indexer.encode(location, other).lit(other == color)]));

            // its path leaves through exactly one neighbor
            clauses.extend(exactly_one(&self.neighbor_lits(location, color)));
        }

        clauses
    }

    /// Rule 2, for every connecting cell.
    pub fn single_color_clauses(&self) -> Vec<Vec<Lit>> {
        self.grid.connecting_cells()
            .flat_map(|location| exactly_one(&self.color_lits(location)))
            .collect_vec()
    }

    /// If `location` has `color`, exactly two of its neighbors have it too.
    fn continuation_clauses(&self, location: Location, color: ColorID) -> Vec<Vec<Lit>> {
        exactly(2, &self.neighbor_lits(location, color), Some(self.lit(location, color)))
    }

    /// Rule 3, for every connecting cell and color.
    pub fn path_clauses(&self) -> Vec<Vec<Lit>> {
        self.grid.connecting_cells()
            .cartesian_product(self.grid.colors())
            .flat_map(|(location, color)| self.continuation_clauses(location, color))
            .collect_vec()
    }

    /// Straight crossing of a bridge at `location` by `color`; a missing side is a literal that never holds.
    fn straight_clauses(&self, location: Location, color: ColorID) -> Vec<Vec<Lit>> {
        let here = self.lit(location, color);
        let side = |step: Step| self.grid.step(location, step).map(|neighbor| self.lit(neighbor, color));
        let (up, down, left, right) = (side(Step::Up), side(Step::Down), side(Step::Left), side(Step::Right));

        let mut clauses = Vec::new();

        // here => (up & down) | (left & right)
        for (vertical, horizontal) in [up, down].into_iter().cartesian_product([left, right]) {
            clauses.push([Some(!here), vertical, horizontal].into_iter().flatten().collect_vec());
        }

        // entering from one side means leaving from the opposite one
        for (from, to) in [(up, down), (down, up), (left, right), (right, left)] {
            if let Some(from) = from {
                clauses.push([Some(!here), Some(!from), to].into_iter().flatten().collect_vec());
            }
        }

        // but not along both axes
        if let (Some(u), Some(d), Some(l), Some(r)) = (up, down, left, right) {
            clauses.push(vec![!here, !u, !d, !l, !r]);
        }

        clauses
    }

    /// Two colors on a bridge at `location` may not share an axis.
    fn axis_clauses(&self, location: Location) -> Vec<Vec<Lit>> {
        let axes = [(Step::Up, Step::Down), (Step::Left, Step::Right)];

        self.grid.colors()
            .tuple_combinations()
            .cartesian_product(axes)
            .filter_map(|((c1, c2), (a, b))| {
                let (a, b) = (self.grid.step(location, a)?, self.grid.step(location, b)?);
                Some(vec![
                    !self.lit(location, c1), !self.lit(location, c2),
                    !self.lit(a, c1), !self.lit(b, c1),
                    !self.lit(a, c2), !self.lit(b, c2),
                ])
            })
            .collect_vec()
    }

    /// Rule 4, for every bridge, according to the configured [`BridgeRule`].
    pub fn bridge_clauses(&self) -> Vec<Vec<Lit>> {
        let mut clauses = Vec::new();

        for location in self.grid.bridges() {
            // exactly two colors cross here
            clauses.extend(exactly(2, &self.color_lits(location), None));

            match self.config.bridge_rule {
                BridgeRule::Loose => clauses.extend(self.grid.colors()
                    .flat_map(|color| self.continuation_clauses(location, color))),
                BridgeRule::Straight => {
                    clauses.extend(self.grid.colors()
                        .flat_map(|color| self.straight_clauses(location, color)));
                    clauses.extend(self.axis_clauses(location));
                }
            }
        }

        clauses
    }

    /// Every clause family, in the order above.
    pub fn compile(&self) -> Cnf {
        let mut cnf = Cnf::new(self.indexer.var_count());
        trace!(vars = cnf.var_count(), "compiling");

        let endpoint = self.endpoint_clauses();
        debug!(clauses = endpoint.len(), "endpoint clauses");
        cnf.extend(endpoint);

        let single_color = self.single_color_clauses();
        debug!(clauses = single_color.len(), "single color clauses");
        cnf.extend(single_color);

        let path = self.path_clauses();
        debug!(clauses = path.len(), "path continuation clauses");
        cnf.extend(path);

        let bridge = self.bridge_clauses();
        debug!(clauses = bridge.len(), rule = ?self.config.bridge_rule, "bridge clauses");
        cnf.extend(bridge);

        cnf
    }
}
