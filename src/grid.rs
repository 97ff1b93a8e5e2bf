use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::num::NonZero;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array2;
use strum::VariantArray;
use tracing::info;

use crate::builder::{GridBuilder, BRIDGE_DISPLAY, EMPTY_DISPLAY};
use crate::cell::Cell;
use crate::color::{ColorID, Palette};
use crate::decoder;
use crate::encoder::{ClauseCompiler, Cnf, EncoderConfig};
use crate::error::{FormatError, SolveError};
use crate::location::{Location, Step};
use crate::solver::{Outcome, SatBackend, SatOutcome, VarisatBackend};

/// An immutable Flow puzzle: a rectangle of empty cells, bridges and color endpoints.
///
/// [`Grid`]s are built with a [`GridBuilder`] or parsed from text with [`Grid::parse`], both of which validate the puzzle.
/// Every color has exactly two endpoints and there is at least one color.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid {
    pub(crate) cells: Array2<Cell>,
    pub(crate) palette: Palette,
    // indexed by color
    pub(crate) endpoints: Vec<(Location, Location)>,
    pub(crate) bridges: BTreeSet<Location>,
}

impl Grid {
    /// Parse the text format: one row per line, `*` for an empty cell, `+` for a bridge and any other character for an endpoint of the color it names.
    ///
    /// Colors are numbered in order of first appearance, reading row by row.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Self::parse_inner(text, None)
    }

    /// As [`Self::parse`], additionally requiring exactly `colors` distinct colors.
    pub fn parse_with_colors(text: &str, colors: usize) -> Result<Self, FormatError> {
        Self::parse_inner(text, Some(colors))
    }

    fn parse_inner(text: &str, declared_colors: Option<usize>) -> Result<Self, FormatError> {
        let lines = text.trim().lines().map(str::trim).collect_vec();
        let rows = NonZero::new(lines.len()).ok_or(FormatError::EmptyGrid)?;
        let cols = lines[0].chars().count();

        let mut termini: Vec<(char, Vec<Location>)> = Vec::new();
        let mut bridges = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(FormatError::RaggedRows { row, expected: cols, found });
            }

            for (col, display) in line.chars().enumerate() {
                let location = Location(row, col);
                match display {
                    EMPTY_DISPLAY => {}
                    BRIDGE_DISPLAY => bridges.push(location),
                    _ => match termini.iter_mut().find(|(d, _)| *d == display) {
                        Some((_, locations)) => locations.push(location),
                        None => termini.push((display, vec![location])),
                    },
                }
            }
        }

        let cols = NonZero::new(cols).ok_or(FormatError::EmptyGrid)?;
        let mut builder = GridBuilder::with_dims((rows, cols));

        for (display, locations) in termini {
            match locations[..] {
                [a, b] => builder.add_termini(display, (a, b)),
                _ => return Err(FormatError::EndpointCount { display, found: locations.len() }),
            };
        }
        for location in bridges {
            builder.add_bridge(location);
        }
        if let Some(count) = declared_colors {
            builder.declare_colors(count);
        }

        builder.build()
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// The number of columns.
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// The number of colors, `k`.
    pub fn num_colors(&self) -> usize {
        self.palette.len()
    }

    /// Every [`ColorID`] in use, `0..k`.
    pub fn colors(&self) -> std::ops::Range<ColorID> {
        self.palette.colors()
    }

    /// The display characters of the colors.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The character `color` is written as in the text format.
    pub fn display_of(&self, color: ColorID) -> Option<char> {
        self.palette.display_of(color)
    }

    /// The color written as `display` in the text format.
    pub fn color_of(&self, display: char) -> Option<ColorID> {
        self.palette.color_of(display)
    }

    /// The cell at `location`, if it is within the grid.
    pub fn cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// Whether `location` lies within the grid.
    pub fn contains(&self, location: Location) -> bool {
        location.0 < self.rows() && location.1 < self.cols()
    }

    /// Both endpoints of `color`.
    pub fn endpoints(&self, color: ColorID) -> Option<(Location, Location)> {
        self.endpoints.get(color).copied()
    }

    /// Every endpoint with its color, color by color.
    pub fn termini(&self) -> impl Iterator<Item = (Location, ColorID)> + '_ {
        self.endpoints.iter()
            .enumerate()
            .flat_map(|(color, (a, b))| [(*a, color), (*b, color)])
    }

    /// Every cell which is neither an endpoint nor a bridge, in row-major order.
    pub fn connecting_cells(&self) -> impl Iterator<Item = Location> + '_ {
        self.cells.indexed_iter()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| Location::from(index))
    }

    /// Every bridge, in row-major order.
    pub fn bridges(&self) -> impl Iterator<Item = Location> + '_ {
        self.bridges.iter().copied()
    }

    /// The neighbor of `location` in direction `step`, if it lies within the grid.
    pub fn step(&self, location: Location, step: Step) -> Option<Location> {
        Some(step.attempt_from(location)).filter(|neighbor| self.contains(*neighbor))
    }

    /// The orthogonal neighbors of `location` within the grid, in the order up, down, left, right.
    pub fn neighbors(&self, location: Location) -> Vec<Location> {
        Step::VARIANTS.iter()
            .filter_map(|step| self.step(location, *step))
            .collect_vec()
    }

    /// Compile this puzzle to CNF.
    pub fn encode(&self, config: EncoderConfig) -> Cnf {
        ClauseCompiler::new(self, config).compile()
    }

    /// Solve with the default configuration and the built-in [`VarisatBackend`].
    pub fn solve(&self) -> Result<Outcome, SolveError> {
        self.solve_with(EncoderConfig::default(), &mut VarisatBackend::default())
    }

    /// Compile with `config`, hand the instance to `backend` and decode its answer.
    pub fn solve_with<B: SatBackend>(&self, config: EncoderConfig, backend: &mut B) -> Result<Outcome, SolveError> {
        let cnf = self.encode(config);

        match backend.solve(&cnf)? {
            SatOutcome::Satisfiable(assignment) => {
                info!(rows = self.rows(), cols = self.cols(), colors = self.num_colors(), "solved");
                Ok(Outcome::Solved(decoder::decode(self, &assignment)?))
            }
            SatOutcome::Unsatisfiable => {
                info!(rows = self.rows(), cols = self.cols(), colors = self.num_colors(), "no solution");
                Ok(Outcome::Unsatisfiable)
            }
        }
    }
}

impl FromStr for Grid {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

pub(crate) fn print(board: Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    for row in board.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.cells.map(|cell| match cell {
            Cell::Terminus { color } => self.palette.display_of(*color).unwrap_or('?'),
            Cell::Bridge => BRIDGE_DISPLAY,
            Cell::Empty => EMPTY_DISPLAY,
        })))
    }
}
