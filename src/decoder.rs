use std::fmt::{Display, Formatter};

use ndarray::Array2;

use crate::builder::BRIDGE_DISPLAY;
use crate::cell::{Cell, SolvedCell};
use crate::color::{ColorID, Palette};
use crate::error::SolveError;
use crate::grid::{print, Grid};
use crate::indexer::VarIndexer;
use crate::location::Location;
use crate::solver::Assignment;

/// A fully colored grid.
///
/// Displays endpoints as their color's character upper-cased, path cells lower-cased and bridges as `+`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolvedGrid {
    pub(crate) cells: Array2<SolvedCell>,
    pub(crate) palette: Palette,
}

impl SolvedGrid {
    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// The number of columns.
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// The cell at `location`, if it is within the grid.
    pub fn cell(&self, location: Location) -> Option<&SolvedCell> {
        self.cells.get(location.as_index())
    }

    /// The single color at `location`, or `None` for bridges and out of bounds locations.
    pub fn color_at(&self, location: Location) -> Option<ColorID> {
        match self.cell(location)? {
            SolvedCell::Terminus { color } | SolvedCell::Path { color } => Some(*color),
            SolvedCell::Bridge { .. } => None,
        }
    }

    /// The display characters of the puzzle's colors.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

/// Read the colors of every cell of `grid` off `assignment`.
///
/// Non-bridge cells must have exactly one true color variable, and endpoints must keep their color.
/// Bridges keep whichever colors are true at their location.
pub fn decode(grid: &Grid, assignment: &Assignment) -> Result<SolvedGrid, SolveError> {
    let indexer = VarIndexer::for_grid(grid);
    let mut found: Array2<Vec<ColorID>> = Array2::from_elem((grid.rows(), grid.cols()), Vec::new());

    for var in assignment.true_vars().filter(|var| indexer.contains(*var)) {
        let (location, color) = indexer.decode(var);
        found[location.as_index()].push(color);
    }

    found.map_inplace(|colors| colors.sort_unstable());

    let mut cells = Array2::from_elem(found.raw_dim(), SolvedCell::Bridge { colors: Vec::new() });
    for ((index, colors), cell) in found.indexed_iter().zip(grid.cells.iter()) {
        let location = Location::from(index);

        cells[index] = match (cell, &colors[..]) {
            (Cell::Bridge, _) => SolvedCell::Bridge { colors: colors.clone() },
            (_, []) => return Err(SolveError::UncoloredCell(location)),
            (Cell::Terminus { color: expected }, [actual]) if actual != expected => {
                return Err(SolveError::TerminusMismatch { location, expected: *expected, found: *actual });
            }
            (Cell::Terminus { color }, [_]) => SolvedCell::Terminus { color: *color },
            (Cell::Empty, [color]) => SolvedCell::Path { color: *color },
            (_, _) => return Err(SolveError::AmbiguousCell { location, colors: colors.clone() }),
        };
    }

    Ok(SolvedGrid {
        cells,
        palette: grid.palette.clone(),
    })
}

impl Display for SolvedGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = |color: &ColorID| self.palette.display_of(*color).unwrap_or('?');

        write!(f, "{}", print(self.cells.map(|cell| match cell {
            SolvedCell::Terminus { color } => display(color).to_ascii_uppercase(),
            SolvedCell::Path { color } => display(color).to_ascii_lowercase(),
            SolvedCell::Bridge { .. } => BRIDGE_DISPLAY,
        })))
    }
}
