//! Error types for building, encoding and solving puzzles

use thiserror::Error;

use crate::color::ColorID;
use crate::location::Location;

/// A malformed puzzle description, rejected while building a [`Grid`](crate::Grid).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FormatError {
    /// The description has no rows at all.
    #[error("the puzzle has no rows")]
    EmptyGrid,

    /// Rows differ in length.
    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedRows {
        /// The first offending row.
        row: usize,
        /// The length of the first row.
        expected: usize,
        /// The length of `row`.
        found: usize,
    },

    /// A color appears some number of times other than twice.
    #[error("color '{display}' has {found} endpoints, but there should be exactly 2")]
    EndpointCount {
        /// The color's character.
        display: char,
        /// How many times it appears.
        found: usize,
    },

    /// The number of colors in the grid differs from the declared count.
    #[error("found {found} colors but {declared} were declared")]
    ColorCountMismatch {
        /// The required count.
        declared: usize,
        /// The count actually present.
        found: usize,
    },

    /// No endpoints at all.
    #[error("the puzzle has no colors")]
    NoColors,

    /// A feature was placed outside the grid.
    #[error("{location} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Where the feature was placed.
        location: Location,
        /// Rows in the grid.
        rows: usize,
        /// Columns in the grid.
        cols: usize,
    },

    /// A feature was placed on a cell which already holds one.
    #[error("{0} already holds an endpoint or bridge")]
    Overlapping(Location),

    /// A color was named by `*`, `+` or whitespace.
    #[error("'{0}' is reserved and cannot name a color")]
    ReservedDisplay(char),

    /// Two colors share a display character.
    #[error("color '{0}' was added twice")]
    DuplicateColor(char),

    /// Two colors differ only in letter case, which solved grids use to tell endpoints from paths.
    #[error("color '{display}' differs from color '{existing}' only in case")]
    CaseCollision {
        /// The rejected character.
        display: char,
        /// The character of the color already present.
        existing: char,
    },
}

/// Reasons solving a well-formed puzzle may fail.
///
/// An unsatisfiable puzzle is not an error; see [`Outcome::Unsatisfiable`](crate::Outcome::Unsatisfiable).
#[derive(Debug, Error)]
pub enum SolveError {
    /// The SAT backend itself failed.
    #[error("SAT backend failed: {0}")]
    Backend(String),

    /// The assignment gives a non-bridge cell no color.
    #[error("no color variable is true at {0}")]
    UncoloredCell(Location),

    /// The assignment gives a non-bridge cell several colors.
    #[error("color variables {colors:?} are all true at {location}")]
    AmbiguousCell {
        /// The offending cell.
        location: Location,
        /// Every color true there, ascending.
        colors: Vec<ColorID>,
    },

    /// The assignment recolors an endpoint.
    #[error("endpoint at {location} has color {expected} but the assignment gives it {found}")]
    TerminusMismatch {
        /// The endpoint.
        location: Location,
        /// The endpoint's own color.
        expected: ColorID,
        /// The color the assignment gives it.
        found: ColorID,
    },
}
