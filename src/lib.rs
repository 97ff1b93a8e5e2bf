#![warn(missing_docs)]

//! # `flowsat`
//!
//! A solver for the puzzles of the mobile game Flow Free and its Bridges expansion: pairs of colored endpoints on a rectangular grid must be joined by non-crossing paths which together fill every cell.
//! Bridge cells are crossed by two paths at once.
//!
//! Build a [`Grid`] with a [`GridBuilder`] or parse one from text, then call [`Grid::solve`]:
//!
//! ```
//! use flowsat::{Grid, Outcome};
//!
//! let grid: Grid = "AB\nAB".parse().unwrap();
//! match grid.solve().unwrap() {
//!     Outcome::Solved(solved) => assert_eq!(solved.to_string(), "AB\nAB\n"),
//!     Outcome::Unsatisfiable => unreachable!(),
//! }
//! ```
//!
//! # Internals
//! The puzzle is compiled to a Boolean satisfiability problem in conjunctive normal form, handed to a SAT solver, and the model read back into a grid.
//! There is one variable per `(row, column, color)` triple, stating that a path of that color occupies that cell; see [`VarIndexer`].
//!
//! We make the following assertions in SAT form:
//! 1. An endpoint has its color and no other, and exactly one neighbor shares its color (the path leaves the endpoint once).
//! 2. Every other non-bridge cell has exactly one color.
//! 3. A non-bridge, non-endpoint cell with color C has exactly two neighbors with color C (the path enters and leaves once).
//! 4. A bridge has exactly two colors, and for each of them behaves as in 3.
//! Optionally ([`BridgeRule::Straight`]) each color must instead cross the bridge in a straight line.
//!
//! All of these are instances of a single "exactly N of these literals, if this one holds" clause generator.
//! Paths closing into loops away from their endpoints are not ruled out.

pub use builder::GridBuilder;
pub use cell::{Cell, SolvedCell};
pub use color::{ColorID, Palette};
pub use decoder::{decode, SolvedGrid};
pub use encoder::{BridgeRule, ClauseCompiler, Cnf, EncoderConfig};
pub use error::{FormatError, SolveError};
pub use grid::Grid;
pub use indexer::VarIndexer;
pub use location::{Location, Step};
pub use solver::{Assignment, Outcome, SatBackend, SatOutcome, VarisatBackend};

pub(crate) mod builder;
mod tests;
pub(crate) mod cell;
pub(crate) mod color;
pub(crate) mod decoder;
pub(crate) mod encoder;
pub mod error;
pub(crate) mod grid;
pub(crate) mod indexer;
pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod solver;
#[cfg(feature = "wasm")]
pub mod wasm;
