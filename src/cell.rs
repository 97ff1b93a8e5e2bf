use crate::color::ColorID;

/// A cell of an unsolved puzzle.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cell {
    /// One end of the path of `color`.
    Terminus {
        /// The color this cell is an endpoint of.
        color: ColorID,
    },
    /// A crossing carrying two paths at once.
    Bridge,
    /// A connecting cell, to be colored by the solver.
    #[default]
    Empty,
}

/// A cell of a solved grid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolvedCell {
    /// An endpoint, unchanged from the puzzle.
    Terminus {
        /// The endpoint's color.
        color: ColorID,
    },
    /// A connecting cell on the path of `color`.
    Path {
        /// The color of the path occupying this cell.
        color: ColorID,
    },
    /// A bridge and the colors crossing it.
    Bridge {
        /// In ascending order.
        colors: Vec<ColorID>,
    },
}

impl SolvedCell {
    /// Whether a path of `color` occupies this cell.
    pub fn carries(&self, color: ColorID) -> bool {
        match self {
            Self::Terminus { color: c } | Self::Path { color: c } => *c == color,
            Self::Bridge { colors } => colors.contains(&color),
        }
    }
}
