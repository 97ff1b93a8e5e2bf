use varisat::Var;

use crate::color::ColorID;
use crate::grid::Grid;
use crate::location::Location;

/// Bijection between `(row, column, color)` triples and SAT variables.
///
/// Variable `1 + row * cols + col + color * rows * cols`, in DIMACS numbering, states that the cell at `(row, col)` carries `color`.
/// The variables of one color form a contiguous block of `rows * cols` IDs, so IDs span exactly `1..=rows * cols * k`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VarIndexer {
    rows: usize,
    cols: usize,
    colors: usize,
}

impl VarIndexer {
    /// An indexer for a `rows` by `cols` grid with `colors` colors.
    pub fn new(rows: usize, cols: usize, colors: usize) -> Self {
        Self { rows, cols, colors }
    }

    /// An indexer sized to `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.rows(), grid.cols(), grid.num_colors())
    }

    #[inline]
    fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// The number of variables, which is also the largest DIMACS ID in use.
    pub fn var_count(&self) -> usize {
        self.cells() * self.colors
    }

    /// Whether `var` belongs to this indexer's range.
    pub fn contains(&self, var: Var) -> bool {
        var.index() < self.var_count()
    }

    /// The variable stating that `location` has `color`.
    ///
    /// # Panics
    /// If `location` or `color` lies outside the grid this indexer was made for.
    #[inline]
    pub fn encode(&self, location: Location, color: ColorID) -> Var {
        assert!(location.0 < self.rows && location.1 < self.cols, "{location} is outside a {}x{} grid", self.rows, self.cols);
        assert!(color < self.colors, "color {color} is outside 0..{}", self.colors);

        Var::from_dimacs((1 + location.0 * self.cols + location.1 + color * self.cells()) as isize)
    }

    /// Inverse of [`Self::encode`].
    ///
    /// # Panics
    /// If `var` was not produced by this indexer.
    pub fn decode(&self, var: Var) -> (Location, ColorID) {
        assert!(self.contains(var), "variable {} is outside 1..={}", var.to_dimacs(), self.var_count());

        let offset = var.to_dimacs() as usize - 1;
        let color = offset / self.cells();
        let within = offset % self.cells();

        (Location(within / self.cols, within % self.cols), color)
    }
}
