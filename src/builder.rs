use std::collections::BTreeSet;
use std::ops::IndexMut;

use ndarray::{Array2, AssignElem};

use crate::cell::Cell;
use crate::color::Palette;
use crate::error::FormatError;
use crate::grid::Grid;
use crate::location::{Dimension, Location};

/// Characters with a fixed meaning in the text format, which therefore cannot name a color.
pub(crate) const EMPTY_DISPLAY: char = '*';
pub(crate) const BRIDGE_DISPLAY: char = '+';

/// A builder for rectangular [`Grid`]s.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// The first problem encountered is remembered and every later call does nothing; [`Self::build`] reports it.
#[derive(Clone)]
pub struct GridBuilder {
    // rows, columns
    dims: (Dimension, Dimension),
    cells: Array2<Cell>,
    palette: Palette,
    endpoints: Vec<(Location, Location)>,
    bridges: BTreeSet<Location>,
    declared_colors: Option<usize>,
    invalid_reasons: Vec<FormatError>,
}

impl GridBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(rows, columns)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            cells: Array2::from_shape_simple_fn((dims.0.get(), dims.1.get()), Cell::default),
            palette: Default::default(),
            endpoints: Default::default(),
            bridges: Default::default(),
            declared_colors: None,
            invalid_reasons: Default::default(),
        }
    }

    fn check_placement(&mut self, location: Location) -> bool {
        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            self.invalid_reasons.push(FormatError::OutOfBounds {
                location,
                rows: self.dims.0.get(),
                cols: self.dims.1.get(),
            });
            return false;
        }

        if self.cells[location.as_index()] != Cell::Empty {
            self.invalid_reasons.push(FormatError::Overlapping(location));
            return false;
        }

        true
    }

    /// Add the two endpoints of a new color, displayed as `display`. The order in which `locations` are specified does not matter.
    ///
    /// Invalidates the builder if either location is out of bounds or occupied, or if `display` is reserved or already in use.
    /// Solved grids print endpoints upper-cased and paths lower-cased, so `display` also may not differ from an existing color only in case.
    /// If the builder is already invalid, this function does nothing.
    pub fn add_termini(&mut self, display: char, locations: (Location, Location)) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if display == EMPTY_DISPLAY || display == BRIDGE_DISPLAY || display.is_whitespace() {
            self.invalid_reasons.push(FormatError::ReservedDisplay(display));
            return self;
        }

        if self.palette.color_of(display).is_some() {
            self.invalid_reasons.push(FormatError::DuplicateColor(display));
            return self;
        }

        let folded = [display.to_ascii_lowercase(), display.to_ascii_uppercase()];
        if let Some(existing) = folded.into_iter().find_map(|d| self.palette.display_of(self.palette.color_of(d)?)) {
            self.invalid_reasons.push(FormatError::CaseCollision { display, existing });
            return self;
        }

        for location in [locations.0, locations.1] {
            if !self.check_placement(location) {
                return self;
            }
            // a color's first terminus must block its second
            self.cells.index_mut(location.as_index()).assign_elem(Cell::Terminus { color: self.palette.len() });
        }

        self.palette.push(display);
        self.endpoints.push(locations);

        self
    }

    /// Remove the most recently added pair of termini.
    ///
    /// If the builder is invalid or no termini are present, this function does nothing.
    pub fn pop_termini(&mut self) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if self.palette.pop().is_some() {
            if let Some((a, b)) = self.endpoints.pop() {
                for location in [a, b] {
                    self.cells.index_mut(location.as_index()).assign_elem(Cell::Empty);
                }
            }
        }

        self
    }

    /// Add a bridge at the specified `location`, a cell crossed by exactly two paths.
    ///
    /// Invalidates the builder if `location` is out of bounds or occupied.
    /// If the builder is already invalid, this function does nothing.
    pub fn add_bridge(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if self.check_placement(location) {
            self.cells.index_mut(location.as_index()).assign_elem(Cell::Bridge);
            self.bridges.insert(location);
        }

        self
    }

    /// Require the finished grid to have exactly `count` colors.
    pub fn declare_colors(&mut self, count: usize) -> &mut Self {
        self.declared_colors = Some(count);
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<FormatError>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<FormatError>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Grid`], or report the first reason it cannot be.
    pub fn build(&self) -> Result<Grid, FormatError> {
        if let Some(reason) = self.invalid_reasons.first() {
            return Err(reason.clone());
        }

        if self.palette.is_empty() {
            return Err(FormatError::NoColors);
        }

        if let Some(declared) = self.declared_colors {
            if declared != self.palette.len() {
                return Err(FormatError::ColorCountMismatch { declared, found: self.palette.len() });
            }
        }

        Ok(Grid {
            cells: self.cells.clone(),
            palette: self.palette.clone(),
            endpoints: self.endpoints.clone(),
            bridges: self.bridges.clone(),
        })
    }
}
