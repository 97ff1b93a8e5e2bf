/// Colors are numbered `0..k` in the order they were added to a grid.
pub type ColorID = usize;

/// Characters used to display each color, indexed by [`ColorID`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Palette {
    displays: Vec<char>,
}

impl Palette {
    /// The number of colors.
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    /// Whether no colors are registered.
    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Register `display` as the next color and return its ID.
    pub(crate) fn push(&mut self, display: char) -> ColorID {
        self.displays.push(display);
        self.displays.len() - 1
    }

    /// Forget the most recently registered color.
    pub(crate) fn pop(&mut self) -> Option<char> {
        self.displays.pop()
    }

    /// The character `color` is displayed as.
    pub fn display_of(&self, color: ColorID) -> Option<char> {
        self.displays.get(color).copied()
    }

    /// The color displayed as `display`.
    pub fn color_of(&self, display: char) -> Option<ColorID> {
        self.displays.iter().position(|d| *d == display)
    }

    /// Every [`ColorID`] in use.
    pub fn colors(&self) -> std::ops::Range<ColorID> {
        0..self.displays.len()
    }
}
