/// Cell is the fundamental unit of a growth layer.
/// A position is either occupied by structure or left open.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Alive,
}

impl Cell {
    /// Check if the cell is occupied
    pub const fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    /// Check if the cell is open space
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Build a cell from a boolean occupancy flag
    pub const fn from_alive(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Empty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert_eq!(Cell::default(), Cell::Empty);
        assert!(Cell::default().is_empty());
    }

    #[test]
    fn test_from_alive() {
        assert_eq!(Cell::from_alive(true), Cell::Alive);
        assert_eq!(Cell::from_alive(false), Cell::Empty);
        assert!(Cell::Alive.is_alive());
        assert!(!Cell::Alive.is_empty());
    }
}
