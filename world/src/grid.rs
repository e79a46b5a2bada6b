//! Static obstacle map rebuilt wholesale whenever a level loads.

use labyrinth_core::{CellCoord, Direction, LevelLayout};

/// Expansion order used when enumerating lattice neighbours.
///
/// Search tie-breaking depends on insertion order, so this order is part of
/// the observable behaviour of path planning.
pub const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::South,
    Direction::North,
    Direction::West,
    Direction::East,
];

/// Dense blocked-cell map for a single level.
///
/// Cells outside the configured bounds are reported as blocked, so searches
/// can never leak through gaps in a level's outer wall.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridWorld {
    columns: u32,
    rows: u32,
    blocked: Vec<bool>,
}

impl GridWorld {
    /// Creates a grid of the provided size with the listed cells blocked.
    ///
    /// Walls that fall outside the bounds are ignored.
    #[must_use]
    pub fn new<I>(columns: u32, rows: u32, walls: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let width = usize::try_from(columns).unwrap_or(0);
        let height = usize::try_from(rows).unwrap_or(0);
        let cell_count = width.checked_mul(height).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            blocked: vec![false; cell_count],
        };

        for wall in walls {
            if let Some(index) = grid.index(wall) {
                grid.blocked[index] = true;
            }
        }

        grid
    }

    /// Creates a grid of the provided size without any walls.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        Self::new(columns, rows, Vec::<CellCoord>::new())
    }

    /// Builds the obstacle map described by a parsed level.
    #[must_use]
    pub fn from_layout(layout: &LevelLayout) -> Self {
        Self::new(
            layout.columns(),
            layout.rows(),
            layout.walls().iter().copied(),
        )
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is a wall or lies outside the grid.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.blocked.get(index).copied())
            .unwrap_or(true)
    }

    /// Free cells orthogonally adjacent to `cell`, in [`NEIGHBOR_ORDER`].
    ///
    /// Blocked and out-of-bounds cells are filtered here; callers must not
    /// filter again.
    pub fn neighbors(&self, cell: CellCoord) -> Neighbors {
        let mut neighbors = Neighbors::default();
        for direction in NEIGHBOR_ORDER {
            if let Some(candidate) = cell.neighbor(direction) {
                if !self.is_blocked(candidate) {
                    neighbors.push(candidate);
                }
            }
        }
        neighbors
    }

    /// Number of cells that are not walls.
    #[must_use]
    pub fn free_cell_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| !**blocked).count()
    }

    /// Walls within the grid bounds in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| self.is_blocked(*cell))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Iterator over at most four neighbouring cells.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}
