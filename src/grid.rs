// Grid geometry and the obstacle bitboard
//
// A Grid is a square N x N board with one connectivity model. Every concern
// (agent movement, pathfinding, opponent placements, attack adjacency) asks the
// same Grid for neighbors so the connectivity can never be mixed.

use serde::Deserialize;

use crate::types::Cell;

/// Largest accepted board side
pub const MAX_GRID_SIZE: usize = 256;

const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const OCTILE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Which cells count as adjacent
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// 4-connected; distances are Manhattan
    #[default]
    Orthogonal,
    /// 8-connected; distances are Chebyshev
    Octile,
}

impl Connectivity {
    fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Orthogonal => &ORTHOGONAL_OFFSETS,
            Connectivity::Octile => &OCTILE_OFFSETS,
        }
    }
}

/// Immutable board geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i32,
    connectivity: Connectivity,
}

impl Grid {
    /// Creates a grid of side `size`
    ///
    /// # Returns
    /// * `Result<Grid, String>` - Error if `size` is 0 or above `MAX_GRID_SIZE`
    pub fn new(size: usize, connectivity: Connectivity) -> Result<Self, String> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(format!(
                "Grid size must be between 1 and {}, got {}",
                MAX_GRID_SIZE, size
            ));
        }
        Ok(Grid {
            size: size as i32,
            connectivity,
        })
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn cell_count(&self) -> usize {
        (self.size * self.size) as usize
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.size && cell.col >= 0 && cell.col < self.size
    }

    /// True iff the cell lies on the outer ring
    pub fn is_boundary(&self, cell: Cell) -> bool {
        cell.row == 0 || cell.col == 0 || cell.row == self.size - 1 || cell.col == self.size - 1
    }

    /// Steps needed to reach the closest edge ignoring obstacles.
    /// Admissible for both connectivity models.
    pub fn boundary_distance(&self, cell: Cell) -> u32 {
        let last = self.size - 1;
        cell.row
            .min(last - cell.row)
            .min(cell.col)
            .min(last - cell.col)
            .max(0) as u32
    }

    /// Obstacle-free step distance between two cells
    pub fn distance(&self, a: Cell, b: Cell) -> u32 {
        let d_row = (a.row - b.row).unsigned_abs();
        let d_col = (a.col - b.col).unsigned_abs();
        match self.connectivity {
            Connectivity::Orthogonal => d_row + d_col,
            Connectivity::Octile => d_row.max(d_col),
        }
    }

    /// In-bounds neighbors of `cell`, in a fixed order
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.connectivity
            .offsets()
            .iter()
            .map(move |&(d_row, d_col)| cell.offset(d_row, d_col))
            .filter(move |&next| self.contains(next))
    }

    /// Neighbors the agent could step onto
    pub fn free_neighbors<'a>(
        &'a self,
        cell: Cell,
        obstacles: &'a ObstacleSet,
    ) -> impl Iterator<Item = Cell> + 'a {
        self.neighbors(cell).filter(move |&next| !obstacles.contains(next))
    }

    pub fn are_adjacent(&self, a: Cell, b: Cell) -> bool {
        a != b && self.distance(a, b) == 1
    }

    /// Row-major index; caller guarantees the cell is in bounds
    pub fn index(&self, cell: Cell) -> usize {
        (cell.row * self.size + cell.col) as usize
    }

    pub fn cell_at(&self, index: usize) -> Cell {
        let index = index as i32;
        Cell::new(index / self.size, index % self.size)
    }
}

/// Set of blocked cells stored as a bitboard.
///
/// Cloning copies a handful of words, which is what the search does for every
/// hypothetical placement or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleSet {
    grid: Grid,
    words: Vec<u64>,
    len: usize,
}

impl ObstacleSet {
    pub fn new(grid: Grid) -> Self {
        ObstacleSet {
            grid,
            words: vec![0; grid.cell_count().div_ceil(64)],
            len: 0,
        }
    }

    /// Builds a set from cells, rejecting any outside the grid
    pub fn from_cells<I>(grid: Grid, cells: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut set = ObstacleSet::new(grid);
        for cell in cells {
            if !grid.contains(cell) {
                return Err(format!(
                    "Obstacle {} is outside the {}x{} grid",
                    cell,
                    grid.size(),
                    grid.size()
                ));
            }
            set.insert(cell);
        }
        Ok(set)
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Out-of-bounds cells are never contained
    pub fn contains(&self, cell: Cell) -> bool {
        if !self.grid.contains(cell) {
            return false;
        }
        let idx = self.grid.index(cell);
        self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    /// Returns true if the cell was newly blocked
    pub fn insert(&mut self, cell: Cell) -> bool {
        if !self.grid.contains(cell) || self.contains(cell) {
            return false;
        }
        let idx = self.grid.index(cell);
        self.words[idx / 64] |= 1u64 << (idx % 64);
        self.len += 1;
        true
    }

    /// Returns true if the cell was blocked
    pub fn remove(&mut self, cell: Cell) -> bool {
        if !self.contains(cell) {
            return false;
        }
        let idx = self.grid.index(cell);
        self.words[idx / 64] &= !(1u64 << (idx % 64));
        self.len -= 1;
        true
    }

    /// Copy of this set with one more obstacle
    pub fn with(&self, cell: Cell) -> ObstacleSet {
        let mut copy = self.clone();
        copy.insert(cell);
        copy
    }

    /// Copy of this set with one obstacle removed
    pub fn without(&self, cell: Cell) -> ObstacleSet {
        let mut copy = self.clone();
        copy.remove(cell);
        copy
    }

    /// Blocked cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.grid.cell_count())
            .filter(move |&idx| self.words[idx / 64] & (1u64 << (idx % 64)) != 0)
            .map(move |idx| self.grid.cell_at(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid5() -> Grid {
        Grid::new(5, Connectivity::Orthogonal).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_size() {
        assert!(Grid::new(0, Connectivity::Orthogonal).is_err());
        assert!(Grid::new(MAX_GRID_SIZE + 1, Connectivity::Orthogonal).is_err());
        assert!(Grid::new(1, Connectivity::Orthogonal).is_ok());
    }

    #[test]
    fn test_boundary_detection() {
        let grid = grid5();
        assert!(grid.is_boundary(Cell::new(0, 2)));
        assert!(grid.is_boundary(Cell::new(2, 4)));
        assert!(grid.is_boundary(Cell::new(4, 4)));
        assert!(!grid.is_boundary(Cell::new(1, 1)));
        assert!(!grid.is_boundary(Cell::new(2, 2)));
    }

    #[test]
    fn test_boundary_distance() {
        let grid = grid5();
        assert_eq!(grid.boundary_distance(Cell::new(2, 2)), 2);
        assert_eq!(grid.boundary_distance(Cell::new(1, 3)), 1);
        assert_eq!(grid.boundary_distance(Cell::new(4, 0)), 0);
    }

    #[test]
    fn test_orthogonal_neighbors() {
        let grid = grid5();
        let centre: Vec<Cell> = grid.neighbors(Cell::new(2, 2)).collect();
        assert_eq!(centre.len(), 4);
        assert!(centre.contains(&Cell::new(1, 2)));
        assert!(centre.contains(&Cell::new(2, 3)));

        let corner: Vec<Cell> = grid.neighbors(Cell::new(0, 0)).collect();
        assert_eq!(corner, vec![Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_octile_neighbors_and_distance() {
        let grid = Grid::new(5, Connectivity::Octile).unwrap();
        assert_eq!(grid.neighbors(Cell::new(2, 2)).count(), 8);
        assert_eq!(grid.neighbors(Cell::new(0, 0)).count(), 3);
        assert_eq!(grid.distance(Cell::new(0, 0), Cell::new(3, 2)), 3);
        assert!(grid.are_adjacent(Cell::new(1, 1), Cell::new(2, 2)));
        assert!(!grid5().are_adjacent(Cell::new(1, 1), Cell::new(2, 2)));
    }

    #[test]
    fn test_obstacle_set_operations() {
        let grid = grid5();
        let mut set = ObstacleSet::new(grid);
        assert!(set.insert(Cell::new(1, 2)));
        assert!(!set.insert(Cell::new(1, 2)));
        assert!(!set.insert(Cell::new(7, 7)));
        assert_eq!(set.len(), 1);

        let branch = set.with(Cell::new(3, 3));
        assert_eq!(branch.len(), 2);
        assert_eq!(set.len(), 1, "copy-on-branch must not touch the original");

        let cleared = branch.without(Cell::new(1, 2));
        assert_eq!(cleared.iter().collect::<Vec<_>>(), vec![Cell::new(3, 3)]);
        assert!(set.remove(Cell::new(1, 2)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_cells_rejects_out_of_bounds() {
        let grid = grid5();
        assert!(ObstacleSet::from_cells(grid, vec![Cell::new(-1, 0)]).is_err());
        let set = ObstacleSet::from_cells(grid, vec![Cell::new(4, 4), Cell::new(0, 0)]).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Cell::new(0, 0), Cell::new(4, 4)]);
    }

    #[test]
    fn test_free_neighbors_skip_obstacles() {
        let grid = grid5();
        let set = ObstacleSet::from_cells(grid, vec![Cell::new(1, 2), Cell::new(2, 1)]).unwrap();
        let free: Vec<Cell> = grid.free_neighbors(Cell::new(2, 2), &set).collect();
        assert_eq!(free, vec![Cell::new(3, 2), Cell::new(2, 3)]);
    }
}
