use std::collections::HashSet;

use thiserror::Error;

/// Error raised when a grid cannot be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
}

/// State of a single grid position.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Dead = 0,
    Alive = 1,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }
}

/// Fixed-size Game of Life board with sparse active-cell tracking.
///
/// Cells are stored densely for O(1) random access, but a simulation step
/// never scans the whole board: the indices of live cells are mirrored in
/// an active set, and each step visits only that set plus its neighborhood.
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Live-cell indices. Invariant: `active` contains `i` iff
    /// `cells[i] == Cell::Alive`.
    active: HashSet<usize>,
    running: bool,
    generation: u64,
}

impl Grid {
    /// Create an all-dead, stopped grid. Dimensions are fixed for the
    /// lifetime of the grid.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; width * height],
            active: HashSet::new(),
            running: false,
            generation: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Linear index of the cell at `(x, y)`.
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.active.len()
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Completed simulation steps since creation or the last reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set a cell, keeping the active set in sync. Idempotent: setting a
    /// cell to its current value leaves the active set unchanged.
    ///
    /// Panics if `index` is out of range; callers (the coordinate mapper
    /// for on-screen clicks) are responsible for providing valid indices.
    pub fn set_cell(&mut self, index: usize, value: Cell) {
        assert!(index < self.cells.len(), "cell index {index} out of range");
        self.cells[index] = value;
        match value {
            Cell::Alive => {
                self.active.insert(index);
            }
            Cell::Dead => {
                self.active.remove(&index);
            }
        }
    }

    /// Flip a single cell between dead and alive.
    pub fn toggle_cell(&mut self, index: usize) {
        let value = if self.cells[index].is_alive() {
            Cell::Dead
        } else {
            Cell::Alive
        };
        self.set_cell(index, value);
    }

    /// Flip the run flag. No other effect.
    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    /// Replace the board with a fresh all-dead grid: active set emptied,
    /// simulation stopped, generation counter zeroed.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Dead);
        self.active.clear();
        self.running = false;
        self.generation = 0;
    }

    /// Advance one generation (B3/S23). No-op unless running.
    ///
    /// Only live cells and their dead neighbors are evaluated. The rule is
    /// applied against the current generation as a whole: deaths and births
    /// are collected first and written back only after every cell has been
    /// judged, so no update observes another update from the same step.
    pub fn simulate(&mut self) {
        if !self.running {
            return;
        }

        let mut to_die = Vec::new();
        let mut to_live = Vec::new();

        for &index in &self.active {
            let live = self.live_neighbor_count(index);
            if !(2..=3).contains(&live) {
                to_die.push(index);
            }
            for n in neighbors(index, self.width, self.height) {
                // A dead cell is revisited once per live neighbor; the
                // duplicate birth marks collapse in set_cell.
                if !self.cells[n].is_alive() && self.live_neighbor_count(n) == 3 {
                    to_live.push(n);
                }
            }
        }

        // The two lists are disjoint: to_die holds currently-live cells,
        // to_live currently-dead ones.
        for index in to_die {
            self.set_cell(index, Cell::Dead);
        }
        for index in to_live {
            self.set_cell(index, Cell::Alive);
        }

        self.generation += 1;
    }

    fn live_neighbor_count(&self, index: usize) -> usize {
        neighbors(index, self.width, self.height)
            .filter(|&n| self.cells[n].is_alive())
            .count()
    }
}

/// In-bounds Moore neighborhood of the cell at `index`.
///
/// Yields the up-to-8 orthogonally and diagonally adjacent indices, never
/// `index` itself. Edges are hard boundaries: out-of-grid positions are
/// skipped, not wrapped.
pub fn neighbors(index: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let x = (index % width) as isize;
    let y = (index / width) as isize;
    let (w, h) = (width as isize, height as isize);
    (-1..=1)
        .flat_map(move |dy| (-1..=1).map(move |dx| (x + dx, y + dy)))
        .filter(move |&(nx, ny)| (nx, ny) != (x, y) && nx >= 0 && ny >= 0 && nx < w && ny < h)
        .map(move |(nx, ny)| (ny * w + nx) as usize)
}
