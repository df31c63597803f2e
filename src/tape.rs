//! Fixed-length memory tape with a single data pointer.

/// One tape cell. Arithmetic wraps modulo 2^64.
pub type Cell = u64;

/// Tape length used when the caller does not configure one.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// A pointer move would have left `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pointer {ptr} cannot move outside a tape of {len} cells")]
pub struct OutOfBounds {
    pub ptr: usize,
    pub len: usize,
}

/// Zero-initialised cells plus the data pointer.
///
/// The length is fixed at construction; moving past either end is an error
/// rather than a reallocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Cell>,
    pointer: usize,
}

impl Tape {
    /// Allocate `len` zeroed cells with the pointer at 0.
    ///
    /// `len` must be positive; callers validate it (see [`crate::config`]).
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0; len],
            pointer: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    pub fn move_right(&mut self) -> Result<(), OutOfBounds> {
        if self.pointer + 1 >= self.cells.len() {
            return Err(self.out_of_bounds());
        }
        self.pointer += 1;
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), OutOfBounds> {
        if self.pointer == 0 {
            return Err(self.out_of_bounds());
        }
        self.pointer -= 1;
        Ok(())
    }

    pub fn read(&self) -> Cell {
        self.cells[self.pointer]
    }

    pub fn write(&mut self, value: Cell) {
        self.cells[self.pointer] = value;
    }

    /// Page-aligned view containing the pointer: `(base, cells[base..base + size])`.
    pub fn window(&self, size: usize) -> (usize, &[Cell]) {
        let size = size.max(1);
        let base = self.pointer - self.pointer % size;
        let end = (base + size).min(self.cells.len());
        (base, &self.cells[base..end])
    }

    fn out_of_bounds(&self) -> OutOfBounds {
        OutOfBounds {
            ptr: self.pointer,
            len: self.cells.len(),
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_LEN)
    }
}
