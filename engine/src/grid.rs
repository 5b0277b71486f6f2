use std::ops::{Add, Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Integer grid offset. `x` is the column axis, `y` the row axis (growing
/// downward).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Vec2i = Vec2i { x: 0, y: 0 };
    pub const UP: Vec2i = Vec2i { x: 0, y: -1 };
    pub const DOWN: Vec2i = Vec2i { x: 0, y: 1 };
    pub const LEFT: Vec2i = Vec2i { x: -1, y: 0 };
    pub const RIGHT: Vec2i = Vec2i { x: 1, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Vec2i) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Fixed-size, row-major 2D array addressed as `(row, col)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Removes the given rows and inserts the same number of `fill` rows at
    /// the top, so everything above a removed row shifts down.
    pub fn remove_rows(&mut self, rows: &[usize], fill: T) -> usize {
        let keep: Vec<&[T]> = (0..self.height)
            .filter(|row| !rows.contains(row))
            .map(|row| self.row(row))
            .collect();
        let removed = self.height - keep.len();
        if removed == 0 {
            return 0;
        }

        let mut cells = vec![fill; removed * self.width];
        for row in keep {
            cells.extend_from_slice(row);
        }
        self.cells = cells;
        removed
    }
}

impl<T> Grid<T> {
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                cells.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// `Vec2i` lookup where `x` is the column and `y` the row.
    pub fn contains_point(&self, p: Vec2i) -> bool {
        self.contains(p.y, p.x)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.height && col < self.width {
            Some(&self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.height && col < self.width {
            Some(&mut self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn at(&self, p: Vec2i) -> Option<&T> {
        if self.contains_point(p) {
            self.get(p.y as usize, p.x as usize)
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        match self.get_mut(row, col) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        let ia = a.0 * self.width + a.1;
        let ib = b.0 * self.width + b.1;
        self.cells.swap(ia, ib);
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Iterates `(row, col, &cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / width, i % width, cell))
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.height && col < self.width, "grid index out of bounds");
        &self.cells[row * self.width + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.height && col < self.width, "grid index out of bounds");
        &mut self.cells[row * self.width + col]
    }
}
