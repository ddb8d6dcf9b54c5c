//! Toroidal grid geometry.
//!
//! Cells are stored row-major (`index = y * width + x`). Neighbourhoods are
//! Chebyshev squares that wrap on both axes and are always visited in the same
//! order: `dy` from `-radius` to `radius` in the outer loop, `dx` likewise in
//! the inner loop. On a board narrower than the square a cell can appear more
//! than once; callers rely on this.

/// Dimensions of a wrapping 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Torus {
    width: usize,
    height: usize,
}

impl Torus {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "torus dimensions must be positive");
        Self { width, height }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[must_use]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Index of `(x + dx, y + dy)` with wraparound.
    #[must_use]
    pub fn offset(&self, x: usize, y: usize, dx: i64, dy: i64) -> usize {
        let x2 = (x as i64 + dx).rem_euclid(self.width as i64) as usize;
        let y2 = (y as i64 + dy).rem_euclid(self.height as i64) as usize;
        self.index(x2, y2)
    }

    /// All cells within Chebyshev distance `radius` of `(x, y)`, including
    /// the centre, in scan order.
    #[must_use]
    pub fn neighborhood(&self, x: usize, y: usize, radius: u32) -> Neighborhood {
        let r = i64::from(radius);
        Neighborhood {
            torus: *self,
            x,
            y,
            radius: r,
            dx: -r,
            dy: -r,
        }
    }
}

/// Iterator over a wrapped Chebyshev square.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    torus: Torus,
    x: usize,
    y: usize,
    radius: i64,
    dx: i64,
    dy: i64,
}

impl Iterator for Neighborhood {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.dy > self.radius {
            return None;
        }
        let index = self.torus.offset(self.x, self.y, self.dx, self.dy);
        self.dx += 1;
        if self.dx > self.radius {
            self.dx = -self.radius;
            self.dy += 1;
        }
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let side = (2 * self.radius + 1) as usize;
        let done = ((self.dy + self.radius) * (2 * self.radius + 1) + (self.dx + self.radius)) as usize;
        let left = (side * side).saturating_sub(done);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Neighborhood {}
