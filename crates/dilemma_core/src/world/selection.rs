//! Kill selection.
//!
//! Both passes run row-major and change statuses as they go, so a cell
//! marked `Survived` by an earlier neighbour is never examined itself.

use super::World;
use dilemma_data::Status;

impl World {
    /// First pass: every `Alive` cell with a strictly weaker cell in its kill
    /// area becomes `Strong`. A local minimum protects its whole kill area by
    /// marking it `Survived` and then dies.
    ///
    /// Returns the number of cells marked dead.
    pub fn select_weak(&mut self) -> usize {
        let area = self.settings.kill_area;
        let mut culled = 0;
        for i in 0..self.cells.len() {
            if self.cells[i].status != Status::Alive {
                continue;
            }
            let (x, y) = self.torus.coords(i);
            let score = self.cells[i].score;
            let has_weaker = self
                .torus
                .neighborhood(x, y, area)
                .any(|j| self.cells[j].score < score);
            if has_weaker {
                self.cells[i].status = Status::Strong;
            } else {
                self.cull(i);
                culled += 1;
            }
        }
        tracing::trace!(culled, "Weak cells selected");
        culled
    }

    /// Second pass: `Strong` cells whose lifetime has run out die the same way.
    ///
    /// Returns the number of cells marked dead.
    pub fn retire_old(&mut self) -> usize {
        let mut retired = 0;
        for i in 0..self.cells.len() {
            let cell = &self.cells[i];
            if cell.status == Status::Strong && cell.lifetime == 0 {
                self.cull(i);
                retired += 1;
            }
        }
        tracing::trace!(retired, "Old cells retired");
        retired
    }

    fn cull(&mut self, i: usize) {
        let (x, y) = self.torus.coords(i);
        for j in self.torus.neighborhood(x, y, self.settings.kill_area) {
            self.cells[j].status = Status::Survived;
        }
        self.cells[i].status = Status::Dead;
    }
}
