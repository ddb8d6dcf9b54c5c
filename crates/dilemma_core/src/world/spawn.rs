use super::World;
use crate::automaton::AutomatonLogic;
use dilemma_data::Status;

impl World {
    /// Replaces every `Dead` cell, row-major, with offspring of two
    /// `Survived` cells from its cross area.
    ///
    /// The child reuses the dead cell's storage. Returns the number of
    /// cells reborn.
    pub fn spawn(&mut self) -> usize {
        let mut reborn = 0;
        for i in 0..self.cells.len() {
            if self.cells[i].status != Status::Dead {
                continue;
            }
            let parent1 = self.pick_parent(i);
            let parent2 = self.pick_parent(i);

            let mut child = std::mem::take(&mut self.cells[i]);
            child.cross_from(
                &self.cells[parent1],
                &self.cells[parent2],
                &self.settings,
                &mut self.rng,
            );
            self.cells[i] = child;
            reborn += 1;
        }
        tracing::trace!(reborn, "Dead cells respawned");
        reborn
    }

    /// Draws uniform offsets in the cross area until one lands on a
    /// `Survived` cell.
    ///
    /// Terminates because a dead cell's kill area, which contains its
    /// immediate neighbours, was marked `Survived` when it died. Neither
    /// parent can be the dead cell itself.
    fn pick_parent(&mut self, i: usize) -> usize {
        let (x, y) = self.torus.coords(i);
        let area = self.settings.cross_area;
        loop {
            let dx = self.rng.offset(area);
            let dy = self.rng.offset(area);
            let j = self.torus.offset(x, y, dx, dy);
            if self.cells[j].status == Status::Survived {
                return j;
            }
        }
    }
}
