use super::World;
use crate::automaton::play_match;

impl World {
    /// Every cell plays one match against each other cell in its play area.
    ///
    /// Both sides of a match collect their payoff, so every neighbouring pair
    /// meets twice per step. On a small torus the same neighbour can be hit by
    /// several offsets and is then played once per offset.
    pub fn play(&mut self) {
        let area = self.settings.play_area;
        for i in 0..self.cells.len() {
            let (x, y) = self.torus.coords(i);
            for j in self.torus.neighborhood(x, y, area) {
                if i == j {
                    continue;
                }
                let (gain_i, gain_j) =
                    play_match(&self.cells[i], &self.cells[j], &self.settings, &mut self.rng);
                self.cells[i].score += gain_i;
                self.cells[j].score += gain_j;
            }
        }
    }
}
