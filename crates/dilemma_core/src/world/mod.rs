//! The population grid.
//!
//! A [`World`] owns one automaton per torus cell, stored row-major, and the
//! single [`RandomStream`] every phase draws from. A step is a fixed sequence
//! of full passes over the grid:
//!
//! 1. reset scores and statuses, age every cell
//! 2. play matches between neighbours ([`play`])
//! 3. mark local minima and old cells for death ([`selection`])
//! 4. refill dead cells from surviving neighbours ([`spawn`])
//!
//! Passes are sequential and mutate statuses in place, so the order in which
//! cells are visited is observable and fixed.

use crate::automaton::AutomatonLogic;
use crate::config::Settings;
use crate::grid::Torus;
use crate::rng::RandomStream;
use dilemma_data::Automaton;
use std::collections::BTreeSet;

pub mod play;
pub mod selection;
pub mod spawn;

/// What happened to the population during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// Cells marked dead as the weakest of their neighbourhood.
    pub culled: usize,
    /// Strong cells marked dead because their lifetime ran out.
    pub retired: usize,
    /// Dead cells replaced by offspring. Always `culled + retired`, since a
    /// dead cell's kill area is shielded and no later decision reaches it.
    pub reborn: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    settings: Settings,
    torus: Torus,
    step: u64,
    cells: Vec<Automaton>,
    rng: RandomStream,
}

impl World {
    /// Builds a random population seeded from `settings.seed`.
    ///
    /// Cells are initialized row-major from a single stream.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let torus = Torus::new(
            settings.board_size_x as usize,
            settings.board_size_y as usize,
        );
        let mut rng = RandomStream::seed(settings.seed);
        let cells = (0..torus.len())
            .map(|_| Automaton::new_random(&settings, &mut rng))
            .collect();
        tracing::debug!(
            width = torus.width(),
            height = torus.height(),
            state_n = settings.state_n,
            seed = settings.seed,
            "World initialized"
        );
        Ok(Self {
            settings,
            torus,
            step: 0,
            cells,
            rng,
        })
    }

    /// Reassembles a world from previously captured parts.
    pub fn from_parts(
        settings: Settings,
        step: u64,
        cells: Vec<Automaton>,
        rng: RandomStream,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        anyhow::ensure!(
            cells.len() == settings.cell_count(),
            "Expected {} automata, got {}",
            settings.cell_count(),
            cells.len()
        );
        for (i, cell) in cells.iter().enumerate() {
            anyhow::ensure!(
                cell.state_n() == usize::from(settings.state_n),
                "Automaton {i} has {} states, expected {}",
                cell.state_n(),
                settings.state_n
            );
            anyhow::ensure!(cell.is_well_formed(), "Automaton {i} is malformed");
        }
        let torus = Torus::new(
            settings.board_size_x as usize,
            settings.board_size_y as usize,
        );
        Ok(Self {
            settings,
            torus,
            step,
            cells,
            rng,
        })
    }

    /// Replaces the run options of a running world.
    ///
    /// Only fields outside [`Settings::fingerprint`] may change: step limit,
    /// output paths, reporting cadences and the display flags. Anything that
    /// would alter the trajectory is rejected.
    pub fn reconfigure(&mut self, settings: Settings) -> anyhow::Result<()> {
        settings.validate()?;
        anyhow::ensure!(
            settings.fingerprint() == self.settings.fingerprint(),
            "Only run options can change when resuming; simulation parameters differ"
        );
        self.settings = settings;
        Ok(())
    }

    /// Clears scores and statuses and ages every automaton.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    /// Runs one full generation without advancing the step counter.
    pub fn step(&mut self) -> StepOutcome {
        self.reset();
        self.play();
        let culled = self.select_weak();
        let retired = self.retire_old();
        let reborn = self.spawn();
        let outcome = StepOutcome {
            culled,
            retired,
            reborn,
        };
        tracing::trace!(step = self.step, ?outcome, "Generation done");
        outcome
    }

    /// Increments the step counter and reports whether the run continues.
    pub fn advance(&mut self) -> bool {
        self.step += 1;
        self.settings.step_n == 0 || self.step < self.settings.step_n
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.torus.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.torus.height()
    }

    #[must_use]
    pub fn torus(&self) -> Torus {
        self.torus
    }

    /// The automaton at `(x, y)`.
    ///
    /// # Panics
    /// If the coordinates are off the board.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> &Automaton {
        assert!(x < self.width() && y < self.height(), "cell ({x}, {y}) is off the board");
        &self.cells[self.torus.index(x, y)]
    }

    /// All automata in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Automaton] {
        &self.cells
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Completed steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn rng(&self) -> &RandomStream {
        &self.rng
    }

    /// Mean score over the whole population.
    #[must_use]
    pub fn average_score(&self) -> f64 {
        let sum: i64 = self.cells.iter().map(|c| c.score).sum();
        sum as f64 / self.cells.len() as f64
    }

    /// Reachable state ids of the automaton at `(x, y)`.
    #[must_use]
    pub fn reachable_states(&self, x: usize, y: usize) -> BTreeSet<usize> {
        self.cell(x, y).reachable_states(&self.settings)
    }
}
