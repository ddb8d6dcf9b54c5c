use dilemma_core::config::Settings;
use dilemma_core::world::World;
use dilemma_data::{Automaton, State};

type CellMod = Box<dyn FnOnce(&mut [Automaton])>;

#[allow(dead_code)]
pub struct WorldBuilder {
    settings: Settings,
    cell_mods: Vec<CellMod>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// A small board with short matches and unit areas.
    pub fn new() -> Self {
        Self {
            settings: Settings {
                board_size_x: 8,
                board_size_y: 8,
                state_n: 4,
                turn_n: 10,
                play_area: 1,
                kill_area: 1,
                cross_area: 1,
                seed: 1,
                ..Settings::default()
            },
            cell_mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.settings.board_size_x = width;
        self.settings.board_size_y = height;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut Settings),
    {
        modifier(&mut self.settings);
        self
    }

    /// Every cell becomes a copy of `automaton`; `state_n` follows it.
    pub fn filled_with(mut self, automaton: Automaton) -> Self {
        self.settings.state_n = automaton.state_n() as u16;
        self.cell_mods.push(Box::new(move |cells| {
            for cell in cells.iter_mut() {
                *cell = automaton.clone();
            }
        }));
        self
    }

    /// Applies `f` to the row-major cell array after initialization.
    pub fn with_cells<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut [Automaton]) + 'static,
    {
        self.cell_mods.push(Box::new(f));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn build(self) -> World {
        let world = World::new(self.settings.clone()).expect("Failed to create world in test builder");
        if self.cell_mods.is_empty() {
            return world;
        }
        let mut cells = world.cells().to_vec();
        for modifier in self.cell_mods {
            modifier(&mut cells);
        }
        World::from_parts(self.settings, world.step_count(), cells, world.rng().clone())
            .expect("Builder produced an inconsistent world")
    }
}

/// One-state automaton that cooperates with probability `action / RESOLUTION`.
#[allow(dead_code)]
pub fn single_state(action: u16) -> Automaton {
    Automaton {
        states: vec![State {
            action,
            next: [0; 8],
        }],
        lifetime: 50,
        ..Default::default()
    }
}
