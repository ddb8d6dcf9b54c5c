//! Command-line options.
//!
//! Settings are layered: defaults, then the optional TOML file, then any
//! option given on the command line. When resuming, the checkpoint replaces
//! the first two layers and only run options may be overridden.

use anyhow::{Context, Result};
use clap::Parser;
use dilemma_core::config::Settings;
use dilemma_core::rng::to_fixed;
use dilemma_core::world::World;
use dilemma_io::CheckpointPersistence;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Spatial evolution of noisy Prisoner's Dilemma automata", long_about = None)]
pub struct Args {
    /// Settings file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// States per automaton
    #[arg(long)]
    pub states: Option<u16>,

    /// Steps to run (0 runs until interrupted)
    #[arg(long)]
    pub steps: Option<u64>,

    /// Turns per match
    #[arg(long)]
    pub turns: Option<u32>,

    #[arg(long)]
    pub play_area: Option<u32>,

    #[arg(long)]
    pub kill_area: Option<u32>,

    #[arg(long)]
    pub cross_area: Option<u32>,

    /// Exclusive upper bound of a newborn's lifetime
    #[arg(long)]
    pub lifetime: Option<u16>,

    #[arg(long, value_parser = parse_rate)]
    pub mistake_rate: Option<f64>,

    #[arg(long, value_parser = parse_rate)]
    pub cross_rate: Option<f64>,

    #[arg(long, value_parser = parse_rate)]
    pub state_mut_rate: Option<f64>,

    #[arg(long, value_parser = parse_rate)]
    pub action_mut_rate: Option<f64>,

    #[arg(long, value_parser = parse_rate)]
    pub edge_mut_rate: Option<f64>,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long)]
    pub species_map: bool,

    /// Keep unreachable states in example graphs
    #[arg(long)]
    pub show_unreachable: bool,

    /// Only pure cooperate/defect states
    #[arg(long)]
    pub deterministic: bool,

    /// Let transitions see the automaton's own mistakes
    #[arg(long)]
    pub mistake_aware: bool,

    /// Let transitions see the automaton's own intended move
    #[arg(long)]
    pub decision_aware: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Stat output file; `-` is stdout
    #[arg(long, value_name = "FILE")]
    pub stat_file: Option<String>,

    #[arg(long)]
    pub stat_report_rate: Option<u32>,

    #[arg(long)]
    pub stat_flush_rate: Option<u32>,

    /// Path prefix for example automaton graphs
    #[arg(long, value_name = "PREFIX")]
    pub example_name: Option<String>,

    #[arg(long)]
    pub example_rate: Option<u32>,

    /// Checkpoint file for backups, interrupts and --resume
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,

    #[arg(long)]
    pub backup_rate: Option<u32>,

    /// Continue from the checkpoint instead of starting a new run
    #[arg(long, requires = "checkpoint")]
    pub resume: bool,
}

impl Args {
    /// Defaults, overlaid by the settings file if one was given.
    pub fn base_settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Settings::from_toml(&content)
                    .with_context(|| format!("Invalid settings in {}", path.display()))
            }
            None => Ok(Settings::default()),
        }
    }

    /// Settings for a fresh run.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = self.base_settings()?;
        self.apply(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    /// Overlays every option that was given.
    pub fn apply(&self, s: &mut Settings) {
        if let Some((x, y)) = self.size {
            s.board_size_x = x;
            s.board_size_y = y;
        }
        set(&mut s.state_n, self.states);
        set(&mut s.step_n, self.steps);
        set(&mut s.turn_n, self.turns);
        set(&mut s.play_area, self.play_area);
        set(&mut s.kill_area, self.kill_area);
        set(&mut s.cross_area, self.cross_area);
        set(&mut s.lifetime, self.lifetime);
        set(&mut s.mistake_rate, self.mistake_rate.map(to_fixed));
        set(&mut s.cross_rate, self.cross_rate.map(to_fixed));
        set(&mut s.state_mut_rate, self.state_mut_rate.map(to_fixed));
        set(&mut s.action_mut_rate, self.action_mut_rate.map(to_fixed));
        set(&mut s.edge_mut_rate, self.edge_mut_rate.map(to_fixed));
        set(&mut s.seed, self.seed);
        set(&mut s.stat_report_rate, self.stat_report_rate);
        set(&mut s.stat_flush_rate, self.stat_flush_rate);
        set(&mut s.example_rate, self.example_rate);
        set(&mut s.backup_rate, self.backup_rate);
        if self.stat_file.is_some() {
            s.stat_file.clone_from(&self.stat_file);
        }
        if self.example_name.is_some() {
            s.example_name.clone_from(&self.example_name);
        }
        s.flags.quiet |= self.quiet;
        s.flags.species_map |= self.species_map;
        s.flags.show_unreachable |= self.show_unreachable;
        s.flags.deterministic |= self.deterministic;
        s.flags.mistake_aware |= self.mistake_aware;
        s.flags.decision_aware |= self.decision_aware;
    }

    /// A new world, or the checkpointed one with run options applied.
    pub fn build_world(&self) -> Result<World> {
        match (&self.checkpoint, self.resume) {
            (Some(path), true) => {
                let mut world = World::load(path)
                    .with_context(|| format!("Failed to resume from {}", path.display()))?;
                let mut settings = world.settings().clone();
                self.apply(&mut settings);
                world.reconfigure(settings)?;
                Ok(world)
            }
            _ => World::new(self.settings()?),
        }
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("`{s}` is not of the form WIDTHxHEIGHT"))?;
    let w = w
        .trim()
        .parse()
        .map_err(|_| format!("bad width `{w}`"))?;
    let h = h
        .trim()
        .parse()
        .map_err(|_| format!("bad height `{h}`"))?;
    Ok((w, h))
}

/// Parses a probability in `[0, 1]`.
pub fn parse_rate(s: &str) -> Result<f64, String> {
    let x: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=1.0).contains(&x) {
        Ok(x)
    } else {
        Err(format!("{x} is outside [0, 1]"))
    }
}
