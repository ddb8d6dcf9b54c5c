//! Simulation settings.
//!
//! [`Settings`] maps onto an optional `settings.toml` file and is the single
//! value the engine is configured with. Every numeric field has a range in
//! [`limits`]; the same bounds are enforced when validating user input and
//! when reading a checkpoint.
//!
//! ## Example `settings.toml`
//!
//! ```toml
//! board_size_x = 53
//! board_size_y = 69
//! state_n = 12
//! turn_n = 50
//! mistake_rate = 0.01
//! seed = 42
//!
//! [flags]
//! mistake_aware = true
//! ```

use crate::rng::{from_fixed, to_fixed, FIXED_ONE};
use serde::{Deserialize, Serialize};

/// Inclusive bounds for every settings field.
pub mod limits {
    pub const MAX_BOARD_SIZE: u32 = 4096;
    pub const MAX_AREA_SIZE: u32 = 2048;
    pub const MAX_STATE_N: u16 = 10_000;
    pub const MAX_STEP_N: u64 = 200_000_000;
    pub const MAX_TURN_N: u32 = 1_000_000;
    pub const MAX_LIFETIME: u16 = 10_000;
    pub const MAX_REPORT_RATE: u32 = 1_000_000;
    pub const MAX_STRING_LEN: usize = 4096;
}

use limits::*;

/// Feature switches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Flags {
    /// Suppress progress logging.
    pub quiet: bool,
    /// Colour renderers by lineage instead of score.
    pub species_map: bool,
    /// Keep unreachable states in graph exports.
    pub show_unreachable: bool,
    /// Only pure cooperate/defect states.
    pub deterministic: bool,
    /// Transitions can observe the automaton's own mistakes.
    pub mistake_aware: bool,
    /// Transitions can observe the automaton's own intended decision.
    pub decision_aware: bool,
}

impl Flags {
    pub const QUIET: u32 = 0x1;
    pub const SPECIES_MAP: u32 = 0x2;
    pub const SHOW_UNREACHABLE: u32 = 0x4;
    pub const DETERMINISTIC: u32 = 0x10;
    pub const MISTAKE_AWARE: u32 = 0x20;
    pub const DECISION_AWARE: u32 = 0x40;

    const ALL: u32 = Self::QUIET
        | Self::SPECIES_MAP
        | Self::SHOW_UNREACHABLE
        | Self::DETERMINISTIC
        | Self::MISTAKE_AWARE
        | Self::DECISION_AWARE;

    /// Packs the flags into their checkpoint bit layout.
    #[must_use]
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        for (on, bit) in [
            (self.quiet, Self::QUIET),
            (self.species_map, Self::SPECIES_MAP),
            (self.show_unreachable, Self::SHOW_UNREACHABLE),
            (self.deterministic, Self::DETERMINISTIC),
            (self.mistake_aware, Self::MISTAKE_AWARE),
            (self.decision_aware, Self::DECISION_AWARE),
        ] {
            if on {
                bits |= bit;
            }
        }
        bits
    }

    /// Unpacks a bit set; `None` if unknown bits are present.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL != 0 {
            return None;
        }
        Some(Self {
            quiet: bits & Self::QUIET != 0,
            species_map: bits & Self::SPECIES_MAP != 0,
            show_unreachable: bits & Self::SHOW_UNREACHABLE != 0,
            deterministic: bits & Self::DETERMINISTIC != 0,
            mistake_aware: bits & Self::MISTAKE_AWARE != 0,
            decision_aware: bits & Self::DECISION_AWARE != 0,
        })
    }
}

/// Fixed-point rates are written as plain fractions in TOML.
mod fixed_rate {
    use super::{from_fixed, to_fixed};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(from_fixed(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let x = f64::deserialize(deserializer)?;
        if !(0.0..=1.0).contains(&x) {
            return Err(D::Error::custom(format!("rate {x} is outside [0, 1]")));
        }
        Ok(to_fixed(x))
    }
}

/// Everything that parameterises a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub board_size_x: u32,
    pub board_size_y: u32,
    /// States per automaton.
    pub state_n: u16,
    /// Steps to run; 0 runs until interrupted.
    pub step_n: u64,
    /// Turns per match.
    pub turn_n: u32,
    pub play_area: u32,
    pub kill_area: u32,
    pub cross_area: u32,
    /// Exclusive upper bound of a newborn's lifetime.
    pub lifetime: u16,
    pub stat_report_rate: u32,
    pub stat_flush_rate: u32,
    pub example_rate: u32,
    pub backup_rate: u32,
    pub flags: Flags,
    pub seed: u64,
    #[serde(with = "fixed_rate")]
    pub mistake_rate: u64,
    #[serde(with = "fixed_rate")]
    pub cross_rate: u64,
    #[serde(with = "fixed_rate")]
    pub state_mut_rate: u64,
    #[serde(with = "fixed_rate")]
    pub action_mut_rate: u64,
    #[serde(with = "fixed_rate")]
    pub edge_mut_rate: u64,
    /// Stat output path; `-` is stdout.
    pub stat_file: Option<String>,
    /// Path prefix for example automaton graphs.
    pub example_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_size_x: 53,
            board_size_y: 69,
            state_n: 12,
            step_n: 3000,
            turn_n: 50,
            play_area: 3,
            kill_area: 2,
            cross_area: 4,
            lifetime: 100,
            stat_report_rate: 1,
            stat_flush_rate: 10,
            example_rate: 100,
            backup_rate: 1000,
            flags: Flags::default(),
            seed: 0,
            mistake_rate: to_fixed(0.01),
            cross_rate: to_fixed(0.5),
            state_mut_rate: to_fixed(0.001),
            action_mut_rate: to_fixed(0.01),
            edge_mut_rate: to_fixed(0.005),
            stat_file: None,
            example_name: None,
        }
    }
}

impl Settings {
    /// Number of grid cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.board_size_x as usize * self.board_size_y as usize
    }

    /// Validates all parameters.
    ///
    /// Returns `Ok(())` if every field is within [`limits`], or `Err` with a
    /// description of the first violation.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_BOARD_SIZE).contains(&self.board_size_x),
            "Board width must be in [1, {MAX_BOARD_SIZE}]"
        );
        anyhow::ensure!(
            (1..=MAX_BOARD_SIZE).contains(&self.board_size_y),
            "Board height must be in [1, {MAX_BOARD_SIZE}]"
        );
        anyhow::ensure!(
            self.cell_count() > 1,
            "Board must contain at least two cells"
        );
        anyhow::ensure!(
            (1..=MAX_STATE_N).contains(&self.state_n),
            "State count must be in [1, {MAX_STATE_N}]"
        );
        anyhow::ensure!(
            self.step_n <= MAX_STEP_N,
            "Step count too large (max {MAX_STEP_N})"
        );
        anyhow::ensure!(
            (1..=MAX_TURN_N).contains(&self.turn_n),
            "Turn count must be in [1, {MAX_TURN_N}]"
        );
        for (name, area) in [
            ("Play area", self.play_area),
            ("Kill area", self.kill_area),
            ("Cross area", self.cross_area),
        ] {
            anyhow::ensure!(
                (1..=MAX_AREA_SIZE).contains(&area),
                "{name} must be in [1, {MAX_AREA_SIZE}]"
            );
        }
        anyhow::ensure!(
            (1..=MAX_LIFETIME).contains(&self.lifetime),
            "Lifetime must be in [1, {MAX_LIFETIME}]"
        );
        for (name, rate) in [
            ("Stat report rate", self.stat_report_rate),
            ("Stat flush rate", self.stat_flush_rate),
            ("Example rate", self.example_rate),
            ("Backup rate", self.backup_rate),
        ] {
            anyhow::ensure!(
                (1..=MAX_REPORT_RATE).contains(&rate),
                "{name} must be in [1, {MAX_REPORT_RATE}]"
            );
        }
        for (name, rate) in [
            ("Mistake rate", self.mistake_rate),
            ("Cross rate", self.cross_rate),
            ("State mutation rate", self.state_mut_rate),
            ("Action mutation rate", self.action_mut_rate),
            ("Edge mutation rate", self.edge_mut_rate),
        ] {
            anyhow::ensure!(rate <= FIXED_ONE, "{name} must be in [0.0, 1.0]");
        }
        for (name, value) in [
            ("Stat file", &self.stat_file),
            ("Example name", &self.example_name),
        ] {
            if let Some(value) = value {
                anyhow::ensure!(!value.is_empty(), "{name} must not be empty");
                // Checkpoints store strings line by line, which cannot keep a `\r`.
                anyhow::ensure!(
                    !value.contains('\r'),
                    "{name} must not contain a carriage return"
                );
                anyhow::ensure!(
                    value.len() <= MAX_STRING_LEN,
                    "{name} too long (max {MAX_STRING_LEN} bytes)"
                );
            }
        }
        Ok(())
    }

    /// Loads and validates settings from TOML. Missing keys take defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings = toml::from_str::<Self>(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// SHA-256 over the fields that influence the simulation trajectory.
    ///
    /// Output paths and reporting cadences are excluded, so two runs with the
    /// same fingerprint evolve identically.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "{}x{}:{}:{}:{}:{}:{}:{}",
                self.board_size_x,
                self.board_size_y,
                self.state_n,
                self.turn_n,
                self.play_area,
                self.kill_area,
                self.cross_area,
                self.lifetime
            )
            .as_bytes(),
        );
        hasher.update(
            format!(
                "{}:{}:{}:{}:{}:{}",
                self.seed,
                self.mistake_rate,
                self.cross_rate,
                self.state_mut_rate,
                self.action_mut_rate,
                self.edge_mut_rate
            )
            .as_bytes(),
        );
        let behaviour = Flags {
            quiet: false,
            species_map: false,
            show_unreachable: false,
            ..self.flags
        };
        hasher.update(behaviour.bits().to_le_bytes());
        hex::encode(hasher.finalize())
    }
}
