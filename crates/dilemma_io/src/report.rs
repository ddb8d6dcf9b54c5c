//! Periodic outputs written while a run progresses.
//!
//! Both reporters are optional and keyed off the world's step counter. A
//! failure here never touches the world; the caller decides whether to log
//! and carry on.

use crate::error::{IoError, Result};
use crate::graph::to_dot;
use dilemma_core::config::Settings;
use dilemma_core::rng::RandomStream;
use dilemma_core::world::World;
use dilemma_data::Status;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Appends `"<step>\t<average score>"` lines to a stat sink.
pub struct StatsReporter<W: Write> {
    out: W,
    report_rate: u64,
    flush_rate: u64,
}

impl StatsReporter<Box<dyn Write + Send>> {
    /// Opens `settings.stat_file`; `-` means stdout. `None` when no stat
    /// file is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(path) = settings.stat_file.as_deref() else {
            return Ok(None);
        };
        let out: Box<dyn Write + Send> = if path == "-" {
            Box::new(std::io::stdout())
        } else {
            let file = File::create(path)
                .map_err(|e| IoError::from(e).with_context(format!("creating {path}")))?;
            Box::new(BufWriter::new(file))
        };
        Ok(Some(Self::new(
            out,
            settings.stat_report_rate,
            settings.stat_flush_rate,
        )))
    }
}

impl<W: Write> StatsReporter<W> {
    #[must_use]
    pub fn new(out: W, report_rate: u32, flush_rate: u32) -> Self {
        Self {
            out,
            report_rate: u64::from(report_rate.max(1)),
            flush_rate: u64::from(flush_rate.max(1)),
        }
    }

    /// Writes a line when the current step is a multiple of the report rate
    /// and flushes on multiples of the flush rate.
    pub fn observe(&mut self, world: &World) -> Result<()> {
        let step = world.step_count();
        if step % self.report_rate == 0 {
            writeln!(self.out, "{step}\t{:.6}", world.average_score())?;
        }
        if step % self.flush_rate == 0 {
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Mixed into the run seed so example picks never share the world stream.
const EXAMPLE_SEED_SALT: u64 = 0x5DEE_CE66_D1CE_4E5B;

/// Dumps a randomly chosen survivor as `<example_name><step>.gv`.
pub struct ExampleExporter {
    prefix: String,
    rate: u64,
    rng: RandomStream,
}

impl ExampleExporter {
    /// `None` when no example name is configured.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.example_name.as_ref().map(|prefix| Self {
            prefix: prefix.clone(),
            rate: u64::from(settings.example_rate.max(1)),
            rng: RandomStream::seed(settings.seed ^ EXAMPLE_SEED_SALT),
        })
    }

    /// Exports an example on multiples of the example rate. Returns the path
    /// written, or `None` when nothing was due or no cell survived this step.
    pub fn observe(&mut self, world: &World) -> Result<Option<PathBuf>> {
        let step = world.step_count();
        if step % self.rate != 0 {
            return Ok(None);
        }
        let Some(index) = self.pick_survivor(world) else {
            tracing::debug!(step, "No survivor to export");
            return Ok(None);
        };
        let path = PathBuf::from(format!("{}{step}.gv", self.prefix));
        std::fs::write(&path, to_dot(&world.cells()[index], world.settings()))
            .map_err(|e| IoError::from(e).with_context(format!("writing {}", path.display())))?;
        tracing::debug!(step, index, path = %path.display(), "Example automaton exported");
        Ok(Some(path))
    }

    fn pick_survivor(&mut self, world: &World) -> Option<usize> {
        let cells = world.cells();
        if !cells.iter().any(|c| c.status == Status::Survived) {
            return None;
        }
        loop {
            let i = self.rng.below(cells.len() as u64) as usize;
            if cells[i].status == Status::Survived {
                return Some(i);
            }
        }
    }
}
