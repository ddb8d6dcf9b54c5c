//! Versioned text checkpoints.
//!
//! A checkpoint is a sequence of lines. The first line is
//! `version=<VERSION>`; every `#TAG` line opens a block and every other line
//! is a `name=value` field. Fields are read strictly in the order they are
//! written, so the decoder needs no lookahead. Strings are stored as
//! `len|payload` with `-1|` for an absent value; a payload containing line
//! breaks continues on the following lines until `len` bytes are consumed.
//!
//! Scores and statuses are not stored: both are recomputed at the start of
//! every step.

use crate::error::{IoError, Result};
use dilemma_core::config::limits::*;
use dilemma_core::config::{Flags, Settings};
use dilemma_core::rng::{RandomStream, StreamState, FIXED_ONE};
use dilemma_core::world::World;
use dilemma_data::{Automaton, Rgb, State, RESOLUTION, TRANSITION_SLOTS};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Format tag on the first line of every checkpoint.
pub const VERSION: &str = "dilemma-checkpoint-1";

/// ChaCha keeps a 68-bit word counter.
const MAX_WORD_POS: u128 = (1 << 68) - 1;

/// Writes the complete world state.
pub fn write_world<W: Write>(out: &mut W, world: &World) -> Result<()> {
    writeln!(out, "version={VERSION}")?;
    write_settings(out, world.settings())?;
    writeln!(out, "#WORLD")?;
    writeln!(out, "step={}", world.step_count())?;
    for cell in world.cells() {
        write_automaton(out, cell)?;
    }
    write_random(out, &world.rng().snapshot())?;
    Ok(())
}

fn write_settings<W: Write>(out: &mut W, s: &Settings) -> Result<()> {
    writeln!(out, "#SETTINGS")?;
    let numbers: [(&str, u64); 20] = [
        ("board_size_x", u64::from(s.board_size_x)),
        ("board_size_y", u64::from(s.board_size_y)),
        ("state_n", u64::from(s.state_n)),
        ("step_n", s.step_n),
        ("turn_n", u64::from(s.turn_n)),
        ("play_area", u64::from(s.play_area)),
        ("kill_area", u64::from(s.kill_area)),
        ("cross_area", u64::from(s.cross_area)),
        ("lifetime", u64::from(s.lifetime)),
        ("stat_report_rate", u64::from(s.stat_report_rate)),
        ("stat_flush_rate", u64::from(s.stat_flush_rate)),
        ("example_rate", u64::from(s.example_rate)),
        ("backup_rate", u64::from(s.backup_rate)),
        ("flags", u64::from(s.flags.bits())),
        ("seed", s.seed),
        ("mistake_rate", s.mistake_rate),
        ("cross_rate", s.cross_rate),
        ("state_mut_rate", s.state_mut_rate),
        ("action_mut_rate", s.action_mut_rate),
        ("edge_mut_rate", s.edge_mut_rate),
    ];
    for (name, value) in numbers {
        writeln!(out, "{name}={value}")?;
    }
    write_string(out, "stat_file", s.stat_file.as_deref())?;
    write_string(out, "example_name", s.example_name.as_deref())?;
    Ok(())
}

fn write_string<W: Write>(out: &mut W, name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => writeln!(out, "{name}={}|{v}", v.len())?,
        None => writeln!(out, "{name}=-1|")?,
    }
    Ok(())
}

fn write_automaton<W: Write>(out: &mut W, automaton: &Automaton) -> Result<()> {
    writeln!(out, "#AUTOMATON")?;
    writeln!(out, "state_n={}", automaton.state_n())?;
    writeln!(out, "lifetime={}", automaton.lifetime)?;
    writeln!(out, "color={}", automaton.color.packed())?;
    for state in &automaton.states {
        writeln!(out, "#STATE")?;
        writeln!(out, "action={}", state.action)?;
        write!(out, "next=")?;
        for target in state.next {
            write!(out, " {target}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_random<W: Write>(out: &mut W, state: &StreamState) -> Result<()> {
    writeln!(out, "#RANDOM")?;
    writeln!(out, "key={}", hex::encode(state.key))?;
    writeln!(out, "stream={}", state.stream)?;
    writeln!(out, "word_pos={}", state.word_pos)?;
    Ok(())
}

/// Reads a checkpoint written by [`write_world`].
///
/// Every field is range-checked as it is read and the first problem is
/// reported with its line number. Content after the `#RANDOM` block is an
/// error.
pub fn read_world<R: BufRead>(input: R) -> Result<World> {
    let mut r = Reader {
        lines: input.lines(),
        line: 0,
    };

    let header = r.expect_line("version line")?;
    let found = header.strip_prefix("version=").unwrap_or(header.as_str());
    if found != VERSION {
        return Err(IoError::Version {
            expected: VERSION.to_string(),
            found: found.to_string(),
        });
    }

    let settings = read_settings(&mut r)?;

    r.tag("WORLD")?;
    let step = r.number("step", 0..=u64::MAX)?;

    let mut cells = Vec::with_capacity(settings.cell_count());
    for _ in 0..settings.cell_count() {
        cells.push(read_automaton(&mut r, &settings)?);
    }

    let rng = RandomStream::restore(&read_random(&mut r)?);

    if let Some(extra) = r.next_line()? {
        return Err(IoError::validation(format!(
            "line {}: unexpected content after #RANDOM block: `{extra}`",
            r.line
        )));
    }

    World::from_parts(settings, step, cells, rng).map_err(|e| IoError::validation(e.to_string()))
}

/// Parses a checkpoint held in memory.
pub fn decode(text: &str) -> Result<World> {
    read_world(text.as_bytes())
}

/// Renders a checkpoint into memory.
pub fn encode(world: &World) -> Result<String> {
    let mut buf = Vec::new();
    write_world(&mut buf, world)?;
    String::from_utf8(buf).map_err(|e| IoError::validation(e.to_string()))
}

fn read_settings<R: BufRead>(r: &mut Reader<R>) -> Result<Settings> {
    r.tag("SETTINGS")?;
    let board_size_x = r.number("board_size_x", 1..=MAX_BOARD_SIZE)?;
    let board_size_y = r.number("board_size_y", 1..=MAX_BOARD_SIZE)?;
    let state_n = r.number("state_n", 1..=MAX_STATE_N)?;
    let step_n = r.number("step_n", 0..=MAX_STEP_N)?;
    let turn_n = r.number("turn_n", 1..=MAX_TURN_N)?;
    let play_area = r.number("play_area", 1..=MAX_AREA_SIZE)?;
    let kill_area = r.number("kill_area", 1..=MAX_AREA_SIZE)?;
    let cross_area = r.number("cross_area", 1..=MAX_AREA_SIZE)?;
    let lifetime = r.number("lifetime", 1..=MAX_LIFETIME)?;
    let stat_report_rate = r.number("stat_report_rate", 1..=MAX_REPORT_RATE)?;
    let stat_flush_rate = r.number("stat_flush_rate", 1..=MAX_REPORT_RATE)?;
    let example_rate = r.number("example_rate", 1..=MAX_REPORT_RATE)?;
    let backup_rate = r.number("backup_rate", 1..=MAX_REPORT_RATE)?;
    let bits = r.number("flags", 0..=u32::MAX)?;
    let flags = Flags::from_bits(bits)
        .ok_or_else(|| IoError::field(r.line, "flags", format!("unknown bits in {bits:#x}")))?;
    let seed = r.number("seed", 0..=u64::MAX)?;
    let mistake_rate = r.number("mistake_rate", 0..=FIXED_ONE)?;
    let cross_rate = r.number("cross_rate", 0..=FIXED_ONE)?;
    let state_mut_rate = r.number("state_mut_rate", 0..=FIXED_ONE)?;
    let action_mut_rate = r.number("action_mut_rate", 0..=FIXED_ONE)?;
    let edge_mut_rate = r.number("edge_mut_rate", 0..=FIXED_ONE)?;
    let stat_file = r.string("stat_file")?;
    let example_name = r.string("example_name")?;

    let settings = Settings {
        board_size_x,
        board_size_y,
        state_n,
        step_n,
        turn_n,
        play_area,
        kill_area,
        cross_area,
        lifetime,
        stat_report_rate,
        stat_flush_rate,
        example_rate,
        backup_rate,
        flags,
        seed,
        mistake_rate,
        cross_rate,
        state_mut_rate,
        action_mut_rate,
        edge_mut_rate,
        stat_file,
        example_name,
    };
    settings
        .validate()
        .map_err(|e| IoError::validation(format!("settings: {e}")))?;
    Ok(settings)
}

fn read_automaton<R: BufRead>(r: &mut Reader<R>, settings: &Settings) -> Result<Automaton> {
    r.tag("AUTOMATON")?;
    let state_n: u16 = r.number("state_n", 1..=MAX_STATE_N)?;
    if state_n != settings.state_n {
        return Err(IoError::field(
            r.line,
            "state_n",
            format!("{state_n} does not match the settings ({})", settings.state_n),
        ));
    }
    let lifetime = r.number("lifetime", 0..=MAX_LIFETIME)?;
    let color = Rgb::from_packed(r.number("color", 0..=Rgb::MAX_PACKED)?);
    let states = (0..state_n)
        .map(|_| read_state(r, usize::from(state_n)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Automaton {
        lifetime,
        color,
        states,
        ..Default::default()
    })
}

fn read_state<R: BufRead>(r: &mut Reader<R>, state_n: usize) -> Result<State> {
    r.tag("STATE")?;
    let action = r.number("action", 0..=RESOLUTION)?;
    let raw = r.raw("next")?;
    let mut targets = raw.split_whitespace();
    let mut next = [0u16; TRANSITION_SLOTS];
    for slot in &mut next {
        let token = targets.next().ok_or_else(|| {
            IoError::field(r.line, "next", format!("expected {TRANSITION_SLOTS} targets"))
        })?;
        let target: u16 = token
            .parse()
            .map_err(|_| IoError::field(r.line, "next", format!("bad target `{token}`")))?;
        if usize::from(target) >= state_n {
            return Err(IoError::field(
                r.line,
                "next",
                format!("target {target} is outside [0, {})", state_n),
            ));
        }
        *slot = target;
    }
    if targets.next().is_some() {
        return Err(IoError::field(
            r.line,
            "next",
            format!("more than {TRANSITION_SLOTS} targets"),
        ));
    }
    Ok(State { action, next })
}

fn read_random<R: BufRead>(r: &mut Reader<R>) -> Result<StreamState> {
    r.tag("RANDOM")?;
    let key_hex = r.raw("key")?;
    let key: [u8; 32] = hex::decode(&key_hex)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| IoError::field(r.line, "key", "expected 64 hex digits"))?;
    let stream = r.number("stream", 0..=u64::MAX)?;
    let word_pos = r.number("word_pos", 0..=MAX_WORD_POS)?;
    Ok(StreamState {
        key,
        stream,
        word_pos,
    })
}

struct Reader<R> {
    lines: std::io::Lines<R>,
    /// 1-based number of the last line read.
    line: usize,
}

impl<R: BufRead> Reader<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| IoError::Truncated(what.to_string()))
    }

    fn tag(&mut self, tag: &str) -> Result<()> {
        let found = self.expect_line(&format!("#{tag}"))?;
        if found.strip_prefix('#') == Some(tag) {
            Ok(())
        } else {
            Err(IoError::Tag {
                line: self.line,
                expected: tag.to_string(),
                found,
            })
        }
    }

    fn raw(&mut self, name: &str) -> Result<String> {
        let line = self.expect_line(&format!("field `{name}`"))?;
        match line.split_once('=') {
            Some((key, value)) if key == name => Ok(value.to_string()),
            _ => Err(IoError::field(
                self.line,
                name,
                format!("expected `{name}=`, found `{line}`"),
            )),
        }
    }

    fn number<T>(&mut self, name: &str, range: RangeInclusive<T>) -> Result<T>
    where
        T: FromStr + PartialOrd + Display,
        T::Err: Display,
    {
        let raw = self.raw(name)?;
        let value: T = raw
            .parse()
            .map_err(|e| IoError::field(self.line, name, format!("cannot parse `{raw}`: {e}")))?;
        if !range.contains(&value) {
            return Err(IoError::field(
                self.line,
                name,
                format!("{value} is outside [{}, {}]", range.start(), range.end()),
            ));
        }
        Ok(value)
    }

    fn string(&mut self, name: &str) -> Result<Option<String>> {
        let raw = self.raw(name)?;
        let (len, payload) = raw
            .split_once('|')
            .ok_or_else(|| IoError::field(self.line, name, "missing `|` after the length"))?;
        if len == "-1" {
            if !payload.is_empty() {
                return Err(IoError::field(self.line, name, "absent string has a payload"));
            }
            return Ok(None);
        }
        let len: usize = len
            .parse()
            .map_err(|_| IoError::field(self.line, name, format!("bad length `{len}`")))?;
        if len > MAX_STRING_LEN {
            return Err(IoError::field(
                self.line,
                name,
                format!("length {len} exceeds {MAX_STRING_LEN}"),
            ));
        }
        let mut value = payload.to_string();
        while value.len() < len {
            let more = self.expect_line(&format!("rest of field `{name}`"))?;
            value.push('\n');
            value.push_str(&more);
        }
        if value.len() != len {
            return Err(IoError::field(
                self.line,
                name,
                format!("payload is {} bytes but length says {len}", value.len()),
            ));
        }
        Ok(Some(value))
    }
}
