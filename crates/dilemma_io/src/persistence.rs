use crate::checkpoint::{read_world, write_world};
use crate::error::{IoError, Result};
use dilemma_core::world::World;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Checkpoint files on disk.
pub trait CheckpointPersistence: Sized {
    /// Writes a checkpoint next to `path` and renames it into place, so a
    /// crash never leaves a half-written file under the final name.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
    /// Reads and validates a checkpoint.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self>;
}

impl CheckpointPersistence for World {
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        replace_atomically(path, |writer| write_world(writer, self))?;
        tracing::debug!(path = %path.display(), step = self.step_count(), "Checkpoint saved");
        Ok(())
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IoError::from(e).with_context(format!("opening {}", path.display())))?;
        let world = read_world(BufReader::new(file))
            .map_err(|e| e.with_context(format!("reading {}", path.display())))?;
        tracing::debug!(path = %path.display(), step = world.step_count(), "Checkpoint loaded");
        Ok(world)
    }
}

/// Saves `world` to `path` atomically.
pub fn save<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
    world.save(path)
}

/// Loads a world from the checkpoint at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<World> {
    World::load(path)
}

/// Writes `<path>.tmp` with `write` and renames it over `path`.
///
/// On any failure the temporary file is removed and `path` keeps its
/// previous contents.
fn replace_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp_path = tmp_path(path);
    if let Err(e) = write_file(&tmp_path, write) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.with_context(format!("writing {}", tmp_path.display())));
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(IoError::from(e).with_context(format!("renaming to {}", path.display())));
    }
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// `<path>.tmp` in the same directory, so the final rename stays on one
/// file system.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilemma_core::config::Settings;

    fn world() -> World {
        World::new(Settings {
            board_size_x: 4,
            board_size_y: 4,
            state_n: 2,
            turn_n: 4,
            ..Settings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.ckpt");
        let original = world();
        save(&original, &path).unwrap();
        assert!(!dir.path().join("backup.ckpt.tmp").exists());

        let restored = load(&path).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.ckpt");
        std::fs::write(&path, "stale").unwrap();
        let mut w = world();
        w.step();
        w.advance();
        w.save(&path).unwrap();
        assert_eq!(World::load(&path).unwrap().step_count(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.ckpt");
        let first = world();
        first.save(&path).unwrap();

        let err = replace_atomically(&path, |writer| {
            writer.write_all(b"version=dilemma-checkpoint-1\n#SETTINGS\n")?;
            writer.flush()?;
            Err(IoError::validation("disk full"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("disk full"));

        assert!(!dir.path().join("backup.ckpt.tmp").exists());
        assert_eq!(World::load(&path).unwrap(), first);
    }

    #[test]
    fn test_failed_rename_keeps_previous_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.ckpt");
        let first = world();
        first.save(&path).unwrap();

        // A file cannot be renamed over a non-empty directory.
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();
        let mut second = world();
        second.step();
        second.advance();
        assert!(second.save(&blocked).is_err());
        assert!(!dir.path().join("blocked.tmp").exists());

        assert_eq!(World::load(&path).unwrap(), first);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.ckpt")).unwrap_err();
        assert!(err.to_string().contains("nope.ckpt"));
    }

    #[test]
    fn test_load_corrupt_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ckpt");
        std::fs::write(&path, "version=something-else\n").unwrap();
        let err = load(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad.ckpt"));
        assert!(msg.contains("something-else"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("backup.ckpt");
        assert!(save(&world(), path).is_err());
    }
}
