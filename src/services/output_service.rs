use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::utils::{invert_colors, RefreshError};

pub const IMAGE_EXTENSION: &str = "png";

/// Output file name for a symbol, e.g. "ETHBTC" -> "ethbtc.png"
pub fn chart_file_name(symbol: &str) -> String {
    format!("{}.{}", symbol.to_lowercase(), IMAGE_EXTENSION)
}

/// Regular files directly inside `destination` (not recursive)
pub fn snapshot_destination(destination: &Path) -> Result<Vec<PathBuf>, RefreshError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(destination).map_err(RefreshError::io(destination))? {
        let entry = entry.map_err(RefreshError::io(destination))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(RefreshError::io(&path))?;
        if file_type.is_file() || file_type.is_symlink() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete the files that were there before the run, sparing the ones this run just wrote
pub fn remove_previous(previous: &[PathBuf], written: &[PathBuf]) -> Result<usize, RefreshError> {
    let mut removed = 0;
    for path in previous {
        if written.contains(path) {
            debug!("Keeping {} (rewritten this run)", path.display());
            continue;
        }
        fs::remove_file(path).map_err(RefreshError::io(path))?;
        removed += 1;
    }
    Ok(removed)
}

/// Writes charts through a per-run buffer directory, then moves them into place
pub struct OutputWriter {
    buffer_dir: PathBuf,
}

impl OutputWriter {
    /// Fresh buffer location under `buffer_root`, created on first write
    pub fn new(buffer_root: &Path) -> Self {
        Self {
            buffer_dir: buffer_root.join(Uuid::new_v4().to_string()),
        }
    }

    pub fn buffer_dir(&self) -> &Path {
        &self.buffer_dir
    }

    /// Save `chart` as `<symbol>.png` in `destination`, inverted if asked
    pub fn write(
        &self,
        symbol: &str,
        chart: &RgbaImage,
        destination: &Path,
        invert: bool,
    ) -> Result<PathBuf, RefreshError> {
        let file_name = chart_file_name(symbol);
        let temp = self.buffer_dir.join(&file_name);
        let target = destination.join(&file_name);

        fs::create_dir_all(&self.buffer_dir).map_err(RefreshError::io(&self.buffer_dir))?;
        chart.save(&temp)?;

        if invert {
            let buffered = image::open(&temp)?;
            let inverted: DynamicImage = invert_colors(buffered);
            inverted.save(&temp)?;
        }

        move_file(&temp, &target)?;
        info!("Wrote {}", target.display());
        Ok(target)
    }

    /// Remove the buffer directory and anything left in it
    pub fn cleanup(self) -> Result<(), RefreshError> {
        if self.buffer_dir.exists() {
            fs::remove_dir_all(&self.buffer_dir).map_err(RefreshError::io(&self.buffer_dir))?;
        }
        Ok(())
    }
}

/// Rename, falling back to copy + delete only when the buffer sits on another filesystem
fn move_file(from: &Path, to: &Path) -> Result<(), RefreshError> {
    debug!("Moving {} -> {}", from.display(), to.display());
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            warn!("Buffer is on another filesystem ({}), copying instead", e);
            fs::copy(from, to).map_err(RefreshError::io(to))?;
            fs::remove_file(from).map_err(RefreshError::io(from))?;
            Ok(())
        }
        Err(e) => Err(RefreshError::Io {
            path: to.to_path_buf(),
            source: e,
        }),
    }
}
