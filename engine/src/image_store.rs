//! Writes generated images below an output directory without ever overwriting a file.
//!
//! Files are named `{short model name}_{YYYYMMDD_HHMMSS}.png`. If that name is taken,
//! `_1`, `_2`, ... is inserted before the extension.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use color_eyre::{
    Result,
    eyre::{WrapErr as _, ensure},
};
use log::{info, warn};

use crate::catalog::ModelSpec;

pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// absolute
    pub path: PathBuf,
    pub size: u64,
}

impl SavedImage {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The report shown to the user after saving
impl fmt::Display for SavedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✔ Image successfully saved:")?;
        writeln!(f, "  File: {}", self.file_name())?;
        writeln!(f, "  Size: {} bytes", self.size)?;
        writeln!(f, "  Path: {}", self.path.display())
    }
}

pub fn sanitize_filename(name: &str) -> String {
    name.replace(INVALID_FILENAME_CHARS, "_")
}

pub fn image_file_name(model: &ModelSpec, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.png",
        sanitize_filename(model.short_name()),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Creates a new file in `dir` (creating `dir` if needed). The name is `file_name` or, if
/// that is taken, `{stem}_{n}{extension}` with the smallest free `n`.
pub fn create_unique_file(dir: &Path, file_name: &str) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Couldn't create output directory {}", dir.display()))?;

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut i = 0;
    loop {
        let candidate = if i == 0 {
            dir.join(file_name)
        } else {
            dir.join(format!("{stem}_{i}{extension}"))
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => i += 1,
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Couldn't create {}", candidate.display()));
            }
        }
    }
}

pub fn save_image(dir: &Path, model: &ModelSpec, bytes: &[u8]) -> Result<SavedImage> {
    let file_name = image_file_name(model, Local::now().naive_local());
    let (path, mut file) = create_unique_file(dir, &file_name)?;

    let written = file
        .write_all(bytes)
        .and_then(|_| file.sync_all())
        .and_then(|_| file.metadata())
        .map(|m| m.len());
    drop(file);

    if !matches!(written, Ok(size) if size > 0) {
        if let Err(e) = fs::remove_file(&path) {
            warn!("Couldn't remove {}: {e}", path.display());
        }
    }
    let size = written.wrap_err_with(|| format!("Couldn't write {}", path.display()))?;
    ensure!(size > 0, "File was not created properly: {}", path.display());

    let path = std::path::absolute(&path)?;
    info!("Saved {size} bytes to {}", path.display());
    Ok(SavedImage { path, size })
}
