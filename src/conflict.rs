use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::log_warn;
use crate::prompt::Prompter;

/// What to do about a site file that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    BackupAndOverwrite,
    Overwrite,
    Cancel,
}

impl ConflictChoice {
    /// Anything unrecognised cancels
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "b" | "backup" => ConflictChoice::BackupAndOverwrite,
            "2" | "o" | "overwrite" => ConflictChoice::Overwrite,
            _ => ConflictChoice::Cancel,
        }
    }
}

/// Ask once what to do with an existing site file
pub fn ask_choice(prompter: &mut dyn Prompter, path: &Path) -> Result<ConflictChoice, SetupError> {
    prompter.say(&format!("A site file already exists at {}", path.display()));
    prompter.say("  1) back it up, then overwrite");
    prompter.say("  2) overwrite");
    prompter.say("  3) cancel");

    let answer = prompter
        .ask("Choose [1-3]:")?
        .ok_or_else(|| SetupError::Cancelled("input closed".into()))?;
    Ok(ConflictChoice::parse(&answer))
}

/// `<path>.<YYYYMMDD_HHMMSS>.bak`
pub fn backup_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.bak", at.format("%Y%m%d_%H%M%S")));
    PathBuf::from(name)
}

/// Copy `path` to a fresh timestamped backup. Never overwrites an existing
/// backup file, and leaves no partial backup behind on failure.
pub fn take_backup(path: &Path, at: DateTime<Local>) -> Result<PathBuf, SetupError> {
    let backup = backup_path(path, at);
    let fail = |source: io::Error| SetupError::Backup {
        path: path.to_path_buf(),
        source,
    };

    let mut src = fs::File::open(path).map_err(fail)?;
    let mut dst = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&backup)
        .map_err(fail)?;

    if let Err(source) = io::copy(&mut src, &mut dst).and_then(|_| dst.sync_all()) {
        drop(dst);
        if let Err(e) = fs::remove_file(&backup) {
            log_warn!("Could not remove partial backup {}: {}", backup.display(), e);
        }
        return Err(fail(source));
    }
    Ok(backup)
}
