use std::path::PathBuf;
use thiserror::Error;

/// Why a typed answer was rejected. Never leaves the prompt loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("a value is required")]
    Empty,
    #[error("'{0}' is not allowed here; use letters, digits, '.' and '-' only")]
    DomainChar(char),
    #[error("a domain needs at least one letter or digit")]
    DomainWithoutLabel,
    #[error("the port must contain digits only")]
    PortNotNumeric,
    #[error("the port must be between 1 and 65535")]
    PortOutOfRange,
    #[error("the path must start with '/'")]
    PathNotAbsolute,
    #[error("'{0}' cannot appear in a site file value")]
    UnsafeChar(char),
    #[error("please answer y or n")]
    NotYesNo,
}

/// Pipeline stage where activation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Write,
    Symlink,
    Validate,
    Reload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Write => "writing the site file",
            Stage::Symlink => "enabling the site",
            Stage::Validate => "configuration test",
            Stage::Reload => "reload",
        };
        f.write_str(name)
    }
}

/// Terminal failures of a run. Each maps to a distinct exit code.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{0}")]
    Precondition(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("could not back up {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("activation failed during {stage}{}", revert_note(.reverted))]
    Activation { stage: Stage, reverted: Option<bool> },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

fn revert_note(reverted: &Option<bool>) -> &'static str {
    match reverted {
        Some(true) => " (previous configuration restored)",
        Some(false) => " (restoring the previous configuration also failed)",
        None => "",
    }
}

impl SetupError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::Precondition(_) => 2,
            SetupError::Cancelled(_) => 3,
            SetupError::Activation { .. } => 4,
            SetupError::Backup { .. } | SetupError::Io(_) => 1,
        }
    }
}
