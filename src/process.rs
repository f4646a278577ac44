use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Exit status and diagnostics of an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub success: bool,
    /// stdout followed by stderr; empty when the terminal was attached
    pub output: String,
}

impl CommandReport {
    pub fn ok() -> Self {
        Self {
            success: true,
            output: String::new(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Run a command to completion and capture its output
pub fn run_captured<I, S>(program: &str, args: I) -> Result<CommandReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(CommandReport {
        success: output.status.success(),
        output: text,
    })
}

/// Run a command with the terminal attached so it can talk to the operator
pub fn run_attached<I, S>(program: &str, args: I) -> Result<CommandReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    Ok(CommandReport {
        success: status.success(),
        output: String::new(),
    })
}

/// Locate an executable on PATH
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    // Explicit paths are checked as given.
    if binary.contains('/') {
        let path = Path::new(binary);
        return is_executable(path).then(|| path.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// True when running with an effective uid of 0
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captured_collects_both_streams() {
        let report = run_captured("sh", ["-c", "echo out; echo err >&2; exit 3"]).unwrap();
        assert!(!report.success);
        assert!(report.output.contains("out"));
        assert!(report.output.contains("err"));
    }

    #[test]
    fn test_run_captured_success() {
        let report = run_captured("sh", ["-c", "true"]).unwrap();
        assert!(report.success);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        assert!(run_captured("definitely-not-a-real-binary-xyz", ["-t"]).is_err());
    }

    #[test]
    fn test_find_in_path() {
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely-not-a-real-binary-xyz").is_none());
        assert!(find_in_path("/definitely/not/here").is_none());
    }
}
