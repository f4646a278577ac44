use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Stage;
use crate::system::WebServer;
use crate::{log_error, log_info, log_warn};

/// What `ensure_symlink` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Unchanged,
    Created,
    Replaced,
}

/// Point `link` at `target`, leaving a correct link alone
pub fn ensure_symlink(target: &Path, link: &Path) -> Result<LinkAction> {
    match fs::symlink_metadata(link) {
        Ok(_) => {
            if fs::read_link(link).ok().as_deref() == Some(target) {
                return Ok(LinkAction::Unchanged);
            }
            fs::remove_file(link)
                .with_context(|| format!("Could not remove {}", link.display()))?;
            std::os::unix::fs::symlink(target, link)
                .with_context(|| format!("Could not link {}", link.display()))?;
            Ok(LinkAction::Replaced)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            std::os::unix::fs::symlink(target, link)
                .with_context(|| format!("Could not link {}", link.display()))?;
            Ok(LinkAction::Created)
        }
        Err(e) => Err(e).with_context(|| format!("Could not inspect {}", link.display())),
    }
}

/// Paths touched by one activation
#[derive(Debug, Clone)]
pub struct Activation<'a> {
    pub site_path: &'a Path,
    pub enabled_path: &'a Path,
    /// Created beforehand when custom logs are on
    pub log_dir: Option<&'a Path>,
}

/// Why activation stopped
#[derive(Debug)]
pub struct ActivationFailure {
    pub stage: Stage,
    /// Validator or reload output, or the I/O error text
    pub detail: String,
    /// Whether this run created the enable link
    pub link_created: bool,
    /// Whether this run created the logs directory
    pub log_dir_created: bool,
}

/// Write, enable, validate and reload, stopping at the first failure
pub fn activate(
    plan: &Activation<'_>,
    contents: &str,
    server: &dyn WebServer,
) -> std::result::Result<LinkAction, ActivationFailure> {
    let log_dir_created = plan.log_dir.is_some_and(|dir| !dir.exists());
    let fail = |stage: Stage, detail: String, link_created: bool| ActivationFailure {
        stage,
        detail,
        link_created,
        log_dir_created,
    };

    write_site(plan, contents).map_err(|e| fail(Stage::Write, format!("{:#}", e), false))?;
    log_info!("Wrote {}", plan.site_path.display());

    let link = ensure_symlink(plan.site_path, plan.enabled_path)
        .map_err(|e| fail(Stage::Symlink, format!("{:#}", e), false))?;
    log_info!("Enabled {} ({:?})", plan.enabled_path.display(), link);
    let link_created = link == LinkAction::Created;

    validate_and_reload(server).map_err(|(stage, detail)| fail(stage, detail, link_created))?;
    Ok(link)
}

fn write_site(plan: &Activation<'_>, contents: &str) -> Result<()> {
    for dir in [plan.site_path.parent(), plan.enabled_path.parent(), plan.log_dir]
        .into_iter()
        .flatten()
    {
        fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
    }
    fs::write(plan.site_path, contents)
        .with_context(|| format!("Could not write {}", plan.site_path.display()))
}

/// Configuration test followed by reload
pub fn validate_and_reload(server: &dyn WebServer) -> std::result::Result<(), (Stage, String)> {
    let check = server
        .validate_config()
        .map_err(|e| (Stage::Validate, format!("{:#}", e)))?;
    if !check.success {
        return Err((Stage::Validate, check.output));
    }

    let reload = server
        .reload()
        .map_err(|e| (Stage::Reload, format!("{:#}", e)))?;
    if !reload.success {
        return Err((Stage::Reload, reload.output));
    }
    Ok(())
}

/// Put the backed-up site file back and bring nginx in line with it
pub fn restore_backup(backup: &Path, site_path: &Path, server: &dyn WebServer) -> bool {
    if let Err(e) = fs::copy(backup, site_path) {
        log_error!("Could not restore {}: {}", backup.display(), e);
        return false;
    }
    log_info!("Restored {} from {}", site_path.display(), backup.display());

    match validate_and_reload(server) {
        Ok(()) => true,
        Err((stage, detail)) => {
            log_error!("Restored configuration failed at {}: {}", stage, detail.trim());
            false
        }
    }
}

/// Remove a site file this run created from nothing, along with the link
/// and logs directory if the run created those too
pub fn discard_new_site(
    plan: &Activation<'_>,
    failure: &ActivationFailure,
    server: &dyn WebServer,
) -> bool {
    let mut removed: Vec<PathBuf> = Vec::new();
    let mut targets = vec![plan.site_path];
    if failure.link_created {
        targets.insert(0, plan.enabled_path);
    }

    for path in targets {
        match fs::remove_file(path) {
            Ok(()) => removed.push(path.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                log_error!("Could not remove {}: {}", path.display(), e);
                return false;
            }
        }
    }

    // Only files from this run can be in a directory this run created.
    if let Some(dir) = plan.log_dir.filter(|_| failure.log_dir_created) {
        match fs::remove_dir_all(dir) {
            Ok(()) => removed.push(dir.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                log_error!("Could not remove {}: {}", dir.display(), e);
                return false;
            }
        }
    }
    log_warn!("Discarded {:?}", removed);

    validate_and_reload(server).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_symlink_created_then_unchanged() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("site");
        let link = dir.path().join("link");
        fs::write(&target, "x").unwrap();

        assert_eq!(ensure_symlink(&target, &link).unwrap(), LinkAction::Created);
        assert_eq!(ensure_symlink(&target, &link).unwrap(), LinkAction::Unchanged);
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_symlink_replaced_when_wrong() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("site");
        let other = dir.path().join("other");
        let link = dir.path().join("link");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&other, &link).unwrap();

        assert_eq!(ensure_symlink(&target, &link).unwrap(), LinkAction::Replaced);
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_regular_file_in_place_of_link_is_replaced() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("site");
        let link = dir.path().join("link");
        fs::write(&target, "x").unwrap();
        fs::write(&link, "copy").unwrap();

        assert_eq!(ensure_symlink(&target, &link).unwrap(), LinkAction::Replaced);
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }
}
