//! The end-to-end wizard: preflight, questions, conflict handling, probe,
//! render, activation with rollback, optional TLS.

use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;

use crate::activate::{activate, discard_new_site, restore_backup, Activation};
use crate::config::{Layout, Presets};
use crate::conflict::{ask_choice, take_backup, ConflictChoice};
use crate::error::SetupError;
use crate::probe::{probe, Reachability};
use crate::prompt::{confirm, prompt_until_valid, Prompter};
use crate::render::render;
use crate::site::{
    parse_domain, parse_port, parse_redirect_path, parse_upstream_host, ProxySiteConfig,
    DEFAULT_UPSTREAM_HOST,
};
use crate::system::{CertificateTool, PackageManager, WebServer};
use crate::tls::{provision, TlsOutcome};
use crate::{log_info, log_warn};

/// Knobs for one run
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub layout: Layout,
    pub presets: Presets,
    /// Render only; touch nothing
    pub dry_run: bool,
    /// Upstream check timeout; `None` skips the check
    pub probe_timeout: Option<Duration>,
    /// Remove a first-time site file when activation fails
    pub discard_on_failure: bool,
}

/// The external programs a run may call
pub struct Collaborators<'a> {
    pub packages: &'a dyn PackageManager,
    pub server: &'a dyn WebServer,
    pub certs: &'a dyn CertificateTool,
}

/// What a successful run produced
#[derive(Debug)]
pub struct Summary {
    pub site: ProxySiteConfig,
    pub rendered: String,
    pub site_path: PathBuf,
    pub backup: Option<PathBuf>,
    /// `None` when TLS was not requested
    pub tls: Option<TlsOutcome>,
}

/// Run the wizard to completion
pub async fn run(
    prompter: &mut dyn Prompter,
    options: &Options,
    tools: &Collaborators<'_>,
) -> Result<Summary, SetupError> {
    let layout = &options.layout;

    if !options.dry_run {
        ensure_web_server(prompter, tools.packages, tools.server)?;
    }

    let site = collect(prompter, &options.presets, layout)?;
    let site_path = layout.site_path(&site.domain);

    if options.dry_run {
        return Ok(Summary {
            rendered: render(&site),
            site,
            site_path,
            backup: None,
            tls: None,
        });
    }

    let existed = site_path.is_file();
    let backup = if existed {
        match ask_choice(prompter, &site_path)? {
            ConflictChoice::Cancel => {
                return Err(SetupError::Cancelled(format!(
                    "{} left untouched",
                    site_path.display()
                )))
            }
            ConflictChoice::Overwrite => None,
            ConflictChoice::BackupAndOverwrite => {
                let backup = take_backup(&site_path, Local::now())?;
                prompter.say(&format!("✓ Backup saved to {}", backup.display()));
                Some(backup)
            }
        }
    } else {
        None
    };

    if let Some(timeout) = options.probe_timeout {
        report_probe(
            probe(&site.upstream_host, site.upstream_port, &site.domain, timeout).await,
            &site,
        );
    }

    let rendered = render(&site);
    let enabled_path = layout.enabled_path(&site.domain);
    let log_dir = layout.logs_dir();
    let plan = Activation {
        site_path: &site_path,
        enabled_path: &enabled_path,
        log_dir: site.custom_logs.then_some(log_dir.as_path()),
    };

    if let Err(failure) = activate(&plan, &rendered, tools.server) {
        prompter.say(&format!("✗ {} failed", failure.stage));
        if !failure.detail.trim().is_empty() {
            prompter.say(failure.detail.trim_end());
        }

        let reverted = if let Some(backup) = &backup {
            let ok = restore_backup(backup, &site_path, tools.server);
            if ok {
                prompter.say(&format!("✓ Restored previous configuration from {}", backup.display()));
            } else {
                prompter.say(&format!(
                    "✗ Could not restore the previous configuration; backup kept at {}",
                    backup.display()
                ));
            }
            Some(ok)
        } else if options.discard_on_failure && !existed {
            let ok = discard_new_site(&plan, &failure, tools.server);
            if ok {
                prompter.say(&format!("✓ Removed {}", site_path.display()));
            } else {
                prompter.say(&format!("✗ Could not cleanly remove {}", site_path.display()));
            }
            Some(ok)
        } else {
            // No backup: the new, failing file stays where it is.
            prompter.say(&format!(
                "✗ {} was left in place; fix it or remove it before the next reload",
                site_path.display()
            ));
            None
        };

        return Err(SetupError::Activation {
            stage: failure.stage,
            reverted,
        });
    }

    prompter.say(&format!(
        "✓ {} is live: http://{} -> {}",
        site.domain,
        site.domain,
        site.upstream_url()
    ));

    // The site is live at this point; closed input here just means no TLS.
    let wants_tls = confirm(
        prompter,
        "Request a TLS certificate now?",
        options.presets.tls.unwrap_or(false),
    )
    .or_else(|e| match e {
        SetupError::Cancelled(_) => Ok(false),
        e => Err(e),
    })?;
    let tls = if wants_tls {
        Some(provision(
            prompter,
            &site.domain,
            &[site.www_alias()],
            tools.packages,
            tools.certs,
            tools.server,
        )?)
    } else {
        None
    };

    Ok(Summary {
        site,
        rendered,
        site_path,
        backup,
        tls,
    })
}

/// Make sure the web server binary exists, installing it on consent
pub fn ensure_web_server(
    prompter: &mut dyn Prompter,
    packages: &dyn PackageManager,
    server: &dyn WebServer,
) -> Result<(), SetupError> {
    let tool = server.tool();
    if packages.is_installed(&tool) {
        return Ok(());
    }

    let question = format!("{} is not installed. Install it now?", tool.binary);
    if !confirm(prompter, &question, false)? {
        return Err(SetupError::Precondition(format!(
            "{} is required",
            tool.binary
        )));
    }

    let report = packages.install(&tool).map_err(|e| {
        SetupError::Precondition(format!("installing {} failed: {:#}", tool.binary, e))
    })?;
    if !report.success || !packages.is_installed(&tool) {
        return Err(SetupError::Precondition(format!(
            "installing {} failed",
            tool.packages.join(" ")
        )));
    }
    prompter.say(&format!("✓ Installed {}", tool.binary));
    Ok(())
}

/// Ask every question and build the site description
pub fn collect(
    prompter: &mut dyn Prompter,
    presets: &Presets,
    layout: &Layout,
) -> Result<ProxySiteConfig, SetupError> {
    let domain = prompt_until_valid(
        prompter,
        "Domain (e.g. example.com)",
        presets.domain.as_deref(),
        parse_domain,
    )?;

    let upstream_host = prompt_until_valid(
        prompter,
        "Upstream host",
        Some(presets.upstream_host.as_deref().unwrap_or(DEFAULT_UPSTREAM_HOST)),
        parse_upstream_host,
    )?;

    let preset_port = presets.upstream_port.map(|p| p.to_string());
    let upstream_port = prompt_until_valid(
        prompter,
        "Upstream port",
        preset_port.as_deref(),
        parse_port,
    )?;

    let root_redirect = prompt_until_valid(
        prompter,
        "Redirect / to path (blank for none)",
        presets.root_redirect.as_deref(),
        parse_redirect_path,
    )?;

    let custom_logs = confirm(
        prompter,
        "Write per-site access/error logs?",
        presets.custom_logs.unwrap_or(false),
    )?;

    Ok(ProxySiteConfig {
        domain,
        upstream_host,
        upstream_port,
        root_redirect,
        custom_logs,
        log_dir: layout.logs_dir(),
    })
}

fn report_probe(result: Reachability, site: &ProxySiteConfig) {
    match result {
        Reachability::Reachable(status) => {
            log_info!("Upstream {} answered {}", site.upstream_url(), status)
        }
        Reachability::Unreachable(reason) => {
            log_warn!("Upstream {} is not reachable: {}", site.upstream_url(), reason)
        }
        Reachability::Indeterminate(reason) => {
            log_warn!("Could not check upstream {}: {}", site.upstream_url(), reason)
        }
    }
}
