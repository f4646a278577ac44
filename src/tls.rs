use crate::activate::validate_and_reload;
use crate::error::SetupError;
use crate::prompt::{confirm, Prompter};
use crate::system::{CertificateTool, PackageManager, WebServer};
use crate::{log_info, log_warn};

/// How the certificate step ended. None of these fail the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsOutcome {
    Installed,
    ToolDeclined,
    ToolInstallFailed,
    IssueFailed,
    /// Certificate issued but the follow-up test or reload failed
    ReloadFailed(String),
}

/// Install the certificate tool if needed, request a certificate for the
/// domain and its www alias, then validate and reload.
///
/// Only a closed prompt stream escapes as an error.
pub fn provision(
    prompter: &mut dyn Prompter,
    domain: &str,
    alt_names: &[String],
    packages: &dyn PackageManager,
    certs: &dyn CertificateTool,
    server: &dyn WebServer,
) -> Result<TlsOutcome, SetupError> {
    let tool = certs.tool();

    if !packages.is_installed(&tool) {
        let question = format!("{} is not installed. Install it now?", tool.binary);
        if !confirm(prompter, &question, false)? {
            prompter.say(&format!("✗ Skipping TLS: {} is required", tool.binary));
            return Ok(TlsOutcome::ToolDeclined);
        }

        match packages.install(&tool) {
            Ok(report) if report.success => {
                log_info!("Installed {}", tool.packages.join(" "));
            }
            Ok(report) => {
                prompter.say(&format!("✗ Could not install {}", tool.binary));
                if !report.output.is_empty() {
                    prompter.say(report.output.trim_end());
                }
                return Ok(TlsOutcome::ToolInstallFailed);
            }
            Err(e) => {
                prompter.say(&format!("✗ Could not install {}: {:#}", tool.binary, e));
                return Ok(TlsOutcome::ToolInstallFailed);
            }
        }
    }

    log_info!("Requesting certificate for {} {:?}", domain, alt_names);
    match certs.issue_certificate(domain, alt_names) {
        Ok(report) if report.success => {}
        Ok(report) => {
            prompter.say(&format!("✗ {} could not issue a certificate", tool.binary));
            if !report.output.is_empty() {
                prompter.say(report.output.trim_end());
            }
            prompter.say("  The plain HTTP site stays active.");
            return Ok(TlsOutcome::IssueFailed);
        }
        Err(e) => {
            prompter.say(&format!("✗ {:#}", e));
            prompter.say("  The plain HTTP site stays active.");
            return Ok(TlsOutcome::IssueFailed);
        }
    }

    match validate_and_reload(server) {
        Ok(()) => {
            prompter.say(&format!("✓ HTTPS enabled for {}", domain));
            Ok(TlsOutcome::Installed)
        }
        Err((stage, detail)) => {
            log_warn!("Post-certificate {} failed", stage);
            prompter.say(&format!("✗ Certificate installed but {} failed:", stage));
            prompter.say(detail.trim_end());
            Ok(TlsOutcome::ReloadFailed(detail))
        }
    }
}
