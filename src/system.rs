//! External collaborators: package manager, web server, certificate tool.
//!
//! The pipeline only talks to these traits. The real implementations shell
//! out; tests substitute fakes.

use anyhow::Result;

use crate::log_debug;
use crate::process::{find_in_path, run_attached, run_captured, CommandReport};

/// An installable executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Name looked up on PATH
    pub binary: String,
    /// Packages that provide it
    pub packages: Vec<String>,
}

impl Tool {
    pub fn new(binary: impl Into<String>, packages: &[&str]) -> Self {
        Self {
            binary: binary.into(),
            packages: packages.iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub trait PackageManager {
    fn is_installed(&self, tool: &Tool) -> bool;
    fn install(&self, tool: &Tool) -> Result<CommandReport>;
}

pub trait WebServer {
    /// The server's own executable, for the preflight check
    fn tool(&self) -> Tool;
    /// Built-in configuration test; output is the server's diagnostics
    fn validate_config(&self) -> Result<CommandReport>;
    fn reload(&self) -> Result<CommandReport>;
}

pub trait CertificateTool {
    fn tool(&self) -> Tool;
    /// Obtain and install a certificate; may rewrite the site file
    fn issue_certificate(&self, domain: &str, alt_names: &[String]) -> Result<CommandReport>;
}

/// apt-get on Debian-family hosts
pub struct Apt;

impl PackageManager for Apt {
    fn is_installed(&self, tool: &Tool) -> bool {
        find_in_path(&tool.binary).is_some()
    }

    fn install(&self, tool: &Tool) -> Result<CommandReport> {
        let update = run_attached("apt-get", ["update"])?;
        if !update.success {
            return Ok(update);
        }

        let mut args = vec!["install".to_string(), "-y".to_string()];
        args.extend(tool.packages.iter().cloned());
        run_attached("apt-get", &args)
    }
}

/// nginx managed by systemd
pub struct Nginx {
    pub binary: String,
    pub service: String,
}

impl Default for Nginx {
    fn default() -> Self {
        Self {
            binary: "nginx".into(),
            service: "nginx".into(),
        }
    }
}

impl WebServer for Nginx {
    fn tool(&self) -> Tool {
        Tool::new(self.binary.clone(), &["nginx"])
    }

    fn validate_config(&self) -> Result<CommandReport> {
        log_debug!("Running {} -t", self.binary);
        run_captured(&self.binary, ["-t"])
    }

    fn reload(&self) -> Result<CommandReport> {
        log_debug!("Reloading service {}", self.service);
        run_captured("systemctl", ["reload", self.service.as_str()])
    }
}

/// certbot with its nginx installer plugin
#[derive(Default)]
pub struct Certbot {
    /// Registration email; enables a non-interactive run
    pub email: Option<String>,
}

impl Certbot {
    pub fn args(&self, domain: &str, alt_names: &[String]) -> Vec<String> {
        let mut args = vec!["--nginx".to_string(), "-d".to_string(), domain.to_string()];
        for name in alt_names {
            args.push("-d".into());
            args.push(name.clone());
        }
        if let Some(email) = &self.email {
            args.extend([
                "--non-interactive".to_string(),
                "--agree-tos".to_string(),
                "--email".to_string(),
                email.clone(),
            ]);
        }
        args
    }
}

impl CertificateTool for Certbot {
    fn tool(&self) -> Tool {
        Tool::new("certbot", &["certbot", "python3-certbot-nginx"])
    }

    fn issue_certificate(&self, domain: &str, alt_names: &[String]) -> Result<CommandReport> {
        run_attached("certbot", self.args(domain, alt_names))
    }
}
