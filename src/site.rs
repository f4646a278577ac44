use std::path::PathBuf;

use crate::error::InputError;

/// Upstream host used when the question is left blank.
pub const DEFAULT_UPSTREAM_HOST: &str = "127.0.0.1";

/// Characters that would let a value break out of its nginx directive.
const UNSAFE_CHARS: &[char] = &[';', '{', '}', '"', '\''];

/// Everything needed to render one proxied site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySiteConfig {
    pub domain: String,
    pub upstream_host: String,
    pub upstream_port: u16,
    /// Path that `/` answers with a 302 to, if any
    pub root_redirect: Option<String>,
    pub custom_logs: bool,
    /// Directory holding the per-domain log files
    pub log_dir: PathBuf,
}

impl ProxySiteConfig {
    pub fn access_log_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}_access.log", self.domain))
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}_error.log", self.domain))
    }

    /// `www.` alias served alongside the domain
    pub fn www_alias(&self) -> String {
        format!("www.{}", self.domain)
    }

    /// `host:port`, with IPv6 literals bracketed
    pub fn upstream_authority(&self) -> String {
        authority(&self.upstream_host, self.upstream_port)
    }

    pub fn upstream_url(&self) -> String {
        format!("http://{}", self.upstream_authority())
    }
}

/// Join host and port, bracketing hosts that contain ':'
pub fn authority(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Accept a hostname made of ASCII letters, digits, '.' and '-'
pub fn parse_domain(input: &str) -> Result<String, InputError> {
    let domain = input.trim();
    if domain.is_empty() {
        return Err(InputError::Empty);
    }
    if let Some(bad) = domain
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(InputError::DomainChar(bad));
    }
    // "." and ".." would name a directory instead of a site file.
    if domain.chars().all(|c| c == '.') {
        return Err(InputError::DomainWithoutLabel);
    }
    Ok(domain.to_string())
}

/// Blank selects the loopback default
pub fn parse_upstream_host(input: &str) -> Result<String, InputError> {
    let host = input.trim();
    if host.is_empty() {
        return Ok(DEFAULT_UPSTREAM_HOST.to_string());
    }
    reject_unsafe(host)?;
    Ok(host.to_string())
}

/// Digits only, 0 < port < 65536
pub fn parse_port(input: &str) -> Result<u16, InputError> {
    let digits = input.trim();
    if digits.is_empty() {
        return Err(InputError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(InputError::PortNotNumeric);
    }
    // Anything too long for u32 is out of range too.
    let value: u32 = digits.parse().map_err(|_| InputError::PortOutOfRange)?;
    if value == 0 || value > u16::MAX as u32 {
        return Err(InputError::PortOutOfRange);
    }
    Ok(value as u16)
}

/// Blank means no redirect
pub fn parse_redirect_path(input: &str) -> Result<Option<String>, InputError> {
    let path = input.trim();
    if path.is_empty() {
        return Ok(None);
    }
    if !path.starts_with('/') {
        return Err(InputError::PathNotAbsolute);
    }
    reject_unsafe(path)?;
    Ok(Some(path.to_string()))
}

/// y/yes/n/no, case-insensitive. Blank is reported as Empty so the
/// caller can apply its own default.
pub fn parse_yes_no(input: &str) -> Result<bool, InputError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Err(InputError::Empty),
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(InputError::NotYesNo),
    }
}

fn reject_unsafe(value: &str) -> Result<(), InputError> {
    match value
        .chars()
        .find(|c| c.is_whitespace() || UNSAFE_CHARS.contains(c))
    {
        Some(bad) => Err(InputError::UnsafeChar(bad)),
        None => Ok(()),
    }
}
