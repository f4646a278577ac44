#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use proxysite::config::Layout;
use proxysite::process::CommandReport;
use proxysite::prompt::Prompter;
use proxysite::setup::{Collaborators, Options};
use proxysite::system::{CertificateTool, PackageManager, Tool, WebServer};

/// Answers questions from a fixed list; `None` once exhausted
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.transcript.push(question.to_string());
        Ok(self.answers.pop_front())
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

pub struct FakePackages {
    pub installed: RefCell<HashSet<String>>,
    pub install_succeeds: bool,
    pub installs: RefCell<Vec<String>>,
}

impl FakePackages {
    pub fn with(binaries: &[&str]) -> Self {
        Self {
            installed: RefCell::new(binaries.iter().map(|b| b.to_string()).collect()),
            install_succeeds: true,
            installs: RefCell::new(Vec::new()),
        }
    }
}

impl PackageManager for FakePackages {
    fn is_installed(&self, tool: &Tool) -> bool {
        self.installed.borrow().contains(&tool.binary)
    }

    fn install(&self, tool: &Tool) -> anyhow::Result<CommandReport> {
        self.installs.borrow_mut().push(tool.binary.clone());
        if !self.install_succeeds {
            return Ok(CommandReport::failed("E: Unable to locate package"));
        }
        self.installed.borrow_mut().insert(tool.binary.clone());
        Ok(CommandReport::ok())
    }
}

/// Validation and reload answer from queues, succeeding once a queue is empty
#[derive(Default)]
pub struct FakeServer {
    pub validate_results: RefCell<VecDeque<CommandReport>>,
    pub reload_results: RefCell<VecDeque<CommandReport>>,
    pub validations: Cell<usize>,
    pub reloads: Cell<usize>,
}

impl FakeServer {
    pub fn failing_validation(outputs: &[&str]) -> Self {
        let server = Self::default();
        for output in outputs {
            server
                .validate_results
                .borrow_mut()
                .push_back(CommandReport::failed(*output));
        }
        server
    }

    pub fn failing_reload(output: &str) -> Self {
        let server = Self::default();
        server
            .reload_results
            .borrow_mut()
            .push_back(CommandReport::failed(output));
        server
    }
}

impl WebServer for FakeServer {
    fn tool(&self) -> Tool {
        Tool::new("nginx", &["nginx"])
    }

    fn validate_config(&self) -> anyhow::Result<CommandReport> {
        self.validations.set(self.validations.get() + 1);
        Ok(self
            .validate_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(CommandReport::ok))
    }

    fn reload(&self) -> anyhow::Result<CommandReport> {
        self.reloads.set(self.reloads.get() + 1);
        Ok(self
            .reload_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(CommandReport::ok))
    }
}

pub struct FakeCerts {
    pub succeed: bool,
    pub requests: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeCerts {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl CertificateTool for FakeCerts {
    fn tool(&self) -> Tool {
        Tool::new("certbot", &["certbot", "python3-certbot-nginx"])
    }

    fn issue_certificate(&self, domain: &str, alt_names: &[String]) -> anyhow::Result<CommandReport> {
        self.requests
            .borrow_mut()
            .push((domain.to_string(), alt_names.to_vec()));
        if self.succeed {
            Ok(CommandReport::ok())
        } else {
            Ok(CommandReport::failed("Challenge failed for domain example.com"))
        }
    }
}

/// Fakes with nginx and certbot already present
pub struct Harness {
    pub packages: FakePackages,
    pub server: FakeServer,
    pub certs: FakeCerts,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_server(FakeServer::default())
    }

    pub fn with_server(server: FakeServer) -> Self {
        Self {
            packages: FakePackages::with(&["nginx", "certbot"]),
            server,
            certs: FakeCerts::new(true),
        }
    }

    pub fn tools(&self) -> Collaborators<'_> {
        Collaborators {
            packages: &self.packages,
            server: &self.server,
            certs: &self.certs,
        }
    }
}

/// Options rooted in `root` with the upstream probe off
pub fn options(root: &Path) -> Options {
    Options {
        layout: Layout::new(root),
        ..Options::default()
    }
}

pub fn backups_in(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.to_string_lossy().ends_with(".bak"))
                .collect()
        })
        .unwrap_or_default();
    found.sort();
    found
}
