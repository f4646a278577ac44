use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use proxysite::config::{Layout, Presets, DEFAULT_ROOT};
use proxysite::error::SetupError;
use proxysite::process::is_root;
use proxysite::prompt::TerminalPrompter;
use proxysite::setup::{self, Collaborators, Options};
use proxysite::system::{Apt, Certbot, Nginx};
use proxysite::{log_debug, logger};

#[derive(Parser)]
#[command(name = "proxysite")]
#[command(version)]
#[command(about = "Create, enable and reload an nginx reverse-proxy site, with optional certbot TLS")]
struct Cli {
    /// nginx configuration root holding sites-available and sites-enabled
    #[arg(long, default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// JSON file whose values become the default answers
    #[arg(long, value_name = "FILE")]
    defaults: Option<PathBuf>,

    /// Ask the questions and print the site file without touching the system
    #[arg(long)]
    dry_run: bool,

    /// Do not check whether the upstream answers
    #[arg(long)]
    skip_probe: bool,

    /// Seconds to wait for the upstream check
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    probe_timeout: u64,

    /// Remove a newly created site file if nginx rejects it
    #[arg(long)]
    discard_on_failure: bool,

    /// nginx executable used for the configuration test
    #[arg(long, default_value = "nginx")]
    nginx_bin: String,

    /// systemd unit to reload
    #[arg(long, default_value = "nginx")]
    service: String,

    /// Email for certbot registration; makes certbot non-interactive
    #[arg(long, value_name = "EMAIL")]
    certbot_email: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), SetupError> {
    if !cli.dry_run && !is_root() {
        return Err(SetupError::Precondition(
            "this command must be run as root (try sudo)".into(),
        ));
    }

    let presets = match &cli.defaults {
        Some(path) => Presets::load(path).map_err(|e| SetupError::Precondition(format!("{:#}", e)))?,
        None => Presets::default(),
    };

    let options = Options {
        layout: Layout::new(cli.root),
        presets,
        dry_run: cli.dry_run,
        probe_timeout: (!cli.skip_probe).then(|| Duration::from_secs(cli.probe_timeout)),
        discard_on_failure: cli.discard_on_failure,
    };
    log_debug!("Layout root: {}", options.layout.root.display());

    let server = Nginx {
        binary: cli.nginx_bin,
        service: cli.service,
    };
    let certs = Certbot {
        email: cli.certbot_email,
    };
    let tools = Collaborators {
        packages: &Apt,
        server: &server,
        certs: &certs,
    };

    let summary = setup::run(&mut TerminalPrompter, &options, &tools).await?;

    if options.dry_run {
        println!();
        print!("{}", summary.rendered);
    } else {
        println!("✓ Done: {}", summary.site_path.display());
    }
    Ok(())
}
