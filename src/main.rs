//! pagesnap command line
//!
//! Prints the path of the written artifact on stdout and nothing else;
//! logs go to stderr.

use clap::error::ErrorKind;
use clap::Parser;
use pagesnap::browser::{CaptureFormat, SessionConfig, DEFAULT_ENDPOINT};
use pagesnap::cleanup::{CleanupConfig, DEFAULT_CONTAINER_CLASS};
use pagesnap::target::DEFAULT_OUTPUT_DIR;
use pagesnap::{SnapshotOptions, Snapshotter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for usage errors
const USAGE_EXIT: u8 = 1;

const USAGE: &str = "Usage: pagesnap <URL> [--quiet|-q]";

/// Capture a cleaned-up web page as PDF through a remote Chrome
#[derive(Parser, Debug)]
#[command(name = "pagesnap")]
#[command(version)]
#[command(about = "Capture a cleaned-up web page as PDF through a remote Chrome")]
struct Args {
    /// Page to capture (an HTML file path with --offline)
    url: Option<String>,

    /// Suppress informational and usage output
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Remote debugging endpoint of the running browser
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Output folder, relative to the working directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Artifact format
    #[arg(short, long, value_enum, default_value_t = CaptureFormat::Pdf)]
    format: CaptureFormat,

    /// Class marking a removable content block (repeatable)
    #[arg(long = "container-class", default_value = DEFAULT_CONTAINER_CLASS)]
    container_classes: Vec<String>,

    /// Stop the lazy-load scroll after this many ticks (default: scroll to the bottom)
    #[arg(long)]
    max_scroll_ticks: Option<u32>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Disconnect at the end instead of closing the browser
    #[arg(long)]
    keep_browser: bool,

    /// Clean a local HTML file without a browser (html or text output only)
    #[arg(long)]
    offline: bool,
}

impl Args {
    fn snapshot_options(&self) -> SnapshotOptions {
        let mut cleanup =
            CleanupConfig::builder().container_classes(self.container_classes.iter().cloned());
        if let Some(ticks) = self.max_scroll_ticks {
            cleanup = cleanup.max_scroll_ticks(ticks);
        }

        SnapshotOptions {
            session: SessionConfig::builder()
                .endpoint(&self.endpoint)
                .timeout_ms(self.timeout_ms)
                .close_browser(!self.keep_browser)
                .build(),
            cleanup: cleanup.build(),
            format: self.format,
            output_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}

fn init_tracing(args: &Args) {
    let filter = if args.quiet {
        EnvFilter::new("off")
    } else {
        let default = if args.verbose { "debug" } else { "info" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn quiet_requested(raw: &[OsString]) -> bool {
    raw.iter().skip(1).any(|arg| arg == "--quiet" || arg == "-q")
}

fn usage_error(quiet: bool, message: &str) -> ExitCode {
    if !quiet {
        eprintln!("{message}");
    }
    ExitCode::from(USAGE_EXIT)
}

async fn run(args: &Args, target: &str) -> anyhow::Result<PathBuf> {
    let snapshotter = Snapshotter::new(args.snapshot_options())?;
    let outcome = if args.offline {
        snapshotter.capture_file(Path::new(target)).await?
    } else {
        snapshotter.capture_url(target).await?
    };
    Ok(outcome.path)
}

#[tokio::main]
async fn main() -> ExitCode {
    let raw: Vec<OsString> = std::env::args_os().collect();

    let args = match Args::try_parse_from(&raw) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            if !quiet_requested(&raw) {
                let _ = e.print();
            }
            return ExitCode::from(USAGE_EXIT);
        }
    };

    let Some(target) = args.url.clone() else {
        return usage_error(args.quiet, USAGE);
    };
    if args.offline && args.format == CaptureFormat::Pdf {
        return usage_error(args.quiet, "--offline needs --format html or --format text");
    }

    init_tracing(&args);

    match run(&args, &target).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
