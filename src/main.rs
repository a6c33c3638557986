use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use fmtcheck::{FormatFixture, RecordingReporter};

#[derive(Parser)]
#[command(name = "fmtcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check that a formatter leaves formatted files unchanged")]
struct Cli {
    /// Files to check (stdin if none are given)
    files: Vec<PathBuf>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check that formatting twice equals formatting once, instead of
    /// checking that the input is already formatted
    #[arg(long)]
    idempotent: bool,

    /// Fold CRLF line endings before comparing
    #[arg(long)]
    normalize_line_endings: bool,

    /// Formatter program and arguments; overrides `command` in the config
    #[arg(last = true)]
    command: Vec<String>,
}

fn read_all(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn start_dir_for(files: &[PathBuf]) -> io::Result<PathBuf> {
    match files.first() {
        Some(p) => Ok(p.parent().unwrap_or(Path::new(".")).to_path_buf()),
        None => std::env::current_dir(),
    }
}

fn display_name(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("fmtcheck: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let start_dir = start_dir_for(&cli.files)?;
    let (cfg, cfg_path) = fmtcheck::config::load(cli.config.as_deref(), &start_dir)?;
    if let Some(p) = &cfg_path {
        log::info!("Using config {}", p.display());
    }

    let formatter = fmtcheck::CommandFormatter::from_argv(&cli.command)
        .or_else(|| cfg.formatter())
        .ok_or("no formatter command given; pass it after `--` or set `command` in the config")?;

    let normalize = cli.normalize_line_endings || cfg.normalize_line_endings.unwrap_or(false);
    let mut fixture = FormatFixture::with_reporter(formatter, RecordingReporter::new())
        .normalize_line_endings(normalize);

    let paths: Vec<Option<&Path>> = if cli.files.is_empty() {
        vec![None]
    } else {
        cli.files.iter().map(|p| Some(p.as_path())).collect()
    };

    let mut all_ok = true;
    for path in paths {
        let name = display_name(path);
        let input = read_all(path)?;
        let before = fixture.reporter().failures().len();

        if cli.idempotent {
            fixture.assert_idempotent(&input)?;
        } else {
            fixture.assert_format(&input)?;
        }

        match fixture.reporter().failures().get(before) {
            None => println!("ok {name}"),
            Some(mismatch) => {
                all_ok = false;
                println!("FAILED {name}\n{}", mismatch.diff());
            }
        }
    }

    let reporter = fixture.into_reporter();
    log::info!(
        "{} passed, {} failed",
        reporter.passed(),
        reporter.failures().len()
    );
    Ok(all_ok)
}
