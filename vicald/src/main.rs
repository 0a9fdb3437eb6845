//! # Vical Host Daemon
//!
//! Entry point: parse arguments, start logging, run the editor.

use chrono::Local;
use clap::Parser;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;
use vical_core::Settings;
use vical_storage::{default_data_path, load_settings, JsonFileStore};
use vicald::{
    default_log_dir, default_log_level, init_logging, parse_today, HostError, HostRuntime,
    HostRuntimeConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vicald", about = "Modal calendar and task editor", version)]
struct Cli {
    /// Calendar data file
    #[arg(long)]
    data: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay keys from a script instead of reading stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Stop after this many keys (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_steps: usize,

    /// Pin today's date (YYYYMMDD)
    #[arg(long)]
    today: Option<String>,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &log_dir)?;

    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let today = match &cli.today {
        Some(raw) => parse_today(raw)?,
        None => Local::now().date_naive(),
    };
    let script = cli.script.map(fs::read_to_string).transpose()?;
    let scripted = script.is_some();

    let store = JsonFileStore::new(cli.data.unwrap_or_else(default_data_path))
        .with_default_color(settings.default_subcal_color.clone());
    let config = HostRuntimeConfig {
        script,
        max_steps: cli.max_steps,
        today,
        settings,
    };
    let mut runtime = HostRuntime::new(config, store)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if scripted {
        runtime.run(&mut out)
    } else {
        runtime.run_interactive(io::stdin().lock(), &mut out)
    }
}
