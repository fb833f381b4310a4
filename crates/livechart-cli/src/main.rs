//! CLI for livechart — plot numbers read from files and pipes as a live terminal chart.

mod terminal;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::warn;

use livechart_core::{FileSource, Session, SessionConfig, StopSignal, StopTrigger};

use terminal::CrosstermTerminal;

#[derive(Parser, Debug)]
#[command(name = "livechart")]
#[command(about = "livechart — poll numbers from files or pipes and chart them live")]
#[command(version = livechart_core::VERSION)]
#[command(after_help = "Keys: ←/→ scroll, Home oldest page, End back to live, q/Esc/Ctrl+C quit")]
struct Cli {
    /// Input files to read values from, one series each (first line is parsed every tick)
    #[arg(default_value = "/dev/stdin")]
    inputs: Vec<PathBuf>,

    /// Sampling interval in seconds
    #[arg(long, default_value = "1.0", value_parser = parse_interval)]
    interval: Duration,
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("interval must be a positive number of seconds, got {s}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Route SIGINT, SIGTERM and SIGHUP to `trigger` so the session shuts down
/// and restores the terminal instead of being killed.
fn install_stop_handler(trigger: StopTrigger) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || trigger.stop())
}

fn run(cli: Cli) -> livechart_core::Result<()> {
    let sources = cli.inputs.iter().map(FileSource::boxed).collect();
    let session = Session::new(sources, SessionConfig::with_interval(cli.interval));

    // Signals from outside the terminal (kill -INT/-TERM) end the session like Ctrl+C.
    let (stop, trigger) = StopSignal::new();
    if let Err(e) = install_stop_handler(trigger) {
        warn!("failed to install interrupt handler: {e}");
    }

    let mut terminal = CrosstermTerminal::enter()?;
    let result = session.run(&mut terminal, stop);
    drop(terminal);
    result
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("livechart: {e}");
        std::process::exit(1);
    }
}
