use clap::Parser;
use nestbench::config::size_sweep;
use nestbench::{
    ConsoleReporter, JsonLinesReporter, OutputFormat, ReportSink, Result, Scheduler,
    SimulationConfig, SoftwareWatchdog, StartOutcome, TextReporter, WorkloadKind,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Nested-loop complexity timing harness
#[derive(Parser)]
#[command(name = "nestbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated workload sizes, e.g. 16,32,48
    #[arg(long, value_delimiter = ',', conflicts_with = "sweep")]
    sizes: Option<Vec<u32>>,

    /// Inclusive size sweep START:END:STEP, e.g. 16:64:16
    #[arg(long, value_parser = parse_sweep)]
    sweep: Option<Sweep>,

    /// Comma-separated workload kinds (quadratic, quasi-linear-nested, cubic)
    #[arg(long, value_delimiter = ',')]
    kinds: Option<Vec<WorkloadKind>>,

    /// Runs per size and kind
    #[arg(short, long)]
    repeat: Option<u32>,

    /// Delay before the first run, e.g. 2s or 500ms
    #[arg(long, value_parser = humantime::parse_duration)]
    delay: Option<Duration>,

    /// Software watchdog window, e.g. 1s
    #[arg(long, value_parser = humantime::parse_duration)]
    watchdog_timeout: Option<Duration>,

    /// Report format: text, json or console
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    start: u32,
    end: u32,
    step: u32,
}

fn parse_sweep(input: &str) -> std::result::Result<Sweep, String> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected START:END:STEP, got {}", input));
    }
    let number = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid number in sweep: {}", s))
    };
    Ok(Sweep {
        start: number(parts[0])?,
        end: number(parts[1])?,
        step: number(parts[2])?,
    })
}

impl Cli {
    /// Layer command-line overrides on top of the file configuration
    fn apply(&self, mut config: SimulationConfig) -> Result<SimulationConfig> {
        if let Some(sizes) = &self.sizes {
            config.sizes = sizes.clone();
        }
        if let Some(sweep) = self.sweep {
            config.sizes = size_sweep(sweep.start, sweep.end, sweep.step)?;
        }
        if let Some(kinds) = &self.kinds {
            config.kinds = kinds.clone();
        }
        if let Some(repeat) = self.repeat {
            config.repeat_count = repeat;
        }
        if let Some(delay) = self.delay {
            config.trigger_delay = delay;
        }
        if let Some(timeout) = self.watchdog_timeout {
            config.watchdog_timeout = timeout;
        }
        if let Some(format) = self.format {
            config.output = format;
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SimulationConfig::load_from(path)?,
        None => SimulationConfig::load()?,
    };
    let config = cli.apply(config)?;
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let matrix = config.matrix();
    let sink: Box<dyn ReportSink> = match config.output {
        OutputFormat::Text => Box::new(TextReporter::stdout()),
        OutputFormat::Json => Box::new(JsonLinesReporter::stdout()),
        OutputFormat::Console => Box::new(ConsoleReporter::new(matrix.len())),
    };
    let watchdog = SoftwareWatchdog::new(config.watchdog_timeout);
    let mut scheduler = Scheduler::new(matrix, watchdog, sink);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    info!(
        "waiting {} before the first run",
        humantime::format_duration(config.trigger_delay)
    );
    match scheduler.start(config.trigger_delay, shutdown_rx).await? {
        StartOutcome::Completed(_) => {
            let stats = scheduler.monitor().stats();
            info!(
                pings = stats.pings,
                longest_gap_us = stats.longest_gap.as_micros() as u64,
                "watchdog fed"
            );
            if stats.overruns > 0 {
                warn!(
                    overruns = stats.overruns,
                    "watchdog window exceeded; reduce sizes or raise --watchdog-timeout"
                );
            }
        }
        StartOutcome::Cancelled => info!("cancelled before the trigger fired"),
        StartOutcome::AlreadyDone | StartOutcome::Stalled(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestbench::HarnessError;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nestbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_sweep() {
        let sweep = parse_sweep("16:64:16").unwrap();
        assert_eq!((sweep.start, sweep.end, sweep.step), (16, 64, 16));
        assert!(parse_sweep("16:64").is_err());
        assert!(parse_sweep("16:64:16:4").is_err());
        assert!(parse_sweep("a:b:c").is_err());
    }

    #[test]
    fn test_malformed_sweep_rejected_by_cli() {
        assert!(Cli::try_parse_from(["nestbench", "--sweep", "16:64"]).is_err());
        assert!(Cli::try_parse_from(["nestbench", "--sweep", "a:b:c"]).is_err());
        assert!(Cli::try_parse_from(["nestbench", "--sizes", "8", "--sweep", "8:16:8"]).is_err());
    }

    #[test]
    fn test_sweep_replaces_file_sizes() {
        let config = cli(&["--sweep", "8:24:8"])
            .apply(SimulationConfig::default().with_sizes(vec![100]))
            .unwrap();
        assert_eq!(config.sizes, vec![8, 16, 24]);
    }

    #[test]
    fn test_zero_step_sweep_is_a_config_error() {
        let result = cli(&["--sweep", "16:64:0"]).apply(SimulationConfig::default());
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }

    #[test]
    fn test_flags_override_file_values() {
        let file = SimulationConfig::default()
            .with_sizes(vec![100, 200])
            .with_repeat_count(9)
            .with_output(OutputFormat::Json);
        let config = cli(&[
            "--sizes",
            "8,12",
            "--kinds",
            "cubic,n2",
            "--repeat",
            "2",
            "--delay",
            "250ms",
            "--watchdog-timeout",
            "3s",
            "--format",
            "console",
        ])
        .apply(file)
        .unwrap();

        assert_eq!(config.sizes, vec![8, 12]);
        assert_eq!(config.kinds, vec![WorkloadKind::Cubic, WorkloadKind::Quadratic]);
        assert_eq!(config.repeat_count, 2);
        assert_eq!(config.trigger_delay, Duration::from_millis(250));
        assert_eq!(config.watchdog_timeout, Duration::from_secs(3));
        assert_eq!(config.output, OutputFormat::Console);
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let file = SimulationConfig::default()
            .with_sizes(vec![4, 8])
            .with_repeat_count(7)
            .with_output(OutputFormat::Json);
        let config = cli(&[]).apply(file.clone()).unwrap();
        assert_eq!(config, file);
    }

    #[test]
    fn test_unknown_kind_rejected_by_cli() {
        assert!(Cli::try_parse_from(["nestbench", "--kinds", "linear"]).is_err());
    }
}
