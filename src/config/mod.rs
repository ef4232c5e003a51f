//! Configuration management module
//!
//! Handles loading, saving, and validation of the simulation matrix and
//! runtime settings.

use crate::bench::{ScheduleMatrix, WorkloadKind};
use crate::{HarnessError, Result, APP_NAME, CONFIG_FILE, MAX_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Simulation configuration: the schedule matrix plus runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Workload sizes, strictly ascending
    pub sizes: Vec<u32>,
    /// Workload kinds, in traversal order
    pub kinds: Vec<WorkloadKind>,
    /// Runs per (size, kind) cell
    pub repeat_count: u32,
    /// Delay between start and the first run
    #[serde(with = "humantime_duration")]
    pub trigger_delay: Duration,
    /// Window of the software watchdog standing in for the hardware one
    #[serde(with = "humantime_duration")]
    pub watchdog_timeout: Duration,
    /// How report lines are rendered
    pub output: OutputFormat,
}

/// Report rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text lines
    Text,
    /// One JSON object per line
    Json,
    /// Text lines above a progress bar
    Console,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sizes: vec![16, 32, 48, 64],
            kinds: WorkloadKind::ALL.to_vec(),
            repeat_count: 5,
            trigger_delay: Duration::from_secs(2),
            watchdog_timeout: Duration::from_secs(1),
            output: OutputFormat::Text,
        }
    }
}

/// Inclusive arithmetic sequence of sizes, e.g. `size_sweep(16, 64, 16)`
/// gives `[16, 32, 48, 64]`. An empty range yields no sizes.
pub fn size_sweep(start: u32, end: u32, step: u32) -> Result<Vec<u32>> {
    if step == 0 {
        return Err(HarnessError::Config(
            "Size sweep step must be greater than 0".to_string(),
        ));
    }
    Ok((start..=end).step_by(step as usize).collect())
}

impl SimulationConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// Empty size or kind lists and a zero repeat count are valid: they
    /// produce a matrix with no runs.
    pub fn validate(&self) -> Result<()> {
        if let Some(pair) = self.sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(HarnessError::Config(format!(
                "Sizes must be strictly ascending ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        if let Some(&size) = self.sizes.iter().find(|&&s| s > MAX_SIZE) {
            return Err(HarnessError::Config(format!(
                "Size too large: {} (max: {})",
                size, MAX_SIZE
            )));
        }

        for (i, kind) in self.kinds.iter().enumerate() {
            if self.kinds[..i].contains(kind) {
                return Err(HarnessError::Config(format!(
                    "Workload kind listed twice: {}",
                    kind
                )));
            }
        }

        const MAX_TRIGGER_DELAY: Duration = Duration::from_secs(3600);
        if self.trigger_delay > MAX_TRIGGER_DELAY {
            return Err(HarnessError::Config(format!(
                "Trigger delay too long: {}s (max: {}s)",
                self.trigger_delay.as_secs(),
                MAX_TRIGGER_DELAY.as_secs()
            )));
        }

        if self.watchdog_timeout.is_zero() {
            return Err(HarnessError::Config(
                "Watchdog timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the schedule matrix described by this configuration
    pub fn matrix(&self) -> ScheduleMatrix {
        ScheduleMatrix::new(self.sizes.clone(), self.kinds.clone(), self.repeat_count)
    }

    /// Set the workload sizes
    pub fn with_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set the sizes from an inclusive sweep
    pub fn with_sweep(mut self, start: u32, end: u32, step: u32) -> Result<Self> {
        self.sizes = size_sweep(start, end, step)?;
        Ok(self)
    }

    /// Set the workload kinds
    pub fn with_kinds(mut self, kinds: Vec<WorkloadKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set the number of runs per cell
    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// Set the trigger delay
    pub fn with_trigger_delay(mut self, delay: Duration) -> Self {
        self.trigger_delay = delay;
        self
    }

    /// Set the watchdog timeout
    pub fn with_watchdog_timeout(mut self, timeout: Duration) -> Self {
        self.watchdog_timeout = timeout;
        self
    }

    /// Set the output format
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            HarnessError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate and write configuration to a TOML file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HarnessError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = self.to_toml()?;

        fs::write(path, content).map_err(|e| {
            HarnessError::Config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/nestbench/nestbench.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            HarnessError::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Console => "console",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "console" => Ok(OutputFormat::Console),
            other => Err(HarnessError::Config(format!(
                "Unknown output format: {} (expected text, json or console)",
                other
            ))),
        }
    }
}

// Durations are written as humantime strings such as "2s" or "500ms"
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
