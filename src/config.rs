//! Configuration file support for event studies.
//!
//! Allows loading study configurations from TOML files for reproducibility.

use crate::bootstrap::BootstrapConfig;
use crate::error::{EventStudyError, Result};
use crate::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete study configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyFileConfig {
    /// Input data locations.
    #[serde(default)]
    pub data: DataSettings,
    /// Event window around each announcement.
    #[serde(default)]
    pub window: WindowSettings,
    /// Bootstrap resampling settings.
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    /// Output file locations.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// CSV of earnings records.
    #[serde(default = "default_earnings_path")]
    pub earnings_path: PathBuf,
    /// Directory holding one `<SYMBOL>.csv` price file per symbol.
    #[serde(default = "default_prices_dir")]
    pub prices_dir: PathBuf,
    /// Symbol of the benchmark instrument.
    #[serde(default = "default_benchmark")]
    pub benchmark_symbol: String,
}

fn default_earnings_path() -> PathBuf { PathBuf::from("earnings.csv") }
fn default_prices_dir() -> PathBuf { PathBuf::from("prices") }
fn default_benchmark() -> String { "SPY".to_string() }

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            earnings_path: default_earnings_path(),
            prices_dir: default_prices_dir(),
            benchmark_symbol: default_benchmark(),
        }
    }
}

/// Event window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Trading days before the announcement.
    #[serde(default = "default_window_days")]
    pub pre_days: usize,
    /// Trading days after the announcement.
    #[serde(default = "default_window_days")]
    pub post_days: usize,
}

fn default_window_days() -> usize { 30 }

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            pre_days: 30,
            post_days: 30,
        }
    }
}

/// Bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Stocks drawn per group per iteration.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Fixed seed; omit for a fresh random seed each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_size() -> usize { 40 }
fn default_iterations() -> usize { 40 }

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            sample_size: 40,
            iterations: 40,
            seed: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Point-estimate CAAR table.
    #[serde(default = "default_caar_path")]
    pub caar_path: PathBuf,
    /// Bootstrapped CAAR table.
    #[serde(default = "default_bootstrap_path")]
    pub bootstrap_path: PathBuf,
}

fn default_caar_path() -> PathBuf { PathBuf::from("caar_data.csv") }
fn default_bootstrap_path() -> PathBuf { PathBuf::from("bootstrapped_caar.csv") }

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            caar_path: default_caar_path(),
            bootstrap_path: default_bootstrap_path(),
        }
    }
}

impl StudyFileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: StudyFileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EventStudyError::ConfigError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.pre_days + self.window.post_days == 0 {
            return Err(EventStudyError::ConfigError(
                "event window must span at least one day besides the announcement".to_string(),
            ));
        }
        if self.data.benchmark_symbol.trim().is_empty() {
            return Err(EventStudyError::ConfigError(
                "benchmark symbol must not be empty".to_string(),
            ));
        }
        self.bootstrap_config()
            .validate()
            .map_err(|e| EventStudyError::ConfigError(e.to_string()))
    }

    pub fn window_config(&self) -> WindowConfig {
        WindowConfig::new(self.window.pre_days, self.window.post_days)
    }

    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            sample_size: self.bootstrap.sample_size,
            iterations: self.bootstrap.iterations,
            seed: self.bootstrap.seed,
        }
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# Earnings event-study configuration

[data]
earnings_path = "earnings.csv"   # symbol,eps_estimate,actual_eps,earnings_date
prices_dir = "prices"            # one <SYMBOL>.csv per stock, plus the benchmark
benchmark_symbol = "SPY"

[window]
pre_days = 30    # day 0 is the first trading day on/after the earnings date
post_days = 30

[bootstrap]
sample_size = 40
iterations = 40
# seed = 42      # uncomment for reproducible sampling

[output]
caar_path = "caar_data.csv"
bootstrap_path = "bootstrapped_caar.csv"
"#
        .to_string()
    }
}
