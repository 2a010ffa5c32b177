//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::MoveMethod;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Grid dimensions and initial seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length N of the square grid
    pub size: usize,
    /// Probability that a cell starts occupied (0.0 to 1.0)
    pub density: f64,
    /// Random seed for reproducibility; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 100,
            density: 0.1,
            seed: None,
        }
    }
}

/// Update engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of N² cells attempted as candidate moves per tick
    pub move_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { move_fraction: 0.20 }
    }
}

/// Initial control values and the range the control surface accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub temperature: f64,
    pub move_method: MoveMethod,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            move_method: MoveMethod::Adjacent,
            min_temperature: 0.01,
            max_temperature: 5.0,
        }
    }
}

/// Tick scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period between ticks (milliseconds)
    pub period_ms: u64,
    /// Stop after this many ticks; run until shutdown when `None`
    pub max_ticks: Option<u64>,
    /// Emit a summary log line every N ticks
    pub log_every_ticks: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ms: 10,
            max_ticks: None,
            log_every_ticks: 1000,
        }
    }
}

/// Raster rendering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of one cell in pixels
    pub cell_size: usize,
    pub occupied_color: [u8; 3],
    pub empty_color: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 5,
            occupied_color: [0x60, 0x60, 0xff],
            empty_color: [0xff, 0xff, 0xff],
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            otel_endpoint: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub controls: ControlConfig,
    pub scheduler: SchedulerConfig,
    pub render: RenderConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.grid.size == 0 {
            return Err(Error::InvalidConfig("grid size must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.grid.density) {
            return Err(Error::InvalidConfig(format!(
                "grid density {} outside [0, 1]",
                self.grid.density
            )));
        }
        if !(0.0..=1.0).contains(&self.engine.move_fraction) {
            return Err(Error::InvalidConfig(format!(
                "move fraction {} outside [0, 1]",
                self.engine.move_fraction
            )));
        }
        let c = &self.controls;
        if !(c.min_temperature > 0.0 && c.min_temperature <= c.max_temperature) {
            return Err(Error::InvalidConfig(format!(
                "temperature range [{}, {}] is empty or not positive",
                c.min_temperature, c.max_temperature
            )));
        }
        if !(c.min_temperature..=c.max_temperature).contains(&c.temperature) {
            return Err(Error::InvalidConfig(format!(
                "initial temperature {} outside [{}, {}]",
                c.temperature, c.min_temperature, c.max_temperature
            )));
        }
        if self.render.cell_size == 0 {
            return Err(Error::InvalidConfig("cell size must be positive".to_string()));
        }
        if self.scheduler.period_ms == 0 {
            return Err(Error::InvalidConfig("tick period must be positive".to_string()));
        }
        Ok(())
    }
}

/// Immutable per-tick snapshot of the control values.
///
/// The engine reads this once at the start of a tick and applies it to every
/// candidate move of that tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickParams {
    pub temperature: f64,
    pub move_method: MoveMethod,
}

impl TickParams {
    pub fn new(temperature: f64, move_method: MoveMethod) -> Self {
        Self {
            temperature,
            move_method,
        }
    }

    /// Build a snapshot from a raw selector string, as handed over by a
    /// control surface.
    pub fn from_selector(temperature: f64, selector: &str) -> Result<Self> {
        Ok(Self::new(temperature, selector.parse()?))
    }
}

impl From<&ControlConfig> for TickParams {
    fn from(config: &ControlConfig) -> Self {
        Self::new(config.temperature, config.move_method)
    }
}
