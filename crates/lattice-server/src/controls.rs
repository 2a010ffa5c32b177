//! Operator controls read by the scheduler at the start of every tick.

use lattice_core::{ControlConfig, Error, MoveMethod, Result, TickParams};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Partial update; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct ControlUpdate {
    pub temperature: Option<f64>,
    pub move_method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlState {
    pub temperature: f64,
    pub move_method: MoveMethod,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

pub struct Controls {
    current: RwLock<TickParams>,
    min_temperature: f64,
    max_temperature: f64,
}

impl Controls {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            current: RwLock::new(TickParams::from(config)),
            min_temperature: config.min_temperature,
            max_temperature: config.max_temperature,
        }
    }

    /// Values for the next tick
    pub fn snapshot(&self) -> TickParams {
        *self.current.read()
    }

    pub fn state(&self) -> ControlState {
        let current = self.snapshot();
        ControlState {
            temperature: current.temperature,
            move_method: current.move_method,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        }
    }

    fn check_temperature(&self, temperature: f64) -> Result<()> {
        if (self.min_temperature..=self.max_temperature).contains(&temperature) {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "temperature {} outside [{}, {}]",
                temperature, self.min_temperature, self.max_temperature
            )))
        }
    }

    pub fn set_temperature(&self, temperature: f64) -> Result<()> {
        self.check_temperature(temperature)?;
        self.current.write().temperature = temperature;
        info!(temperature = %format!("{:.2}", temperature), "Temperature changed");
        Ok(())
    }

    pub fn set_move_method(&self, method: MoveMethod) {
        self.current.write().move_method = method;
        info!(move_method = %method, "Move method changed");
    }

    /// Validate the whole update before applying any of it
    pub fn apply(&self, update: ControlUpdate) -> Result<TickParams> {
        if let Some(temperature) = update.temperature {
            self.check_temperature(temperature)?;
        }
        let method = update
            .move_method
            .as_deref()
            .map(str::parse::<MoveMethod>)
            .transpose()?;

        if let Some(temperature) = update.temperature {
            self.set_temperature(temperature)?;
        }
        if let Some(method) = method {
            self.set_move_method(method);
        }
        Ok(self.snapshot())
    }
}
