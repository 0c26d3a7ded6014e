//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Bounded random walk over temperature and humidity."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use rand::distributions::Uniform;
use rand::prelude::*;
use rand_distr::Normal;

use crate::errors::SimulationError;
use crate::frames::{clamp_humidity, round2, SensorState};

/// Source of sensor readings driven by the tick loop.
pub trait SensorSource: Send {
    /// Produce the first reading of a delivery.
    fn initialize(&mut self) -> SensorState;
    /// Step the reading in place for the next tick.
    fn advance(&mut self, state: &mut SensorState);
}

/// Distribution parameters for the compartment random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParameters {
    pub temperature_mean: f64,
    pub temperature_stddev: f64,
    pub humidity_mean: f64,
    pub humidity_stddev: f64,
    /// Per-tick temperature change is drawn from `[-max, +max)`.
    pub max_temperature_step: f64,
    /// Per-tick humidity change is drawn from `[-max, +max)`.
    pub max_humidity_step: f64,
}

impl Default for WalkParameters {
    fn default() -> Self {
        Self {
            temperature_mean: 28.0,
            temperature_stddev: 2.0,
            humidity_mean: 80.0,
            humidity_stddev: 5.0,
            max_temperature_step: 0.5,
            max_humidity_step: 1.0,
        }
    }
}

impl WalkParameters {
    fn validate(&self) -> Result<(), SimulationError> {
        for (name, step) in [
            ("max_temperature_step", self.max_temperature_step),
            ("max_humidity_step", self.max_humidity_step),
        ] {
            if !step.is_finite() || step <= 0.0 {
                return Err(SimulationError::InvalidParameters(format!(
                    "{name} must be a positive finite number, got {step}"
                )));
            }
        }
        for (name, mean) in [
            ("temperature_mean", self.temperature_mean),
            ("humidity_mean", self.humidity_mean),
        ] {
            if !mean.is_finite() {
                return Err(SimulationError::InvalidParameters(format!(
                    "{name} must be finite, got {mean}"
                )));
            }
        }
        for (name, stddev) in [
            ("temperature_stddev", self.temperature_stddev),
            ("humidity_stddev", self.humidity_stddev),
        ] {
            if !stddev.is_finite() || stddev < 0.0 {
                return Err(SimulationError::InvalidParameters(format!(
                    "{name} must be a non-negative finite number, got {stddev}"
                )));
            }
        }
        Ok(())
    }
}

/// Apply one step of the walk. Humidity is clamped to `[0, 100]`; temperature
/// is left free so a hot compartment can keep drifting past the actuator
/// threshold.
pub fn apply_deltas(state: &mut SensorState, delta_temperature: f64, delta_humidity: f64) {
    state.temperature += delta_temperature;
    state.humidity = clamp_humidity(state.humidity + delta_humidity);
}

/// Gaussian start followed by a bounded uniform walk.
#[derive(Debug)]
pub struct RandomWalkGenerator<R = StdRng> {
    rng: R,
    initial_temperature: Normal<f64>,
    initial_humidity: Normal<f64>,
    temperature_step: Uniform<f64>,
    humidity_step: Uniform<f64>,
}

impl RandomWalkGenerator<StdRng> {
    /// Reproducible generator with the default parameters.
    pub fn seeded(seed: u64) -> Result<Self, SimulationError> {
        Self::with_rng(StdRng::seed_from_u64(seed), WalkParameters::default())
    }

    pub fn from_entropy() -> Result<Self, SimulationError> {
        Self::with_rng(StdRng::from_entropy(), WalkParameters::default())
    }
}

impl<R: Rng> RandomWalkGenerator<R> {
    pub fn with_rng(rng: R, params: WalkParameters) -> Result<Self, SimulationError> {
        params.validate()?;
        let initial_temperature = Normal::new(params.temperature_mean, params.temperature_stddev)
            .map_err(|err| {
                SimulationError::InvalidParameters(format!("temperature distribution: {err}"))
            })?;
        let initial_humidity = Normal::new(params.humidity_mean, params.humidity_stddev)
            .map_err(|err| {
                SimulationError::InvalidParameters(format!("humidity distribution: {err}"))
            })?;
        Ok(Self {
            rng,
            initial_temperature,
            initial_humidity,
            temperature_step: Uniform::new(
                -params.max_temperature_step,
                params.max_temperature_step,
            ),
            humidity_step: Uniform::new(-params.max_humidity_step, params.max_humidity_step),
        })
    }
}

impl<R: Rng + Send> SensorSource for RandomWalkGenerator<R> {
    fn initialize(&mut self) -> SensorState {
        let temperature = round2(self.initial_temperature.sample(&mut self.rng));
        let humidity = round2(self.initial_humidity.sample(&mut self.rng));
        SensorState::new(temperature, humidity)
    }

    fn advance(&mut self, state: &mut SensorState) {
        let delta_temperature = self.temperature_step.sample(&mut self.rng);
        let delta_humidity = self.humidity_step.sample(&mut self.rng);
        apply_deltas(state, delta_temperature, delta_humidity);
    }
}
