//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sensor state and telemetry payload types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Cargo compartment reading owned by the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Degrees Celsius. Not clamped.
    pub temperature: f64,
    /// Relative humidity in percent, kept within `[0, 100]`.
    pub humidity: f64,
}

impl SensorState {
    pub const HUMIDITY_MIN: f64 = 0.0;
    pub const HUMIDITY_MAX: f64 = 100.0;

    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity: clamp_humidity(humidity),
        }
    }

    pub fn payload(&self) -> TelemetryPayload {
        TelemetryPayload::from(*self)
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature: {:.2} °C, humidity: {:.2} %",
            self.temperature, self.humidity
        )
    }
}

pub(crate) fn clamp_humidity(value: f64) -> f64 {
    value.clamp(SensorState::HUMIDITY_MIN, SensorState::HUMIDITY_MAX)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// JSON body posted to the device telemetry endpoint. Key names are the ones
/// the dashboard widgets are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "umidade")]
    pub humidity: f64,
}

impl From<SensorState> for TelemetryPayload {
    fn from(state: SensorState) -> Self {
        Self {
            temperature: state.temperature,
            humidity: state.humidity,
        }
    }
}
