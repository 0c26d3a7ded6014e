//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Refrigeration unit threshold policy."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Compartment temperature above which the refrigeration unit runs.
pub const TEMPERATURE_LIMIT_C: f64 = 25.0;

/// Relative humidity above which the tick line carries an advisory.
pub const HUMIDITY_LIMIT_PCT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActuatorSignal {
    On,
    Off,
}

impl ActuatorSignal {
    pub fn is_on(self) -> bool {
        matches!(self, ActuatorSignal::On)
    }
}

impl fmt::Display for ActuatorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorSignal::On => f.write_str("ON"),
            ActuatorSignal::Off => f.write_str("OFF"),
        }
    }
}

/// Strict threshold, no hysteresis: exactly 25 °C keeps the unit off.
pub fn decide(temperature: f64) -> ActuatorSignal {
    if temperature > TEMPERATURE_LIMIT_C {
        ActuatorSignal::On
    } else {
        ActuatorSignal::Off
    }
}

/// Advisory only; never feeds into [`decide`].
pub fn humidity_alert(humidity: f64) -> bool {
    humidity > HUMIDITY_LIMIT_PCT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert_eq!(decide(26.0), ActuatorSignal::On);
        assert_eq!(decide(25.0), ActuatorSignal::Off);
        assert_eq!(decide(24.9), ActuatorSignal::Off);
        assert_eq!(decide(25.000_001), ActuatorSignal::On);
    }

    #[test]
    fn runaway_temperatures_stay_on() {
        assert!(decide(1_000.0).is_on());
        assert!(!decide(-40.0).is_on());
    }

    #[test]
    fn oscillation_flips_every_tick() {
        let signals: Vec<_> = [25.1, 24.9, 25.1, 24.9].into_iter().map(decide).collect();
        assert_eq!(
            signals,
            vec![
                ActuatorSignal::On,
                ActuatorSignal::Off,
                ActuatorSignal::On,
                ActuatorSignal::Off
            ]
        );
    }

    #[test]
    fn humidity_advisory_is_strict() {
        assert!(humidity_alert(70.5));
        assert!(!humidity_alert(70.0));
        assert!(!humidity_alert(12.0));
    }

    #[test]
    fn signal_renders_for_operators() {
        assert_eq!(ActuatorSignal::On.to_string(), "ON");
        assert_eq!(
            serde_json::to_string(&ActuatorSignal::Off).unwrap(),
            "\"OFF\""
        );
    }
}
