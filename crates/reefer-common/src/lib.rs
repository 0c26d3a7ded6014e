//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives for the reefer simulator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the reefer telemetry simulator.
//! This crate exposes configuration loading and logging bootstrap consumed by
//! the simulation crate and the `reeferd` binary.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, ConfigError, LoadedAppConfig, LoggingConfig, SimulationConfig, ThingsboardConfig,
};
pub use logging::{init_tracing, LogFormat};
