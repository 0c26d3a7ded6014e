//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulation runtime module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Refrigerated truck sensor simulation.
//!
//! A [`RandomWalkGenerator`] feeds a [`TickScheduler`] that publishes each
//! reading through a [`TelemetrySink`] and reports the refrigeration decision
//! while the [`DeliveryController`] keeps the delivery running.

pub mod actuator;
pub mod delivery;
pub mod errors;
pub mod frames;
pub mod generator;
pub mod publisher;
pub mod scheduler;

pub use actuator::{decide, humidity_alert, ActuatorSignal, HUMIDITY_LIMIT_PCT, TEMPERATURE_LIMIT_C};
pub use delivery::{DeliveryController, DeliveryStatus};
pub use errors::{LifecycleError, PublishError, SimulationError};
pub use frames::{SensorState, TelemetryPayload};
pub use generator::{apply_deltas, RandomWalkGenerator, SensorSource, WalkParameters};
pub use publisher::{HttpTelemetryPublisher, TelemetrySink};
pub use scheduler::{run_delivery, run_delivery_until, RunSummary, TickReport, TickScheduler};
