//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Error types for the reefer simulation engine."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid walk parameters: {0}")]
    InvalidParameters(String),
    #[error("simulation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Rejected delivery lifecycle transitions. The status is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("delivery already in progress")]
    AlreadyRunning,
    #[error("no delivery in progress")]
    NotRunning,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("endpoint answered {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("telemetry request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
