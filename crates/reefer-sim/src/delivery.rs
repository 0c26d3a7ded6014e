//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Delivery lifecycle state shared with the tick loop."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::errors::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Stopped,
    Running,
}

impl DeliveryStatus {
    pub fn is_running(self) -> bool {
        matches!(self, DeliveryStatus::Running)
    }
}

/// Sole writer of the delivery status. Workers observe it through
/// [`DeliveryController::subscribe`].
#[derive(Debug)]
pub struct DeliveryController {
    status: watch::Sender<DeliveryStatus>,
}

impl Default for DeliveryController {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryController {
    pub fn new() -> Self {
        let (status, _) = watch::channel(DeliveryStatus::Stopped);
        Self { status }
    }

    pub fn status(&self) -> DeliveryStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeliveryStatus> {
        self.status.subscribe()
    }

    /// Truck leaves for delivery.
    pub fn start(&self) -> Result<(), LifecycleError> {
        self.transition(DeliveryStatus::Stopped, DeliveryStatus::Running)?;
        info!("delivery started: truck left for delivery");
        Ok(())
    }

    /// Truck reached its destination.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        self.transition(DeliveryStatus::Running, DeliveryStatus::Stopped)?;
        info!("delivery finished: truck reached destination");
        Ok(())
    }

    fn transition(&self, from: DeliveryStatus, to: DeliveryStatus) -> Result<(), LifecycleError> {
        let mut rejected = None;
        self.status.send_if_modified(|current| {
            if *current == from {
                *current = to;
                true
            } else {
                rejected = Some(*current);
                false
            }
        });
        match rejected {
            None => Ok(()),
            Some(DeliveryStatus::Running) => Err(LifecycleError::AlreadyRunning),
            Some(DeliveryStatus::Stopped) => Err(LifecycleError::NotRunning),
        }
    }
}
