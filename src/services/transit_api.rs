//! Trait for real-time arrival lookups against a transit API.

use async_trait::async_trait;

use crate::error::BusTimeError;
use crate::models::{Vehicle, Visit};

/// Abstraction over a real-time bus arrival provider (e.g., MTA BusTime).
#[async_trait]
pub trait TransitApi: Send + Sync {
    /// Returns the buses on `line_ref` currently heading to `stop_id`, in the
    /// order the provider reports them.
    async fn stop_visits(&self, stop_id: u32, line_ref: &str) -> Result<Vec<Visit>, BusTimeError>;

    /// Resolves a single bus and the stop it is currently at.
    ///
    /// Returns [`BusTimeError::VehicleNotFound`] if the provider knows no
    /// activity for the refs.
    async fn vehicle(&self, vehicle_ref: &str, line_ref: &str) -> Result<Vehicle, BusTimeError>;
}
