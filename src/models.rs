//! Domain records built from SIRI responses.
//!
//! Fields are private: a [`Visit`] or [`Vehicle`] only exists if its
//! factory found every field it needs in the raw response.

use crate::error::BusTimeError;
use crate::siri::{MonitoredStopVisit, MonitoredVehicleJourney, VehicleMonitoringDelivery};

/// A bus currently heading to the queried stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    line: String,
    line_ref: String,
    vehicle_ref: String,
    stops_away: u32,
}

impl Visit {
    /// Builds a visit from one `MonitoredStopVisit` element.
    pub fn from_raw(raw: &MonitoredStopVisit) -> Result<Self, BusTimeError> {
        let journey = raw
            .monitored_vehicle_journey
            .as_ref()
            .ok_or_else(|| missing("MonitoredStopVisit.MonitoredVehicleJourney"))?;
        let stops_away = journey
            .monitored_call
            .as_ref()
            .and_then(|call| call.extensions.as_ref())
            .and_then(|ext| ext.distances.as_ref())
            .and_then(|d| d.stops_from_call)
            .ok_or_else(|| missing("MonitoredCall.Extensions.Distances.StopsFromCall"))?;

        Ok(Self {
            line: required(&journey.published_line_name, "PublishedLineName")?,
            line_ref: required(&journey.line_ref, "LineRef")?,
            vehicle_ref: required(&journey.vehicle_ref, "VehicleRef")?,
            stops_away,
        })
    }

    /// Published line name, e.g. `Q18`.
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn line_ref(&self) -> &str {
        &self.line_ref
    }

    pub fn vehicle_ref(&self) -> &str {
        &self.vehicle_ref
    }

    pub fn stops_away(&self) -> u32 {
        self.stops_away
    }
}

/// A bus resolved from a visit, with the stop it is currently at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    vehicle_ref: String,
    current_stop: String,
}

impl Vehicle {
    /// Builds a vehicle from a vehicle-monitoring delivery list.
    ///
    /// `vehicle_ref` and `line_ref` are the refs the lookup was made with and
    /// only identify the request in the not-found error.
    pub fn from_deliveries(
        deliveries: &[VehicleMonitoringDelivery],
        vehicle_ref: &str,
        line_ref: &str,
    ) -> Result<Self, BusTimeError> {
        let activity = deliveries
            .first()
            .and_then(|d| d.vehicle_activity.first())
            .ok_or_else(|| BusTimeError::VehicleNotFound {
                vehicle_ref: vehicle_ref.to_string(),
                line_ref: line_ref.to_string(),
            })?;
        let journey = activity
            .monitored_vehicle_journey
            .as_ref()
            .ok_or_else(|| missing("VehicleActivity.MonitoredVehicleJourney"))?;
        Self::from_journey(journey)
    }

    fn from_journey(journey: &MonitoredVehicleJourney) -> Result<Self, BusTimeError> {
        let current_stop = journey
            .monitored_call
            .as_ref()
            .and_then(|call| call.stop_point_name.clone())
            .ok_or_else(|| missing("MonitoredCall.StopPointName"))?;
        Ok(Self {
            vehicle_ref: required(&journey.vehicle_ref, "VehicleRef")?,
            current_stop,
        })
    }

    pub fn vehicle_ref(&self) -> &str {
        &self.vehicle_ref
    }

    /// Name of the stop the bus is at or approaching.
    pub fn current_stop(&self) -> &str {
        &self.current_stop
    }
}

fn required(field: &Option<String>, name: &str) -> Result<String, BusTimeError> {
    field.clone().ok_or_else(|| missing(name))
}

fn missing(path: &str) -> BusTimeError {
    BusTimeError::MalformedResponse(format!("missing {path}"))
}
