//! JSON decoding of BusTime SIRI responses into domain records.

use tracing::debug;

use crate::error::BusTimeError;
use crate::models::{Vehicle, Visit};
use crate::siri::SiriResponse;

/// Decodes a stop-monitoring response body into the visits it reports.
///
/// # Errors
///
/// - [`BusTimeError::InvalidApiKey`] if the delivery carries a
///   `VehicleMonitoringDelivery` node, which is how BusTime answers a bad key.
/// - [`BusTimeError::Upstream`] if the first delivery has an `ErrorCondition`.
/// - [`BusTimeError::MalformedResponse`] if the body is not the expected JSON.
pub fn parse_stop_monitoring(bytes: &[u8]) -> Result<Vec<Visit>, BusTimeError> {
    let response: SiriResponse = serde_json::from_slice(bytes)?;
    let delivery = response.siri.service_delivery;
    debug!(response_timestamp = ?delivery.response_timestamp, "Decoded stop-monitoring response");

    if delivery.vehicle_monitoring_delivery.is_some() {
        return Err(BusTimeError::InvalidApiKey);
    }

    let stop_monitoring = delivery
        .stop_monitoring_delivery
        .as_deref()
        .and_then(<[_]>::first)
        .ok_or_else(|| BusTimeError::MalformedResponse("missing StopMonitoringDelivery".to_string()))?;

    if let Some(err) = &stop_monitoring.error_condition {
        return Err(BusTimeError::Upstream {
            description: err.message(),
        });
    }

    stop_monitoring
        .monitored_stop_visit
        .iter()
        .map(Visit::from_raw)
        .collect()
}

/// Decodes a vehicle-monitoring response body for the given refs.
pub fn parse_vehicle_monitoring(
    bytes: &[u8],
    vehicle_ref: &str,
    line_ref: &str,
) -> Result<Vehicle, BusTimeError> {
    let response: SiriResponse = serde_json::from_slice(bytes)?;
    let delivery = response.siri.service_delivery;
    debug!(response_timestamp = ?delivery.response_timestamp, "Decoded vehicle-monitoring response");

    let deliveries = delivery.vehicle_monitoring_delivery.unwrap_or_default();
    if let Some(err) = deliveries.first().and_then(|d| d.error_condition.as_ref()) {
        return Err(BusTimeError::Upstream {
            description: err.message(),
        });
    }
    Vehicle::from_deliveries(&deliveries, vehicle_ref, line_ref)
}
