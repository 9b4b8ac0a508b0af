//! Serde model of the parts of the BusTime SIRI JSON envelope this tool reads.
//!
//! Everything below `ServiceDelivery` is optional so that absent nodes can be
//! told apart from malformed ones when converting into [`crate::models`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

/// Top-level `{"Siri": {...}}` wrapper shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct SiriResponse {
    #[serde(rename = "Siri")]
    pub siri: Siri,
}

#[derive(Debug, Deserialize)]
pub struct Siri {
    #[serde(rename = "ServiceDelivery")]
    pub service_delivery: ServiceDelivery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDelivery {
    #[serde(default)]
    pub response_timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub stop_monitoring_delivery: Option<Vec<StopMonitoringDelivery>>,
    /// Present on vehicle-monitoring responses. On a stop-monitoring response
    /// it signals a rejected API key, even when its value is `null`.
    #[serde(default, deserialize_with = "present")]
    pub vehicle_monitoring_delivery: Option<Vec<VehicleMonitoringDelivery>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringDelivery {
    #[serde(default)]
    pub monitored_stop_visit: Vec<MonitoredStopVisit>,
    #[serde(default)]
    pub error_condition: Option<ErrorCondition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleMonitoringDelivery {
    #[serde(default)]
    pub vehicle_activity: Vec<VehicleActivity>,
    #[serde(default)]
    pub error_condition: Option<ErrorCondition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorCondition {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub other_error: Option<OtherError>,
}

impl ErrorCondition {
    /// The human-readable reason, preferring `Description`.
    pub fn message(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.other_error.as_ref().and_then(|o| o.error_text.clone()))
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OtherError {
    #[serde(default)]
    pub error_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredStopVisit {
    #[serde(default)]
    pub monitored_vehicle_journey: Option<MonitoredVehicleJourney>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleActivity {
    #[serde(default)]
    pub monitored_vehicle_journey: Option<MonitoredVehicleJourney>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredVehicleJourney {
    #[serde(default)]
    pub line_ref: Option<String>,
    #[serde(default)]
    pub published_line_name: Option<String>,
    #[serde(default)]
    pub vehicle_ref: Option<String>,
    #[serde(default)]
    pub monitored_call: Option<MonitoredCall>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredCall {
    #[serde(default)]
    pub stop_point_name: Option<String>,
    #[serde(default)]
    pub extensions: Option<CallExtensions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallExtensions {
    #[serde(default)]
    pub distances: Option<Distances>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Distances {
    #[serde(default)]
    pub stops_from_call: Option<u32>,
}

/// Deserializes a field that is `Some` whenever its key appears, mapping an
/// explicit `null` to `T::default()`. Pair with `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?.unwrap_or_default()))
}
