use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

use crate::config::BusTimeConfig;
use crate::error::BusTimeError;
use crate::fetch::{BasicClient, HttpClient, auth::UrlParam, fetch_bytes};
use crate::models::{Vehicle, Visit};
use crate::parser::{parse_stop_monitoring, parse_vehicle_monitoring};
use crate::services::transit_api::TransitApi;

/// `OperatorRef` sent on every query; line scoping is done through `LineRef`.
pub const OPERATOR_REF: &str = "MTA";

const STOP_MONITORING_PATH: &str = "stop-monitoring.json";
const VEHICLE_MONITORING_PATH: &str = "vehicle-monitoring.json";

/// Client for the MTA BusTime SIRI JSON endpoints.
#[derive(Debug)]
pub struct BusTimeClient<C = UrlParam<BasicClient>> {
    http: C,
    base_url: Url,
}

impl BusTimeClient {
    /// Builds a client that sends `config.api_key` as the `key` parameter.
    pub fn new(config: &BusTimeConfig) -> Result<Self, BusTimeError> {
        let basic = BasicClient::with_timeout(config.timeout)?;
        Ok(Self::with_http(
            UrlParam::bustime(basic, config.api_key.clone()),
            config.base_url.clone(),
        ))
    }
}

impl<C: HttpClient> BusTimeClient<C> {
    /// Builds a client on top of an already-decorated [`HttpClient`].
    pub fn with_http(http: C, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, BusTimeError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| BusTimeError::Transport(format!("invalid endpoint {path}: {e}")))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    pub(crate) fn stop_monitoring_url(&self, stop_id: u32, line_ref: &str) -> Result<Url, BusTimeError> {
        let stop_id = stop_id.to_string();
        self.endpoint(
            STOP_MONITORING_PATH,
            &[
                ("OperatorRef", OPERATOR_REF),
                ("MonitoringRef", stop_id.as_str()),
                ("LineRef", line_ref),
            ],
        )
    }

    pub(crate) fn vehicle_monitoring_url(&self, vehicle_ref: &str, line_ref: &str) -> Result<Url, BusTimeError> {
        self.endpoint(
            VEHICLE_MONITORING_PATH,
            &[
                ("OperatorRef", OPERATOR_REF),
                ("VehicleRef", vehicle_ref),
                ("LineRef", line_ref),
            ],
        )
    }
}

#[async_trait]
impl<C: HttpClient> TransitApi for BusTimeClient<C> {
    #[instrument(skip(self))]
    async fn stop_visits(&self, stop_id: u32, line_ref: &str) -> Result<Vec<Visit>, BusTimeError> {
        let url = self.stop_monitoring_url(stop_id, line_ref)?;
        let body = fetch_bytes(&self.http, url).await?;
        let visits = parse_stop_monitoring(&body)?;
        debug!(visits = visits.len(), "Stop visits fetched");
        Ok(visits)
    }

    #[instrument(skip(self))]
    async fn vehicle(&self, vehicle_ref: &str, line_ref: &str) -> Result<Vehicle, BusTimeError> {
        let url = self.vehicle_monitoring_url(vehicle_ref, line_ref)?;
        let body = fetch_bytes(&self.http, url).await?;
        let vehicle = parse_vehicle_monitoring(&body, vehicle_ref, line_ref)?;
        debug!(current_stop = vehicle.current_stop(), "Vehicle resolved");
        Ok(vehicle)
    }
}
