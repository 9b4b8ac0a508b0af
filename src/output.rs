//! Turns stop visits into the lines printed for the user.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use tracing::{info, warn};

use crate::config::StopQuery;
use crate::error::BusTimeError;
use crate::models::Visit;
use crate::services::transit_api::TransitApi;

/// Upper bound on visits reported per run, so one run costs at most
/// `1 + MAX_VISITS` API calls.
pub const MAX_VISITS: usize = 3;

/// Buses closer than this many stops get the extra nudge.
pub const HURRY_THRESHOLD: u32 = 5;

pub const NO_BUSES_MESSAGE: &str =
    "Sorry, no buses are coming right now. Time for the subway or a cab?";
pub const HURRY_MESSAGE: &str = "You better get moving!";

/// What to do when a visit's vehicle cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingVehiclePolicy {
    /// Stop the report with an error.
    Abort,
    /// Report the bus without its location and carry on.
    #[default]
    Skip,
}

/// Looks up the visits for `query` and writes one report line per bus.
///
/// At most [`MAX_VISITS`] vehicles are looked up, in the order the API
/// returned them.
#[tracing::instrument(skip(api, out), fields(stop = query.stop.name, line_ref = %query.line_ref))]
pub async fn write_report<A, W>(
    api: &A,
    query: &StopQuery,
    policy: MissingVehiclePolicy,
    out: &mut W,
) -> Result<()>
where
    A: TransitApi + ?Sized,
    W: Write,
{
    let visits = api.stop_visits(query.stop.id, &query.line_ref).await?;
    info!(visits = visits.len(), "Stop visits received");

    if visits.is_empty() {
        writeln!(out, "{NO_BUSES_MESSAGE}")?;
        return Ok(());
    }

    for visit in visits.iter().take(MAX_VISITS) {
        let current_stop = match api.vehicle(visit.vehicle_ref(), visit.line_ref()).await {
            Ok(vehicle) => Some(vehicle.current_stop().to_string()),
            Err(err @ BusTimeError::VehicleNotFound { .. }) => match policy {
                MissingVehiclePolicy::Abort => return Err(err.into()),
                MissingVehiclePolicy::Skip => {
                    warn!(error = %err, "Skipping vehicle location");
                    None
                }
            },
            Err(err) => return Err(err.into()),
        };
        write_visit(out, visit, current_stop.as_deref())?;
    }

    out.flush()?;
    Ok(())
}

/// Writes the line(s) for a single visit.
pub fn write_visit<W: Write>(out: &mut W, visit: &Visit, current_stop: Option<&str>) -> Result<()> {
    match current_stop {
        Some(stop) => writeln!(
            out,
            "There is a {} bus {} stops away at {}.",
            visit.line(),
            visit.stops_away(),
            stop
        )?,
        None => writeln!(
            out,
            "There is a {} bus {} stops away (current location unknown).",
            visit.line(),
            visit.stops_away()
        )?,
    }
    if visit.stops_away() < HURRY_THRESHOLD {
        writeln!(out, "{HURRY_MESSAGE}")?;
    }
    Ok(())
}
