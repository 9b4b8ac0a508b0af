//! Reports how far the next buses are from a stop using the MTA BusTime
//! SIRI API.
//!
//! [`services::transit_api::TransitApi`] is the lookup interface,
//! implemented over HTTP by [`infra::bustime::BusTimeClient`].
//! [`output::write_report`] drives the lookups and formats the result.

pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod models;
pub mod output;
pub mod parser;
pub mod services;
pub mod siri;
pub mod stops;
