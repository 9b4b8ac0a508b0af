mod client;

pub use client::{BusTimeClient, OPERATOR_REF};
