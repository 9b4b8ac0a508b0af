//! The fixed table of stops this tool knows about.
//!
//! BusTime has no endpoint for looking stops up by name, so the monitoring
//! refs are hardcoded here and selected by their 1-based position.

/// A stop the user can select on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub name: &'static str,
    pub id: u32,
}

pub const STOPS: &[Stop] = &[
    Stop {
        name: "30th Ave & 36th Street",
        id: 550601,
    },
    Stop {
        name: "Woodside Ave - 60th Street",
        id: 550552,
    },
];

/// Returns the stop at a 1-based `position`, if there is one.
pub fn by_position(position: usize) -> Option<Stop> {
    position.checked_sub(1).and_then(|i| STOPS.get(i)).copied()
}

/// Numbered listing of [`STOPS`] for the `--stop` help text.
pub fn help_listing() -> String {
    STOPS
        .iter()
        .enumerate()
        .map(|(i, stop)| format!("    {}. {}", i + 1, stop.name))
        .collect::<Vec<_>>()
        .join("\n")
}
