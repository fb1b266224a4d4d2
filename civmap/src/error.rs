use crate::{marker::MarkerId, viewport::ViewportState};
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Coordinate ({lat}, {lon}) is not finite"))]
    NonFiniteCoordinate { lat: f64, lon: f64 },

    #[snafu(display("Invalid color {value:?}, expected #RRGGBB"))]
    InvalidColor { value: String },

    #[snafu(display("Unknown category {label:?}"))]
    UnknownCategory { label: String },

    #[snafu(display("Unknown status {label:?}"))]
    UnknownStatus { label: String },

    /// The external mapping capability failed.
    #[snafu(display("Map provider error: {message}"))]
    Provider { message: String },

    #[snafu(display("Viewport cannot move from {from:?} to {to:?}"))]
    InvalidTransition {
        from: ViewportState,
        to: ViewportState,
    },

    #[snafu(display("No marker with id {id}"))]
    UnknownMarker { id: MarkerId },

    #[snafu(display("No marker id left after {id}"))]
    MarkerIdsExhausted { id: MarkerId },

    #[snafu(display("Marker id {id} is used more than once"))]
    DuplicateMarker { id: MarkerId },

    #[snafu(display("A report needs an address"))]
    EmptyAddress,
}

impl Error {
    /// Convenience for [`crate::MapProvider`] implementations.
    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider {
            message: message.into(),
        }
    }
}
