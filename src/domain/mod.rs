pub mod location;
pub mod map;

pub use location::{Coordinates, LocationQuery, LocationResult};
pub use map::{MapImage, MapRequest, MapSettings, MapStyle, RESOLUTION_PRESETS, Resolution, Zoom};

use thiserror::Error;

/// User input rejected before anything is sent upstream
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Please enter a location")]
    EmptyQuery,
    #[error("Zoom must be between 1 and 20, got {0}")]
    ZoomOutOfRange(i64),
    #[error("Zoom must be a whole number, got {0:?}")]
    MalformedZoom(String),
    #[error("Resolution must look like WIDTHxHEIGHT (e.g. 1024x768) or name a preset, got {0:?}")]
    MalformedResolution(String),
    #[error("Resolution {width}x{height} is outside 1x1 to 1920x1920")]
    ResolutionOutOfRange { width: u32, height: u32 },
    #[error("Unknown map style {0:?} (expected map, hyb, sat, light or dark)")]
    UnknownStyle(String),
    #[error("Coordinates ({latitude}, {longitude}) are out of range")]
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },
    #[error("Unknown command {0:?} (type :help for a list)")]
    UnknownCommand(String),
}
