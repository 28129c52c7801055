//! mapview - Geocode an address with MapQuest and fetch a static map of it

pub mod api;
pub mod app;
pub mod config;
pub mod domain;

pub use api::{LookupError, MapProvider, MapQuest, search};
pub use app::{AppState, Status, View, render};
pub use domain::{LocationQuery, LocationResult, MapImage, MapRequest, MapSettings, MapStyle};
