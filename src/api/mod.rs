pub mod error;
pub mod mapquest;

pub use error::{LookupError, Service};
pub use mapquest::MapQuest;

use crate::domain::{LocationQuery, LocationResult, MapImage, MapRequest, MapSettings};

/// A source of geocodes and static maps
pub trait MapProvider {
    /// Resolve an address to its best match.
    ///
    /// Returns [`LookupError::NotFound`] when the service has no match.
    fn geocode(&self, query: &LocationQuery) -> Result<LocationResult, LookupError>;

    /// Fetch and decode the map image for a request
    fn static_map(&self, request: MapRequest) -> Result<MapImage, LookupError>;
}

/// Geocode `query`, then fetch a map centered on the result.
///
/// The returned image carries the location it was rendered for, so the two
/// are always displayed together.
pub fn search<P: MapProvider + ?Sized>(
    provider: &P,
    query: &LocationQuery,
    settings: &MapSettings,
) -> Result<MapImage, LookupError> {
    let location = provider.geocode(query)?;
    log::info!(
        "Resolved {:?} -> ({:.6}, {:.6})",
        query.as_str(),
        location.latitude(),
        location.longitude()
    );
    provider.static_map(MapRequest::new(location, *settings))
}
