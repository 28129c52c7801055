use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use super::{LookupError, MapProvider, Service};
use crate::config::EndpointConfig;
use crate::domain::{Coordinates, LocationQuery, LocationResult, MapImage, MapRequest};

const USER_AGENT: &str = concat!("mapview/", env!("CARGO_PKG_VERSION"));

/// Raw MapQuest geocoding response
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    info: Option<Info>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// Status block MapQuest attaches to every geocoding response
#[derive(Debug, Deserialize)]
struct Info {
    #[serde(default)]
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    #[serde(default)]
    street: Option<String>,
    /// City
    #[serde(default)]
    admin_area5: Option<String>,
    /// State or province
    #[serde(default)]
    admin_area3: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// MapQuest geocoding and static map client.
///
/// Holds one blocking HTTP client that is reused for every request.
pub struct MapQuest {
    client: Client,
    api_key: String,
    endpoints: EndpointConfig,
}

impl MapQuest {
    pub fn new(api_key: impl Into<String>, endpoints: EndpointConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(endpoints.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoints,
        })
    }

    fn get(
        &self,
        service: Service,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Response, LookupError> {
        log::debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .map_err(|e| LookupError::transport(service, e))?;

        if !response.status().is_success() {
            return Err(LookupError::Status {
                service,
                status: response.status().to_string(),
            });
        }
        Ok(response)
    }
}

impl MapProvider for MapQuest {
    fn geocode(&self, query: &LocationQuery) -> Result<LocationResult, LookupError> {
        let params = geocode_params(query);
        let body = self
            .get(Service::Geocoding, &self.endpoints.geocode_url, &params)?
            .text()
            .map_err(|e| LookupError::transport(Service::Geocoding, e))?;

        parse_geocode_response(&body, query)
    }

    fn static_map(&self, request: MapRequest) -> Result<MapImage, LookupError> {
        let params = static_map_params(&request, &self.endpoints.marker);
        let bytes = self
            .get(Service::StaticMap, &self.endpoints.static_map_url, &params)?
            .bytes()
            .map_err(|e| LookupError::transport(Service::StaticMap, e))?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| LookupError::malformed(Service::StaticMap, e))?;

        let wanted = request.resolution();
        if (image.width(), image.height()) != (wanted.width(), wanted.height()) {
            log::warn!(
                "Requested a {} map but received {}x{}",
                wanted,
                image.width(),
                image.height()
            );
        }

        Ok(MapImage::new(image, request))
    }
}

/// Query parameters for a geocode, minus the API key
fn geocode_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    vec![
        ("location", query.as_str().to_string()),
        // Only the best match is used
        ("maxResults", "1".to_string()),
    ]
}

/// Query parameters for a static map, minus the API key
fn static_map_params(request: &MapRequest, marker: &str) -> Vec<(&'static str, String)> {
    let center = request.center().to_param();
    vec![
        ("center", center.clone()),
        ("size", request.resolution().to_param()),
        ("zoom", request.zoom().to_string()),
        // Drops a marker on the searched location
        ("locations", center),
        ("type", request.style().as_param().to_string()),
        ("defaultMarker", marker.to_string()),
    ]
}

/// Extract the first location from a geocoding response body
fn parse_geocode_response(body: &str, query: &LocationQuery) -> Result<LocationResult, LookupError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| LookupError::malformed(Service::Geocoding, e))?;

    if let Some(info) = response.info
        && info.statuscode != 0
    {
        let detail = info
            .messages
            .into_iter()
            .next()
            .unwrap_or_else(|| "no details".to_string());
        return Err(LookupError::Status {
            service: Service::Geocoding,
            status: format!("{} ({})", info.statuscode, detail),
        });
    }

    let location = response
        .results
        .into_iter()
        .next()
        .and_then(|result| result.locations.into_iter().next())
        .ok_or_else(|| LookupError::NotFound(query.to_string()))?;

    let coordinates = Coordinates::new(location.lat_lng.lat, location.lat_lng.lng)
        .map_err(|e| LookupError::malformed(Service::Geocoding, e))?;

    Ok(LocationResult {
        coordinates,
        street: non_empty(location.street),
        city: non_empty(location.admin_area5),
        state: non_empty(location.admin_area3),
        postal_code: non_empty(location.postal_code),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
