use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::DynamicImage;
use serde::Deserialize;

use super::{Coordinates, InputError, LocationResult};

/// Rendering style of the static map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(try_from = "String")]
pub enum MapStyle {
    /// Standard street map
    #[default]
    #[value(alias = "map")]
    Standard,
    /// Satellite with labels
    #[value(alias = "hyb")]
    Hybrid,
    /// Aerial imagery
    #[value(alias = "sat")]
    Satellite,
    /// Light themed map
    Light,
    /// Dark themed map
    Dark,
}

impl MapStyle {
    pub const ALL: [MapStyle; 5] = [
        MapStyle::Standard,
        MapStyle::Hybrid,
        MapStyle::Satellite,
        MapStyle::Light,
        MapStyle::Dark,
    ];

    /// Value of the static map `type` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            MapStyle::Standard => "map",
            MapStyle::Hybrid => "hyb",
            MapStyle::Satellite => "sat",
            MapStyle::Light => "light",
            MapStyle::Dark => "dark",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapStyle::Standard => "Map",
            MapStyle::Hybrid => "Hybrid",
            MapStyle::Satellite => "Satellite",
            MapStyle::Light => "Light",
            MapStyle::Dark => "Dark",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MapStyle::Standard => "Standard street map",
            MapStyle::Hybrid => "Satellite with labels",
            MapStyle::Satellite => "Aerial imagery",
            MapStyle::Light => "Light themed map",
            MapStyle::Dark => "Dark themed map",
        }
    }
}

impl FromStr for MapStyle {
    type Err = InputError;

    /// Accepts the long name or the wire value, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MapStyle::ALL
            .into_iter()
            .find(|style| {
                wanted == style.as_param() || wanted == format!("{:?}", style).to_lowercase()
            })
            .ok_or_else(|| InputError::UnknownStyle(s.trim().to_string()))
    }
}

impl TryFrom<String> for MapStyle {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map zoom level, 1 (world) through 20 (street)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "i64")]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;

    pub fn new(level: i64) -> Result<Self, InputError> {
        if level < Self::MIN as i64 || level > Self::MAX as i64 {
            return Err(InputError::ZoomOutOfRange(level));
        }
        Ok(Self(level as u8))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(14)
    }
}

impl TryFrom<i64> for Zoom {
    type Error = InputError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl FromStr for Zoom {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: i64 = s
            .trim()
            .parse()
            .map_err(|_| InputError::MalformedZoom(s.trim().to_string()))?;
        Self::new(level)
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel size of the requested map image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Resolution {
    width: u32,
    height: u32,
}

/// Resolutions offered by name, with their common abbreviations
pub const RESOLUTION_PRESETS: [(&str, Resolution); 5] = [
    ("VGA", Resolution { width: 640, height: 480 }),
    ("SVGA", Resolution { width: 800, height: 600 }),
    ("XGA", Resolution { width: 1024, height: 768 }),
    ("WXGA", Resolution { width: 1280, height: 800 }),
    ("Full HD", Resolution { width: 1920, height: 1080 }),
];

impl Resolution {
    /// Largest edge the static map service will render
    pub const MAX_EDGE: u32 = 1920;

    pub fn new(width: u32, height: u32) -> Result<Self, InputError> {
        let in_range = |edge: u32| (1..=Self::MAX_EDGE).contains(&edge);
        if !(in_range(width) && in_range(height)) {
            return Err(InputError::ResolutionOutOfRange { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Look up a preset by name, ignoring case and spaces ("full hd", "FullHD")
    pub fn preset(name: &str) -> Option<Self> {
        let squash = |s: &str| s.replace(' ', "").to_lowercase();
        let wanted = squash(name);
        RESOLUTION_PRESETS
            .iter()
            .find(|(preset, _)| squash(preset) == wanted)
            .map(|&(_, resolution)| resolution)
    }

    /// Value of the static map `size` parameter
    pub fn to_param(&self) -> String {
        format!("{},{}", self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl FromStr for Resolution {
    type Err = InputError;

    /// Parse `WIDTHxHEIGHT`, e.g. "1024x768" or "800 X 600", or a preset name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(preset) = Self::preset(s.trim()) {
            return Ok(preset);
        }
        let malformed = || InputError::MalformedResolution(s.trim().to_string());
        let lowered = s.trim().to_lowercase();
        let (width, height) = lowered.split_once('x').ok_or_else(malformed)?;
        let width: u32 = width.trim().parse().map_err(|_| malformed())?;
        let height: u32 = height.trim().parse().map_err(|_| malformed())?;
        Self::new(width, height)
    }
}

impl TryFrom<String> for Resolution {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Display parameters shared by every map fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapSettings {
    pub zoom: Zoom,
    pub style: MapStyle,
    pub resolution: Resolution,
}

/// A static map request. Only buildable from a geocoded location, so a map
/// is never fetched without a successful geocode first.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    location: LocationResult,
    settings: MapSettings,
}

impl MapRequest {
    pub fn new(location: LocationResult, settings: MapSettings) -> Self {
        Self { location, settings }
    }

    pub fn center(&self) -> Coordinates {
        self.location.coordinates
    }

    pub fn location(&self) -> &LocationResult {
        &self.location
    }

    pub fn zoom(&self) -> Zoom {
        self.settings.zoom
    }

    pub fn style(&self) -> MapStyle {
        self.settings.style
    }

    pub fn resolution(&self) -> Resolution {
        self.settings.resolution
    }
}

/// A decoded map together with the request (and so the location) it was
/// fetched for
#[derive(Debug, Clone)]
pub struct MapImage {
    image: DynamicImage,
    request: MapRequest,
}

impl MapImage {
    pub fn new(image: DynamicImage, request: MapRequest) -> Self {
        Self { image, request }
    }

    pub fn location(&self) -> &LocationResult {
        self.request.location()
    }

    pub fn request(&self) -> &MapRequest {
        &self.request
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Write the image to disk, picking the format from the file extension
    pub fn save(&self, path: &Path) -> image::ImageResult<()> {
        self.image.save(path)
    }
}
