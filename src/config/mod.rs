use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{MapStyle, Resolution, Zoom};

/// Environment variable consulted for the MapQuest key
pub const API_KEY_ENV: &str = "MAPQUEST_API_KEY";

/// Address searched when none is given on the command line or in a config file
pub const DEFAULT_LOCATION: &str = "615 Mountain View Ave Scottsbluff NE";

fn default_geocode_url() -> String {
    "https://www.mapquestapi.com/geocoding/v1/address".to_string()
}

fn default_static_map_url() -> String {
    "https://www.mapquestapi.com/staticmap/v5/map".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_marker() -> String {
    "marker-md-3B5998-22407F".to_string()
}

/// Where and how to reach the MapQuest services
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_static_map_url")]
    pub static_map_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `defaultMarker` style drawn at the searched location
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            static_map_url: default_static_map_url(),
            timeout_secs: default_timeout_secs(),
            marker: default_marker(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub zoom: Option<Zoom>,
    #[serde(default)]
    pub style: Option<MapStyle>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub endpoints: Option<EndpointConfig>,
}

impl FileConfig {
    /// Load the first readable config file from the standard search paths.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn load() -> Option<Self> {
        Self::load_first(&get_config_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Option<Self> {
        for path in paths {
            if !path.exists() {
                continue;
            }
            let contents = match std::fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) => {
                    log::warn!("Failed to read config file {:?}: {}", path, e);
                    continue;
                }
            };
            match toml::from_str(&contents) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                }
            }
        }
        None
    }

    /// Load an explicitly named config file. Unlike [`FileConfig::load`],
    /// a missing or invalid file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

/// Pick the API key: command line first, then the environment, then the file.
/// Blank values are ignored.
pub fn resolve_api_key(
    cli: Option<&str>,
    env: Option<&str>,
    file: Option<&FileConfig>,
) -> Option<String> {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|key| !key.is_empty())
    }

    non_blank(cli)
        .or_else(|| non_blank(env))
        .or_else(|| non_blank(file.and_then(|c| c.api_key.as_deref())))
        .map(str::to_string)
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("mapview.toml"));
    paths.push(PathBuf::from(".mapview.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mapview").join("config.toml"));
        paths.push(config_dir.join("mapview.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".mapview.toml"));
        paths.push(home.join(".config").join("mapview").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            api_key = "abc123"
            location = "Chimney Rock NE"
            zoom = 12
            style = "sat"
            resolution = "800x600"
            output = "out/map.png"
            verbose = true

            [endpoints]
            geocode_url = "http://localhost:8080/geocode"
            timeout_secs = 5
        "#;

        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.location.as_deref(), Some("Chimney Rock NE"));
        assert_eq!(config.zoom.map(|z| z.level()), Some(12));
        assert_eq!(config.style, Some(MapStyle::Satellite));
        assert_eq!(config.resolution.map(|r| r.to_string()).as_deref(), Some("800x600"));
        assert_eq!(config.output, Some(PathBuf::from("out/map.png")));
        assert!(config.verbose);

        let endpoints = config.endpoints.unwrap();
        assert_eq!(endpoints.geocode_url, "http://localhost:8080/geocode");
        assert_eq!(endpoints.static_map_url, default_static_map_url());
        assert_eq!(endpoints.timeout_secs, 5);
        assert_eq!(endpoints.marker, "marker-md-3B5998-22407F");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.zoom.is_none());
        assert!(!config.verbose);
        assert!(config.endpoints.is_none());
    }

    #[test]
    fn test_style_and_preset_names_ignore_case() {
        let config: FileConfig = toml::from_str("style = \"Dark\"\nresolution = \"XGA\"").unwrap();
        assert_eq!(config.style, Some(MapStyle::Dark));
        assert_eq!(config.resolution, Some(Resolution::default()));

        let config: FileConfig =
            toml::from_str("style = \"SAT\"\nresolution = \"full hd\"").unwrap();
        assert_eq!(config.style, Some(MapStyle::Satellite));
        assert_eq!(config.resolution.map(|r| r.to_string()).as_deref(), Some("1920x1080"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(toml::from_str::<FileConfig>("zoom = 25").is_err());
        assert!(toml::from_str::<FileConfig>("resolution = \"big\"").is_err());
        assert!(toml::from_str::<FileConfig>("style = \"terrain\"").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"from-file\"\nzoom = 3").unwrap();

        let config = FileConfig::from_path(file.path()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.zoom.map(|z| z.level()), Some(3));
    }

    #[test]
    fn test_load_skips_unusable_files() {
        let dir = tempfile::tempdir().unwrap();

        // Exists but cannot be read as a file
        let unreadable = dir.path().join("mapview.toml");
        std::fs::create_dir(&unreadable).unwrap();
        let broken = dir.path().join(".mapview.toml");
        std::fs::write(&broken, "zoom = \"deep\"").unwrap();
        let good = dir.path().join("config.toml");
        std::fs::write(&good, "location = \"Gering NE\"").unwrap();

        let paths = vec![dir.path().join("missing.toml"), unreadable, broken, good];
        let config = FileConfig::load_first(&paths).unwrap();
        assert_eq!(config.location.as_deref(), Some("Gering NE"));

        assert!(FileConfig::load_first(&paths[..3]).is_none());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_api_key_precedence() {
        let file = FileConfig {
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_api_key(Some("cli-key"), Some("env-key"), Some(&file)).as_deref(),
            Some("cli-key")
        );
        assert_eq!(
            resolve_api_key(None, Some("env-key"), Some(&file)).as_deref(),
            Some("env-key")
        );
        assert_eq!(
            resolve_api_key(None, None, Some(&file)).as_deref(),
            Some("file-key")
        );
        assert_eq!(resolve_api_key(None, None, None), None);
        assert_eq!(resolve_api_key(Some("  "), None, None), None);
        assert_eq!(
            resolve_api_key(Some(""), Some("env-key"), None).as_deref(),
            Some("env-key")
        );
    }
}
