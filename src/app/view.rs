use std::fmt;

use super::{AppState, Status};
use crate::domain::{LocationResult, MapStyle, RESOLUTION_PRESETS};

const MISSING: &str = "N/A";

/// Text ready to print for the current state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    /// Location labels, empty until the first successful search
    pub fields: Vec<String>,
    /// Size, zoom and style of the displayed map
    pub map_summary: Option<String>,
    pub status: Option<String>,
}

/// Build the printable view of `state`. Pure; performs no I/O.
pub fn render(state: &AppState) -> View {
    let (fields, map_summary) = match state.display() {
        Some(map) => {
            let request = map.request();
            let summary = format!(
                "Map: {}x{} px, zoom {}, {} ({})",
                map.width(),
                map.height(),
                request.zoom(),
                request.style(),
                request.style().description()
            );
            (location_fields(map.location()), Some(summary))
        }
        None => (Vec::new(), None),
    };

    let status = match state.status() {
        Status::Idle | Status::Displaying => None,
        Status::Warning(msg) => Some(format!("Warning: {}", msg)),
        Status::Failed(msg) => Some(format!("Error: {}", msg)),
    };

    View {
        fields,
        map_summary,
        status,
    }
}

fn location_fields(location: &LocationResult) -> Vec<String> {
    let or_missing = |value: &Option<String>| value.clone().unwrap_or_else(|| MISSING.to_string());
    vec![
        format!("Latitude: {:.6}", location.latitude()),
        format!("Longitude: {:.6}", location.longitude()),
        format!("Street: {}", or_missing(&location.street)),
        format!("City: {}", or_missing(&location.city)),
        format!("State: {}", or_missing(&location.state)),
        format!("Postal Code: {}", or_missing(&location.postal_code)),
    ]
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = &self.status {
            writeln!(f, "{}", status)?;
        }
        if !self.fields.is_empty() {
            writeln!(f, "Location Information")?;
            for field in &self.fields {
                writeln!(f, "  {}", field)?;
            }
        }
        if let Some(summary) = &self.map_summary {
            writeln!(f, "{}", summary)?;
        }
        Ok(())
    }
}

pub fn styles_help() -> String {
    let mut out = String::from("Map styles:\n");
    for style in MapStyle::ALL {
        out.push_str(&format!(
            "  {:<6} {:<10} {}\n",
            style.as_param(),
            style.label(),
            style.description()
        ));
    }
    out
}

pub fn resolutions_help() -> String {
    let mut out = String::from("Resolutions:\n");
    for (name, resolution) in RESOLUTION_PRESETS {
        out.push_str(&format!("  {:<10} {}\n", resolution.to_string(), name));
    }
    out
}

pub fn commands_help() -> String {
    [
        "Type an address and press Enter to search.",
        "  :zoom N         set zoom level (1-20)",
        "  :style S        set map style (see :styles)",
        "  :res WxH        set resolution, or a preset name (see :resolutions)",
        "  :styles         list map styles",
        "  :resolutions    list resolution presets",
        "  :help           show this help",
        "  :quit           exit (Ctrl-D also works)",
        "",
    ]
    .join("\n")
}
