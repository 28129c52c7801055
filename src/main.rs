use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mapview::api::{MapProvider, MapQuest};
use mapview::app::{AppState, Command, Status, Step, render};
use mapview::config::{API_KEY_ENV, DEFAULT_LOCATION, FileConfig, resolve_api_key};
use mapview::domain::{MapSettings, MapStyle, Resolution, Zoom};

/// Geocode an address with MapQuest and save a static map of it
///
/// Examples:
///   # Map the default address at zoom 14
///   mapview
///
///   # Satellite view of an address, saved as JPEG
///   mapview "1600 Pennsylvania Ave Washington DC" --style sat -o whitehouse.jpg
///
///   # Full HD dark map
///   mapview "Chimney Rock NE" --resolution 1920x1080 --style dark --zoom 12
///
///   # Search repeatedly from a prompt
///   mapview --interactive
#[derive(Parser, Debug)]
#[command(name = "mapview")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to look up (defaults to the configured location)
    location: Option<String>,

    /// Path to config file (optional, auto-searches mapview.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// MapQuest API key (overrides MAPQUEST_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Zoom level, 1 (world) to 20 (street)
    #[arg(short = 'z', long, value_parser = clap::value_parser!(i64).range(1..=20))]
    zoom: Option<i64>,

    /// Map style
    #[arg(short = 's', long, value_enum, ignore_case = true)]
    style: Option<MapStyle>,

    /// Image size as WIDTHxHEIGHT (e.g. 1024x768) or a preset name (VGA, SVGA, XGA, WXGA, Full HD)
    #[arg(short = 'r', long)]
    resolution: Option<Resolution>,

    /// Where to save the map image (format follows the extension)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Prompt for addresses until :quit or end of input
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match args.config {
        Some(ref config_path) => Some(FileConfig::from_path(config_path)?),
        None => FileConfig::load(),
    };

    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    init_logging(verbose);

    let env_key = std::env::var(API_KEY_ENV).ok();
    let Some(api_key) = resolve_api_key(
        args.api_key.as_deref(),
        env_key.as_deref(),
        file_config.as_ref(),
    ) else {
        bail!(
            "No MapQuest API key: pass --api-key, set {} or add api_key to mapview.toml \
             (get one at https://developer.mapquest.com)",
            API_KEY_ENV
        );
    };

    let zoom = match args.zoom {
        Some(level) => Zoom::new(level)?,
        None => file_config
            .as_ref()
            .and_then(|c| c.zoom)
            .unwrap_or_default(),
    };
    let style = args
        .style
        .or_else(|| file_config.as_ref().and_then(|c| c.style))
        .unwrap_or_default();
    let resolution = args
        .resolution
        .or_else(|| file_config.as_ref().and_then(|c| c.resolution))
        .unwrap_or_default();
    let settings = MapSettings {
        zoom,
        style,
        resolution,
    };

    let location = args
        .location
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.location.clone()))
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()))
        .unwrap_or_else(|| PathBuf::from("map.png"));

    let endpoints = file_config
        .as_ref()
        .and_then(|c| c.endpoints.clone())
        .unwrap_or_default();

    log::debug!(
        "Settings: zoom {}, style {}, resolution {}, output {}",
        settings.zoom,
        settings.style.as_param(),
        settings.resolution,
        output.display()
    );
    log::debug!(
        "Endpoints: {} | {}",
        endpoints.geocode_url,
        endpoints.static_map_url
    );

    let provider = MapQuest::new(api_key, endpoints).context("Failed to create HTTP client")?;
    let mut state = AppState::new(settings);

    if args.interactive {
        run_interactive(&provider, &mut state, &location, &output)
    } else {
        run_once(&provider, &mut state, &location, &output)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_once(
    provider: &dyn MapProvider,
    state: &mut AppState,
    location: &str,
    output: &Path,
) -> Result<()> {
    let mut out = io::stdout();
    search_with_spinner(provider, state, location);
    write!(out, "{}", render(state))?;

    match state.status() {
        Status::Displaying => save_display(state, output, &mut out),
        Status::Warning(msg) | Status::Failed(msg) => bail!("{}", msg),
        Status::Idle => Ok(()),
    }
}

fn run_interactive(
    provider: &dyn MapProvider,
    state: &mut AppState,
    location: &str,
    output: &Path,
) -> Result<()> {
    let mut out = io::stdout();
    open_session(provider, state, location, output, &mut out)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        write!(out, "location> ")?;
        out.flush().context("Failed to write prompt")?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("Failed to read input")?;

        if !handle_line(provider, state, &line, output, &mut out)? {
            break;
        }
    }

    Ok(())
}

/// Print the banner and search the starting address, like the viewer window
/// does when it opens
fn open_session(
    provider: &dyn MapProvider,
    state: &mut AppState,
    location: &str,
    output: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "mapview - MapQuest Map Viewer")?;
    writeln!(out, "=============================")?;
    writeln!(out, "Type :help for commands. Maps are saved to {}", output.display())?;
    writeln!(out)?;

    search_with_spinner(provider, state, location);
    show_result(state, output, out)
}

/// Apply one line of interactive input. Returns `false` once the user quits.
fn handle_line(
    provider: &dyn MapProvider,
    state: &mut AppState,
    line: &str,
    output: &Path,
    out: &mut dyn Write,
) -> Result<bool> {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            writeln!(out, "Warning: {}", e)?;
            return Ok(true);
        }
    };

    let changes_setting = matches!(
        command,
        Command::Zoom(_) | Command::Style(_) | Command::Resolution(_)
    );
    // Settings changes only fetch once there is a search to repeat
    let fetches = match command {
        Command::Search(_) => true,
        _ => changes_setting && state.last_query().is_some(),
    };

    let step = if fetches {
        let spinner = create_spinner("Fetching map...");
        let start = Instant::now();
        let step = state.apply(provider, command);
        spinner.finish_and_clear();
        log::info!("Search took {:.1}s", start.elapsed().as_secs_f32());
        step
    } else {
        state.apply(provider, command)
    };

    match step {
        Step::Quit => return Ok(false),
        Step::Show(text) => write!(out, "{}", text)?,
        Step::Continue => {
            if changes_setting {
                let settings = state.settings();
                writeln!(
                    out,
                    "Settings: zoom {}, style {}, resolution {}",
                    settings.zoom,
                    settings.style.as_param(),
                    settings.resolution
                )?;
            }
            if fetches {
                show_result(state, output, out)?;
            }
        }
    }
    Ok(true)
}

/// Print the current view and save the map if the last search succeeded.
/// A failed save is reported without ending the session.
fn show_result(state: &AppState, output: &Path, out: &mut dyn Write) -> Result<()> {
    write!(out, "{}", render(state))?;
    if *state.status() == Status::Displaying
        && let Err(e) = save_display(state, output, out)
    {
        writeln!(out, "Error: {:#}", e)?;
    }
    Ok(())
}

fn search_with_spinner(provider: &dyn MapProvider, state: &mut AppState, location: &str) {
    let spinner = create_spinner(&format!("Looking up {}...", location));
    let start = Instant::now();
    state.submit(provider, location);
    match state.status() {
        Status::Displaying => spinner.finish_with_message(format!(
            "Found {} [{:.1}s]",
            location,
            start.elapsed().as_secs_f32()
        )),
        _ => spinner.finish_and_clear(),
    }
}

fn save_display(state: &AppState, output: &Path, out: &mut dyn Write) -> Result<()> {
    let Some(map) = state.display() else {
        return Ok(());
    };
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    map.save(output)
        .with_context(|| format!("Failed to write map image to {:?}", output))?;
    writeln!(out, "Saved map to {}", output.display())?;
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use mapview::api::LookupError;
    use mapview::domain::{Coordinates, LocationQuery, LocationResult, MapImage, MapRequest};
    use std::cell::Cell;

    /// Knows every address except "Atlantis"
    #[derive(Default)]
    struct FixedProvider {
        geocodes: Cell<u32>,
    }

    impl MapProvider for FixedProvider {
        fn geocode(&self, query: &LocationQuery) -> Result<LocationResult, LookupError> {
            self.geocodes.set(self.geocodes.get() + 1);
            if query.as_str() == "Atlantis" {
                return Err(LookupError::NotFound(query.to_string()));
            }
            let mut location = LocationResult::new(Coordinates::new(41.83, -103.33).unwrap());
            location.city = Some("Bayard".to_string());
            location.state = Some("NE".to_string());
            Ok(location)
        }

        fn static_map(&self, request: MapRequest) -> Result<MapImage, LookupError> {
            let res = request.resolution();
            Ok(MapImage::new(
                DynamicImage::new_rgb8(res.width(), res.height()),
                request,
            ))
        }
    }

    #[test]
    fn test_cli_style_and_resolution_ignore_case() {
        let args =
            Args::try_parse_from(["mapview", "--style", "SAT", "--resolution", "xga"]).unwrap();
        assert_eq!(args.style, Some(MapStyle::Satellite));
        assert_eq!(args.resolution, Some(Resolution::default()));

        let args = Args::try_parse_from(["mapview", "-s", "Dark", "-r", "Full HD"]).unwrap();
        assert_eq!(args.style, Some(MapStyle::Dark));
        assert_eq!(args.resolution.map(|r| r.to_string()).as_deref(), Some("1920x1080"));

        assert!(Args::try_parse_from(["mapview", "--style", "terrain"]).is_err());
    }

    #[test]
    fn test_session_opens_on_starting_address() {
        let provider = FixedProvider::default();
        let mut state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("map.png");
        let mut out: Vec<u8> = Vec::new();

        open_session(&provider, &mut state, "Chimney Rock NE", &output, &mut out).unwrap();

        assert_eq!(
            state.last_query().map(|q| q.as_str()),
            Some("Chimney Rock NE")
        );
        assert_eq!(*state.status(), Status::Displaying);
        assert!(output.exists());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  City: Bayard\n"));
        assert!(text.contains("Saved map to"));
    }

    #[test]
    fn test_failed_starting_address_keeps_session_open() {
        let provider = FixedProvider::default();
        let mut state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("map.png");
        let mut out: Vec<u8> = Vec::new();

        open_session(&provider, &mut state, "Atlantis", &output, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: Location not found: Atlantis"));
        assert!(!output.exists());
        let mut out: Vec<u8> = Vec::new();
        assert!(handle_line(&provider, &mut state, "Bayard NE", &output, &mut out).unwrap());
        assert!(output.exists());
    }

    #[test]
    fn test_setting_change_before_search_is_echoed() {
        let provider = FixedProvider::default();
        let mut state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("map.png");
        let mut out: Vec<u8> = Vec::new();

        assert!(handle_line(&provider, &mut state, ":zoom 5", &output, &mut out).unwrap());
        assert!(handle_line(&provider, &mut state, ":style dark", &output, &mut out).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Settings: zoom 5, style map, resolution 1024x768\n"));
        assert!(text.contains("Settings: zoom 5, style dark, resolution 1024x768\n"));
        assert_eq!(provider.geocodes.get(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_setting_change_after_search_refetches() {
        let provider = FixedProvider::default();
        let mut state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("map.png");
        let mut out: Vec<u8> = Vec::new();

        handle_line(&provider, &mut state, "Bayard NE", &output, &mut out).unwrap();
        handle_line(&provider, &mut state, ":res VGA", &output, &mut out).unwrap();

        assert_eq!(provider.geocodes.get(), 2);
        let map = state.display().unwrap();
        assert_eq!((map.width(), map.height()), (640, 480));
    }

    #[test]
    fn test_quit_and_bad_commands() {
        let provider = FixedProvider::default();
        let mut state = AppState::default();
        let output = Path::new("unused.png");
        let mut out: Vec<u8> = Vec::new();

        assert!(handle_line(&provider, &mut state, ":zoom 42", output, &mut out).unwrap());
        assert!(String::from_utf8_lossy(&out).starts_with("Warning: Zoom must be between 1 and 20"));
        assert!(!handle_line(&provider, &mut state, ":quit", output, &mut out).unwrap());
    }
}
