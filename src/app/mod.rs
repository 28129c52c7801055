//! Presentation-side state, kept apart from the fetching code so it can be
//! driven by any front end and tested with a stub provider.

pub mod command;
pub mod view;

pub use command::Command;
pub use view::{View, render};

use crate::api::{MapProvider, search};
use crate::domain::{LocationQuery, MapImage, MapSettings};

/// Outcome of the most recent user action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// The current display holds a fresh result
    Displaying,
    /// Input was rejected before any request was made
    Warning(String),
    /// A search failed; any previous display is still shown
    Failed(String),
}

/// What an applied command asks the front end to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
    Show(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    settings: MapSettings,
    display: Option<MapImage>,
    status: Status,
    last_query: Option<LocationQuery>,
}

impl AppState {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// The map currently on screen, always paired with its own location
    pub fn display(&self) -> Option<&MapImage> {
        self.display.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn last_query(&self) -> Option<&LocationQuery> {
        self.last_query.as_ref()
    }

    /// Search for `text` with the current settings.
    ///
    /// Blank input only sets a warning. A failed search keeps the previous
    /// display.
    pub fn submit<P: MapProvider + ?Sized>(&mut self, provider: &P, text: &str) -> &Status {
        match LocationQuery::new(text) {
            Ok(query) => self.run(provider, query),
            Err(e) => self.status = Status::Warning(e.to_string()),
        }
        &self.status
    }

    /// Repeat the last search, e.g. after a settings change. Does nothing
    /// before the first search.
    pub fn refresh<P: MapProvider + ?Sized>(&mut self, provider: &P) -> &Status {
        if let Some(query) = self.last_query.clone() {
            self.run(provider, query);
        }
        &self.status
    }

    pub fn apply<P: MapProvider + ?Sized>(&mut self, provider: &P, command: Command) -> Step {
        match command {
            Command::Search(text) => {
                self.submit(provider, &text);
            }
            Command::Zoom(zoom) => {
                self.settings.zoom = zoom;
                self.refresh(provider);
            }
            Command::Style(style) => {
                self.settings.style = style;
                self.refresh(provider);
            }
            Command::Resolution(resolution) => {
                self.settings.resolution = resolution;
                self.refresh(provider);
            }
            Command::ListStyles => return Step::Show(view::styles_help()),
            Command::ListResolutions => return Step::Show(view::resolutions_help()),
            Command::Help => return Step::Show(view::commands_help()),
            Command::Quit => return Step::Quit,
        }
        Step::Continue
    }

    fn run<P: MapProvider + ?Sized>(&mut self, provider: &P, query: LocationQuery) {
        match search(provider, &query, &self.settings) {
            Ok(map) => {
                self.display = Some(map);
                self.status = Status::Displaying;
            }
            Err(e) => {
                log::warn!("Search for {:?} failed: {}", query.as_str(), e);
                self.status = Status::Failed(e.to_string());
            }
        }
        self.last_query = Some(query);
    }
}
