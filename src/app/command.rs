use crate::domain::{InputError, MapStyle, Resolution, Zoom};

/// One line of interactive input.
///
/// Plain text searches for an address; lines starting with `:` change
/// settings or ask for help.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Zoom(Zoom),
    Style(MapStyle),
    Resolution(Resolution),
    ListStyles,
    ListResolutions,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, InputError> {
        let line = line.trim();
        let Some(directive) = line.strip_prefix(':') else {
            return Ok(Command::Search(line.to_string()));
        };

        let (name, arg) = match directive.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (directive, ""),
        };

        match name.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Ok(Command::Quit),
            "h" | "help" | "?" => Ok(Command::Help),
            "styles" => Ok(Command::ListStyles),
            "resolutions" | "presets" => Ok(Command::ListResolutions),
            "z" | "zoom" => Ok(Command::Zoom(arg.parse()?)),
            "s" | "style" | "type" => Ok(Command::Style(arg.parse()?)),
            "r" | "res" | "resolution" => Ok(Command::Resolution(arg.parse()?)),
            _ => Err(InputError::UnknownCommand(line.to_string())),
        }
    }
}
