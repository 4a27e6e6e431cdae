use std::path::PathBuf;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  add <lon> <lat>   append a waypoint
  import <file>     append waypoints from a lon,lat CSV file
  start             play the path from the first waypoint
  pause             pause playback
  resume            resume playback
  reset             clear waypoints and stop playback
  list              show the waypoints
  status            show the playback state
  help              show this help
  quit              exit";

/// One line of operator input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { lon: String, lat: String },
    Import(PathBuf),
    Start,
    Pause,
    Resume,
    Reset,
    List,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse a line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), rest.as_slice()) {
            ("add", [lon, lat]) => Command::Add {
                lon: lon.to_string(),
                lat: lat.to_string(),
            },
            ("add", _) => return Err(CommandError::Usage("add <lon> <lat>")),
            ("import", [_, ..]) => Command::Import(PathBuf::from(rest.join(" "))),
            ("import", []) => return Err(CommandError::Usage("import <file>")),
            ("start" | "play", []) => Command::Start,
            ("pause", []) => Command::Pause,
            ("resume", []) => Command::Resume,
            ("reset", []) => Command::Reset,
            ("list" | "ls", []) => Command::List,
            ("status", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };
        Ok(Some(command))
    }
}
