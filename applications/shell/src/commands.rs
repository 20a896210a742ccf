//! Line commands typed at the shell prompt
//!
//! Playlist positions are 1-based on the prompt and 0-based everywhere else.

use orbit_playback::Command;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a playlist position")]
    InvalidPosition(String),

    #[error("'{command}' takes no more than {max} argument(s)")]
    TooManyArguments { command: &'static str, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Toggle,
    Pause,
    Stop,
    Next,
    Previous,
    Repeat,
    /// Move the entry at `from` to `to`; `None` drops the move
    Move {
        from: usize,
        to: Option<usize>,
    },
    Remove(usize),
    Select(usize),
    /// Files, directories or http(s) URLs to append
    Add(Vec<String>),
    Status,
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  toggle | t          play or pause
  pause               pause
  stop                pause and rewind
  next | n            skip forward
  prev | p            restart, or go back within the first seconds
  repeat | r          cycle repeat: off, track, context
  move FROM TO        move an entry (TO of '-' cancels)
  remove N            remove entry N
  select N            jump to entry N
  add PATH|URL...     append files, folders or URLs
  status | s          show what is playing
  list | ls           show the playlist
  help | h            show this text
  quit | q            exit";

fn position(
    command: &'static str,
    argument: &'static str,
    raw: Option<&str>,
) -> Result<usize, ParseError> {
    let raw = raw.ok_or(ParseError::MissingArgument { command, argument })?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseError::InvalidPosition(raw.to_string())),
    }
}

fn no_more<'a>(
    command: &'static str,
    max: usize,
    mut rest: impl Iterator<Item = &'a str>,
) -> Result<(), ParseError> {
    match rest.next() {
        Some(_) => Err(ParseError::TooManyArguments { command, max }),
        None => Ok(()),
    }
}

impl FromStr for ShellCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?.to_ascii_lowercase();

        let command = match name.as_str() {
            "toggle" | "t" | "play" => Self::Toggle,
            "pause" => Self::Pause,
            "stop" => Self::Stop,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "repeat" | "r" => Self::Repeat,
            "status" | "s" => Self::Status,
            "list" | "ls" => Self::List,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "move" | "mv" => {
                let from = position("move", "a position to move from", words.next())?;
                let to = match words.next() {
                    Some("-") => None,
                    raw => Some(position("move", "a position to move to", raw)?),
                };
                no_more("move", 2, words)?;
                return Ok(Self::Move { from, to });
            }
            "remove" | "rm" => {
                let index = position("remove", "a position", words.next())?;
                no_more("remove", 1, words)?;
                return Ok(Self::Remove(index));
            }
            "select" | "goto" => {
                let index = position("select", "a position", words.next())?;
                no_more("select", 1, words)?;
                return Ok(Self::Select(index));
            }
            "add" => {
                let items: Vec<String> = words.map(str::to_string).collect();
                if items.is_empty() {
                    return Err(ParseError::MissingArgument {
                        command: "add",
                        argument: "a path or URL",
                    });
                }
                return Ok(Self::Add(items));
            }
            other => return Err(ParseError::Unknown(other.to_string())),
        };

        no_more(command.name(), 0, words)?;
        Ok(command)
    }
}

impl ShellCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Next => "next",
            Self::Previous => "prev",
            Self::Repeat => "repeat",
            Self::Move { .. } => "move",
            Self::Remove(_) => "remove",
            Self::Select(_) => "select",
            Self::Add(_) => "add",
            Self::Status => "status",
            Self::List => "list",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }

    /// Runtime command for transport and playlist edits
    ///
    /// Shell-local commands, and `add` which needs a scan first, give `None`.
    pub fn to_runtime(&self) -> Option<Command> {
        Some(match self {
            Self::Toggle => Command::TogglePlay,
            Self::Pause => Command::Pause,
            Self::Stop => Command::Stop,
            Self::Next => Command::Next,
            Self::Previous => Command::Previous,
            Self::Repeat => Command::ToggleRepeat,
            Self::Move { from, to } => Command::Reorder {
                from: *from,
                to: *to,
            },
            Self::Remove(index) => Command::Remove(*index),
            Self::Select(index) => Command::Select(*index),
            Self::Add(_) | Self::Status | Self::List | Self::Help | Self::Quit => return None,
        })
    }
}

/// Whether an `add` argument names a remote stream rather than a path
pub fn is_remote(item: &str) -> bool {
    let lower = item.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Split `add` arguments into remote URLs and local paths
pub fn partition_sources(items: &[String]) -> (Vec<String>, Vec<PathBuf>) {
    let (urls, paths): (Vec<&String>, Vec<&String>) =
        items.iter().partition(|item| is_remote(item));
    (
        urls.into_iter().cloned().collect(),
        paths.into_iter().map(PathBuf::from).collect(),
    )
}
