//! Shell command execution against a running player

use crate::commands::{partition_sources, ShellCommand, HELP};
use crate::element::LengthTable;
use crate::error::Result;
use crate::format::{format_playlist, format_status};
use crate::library::gather;
use orbit_metadata::TrackScanner;
use orbit_playback::{Command, RuntimeHandle};
use tracing::debug;

/// What the prompt should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading; print the text if any
    Continue(Option<String>),
    Quit,
}

/// Front end for one [`RuntimeHandle`]
pub struct Shell {
    handle: RuntimeHandle,
    scanner: TrackScanner,
    lengths: LengthTable,
}

impl Shell {
    pub fn new(handle: RuntimeHandle, scanner: TrackScanner, lengths: LengthTable) -> Self {
        Self {
            handle,
            scanner,
            lengths,
        }
    }

    pub fn handle(&self) -> &RuntimeHandle {
        &self.handle
    }

    /// Append files, folders and URLs to the playlist
    pub async fn add(&self, items: &[String]) -> Result<usize> {
        let (urls, paths) = partition_sources(items);
        let tracks = gather(&self.scanner, &paths, &urls, &self.lengths).await?;
        let count = tracks.len();
        if count > 0 {
            self.handle.send(Command::AddTracks(tracks))?;
        }
        Ok(count)
    }

    /// Parse one line of input and run it
    pub async fn execute_line(&self, line: &str) -> Result<Outcome> {
        let command = line.parse::<ShellCommand>()?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: ShellCommand) -> Result<Outcome> {
        debug!(?command, "Shell command");

        if let Some(runtime_command) = command.to_runtime() {
            self.handle.send(runtime_command)?;
            return Ok(Outcome::Continue(None));
        }

        let text = match command {
            ShellCommand::Add(items) => {
                let count = self.add(&items).await?;
                format!("added {count} track(s)")
            }
            ShellCommand::Status => format_status(&self.handle.status().await?),
            ShellCommand::List => format_playlist(&self.handle.status().await?.snapshot),
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => {
                self.handle.send(Command::Shutdown)?;
                return Ok(Outcome::Quit);
            }
            _ => return Ok(Outcome::Continue(None)),
        };
        Ok(Outcome::Continue(Some(text)))
    }
}
