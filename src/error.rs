//! Error type shared by the whole crate.

use std::io;

use thiserror::Error;

use crate::grab::GrabKind;

/// Everything that can go wrong while building or running a pie menu.
///
/// Parse and grab errors are fatal for the process. Resource problems (icons,
/// fonts, deferred commands) never surface here; they are logged and absorbed
/// where they happen.
#[derive(Debug, Error)]
pub enum Error {
    /// A line had nothing after its indentation.
    #[error("line {line}: empty item")]
    EmptyItem { line: usize },

    /// A line's indentation does not continue any open menu.
    #[error("line {line}: improper indentation detected (level {level})")]
    Indentation { line: usize, level: usize },

    /// The input produced no slice at all.
    #[error("no menu generated")]
    EmptyMenu,

    /// Exclusive input capture could not be obtained.
    #[error("could not grab {0}")]
    Grab(GrabKind),

    /// Menu placement failed.
    #[error("geometry: {0}")]
    Geometry(String),

    /// A shell command could not be started.
    #[error("could not run `{command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The display connection or event loop failed.
    #[error("display: {0}")]
    Display(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
