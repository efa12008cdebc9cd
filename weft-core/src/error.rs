//! Render failures.
//!
//! Every variant is fatal for the current render. [`WeftError::kind`] sorts
//! them into the parse / execution / protocol / render taxonomy.

use std::io;
use std::path::PathBuf;

use weft_script::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source; nothing was executed.
    Parse,
    /// The program could not be launched or exited non-zero.
    Execution,
    /// The event stream broke the harness contract.
    Protocol,
    /// An event could not be rendered or the document could not be written.
    Render,
    /// Bad configuration or unreadable input.
    Setup,
}

#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    #[error("failed to read {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("cannot rewrite import at {line}:{column}: expected `{expected}`")]
    Rewrite {
        line: usize,
        column: usize,
        expected: String,
    },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(
        "event at {file}:{line} does not belong to {expected}; \
         output from other files cannot be placed"
    )]
    ForeignFile {
        file: String,
        line: u32,
        expected: PathBuf,
    },

    #[error("image event on line {line} carries no image data")]
    MissingImage { line: u32 },

    #[error("unrecognized image encoding on line {line}: {detail}")]
    UnknownImage { line: u32, detail: String },

    #[error("invalid image data on line {line}: {source}")]
    ImageData {
        line: u32,
        #[source]
        source: weft::Error,
    },

    #[error("image file {path} already exists")]
    ImageExists { path: PathBuf },

    #[error("failed to write image {path}: {source}")]
    ImageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write document: {0}")]
    Output(#[from] io::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl WeftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeftError::Parse { .. } | WeftError::Rewrite { .. } => ErrorKind::Parse,
            WeftError::Script(e) if e.is_execution() => ErrorKind::Execution,
            WeftError::Script(ScriptError::Decode { .. }) | WeftError::ForeignFile { .. } => {
                ErrorKind::Protocol
            }
            WeftError::Script(_) => ErrorKind::Setup,
            WeftError::MissingImage { .. }
            | WeftError::UnknownImage { .. }
            | WeftError::ImageData { .. }
            | WeftError::ImageExists { .. }
            | WeftError::ImageIo { .. }
            | WeftError::Output(_) => ErrorKind::Render,
            WeftError::Source { .. }
            | WeftError::ConfigRead { .. }
            | WeftError::ConfigParse { .. } => ErrorKind::Setup,
        }
    }
}

pub type Result<T> = std::result::Result<T, WeftError>;
