//! The Image Sink: writes image events to side files.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use weft::{Event, ImageFormat};

use crate::error::{Result, WeftError};

/// Decode an image event's data reference into its format and bytes.
pub fn decode_image(event: &Event) -> Result<(ImageFormat, Vec<u8>)> {
    let data_ref = event
        .image
        .as_deref()
        .ok_or(WeftError::MissingImage { line: event.line })?;
    ImageFormat::decode(data_ref).map_err(|source| match source {
        weft::Error::UnknownImageFormat(detail) => WeftError::UnknownImage {
            line: event.line,
            detail,
        },
        source => WeftError::ImageData {
            line: event.line,
            source,
        },
    })
}

/// Names and creates image files for one rendered source.
#[derive(Debug, Clone)]
pub struct ImageSink {
    dir: PathBuf,
    stem: String,
}

impl ImageSink {
    /// Files are named after `source` and created in `dir`. An empty `dir`
    /// means the working directory.
    pub fn new(source: &Path, dir: impl Into<PathBuf>) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            dir: dir.into(),
            stem,
        }
    }

    /// `<stem>_<line>.<ext>`, or `<stem>_<line>_<index>.<ext>` when the line
    /// has more than one image.
    pub fn file_name(&self, line: u32, index: Option<usize>, format: ImageFormat) -> String {
        match index {
            Some(index) => format!("{}_{}_{}.{}", self.stem, line, index, format.extension()),
            None => format!("{}_{}.{}", self.stem, line, format.extension()),
        }
    }

    /// Decode `event` and write it to a new file, returning the file's path.
    ///
    /// Never overwrites: an existing file is an error.
    pub fn write(&self, event: &Event, index: Option<usize>) -> Result<PathBuf> {
        let (format, bytes) = decode_image(event)?;
        let path = self.dir.join(self.file_name(event.line, index, format));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => WeftError::ImageExists { path: path.clone() },
                _ => WeftError::ImageIo {
                    path: path.clone(),
                    source,
                },
            })?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|source| WeftError::ImageIo {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
