//! Event model.
//!
//! The wire format shared by the instrumented program and the renderer:
//! one JSON object per line, in emission order.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which rendering branch an event takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
    Markdown,
    Image,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
            Stream::Markdown => "markdown",
            Stream::Image => "image",
        }
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One intercepted output action.
///
/// `file` and `line` locate the call in the rendered source. For image
/// events `text` is the alt text and `image` the data reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub stream: Stream,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Event {
    /// A text event (stdout, stderr or markdown) with an unset location.
    pub fn text(stream: Stream, text: impl Into<String>) -> Self {
        Self {
            stream,
            file: String::new(),
            line: 0,
            func: None,
            text: text.into(),
            image: None,
            title: None,
        }
    }

    /// An image event carrying a data reference.
    pub fn image(data_ref: String, text: impl Into<String>, title: Option<String>) -> Self {
        Self {
            image: Some(data_ref),
            title: title.filter(|t| !t.is_empty()),
            ..Self::text(Stream::Image, text)
        }
    }

    /// Append a trailing newline to `text` if it lacks one.
    ///
    /// The only mutation an event sees after creation.
    pub fn terminate_text(&mut self) {
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Image data references
// ────────────────────────────────────────────────────────────────

/// The image encodings an event can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Svg,
}

impl ImageFormat {
    const ALL: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Svg];

    /// The data reference prefix, including the trailing comma.
    pub fn prefix(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "data:image/jpeg;base64,",
            ImageFormat::Png => "data:image/png;base64,",
            ImageFormat::Svg => "data:image/svg+xml,",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Wrap raw image bytes into a data reference.
    ///
    /// Raster formats are base64 encoded; SVG markup is carried as-is.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            ImageFormat::Svg => format!("{}{}", self.prefix(), String::from_utf8_lossy(bytes)),
            _ => format!("{}{}", self.prefix(), STANDARD.encode(bytes)),
        }
    }

    /// Identify the format of a data reference without decoding it.
    pub fn detect(data_ref: &str) -> Option<ImageFormat> {
        Self::ALL
            .into_iter()
            .find(|format| data_ref.starts_with(format.prefix()))
    }

    /// Split a data reference into its format and raw bytes.
    pub fn decode(data_ref: &str) -> Result<(ImageFormat, Vec<u8>)> {
        let format = Self::detect(data_ref)
            .ok_or_else(|| Error::UnknownImageFormat(abbreviate(data_ref)))?;
        let payload = &data_ref[format.prefix().len()..];

        let bytes = match format {
            ImageFormat::Svg => payload.as_bytes().to_vec(),
            _ => STANDARD.decode(payload)?,
        };
        Ok((format, bytes))
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Data references can be megabytes long; keep error messages readable.
fn abbreviate(data_ref: &str) -> String {
    match data_ref.char_indices().nth(40) {
        Some((idx, _)) => format!("{}...", &data_ref[..idx]),
        None => data_ref.to_string(),
    }
}
