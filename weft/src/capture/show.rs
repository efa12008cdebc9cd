//! Rich output, captured build.

use std::io::Cursor;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

use crate::Result;
use crate::callsite::CallSite;
use crate::emit::emit;
use crate::event::{Event, ImageFormat, Stream};

/// Render Markdown text into the document as-is.
#[track_caller]
pub fn markdown(text: &str) -> Result<()> {
    emit(Event::text(Stream::Markdown, text), CallSite::caller())
}

/// Render `img` as a PNG with alt text and title.
#[track_caller]
pub fn png(img: &DynamicImage, text: &str, title: &str) -> Result<()> {
    let site = CallSite::caller();
    let bytes = encode_png(img)?;
    emit_image(ImageFormat::Png, &bytes, text, title, site)
}

/// Render `img` as a JPEG at the given quality (1-100).
#[track_caller]
pub fn jpeg(img: &DynamicImage, quality: u8, text: &str, title: &str) -> Result<()> {
    let site = CallSite::caller();
    let bytes = encode_jpeg(img, quality)?;
    emit_image(ImageFormat::Jpeg, &bytes, text, title, site)
}

/// Render SVG markup.
#[track_caller]
pub fn svg(markup: &str, text: &str, title: &str) -> Result<()> {
    emit_image(ImageFormat::Svg, markup.as_bytes(), text, title, CallSite::caller())
}

/// Render an already-encoded image.
#[track_caller]
pub fn image(format: ImageFormat, bytes: &[u8], text: &str, title: &str) -> Result<()> {
    emit_image(format, bytes, text, title, CallSite::caller())
}

fn emit_image(
    format: ImageFormat,
    bytes: &[u8],
    text: &str,
    title: &str,
    site: CallSite,
) -> Result<()> {
    let event = Event::image(format.encode(bytes), text, Some(title.to_string()));
    emit(event, site)
}

pub(crate) fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)))?;
    Ok(buf)
}
