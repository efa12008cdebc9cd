//! Rich output, plain build.
//!
//! Markdown goes to standard output as-is. Images are written next to the
//! working directory as `<source>_<line>_<index>.<ext>`, where `index`
//! counts the images produced by the same line of the same file.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use image::DynamicImage;

use crate::Result;
use crate::callsite::CallSite;
use crate::event::ImageFormat;

static COUNTERS: OnceLock<Mutex<HashMap<(&'static str, u32), u32>>> = OnceLock::new();

/// Print Markdown text.
pub fn markdown(text: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Write `img` as a PNG file.
#[track_caller]
pub fn png(img: &DynamicImage, _text: &str, _title: &str) -> Result<()> {
    let site = CallSite::caller();
    let bytes = crate::capture::show::encode_png(img)?;
    write_image(&site, ImageFormat::Png, &bytes)
}

/// Write `img` as a JPEG file at the given quality (1-100).
#[track_caller]
pub fn jpeg(img: &DynamicImage, quality: u8, _text: &str, _title: &str) -> Result<()> {
    let site = CallSite::caller();
    let bytes = crate::capture::show::encode_jpeg(img, quality)?;
    write_image(&site, ImageFormat::Jpeg, &bytes)
}

/// Write SVG markup to a file.
#[track_caller]
pub fn svg(markup: &str, _text: &str, _title: &str) -> Result<()> {
    let site = CallSite::caller();
    write_image(&site, ImageFormat::Svg, markup.as_bytes())
}

/// Write an already-encoded image.
#[track_caller]
pub fn image(format: ImageFormat, bytes: &[u8], _text: &str, _title: &str) -> Result<()> {
    let site = CallSite::caller();
    write_image(&site, format, bytes)
}

/// File name for the `index`th image produced at `file:line`.
pub fn image_file_name(file: &str, line: u32, index: u32, format: ImageFormat) -> String {
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_{}_{}.{}", stem, line, index, format.extension())
}

fn next_index(site: &CallSite) -> u32 {
    let counters = COUNTERS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut counters = counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let slot = counters.entry((site.file, site.line)).or_insert(0);
    let index = *slot;
    *slot += 1;
    index
}

fn write_image(site: &CallSite, format: ImageFormat, bytes: &[u8]) -> Result<()> {
    let name = image_file_name(site.file, site.line, next_index(site), format);
    let mut file = OpenOptions::new().write(true).create_new(true).open(&name)?;
    file.write_all(bytes)?;
    Ok(())
}
