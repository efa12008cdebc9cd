//! The Weaver.
//!
//! Walks the original source line by line and merges it with the
//! Documentation Blocks and the captured Event Groups into one Markdown
//! document:
//!
//! - plain source lines go into code fences, byte for byte;
//! - a Documentation Block becomes prose and its lines are consumed;
//! - the events of a line are rendered right after that line, each
//!   stdout/stderr event in its own fence labelled with the stream name.
//!
//! The only state is whether a code fence is currently open. A fence is
//! opened lazily by the first code line after prose or output, so the
//! document never contains an empty code block.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use weft::{Event, ImageFormat, Stream};

use crate::aggregate::EventGroups;
use crate::docblock::DocBlock;
use crate::error::{Result, WeftError};
use crate::fence::Fence;
use crate::sink::ImageSink;

const QUOTE: &str = "> ";
const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaveOptions {
    /// Embed images as `data:` references instead of writing side files.
    pub inline_images: bool,
    /// Blockquote captured output and image references.
    pub quote: bool,
    /// Info string for source code fences.
    pub lang: Option<String>,
    /// Where side files go. Empty means the working directory.
    pub image_dir: PathBuf,
}

impl Default for WeaveOptions {
    fn default() -> Self {
        Self {
            inline_images: false,
            quote: true,
            lang: None,
            image_dir: PathBuf::new(),
        }
    }
}

/// Weave `source` into `out`.
///
/// `source_path` names image side files. Output written before a failure
/// stays written.
pub fn weave<W: Write>(
    out: &mut W,
    source: &str,
    source_path: &Path,
    doc_blocks: &[DocBlock],
    groups: &EventGroups,
    options: &WeaveOptions,
) -> Result<()> {
    let source = source.strip_prefix(BOM).unwrap_or(source);
    let fence = Fence::for_texts(
        std::iter::once(source).chain(groups.events().map(|event| event.text.as_str())),
    );
    tracing::debug!("using {}-backtick fences", fence.width());

    let mut weaver = Weaver {
        out,
        fence,
        in_fence: false,
        options,
        groups,
        sink: ImageSink::new(source_path, options.image_dir.clone()),
        rendered: BTreeSet::new(),
    };
    weaver.run(source, doc_blocks)?;
    weaver.out.flush()?;
    Ok(())
}

struct Weaver<'a, W: Write> {
    out: &'a mut W,
    fence: Fence,
    in_fence: bool,
    options: &'a WeaveOptions,
    groups: &'a EventGroups,
    sink: ImageSink,
    rendered: BTreeSet<u32>,
}

impl<W: Write> Weaver<'_, W> {
    fn run(&mut self, source: &str, doc_blocks: &[DocBlock]) -> Result<()> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let blocks: BTreeMap<usize, &DocBlock> =
            doc_blocks.iter().map(|b| (b.start_line, b)).collect();

        // Lines consumed so far; also the number of the last consumed line.
        let mut cursor = 0;
        while cursor < lines.len() {
            self.render_events(cursor)?;

            let next = cursor + 1;
            match blocks.get(&next) {
                Some(block) => {
                    self.close_fence()?;
                    self.write_prose(&block.prose())?;
                    cursor = block.end_line.clamp(next, lines.len());
                }
                None => {
                    self.open_fence()?;
                    self.write_line("", lines[cursor])?;
                    cursor = next;
                }
            }
        }
        self.render_events(cursor)?;
        self.close_fence()?;

        let skipped = self
            .groups
            .lines()
            .filter(|line| !self.rendered.contains(line))
            .collect::<Vec<_>>();
        if !skipped.is_empty() {
            tracing::warn!(
                "events on lines {:?} fall inside doc blocks or past the end of the source and were not rendered",
                skipped
            );
        }
        Ok(())
    }

    fn open_fence(&mut self) -> Result<()> {
        if !self.in_fence {
            let lang = self.options.lang.as_deref().unwrap_or("");
            writeln!(self.out, "{}{}", self.fence, lang)?;
            self.in_fence = true;
        }
        Ok(())
    }

    fn close_fence(&mut self) -> Result<()> {
        if self.in_fence {
            writeln!(self.out, "{}", self.fence)?;
            self.in_fence = false;
        }
        Ok(())
    }

    /// Write `line` behind `prefix`, newline terminated.
    fn write_line(&mut self, prefix: &str, line: &str) -> Result<()> {
        self.out.write_all(prefix.as_bytes())?;
        self.out.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_prose(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.write_line("", text)
    }

    fn quote(&self) -> &'static str {
        if self.options.quote { QUOTE } else { "" }
    }

    fn render_events(&mut self, line: usize) -> Result<()> {
        let Ok(line) = u32::try_from(line) else {
            return Ok(());
        };
        let groups = self.groups;
        let events = groups.get(line);
        if events.is_empty() {
            return Ok(());
        }
        self.rendered.insert(line);
        self.close_fence()?;

        let images = events.iter().filter(|e| e.stream == Stream::Image).count();
        let mut image_index = 0;
        let mut after_image = false;
        for event in events {
            match event.stream {
                Stream::Stdout | Stream::Stderr => {
                    self.write_output(event)?;
                    after_image = false;
                }
                Stream::Markdown => {
                    self.write_prose(&event.text)?;
                    after_image = false;
                }
                Stream::Image => {
                    if after_image {
                        writeln!(self.out)?;
                    }
                    let index = (images > 1).then_some(image_index);
                    self.write_image(event, index)?;
                    image_index += 1;
                    after_image = true;
                }
            }
        }
        Ok(())
    }

    fn write_output(&mut self, event: &Event) -> Result<()> {
        let quote = self.quote();
        writeln!(self.out, "{}{}{}", quote, self.fence, event.stream)?;
        for line in event.text.split_inclusive('\n') {
            self.write_line(quote, line)?;
        }
        writeln!(self.out, "{}{}", quote, self.fence)?;
        Ok(())
    }

    fn write_image(&mut self, event: &Event, index: Option<usize>) -> Result<()> {
        let target = if self.options.inline_images {
            let data_ref = event
                .image
                .as_deref()
                .ok_or(WeftError::MissingImage { line: event.line })?;
            if ImageFormat::detect(data_ref).is_none() {
                return Err(WeftError::UnknownImage {
                    line: event.line,
                    detail: data_ref.chars().take(40).collect(),
                });
            }
            data_ref.to_string()
        } else {
            self.sink
                .write(event, index)?
                .to_string_lossy()
                .replace('\\', "/")
        };

        let quote = self.quote();
        match event.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => writeln!(self.out, "{}![{}]({} {:?})", quote, event.text, target, title)?,
            None => writeln!(self.out, "{}![{}]({})", quote, event.text, target)?,
        }
        Ok(())
    }
}
