//! The render pipeline: rewrite, execute, aggregate, weave.

use std::io::Write;
use std::path::Path;

use weft::Event;

use crate::aggregate::EventGroups;
use crate::config::WeftConfig;
use crate::error::{Result, WeftError};
use crate::rewrite::{Rewritten, rewrite};
use crate::weave::weave;

/// Render the program at `source_path` as a Markdown document into `out`.
///
/// Each step runs to completion before the next starts. Nothing is written
/// to `out` until the program has run and its events have been accepted.
pub async fn render<W: Write>(source_path: &Path, config: &WeftConfig, out: &mut W) -> Result<()> {
    let source = tokio::fs::read_to_string(source_path)
        .await
        .map_err(|source| WeftError::Source {
            path: source_path.to_path_buf(),
            source,
        })?;

    let rewritten = rewrite(&source)?;
    if !rewritten.is_hooked() {
        tracing::warn!(
            "{} does not import weft::fmt or weft::show; its output will not be captured",
            source_path.display()
        );
    }

    let events = weft_script::execute_script(&rewritten.source, source_path, &config.script).await?;
    tracing::info!("{} produced {} events", source_path.display(), events.len());

    render_events(out, &source, source_path, &rewritten, events, config)
}

/// The back half of [`render`], for events that were captured elsewhere.
pub fn render_events<W: Write>(
    out: &mut W,
    source: &str,
    source_path: &Path,
    rewritten: &Rewritten,
    events: Vec<Event>,
    config: &WeftConfig,
) -> Result<()> {
    let groups = EventGroups::collect(events, source_path)?;
    weave(
        out,
        source,
        source_path,
        &rewritten.doc_blocks,
        &groups,
        &config.weave,
    )
}
