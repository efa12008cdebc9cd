//! The Event Aggregator.

use std::collections::BTreeMap;
use std::path::Path;

use weft::{Event, Stream};

use crate::error::{Result, WeftError};

/// Events keyed by the source line they were emitted from.
///
/// Within a line, events keep emission order. Nothing is promised across
/// lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventGroups {
    groups: BTreeMap<u32, Vec<Event>>,
}

impl EventGroups {
    /// Group `events` by line, rejecting any event from a file other than
    /// `source`.
    pub fn collect(events: Vec<Event>, source: &Path) -> Result<Self> {
        // Events carry lossy UTF-8 paths; compare in the same form.
        let expected = source.to_string_lossy();
        let mut groups: BTreeMap<u32, Vec<Event>> = BTreeMap::new();
        for mut event in events {
            if Path::new(&event.file) != Path::new(expected.as_ref()) {
                return Err(WeftError::ForeignFile {
                    file: event.file,
                    line: event.line,
                    expected: source.to_path_buf(),
                });
            }
            if event.stream != Stream::Image {
                event.terminate_text();
            }
            groups.entry(event.line).or_default().push(event);
        }

        tracing::debug!("grouped events onto {} lines", groups.len());
        Ok(Self { groups })
    }

    /// The group for `line`, empty if nothing was emitted there.
    pub fn get(&self, line: u32) -> &[Event] {
        self.groups.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Lines that have events, ascending.
    pub fn lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    /// Every event, by line then emission order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.groups.values().flatten()
    }
}
