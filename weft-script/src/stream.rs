//! Event stream decoding.

use std::path::Path;

use weft::Event;

use crate::{MAIN_RS, ScriptError};

/// Decode back-to-back JSON events until the end of `bytes`.
///
/// Whitespace between and after events is ignored. Anything else that is
/// not a complete event, including a truncated final one, is an error.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<Event>, ScriptError> {
    let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<Event>();
    let mut events = Vec::new();

    loop {
        let offset = stream.byte_offset();
        match stream.next() {
            None => break,
            Some(Ok(event)) => events.push(event),
            Some(Err(source)) => return Err(ScriptError::Decode { offset, source }),
        }
    }

    tracing::debug!("decoded {} events", events.len());
    Ok(events)
}

/// Point events recorded against the generated `src/main.rs` back at the
/// original source. Events from any other file are left alone.
pub fn reattribute(mut events: Vec<Event>, main_path: &Path, original: &Path) -> Vec<Event> {
    let original = original.to_string_lossy();
    for event in &mut events {
        let file = Path::new(&event.file);
        if file == Path::new(MAIN_RS) || file == main_path {
            event.file = original.to_string();
        }
    }
    events
}
