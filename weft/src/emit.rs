//! Event emission.
//!
//! Every intercepted call becomes exactly one line on standard output. A
//! process-wide lock is held from serialization to flush so that threads in
//! the rendered program never interleave partial lines.

use std::io::Write;
use std::sync::Mutex;

use crate::Result;
use crate::callsite::CallSite;
use crate::event::Event;

static EMIT_LOCK: Mutex<()> = Mutex::new(());

/// Stamp `event` with `site` and write it to standard output.
pub fn emit(event: Event, site: CallSite) -> Result<()> {
    let event = locate(event, &site);

    // Guards `()`; poisoning carries no state.
    let _guard = EMIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_event(&mut out, &event)?;
    out.flush()?;
    Ok(())
}

/// Write one event as a single newline-terminated JSON line.
pub fn write_event<W: Write>(out: &mut W, event: &Event) -> Result<()> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    out.write_all(&line)?;
    Ok(())
}

/// Copy the call-site fields onto the event.
pub fn locate(mut event: Event, site: &CallSite) -> Event {
    event.file = site.file.to_string();
    event.line = site.line;
    event.func = site.func.map(str::to_string);
    event
}
