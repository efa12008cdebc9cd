//! Call-site attribution.
//!
//! An event is attributed to the user code that called the output wrapper,
//! never to the wrapper itself. The location is captured once, at the
//! outermost wrapper, and threaded down to the emitter as a [`CallSite`]:
//!
//! - macro wrappers capture `file!()` / `line!()` where they expand;
//! - function wrappers are `#[track_caller]` and read
//!   [`Location::caller`]. A wrapper that calls another wrapper must also be
//!   `#[track_caller]` so the location moves one frame further out.

use std::panic::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub func: Option<&'static str>,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, func: Option<&'static str>) -> Self {
        Self { file, line, func }
    }

    /// The location of whoever called the current `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), None)
    }
}

/// Strip the probe function and closure frames from a type name.
///
/// `app::main::{{closure}}::__probe` becomes `app::main`.
pub fn trim_function_name(name: &'static str) -> &'static str {
    let mut name = name.strip_suffix("::__probe").unwrap_or(name);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}
