//! Output primitives, captured build.
//!
//! `print!`, `println!`, `eprint!` and `eprintln!` format their arguments and
//! emit one event each. [`stdout`] and [`stderr`] return writers that emit
//! one event per `write`/`write_fmt` call, as do their `lock()` guards;
//! writers obtained any other way are plain `std` and are not intercepted.

use std::io;
use std::marker::PhantomData;

use crate::callsite::CallSite;
use crate::emit::emit;
use crate::event::{Event, Stream};

pub use crate::__capture_eprint as eprint;
pub use crate::__capture_eprintln as eprintln;
pub use crate::__capture_print as print;
pub use crate::__capture_println as println;

#[doc(hidden)]
#[macro_export]
macro_rules! __capture_print {
    ($($arg:tt)*) => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stdout,
            ::std::format!($($arg)*),
            $crate::__callsite!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capture_println {
    () => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stdout,
            ::std::string::String::from("\n"),
            $crate::__callsite!(),
        )
    };
    ($($arg:tt)*) => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stdout,
            $crate::capture::fmt::__line(::std::format!($($arg)*)),
            $crate::__callsite!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capture_eprint {
    ($($arg:tt)*) => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stderr,
            ::std::format!($($arg)*),
            $crate::__callsite!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capture_eprintln {
    () => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stderr,
            ::std::string::String::from("\n"),
            $crate::__callsite!(),
        )
    };
    ($($arg:tt)*) => {
        $crate::capture::fmt::__print(
            $crate::Stream::Stderr,
            $crate::capture::fmt::__line(::std::format!($($arg)*)),
            $crate::__callsite!(),
        )
    };
}

#[doc(hidden)]
pub fn __line(mut text: String) -> String {
    text.push('\n');
    text
}

/// Backs the print macros. Panics on failure, like `std::println!`.
#[doc(hidden)]
pub fn __print(stream: Stream, text: String, site: CallSite) {
    if let Err(e) = emit(Event::text(stream, text), site) {
        panic!("failed printing to {}: {}", stream, e);
    }
}

fn emit_bytes(stream: Stream, buf: &[u8], site: CallSite) -> io::Result<()> {
    let text = String::from_utf8_lossy(buf).into_owned();
    emit(Event::text(stream, text), site).map_err(io::Error::other)
}

// ────────────────────────────────────────────────────────────────
// Writer handles
// ────────────────────────────────────────────────────────────────

/// Captured standard output handle.
#[derive(Debug, Default)]
pub struct Stdout {
    _private: (),
}

/// Captured standard error handle.
#[derive(Debug, Default)]
pub struct Stderr {
    _private: (),
}

/// Locked [`Stdout`]. Every event already goes out under the emit lock, so
/// holding this guard locks nothing further.
#[derive(Debug)]
pub struct StdoutLock<'a> {
    _handle: PhantomData<&'a Stdout>,
}

/// Locked [`Stderr`].
#[derive(Debug)]
pub struct StderrLock<'a> {
    _handle: PhantomData<&'a Stderr>,
}

pub fn stdout() -> Stdout {
    Stdout::default()
}

pub fn stderr() -> Stderr {
    Stderr::default()
}

impl Stdout {
    pub fn lock(&self) -> StdoutLock<'static> {
        StdoutLock {
            _handle: PhantomData,
        }
    }
}

impl Stderr {
    pub fn lock(&self) -> StderrLock<'static> {
        StderrLock {
            _handle: PhantomData,
        }
    }
}

macro_rules! captured_writer {
    ($handle:ty, $stream:expr) => {
        impl io::Write for $handle {
            #[track_caller]
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                emit_bytes($stream, buf, CallSite::caller())?;
                Ok(buf.len())
            }

            #[track_caller]
            fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
                emit_bytes($stream, buf, CallSite::caller())
            }

            #[track_caller]
            fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
                let site = CallSite::caller();
                emit(Event::text($stream, args.to_string()), site).map_err(io::Error::other)
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
    };
}

captured_writer!(Stdout, Stream::Stdout);
captured_writer!(Stderr, Stream::Stderr);
captured_writer!(StdoutLock<'_>, Stream::Stdout);
captured_writer!(StderrLock<'_>, Stream::Stderr);
