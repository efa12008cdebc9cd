//! Output primitives, plain build.
//!
//! Exactly the `std` macros and handles. The renderer swaps this module for
//! [`crate::capture::fmt`], which exposes the same names.

pub use std::io::{Stderr, StderrLock, Stdout, StdoutLock, stderr, stdout};
pub use std::{eprint, eprintln, print, println};
