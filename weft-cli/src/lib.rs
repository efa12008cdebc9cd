//! Weft command line library target.
//!
//! The binary entry point is in `main.rs`; argument parsing and logging
//! setup live here so `tests/` can reach them.

pub mod cli;
