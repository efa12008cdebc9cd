//! Instrumented replacements for [`crate::fmt`] and [`crate::show`].
//!
//! Same names, same signatures. Each call produces one [`crate::Event`] on
//! standard output instead of performing the output itself.

pub mod fmt;
pub mod show;
