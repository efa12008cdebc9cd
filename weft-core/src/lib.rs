pub mod aggregate;
pub mod config;
pub mod docblock;
pub mod error;
pub mod fence;
pub mod lexer;
pub mod render;
pub mod rewrite;
pub mod sink;
pub mod weave;

// Re-export the pipeline so callers can just use `weft_core::render`
pub use render::{render, render_events};

// Re-export the pieces the binary and tests reach for
pub use aggregate::EventGroups;
pub use config::{ConfigFile, WeftConfig};
pub use docblock::DocBlock;
pub use error::{ErrorKind, Result, WeftError};
pub use fence::Fence;
pub use rewrite::{Hook, Rewritten, rewrite};
pub use sink::ImageSink;
pub use weave::{WeaveOptions, weave};
