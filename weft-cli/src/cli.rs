//! Command line surface of the `weft` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use weft_core::WeftConfig;

#[derive(Debug, Parser)]
#[command(name = "weft")]
#[command(about = "Render a Rust program and its captured output as one Markdown document")]
#[command(version)]
pub struct Cli {
    /// The program to render
    pub source: PathBuf,

    /// Embed images as data: URIs instead of writing side files
    #[arg(long)]
    pub inline: bool,

    /// Blockquote captured output (default: true)
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub quote: Option<bool>,

    /// Info string for source code fences, e.g. `rust`
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Directory for image side files (default: working directory)
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,

    /// Config file (default: ./weft.toml if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build the program in release mode
    #[arg(long)]
    pub release: bool,

    /// More logging on stderr; repeat for more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Layer the flags that were actually given over `config`.
    pub fn apply(&self, config: &mut WeftConfig) {
        if self.inline {
            config.weave.inline_images = true;
        }
        if let Some(quote) = self.quote {
            config.weave.quote = quote;
        }
        if let Some(lang) = &self.lang {
            config.weave.lang = Some(lang.clone()).filter(|l| !l.is_empty());
        }
        if let Some(dir) = &self.image_dir {
            config.weave.image_dir = dir.clone();
        }
        if self.release {
            config.script.release = true;
        }
    }

    pub fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Log to stderr; stdout carries the document. `RUST_LOG` wins over `-v`.
pub fn init_tracing(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
