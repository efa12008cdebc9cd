//! # Weft Script
//!
//! The Execution Harness.
//! Persists a rewritten program into a throwaway cargo project, builds and
//! runs it, and decodes the event stream it prints on stdout. The child's
//! stderr goes straight to ours.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tempfile::TempDir;
use weft::Event;

pub mod manifest;
pub mod stream;

pub use manifest::render_manifest;
pub use stream::{decode_events, reattribute};

/// Where the rewritten program lives inside the generated project.
/// `file!()` in the child reports exactly this path.
pub const MAIN_RS: &str = "src/main.rs";

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to prepare build directory: {0}")]
    Prepare(#[from] io::Error),

    #[error("failed to generate Cargo.toml: {0}")]
    Manifest(#[from] toml::ser::Error),

    #[error("failed to launch {cargo}: {source}")]
    Launch {
        cargo: String,
        #[source]
        source: io::Error,
    },

    #[error("program failed: {status}")]
    Failed { status: ExitStatus },

    #[error("malformed event stream at byte {offset}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ScriptError {
    /// Launch failures and non-zero exits, as opposed to harness or
    /// protocol failures.
    pub fn is_execution(&self) -> bool {
        matches!(self, ScriptError::Launch { .. } | ScriptError::Failed { .. })
    }
}

/// How the generated project is built and run.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// The cargo binary.
    pub cargo: PathBuf,
    /// Path to the `weft` runtime crate the program links against.
    pub runtime_path: PathBuf,
    /// Shared `CARGO_TARGET_DIR`; `None` builds inside the temp dir.
    pub target_dir: Option<PathBuf>,
    /// Parent directory for the temp project; `None` uses the system default.
    pub temp_root: Option<PathBuf>,
    pub release: bool,
    pub edition: String,
    /// Extra `[dependencies]` entries for the program.
    pub dependencies: toml::Table,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            cargo: PathBuf::from("cargo"),
            runtime_path: default_runtime_path(),
            target_dir: default_target_dir(),
            temp_root: None,
            release: false,
            edition: "2021".to_string(),
            dependencies: toml::Table::new(),
        }
    }
}

/// The runtime crate next to this one in the source tree.
pub fn default_runtime_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("weft")
}

/// `~/.cache/weft/target` (or the platform equivalent).
pub fn default_target_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "weft").map(|dirs| dirs.cache_dir().join("target"))
}

// ────────────────────────────────────────────────────────────────
// Project
// ────────────────────────────────────────────────────────────────

/// A generated cargo project. The directory is removed on drop.
#[derive(Debug)]
pub struct ScriptProject {
    dir: TempDir,
}

impl ScriptProject {
    /// Write the manifest and `src/main.rs` into a fresh temp dir.
    pub async fn create(source: &str, config: &ScriptConfig) -> Result<Self, ScriptError> {
        let dir = match &config.temp_root {
            Some(root) => tempfile::Builder::new().prefix("weft-").tempdir_in(root)?,
            None => tempfile::Builder::new().prefix("weft-").tempdir()?,
        };
        let project = Self { dir };

        let manifest = render_manifest(config)?;
        tokio::fs::write(project.manifest_path(), manifest).await?;
        tokio::fs::create_dir_all(project.dir.path().join("src")).await?;
        tokio::fs::write(project.main_path(), source).await?;

        tracing::debug!("wrote rewritten program to {}", project.main_path().display());
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("Cargo.toml")
    }

    pub fn main_path(&self) -> PathBuf {
        self.dir.path().join(MAIN_RS)
    }

    /// `cargo run` the project and return everything it printed on stdout.
    ///
    /// Blocks until the child exits. There is no timeout.
    pub async fn run(&self, config: &ScriptConfig) -> Result<Vec<u8>, ScriptError> {
        let mut cmd = tokio::process::Command::new(&config.cargo);
        cmd.arg("run")
            .arg("--quiet")
            .arg("--manifest-path")
            .arg(self.manifest_path());
        if config.release {
            cmd.arg("--release");
        }
        if let Some(target_dir) = &config.target_dir {
            cmd.env("CARGO_TARGET_DIR", target_dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        tracing::info!("Running rewritten program via {}", config.cargo.display());
        let launch_error = |source: io::Error| ScriptError::Launch {
            cargo: config.cargo.display().to_string(),
            source,
        };
        // `output()` would pipe stderr too; spawn keeps it inherited.
        let child = cmd.spawn().map_err(launch_error)?;
        let output = child.wait_with_output().await.map_err(launch_error)?;

        if !output.status.success() {
            return Err(ScriptError::Failed {
                status: output.status,
            });
        }

        tracing::debug!("captured {} bytes of event stream", output.stdout.len());
        Ok(output.stdout)
    }
}

/// Build and run `source`, returning its events attributed to `original`.
///
/// The temp project is removed on every path out of this function.
pub async fn execute_script(
    source: &str,
    original: &Path,
    config: &ScriptConfig,
) -> Result<Vec<Event>, ScriptError> {
    let project = ScriptProject::create(source, config).await?;
    let stdout = project.run(config).await?;
    let events = decode_events(&stdout)?;
    Ok(reattribute(events, &project.main_path(), original))
}
