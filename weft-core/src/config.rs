//! Configuration.
//!
//! Precedence: defaults < `weft.toml` < environment < command line. The
//! command line layer is applied by the binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use weft_script::ScriptConfig;

use crate::error::{Result, WeftError};
use crate::weave::WeaveOptions;

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "weft.toml";

pub const ENV_RUNTIME_PATH: &str = "WEFT_RUNTIME_PATH";
pub const ENV_CARGO: &str = "WEFT_CARGO";
pub const ENV_TARGET_DIR: &str = "WEFT_TARGET_DIR";

/// `weft.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub inline: Option<bool>,
    pub quote: Option<bool>,
    pub lang: Option<String>,
    pub image_dir: Option<PathBuf>,
    pub cargo: Option<PathBuf>,
    /// Relative paths are resolved against the config file's directory.
    pub runtime_path: Option<PathBuf>,
    /// Relative paths are resolved against the config file's directory.
    pub target_dir: Option<PathBuf>,
    pub release: Option<bool>,
    pub edition: Option<String>,
    /// Extra crates for the generated program.
    pub dependencies: Option<toml::Table>,
}

impl ConfigFile {
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|source| WeftError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| WeftError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }
}

/// Everything a render needs besides the source itself.
#[derive(Debug, Clone, Default)]
pub struct WeftConfig {
    pub weave: WeaveOptions,
    pub script: ScriptConfig,
}

impl WeftConfig {
    /// Defaults, then `explicit` (or `./weft.toml` if present), then the
    /// process environment.
    ///
    /// A missing `explicit` file is an error; a missing `./weft.toml` is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(CONFIG_FILE)).filter(|p| p.is_file()),
        };
        if let Some(path) = path {
            tracing::debug!("loading config from {}", path.display());
            let file = ConfigFile::read(&path)?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            config.apply_file(file, &base);
        }

        config.apply_env(|key| std::env::var_os(key));
        Ok(config)
    }

    /// Overlay the keys set in `file`. `base` anchors relative runtime and
    /// target paths.
    pub fn apply_file(&mut self, file: ConfigFile, base: &Path) {
        if let Some(inline) = file.inline {
            self.weave.inline_images = inline;
        }
        if let Some(quote) = file.quote {
            self.weave.quote = quote;
        }
        if let Some(lang) = file.lang {
            self.weave.lang = Some(lang).filter(|l| !l.is_empty());
        }
        if let Some(dir) = file.image_dir {
            self.weave.image_dir = dir;
        }
        if let Some(cargo) = file.cargo {
            self.script.cargo = cargo;
        }
        if let Some(path) = file.runtime_path {
            self.script.runtime_path = base.join(path);
        }
        if let Some(dir) = file.target_dir {
            self.script.target_dir = Some(base.join(dir));
        }
        if let Some(release) = file.release {
            self.script.release = release;
        }
        if let Some(edition) = file.edition {
            self.script.edition = edition;
        }
        if let Some(dependencies) = file.dependencies {
            self.script.dependencies.extend(dependencies);
        }
    }

    /// Overlay `WEFT_*` variables as reported by `lookup`. Empty values are
    /// ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<OsString>) {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        if let Some(path) = var(ENV_RUNTIME_PATH) {
            self.script.runtime_path = path;
        }
        if let Some(cargo) = var(ENV_CARGO) {
            self.script.cargo = cargo;
        }
        if let Some(dir) = var(ENV_TARGET_DIR) {
            self.script.target_dir = Some(dir);
        }
    }
}
