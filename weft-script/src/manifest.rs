//! Cargo.toml for the generated project.

use toml::{Table, Value};

use crate::ScriptConfig;

/// Package name of every generated project.
pub const PACKAGE_NAME: &str = "weft-render";

/// Render the manifest: one binary package depending on the `weft` runtime
/// plus the configured extras. The empty `[workspace]` table keeps cargo
/// from attaching the temp project to an enclosing workspace.
pub fn render_manifest(config: &ScriptConfig) -> Result<String, toml::ser::Error> {
    let mut package = Table::new();
    package.insert("name".into(), PACKAGE_NAME.into());
    package.insert("version".into(), "0.0.0".into());
    package.insert("edition".into(), config.edition.as_str().into());
    package.insert("publish".into(), false.into());

    let mut runtime = Table::new();
    runtime.insert(
        "path".into(),
        config.runtime_path.to_string_lossy().into_owned().into(),
    );

    let mut dependencies = config.dependencies.clone();
    dependencies.insert("weft".into(), Value::Table(runtime));

    let mut root = Table::new();
    root.insert("package".into(), Value::Table(package));
    root.insert("dependencies".into(), Value::Table(dependencies));
    root.insert("workspace".into(), Value::Table(Table::new()));

    toml::to_string(&root)
}
