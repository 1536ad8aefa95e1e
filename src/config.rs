use serde::Deserialize;
use std::path::PathBuf;

/// Optional TOML config file. Every field supplies a default for the
/// matching CLI flag; flags given on the command line win.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input glob pattern or source directory
    pub input: Option<String>,
    /// Output directory for generated files
    pub output_dir: Option<PathBuf>,
    /// Package name for generated files
    pub package: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub hash_guard: bool,
}

impl Config {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
