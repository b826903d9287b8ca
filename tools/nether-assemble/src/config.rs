//! assemble.toml parsing

use anyhow::{Context, Result};
use nether_assembly::AssemblyOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// assemble.toml structure
#[derive(Debug, Default, Deserialize)]
pub struct AssembleConfig {
    #[serde(default)]
    pub assembly: AssemblyOptions,
    #[serde(default)]
    pub output: OutputSection,
}

/// Output section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output file, relative to the config file
    pub path: Option<String>,
    /// Pretty-print the JSON
    #[serde(default)]
    pub pretty: bool,
}

impl AssembleConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse assemble.toml")
    }

    /// Output path from the config, resolved against the config's directory
    pub fn output_path(&self, config_path: &Path) -> Option<PathBuf> {
        let path = self.output.path.as_ref()?;
        let base = config_path.parent().unwrap_or(Path::new("."));
        Some(base.join(path))
    }
}
