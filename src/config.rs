use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "finantrack.toml";

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub budget: BudgetConfig,
    pub recommendation: RecommendationConfig,
    pub alerts: AlertsConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Prefix used when formatting amounts, e.g. `S/12.50`
    pub currency: String,
    pub expense_categories: Vec<String>,
    pub income_categories: Vec<String>,
    /// Category the suggestion should prioritize for savings
    pub savings_category: String,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        let strings =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            currency: "S/".to_string(),
            expense_categories: strings(&[
                "Comida",
                "Transporte",
                "Ocio",
                "Estudios",
                "Salud",
                "Ropa",
                "Metas",
                "Otros",
            ]),
            income_categories: strings(&[
                "Sueldo",
                "Beca",
                "Venta",
                "Regalo",
                "Automático",
                "Otros",
            ]),
            savings_category: "Metas".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Attach sanitized full-markdown HTML to suggestions.
    pub server_html: bool,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { server_html: true }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub budget_warning_percent: f64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            budget_warning_percent: 80.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments; the prompt is written to its stdin.
    pub command: Vec<String>,
}

impl Config {
    /// The configuration compiled into the binary.
    pub fn compiled_default() -> Self {
        // build.rs has already checked the file parses
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config to use: an explicit path (which must exist), else
    /// `finantrack.toml` in `dir`, else the compiled default.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok((Self::load(&candidate)?, Some(candidate)));
        }
        Ok((Self::compiled_default(), None))
    }
}
