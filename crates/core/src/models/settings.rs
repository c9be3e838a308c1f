use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Dashboard configuration. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spreadsheet (or CSV) holding the transaction records.
    pub data_file: PathBuf,

    /// Bottom-to-top stacking order of the market-composition chart.
    /// Markets not listed are drawn on top.
    pub stack_order: Vec<String>,

    /// Markets whose stacked segment is dark enough to need white label text.
    pub light_label_categories: Vec<String>,

    /// Height in pixels of the market-composition chart.
    pub chart_height: u32,

    /// Attribution shown under the raw data table.
    pub source_name: String,
    pub source_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("mercado bursatil.xlsx"),
            stack_order: vec![
                "Repos".to_string(),
                "Mercado Secundario".to_string(),
                "Mercado Primario".to_string(),
            ],
            light_label_categories: vec!["Repos".to_string()],
            chart_height: 420,
            source_name: "Banco Central del Paraguay – Mercado bursátil".to_string(),
            source_url: "https://www.bcp.gov.py/web/institucional/mercado-bursatil".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.chart_height == 0 {
            return Err(CoreError::Config("chart_height must be positive".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.stack_order.iter().find(|m| !seen.insert(m.as_str())) {
            return Err(CoreError::Config(format!(
                "stack_order lists '{dup}' more than once"
            )));
        }
        Ok(())
    }
}
