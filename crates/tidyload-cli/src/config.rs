//! Run configuration loaded from a TOML or JSON file.
//!
//! ```toml
//! [extraction]
//! csv_file = "data/customers.csv"
//! parse_dates = ["registration_date", "last_purchase_date"]
//!
//! [transformation]
//! text_columns = ["first_name", "last_name"]
//!
//! [loading]
//! warehouse_dir = "warehouse"
//! table = "customers"
//! write_disposition = "append"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use tidyload_ingest::ExtractOptions;
use tidyload_model::TransformConfig;
use tidyload_output::{LoadOptions, WriteDisposition};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub extraction: ExtractionConfig,
    pub transformation: TransformConfig,
    pub loading: LoadingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub csv_file: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub parse_dates: Vec<String>,
    /// Replaces the extra NA spellings when set.
    pub na_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    pub warehouse_dir: Option<PathBuf>,
    pub table: Option<String>,
    pub write_disposition: WriteDisposition,
    pub create_table: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            warehouse_dir: None,
            table: None,
            write_disposition: WriteDisposition::default(),
            create_table: true,
        }
    }
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub csv_file: Option<PathBuf>,
    pub warehouse_dir: Option<PathBuf>,
    pub table: Option<String>,
}

/// A configuration with every required field present.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub csv_file: PathBuf,
    pub extract: ExtractOptions,
    pub transform: TransformConfig,
    pub warehouse_dir: PathBuf,
    pub table: String,
    pub load: LoadOptions,
}

impl EtlConfig {
    /// Parse a config file, choosing the format by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => toml::from_str(&text)
                .with_context(|| format!("parse TOML config {}", path.display())),
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parse JSON config {}", path.display())),
            _ => bail!(
                "unsupported config format for {}: expected .toml or .json",
                path.display()
            ),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(path) = &overrides.csv_file {
            self.extraction.csv_file = Some(path.clone());
        }
        if let Some(dir) = &overrides.warehouse_dir {
            self.loading.warehouse_dir = Some(dir.clone());
        }
        if let Some(table) = &overrides.table {
            self.loading.table = Some(table.clone());
        }
    }

    /// Check required fields and build the per-phase options.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let table = self.loading.table.as_deref().filter(|name| !name.is_empty());
        let (Some(csv_file), Some(warehouse_dir), Some(table)) = (
            &self.extraction.csv_file,
            &self.loading.warehouse_dir,
            table,
        ) else {
            let missing: Vec<&str> = [
                ("extraction.csv_file", self.extraction.csv_file.is_none()),
                ("loading.warehouse_dir", self.loading.warehouse_dir.is_none()),
                ("loading.table", table.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            bail!("required configuration fields missing: {}", missing.join(", "));
        };

        let mut extract = ExtractOptions::default().with_parse_dates(&self.extraction.parse_dates);
        if let Some(delimiter) = self.extraction.delimiter {
            if !delimiter.is_ascii() {
                bail!("delimiter must be a single ASCII character, got {delimiter:?}");
            }
            extract.delimiter = delimiter as u8;
        }
        if let Some(na_values) = &self.extraction.na_values {
            extract.na_values = na_values.clone();
        }

        Ok(ResolvedConfig {
            csv_file: csv_file.clone(),
            extract,
            transform: self.transformation.clone(),
            warehouse_dir: warehouse_dir.clone(),
            table: table.to_string(),
            load: LoadOptions {
                disposition: self.loading.write_disposition,
                create_table: self.loading.create_table,
            },
        })
    }
}
