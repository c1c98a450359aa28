use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::fiscal::Quarter;
use crate::ingest::csv_source::DEFAULT_ENCODING;

pub const DEFAULT_CONFIG_PATH: &str = "msd.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub run: RunConfig,
    pub files: FileLocators,
}

/// Reporting-period context of one transform run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    pub data_version: String,
    pub start_fiscal_year: i32,
    pub current_fiscal_year: i32,
    pub current_quarter: Quarter,
    #[serde(default)]
    pub produce_renamed_output_schema: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileLocators {
    #[serde(default = "default_base_directory")]
    pub base_directory: PathBuf,
    pub ref_table: FileLocator,
    pub partner_type_table: FileLocator,
    pub known_issues_table: FileLocator,
    pub psnu_files: Vec<FileLocator>,
    pub nat_subnat_file: FileLocator,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileLocator {
    pub path: PathBuf,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

fn default_base_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_na_values() -> Vec<String> {
    vec![String::new()]
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref();
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&config_content)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.run.validate()?;
        if self.files.psnu_files.is_empty() {
            return Err(PipelineError::Config(
                "at least one entry is required in files.psnu_files".to_string(),
            ));
        }
        Ok(())
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_version.trim().is_empty() {
            return Err(PipelineError::Config("run.data_version must not be empty".to_string()));
        }
        if self.start_fiscal_year > self.current_fiscal_year {
            return Err(PipelineError::Config(format!(
                "run.start_fiscal_year ({}) is after run.current_fiscal_year ({})",
                self.start_fiscal_year, self.current_fiscal_year
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[run]
data_version = "1.0"
start_fiscal_year = 2017
current_fiscal_year = 2021
current_quarter = "Q4"

[files]
base_directory = "data"
ref_table = { path = "Lookup Tables/ref.csv" }
partner_type_table = { path = "Lookup Tables/partner_type.csv", encoding = "latin1" }
known_issues_table = { path = "Lookup Tables/known_issues.csv", na_values = ["", "NULL"] }
psnu_files = [ { path = "MSD/site_1.txt" }, { path = "MSD/site_2.txt" } ]
nat_subnat_file = { path = "MSD/nat_subnat.txt" }
"#;

    #[test]
    fn test_parse_sample_config_with_defaults() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.run.current_quarter, Quarter::Q4);
        assert!(!config.run.produce_renamed_output_schema);
        assert_eq!(config.files.ref_table.encoding, "utf-8-sig");
        assert_eq!(config.files.ref_table.na_values, vec![String::new()]);
        assert_eq!(config.files.partner_type_table.encoding, "latin1");
        assert_eq!(config.files.known_issues_table.na_values.len(), 2);
        assert_eq!(config.files.psnu_files.len(), 2);
    }

    #[test]
    fn test_validate_rejects_inverted_years() {
        let content = SAMPLE.replace("start_fiscal_year = 2017", "start_fiscal_year = 2023");
        assert!(matches!(Config::from_toml_str(&content), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_site_list() {
        let content = SAMPLE.replace(
            r#"psnu_files = [ { path = "MSD/site_1.txt" }, { path = "MSD/site_2.txt" } ]"#,
            "psnu_files = []",
        );
        assert!(matches!(Config::from_toml_str(&content), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_quarter() {
        let content = SAMPLE.replace(r#"current_quarter = "Q4""#, r#"current_quarter = "Q5""#);
        assert!(matches!(Config::from_toml_str(&content), Err(PipelineError::Toml(_))));
    }

    #[test]
    fn test_load_reports_missing_file() {
        assert!(matches!(Config::load("/nonexistent/msd.toml"), Err(PipelineError::Config(_))));
    }
}
