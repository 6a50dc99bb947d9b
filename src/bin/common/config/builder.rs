use std::fs::File;
use std::io::Read;

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use fwi::models::output::OutputVariableName;

use crate::common::helpers::FWIGridError;

use super::models::FWIConfig;

fn default_model_version() -> String {
    "standard".to_owned()
}

/// One output definition: where to write which variables in which format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputTypeConfig {
    pub name: String,
    pub path: String,
    pub format: String,
    pub variables: Vec<OutputVariableName>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FWIConfigBuilder {
    pub model_name: String,
    pub cells_file_path: String,
    pub warm_state_path: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
    /// IANA timezone of the daily observations; resolved from the grid
    /// centroid when absent
    #[serde(default)]
    pub timezone: Option<String>,
    pub output_types: Vec<OutputTypeConfig>,
}

impl FWIConfigBuilder {
    pub fn build(&self, date: &DateTime<Utc>) -> Result<FWIConfig, FWIGridError> {
        FWIConfig::new(self, *date)
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigBuilderType {
    FWI(FWIConfigBuilder),
}

impl ConfigBuilderType {
    pub fn get_model_name(&self) -> &str {
        match self {
            ConfigBuilderType::FWI(config) => config.get_model_name(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigContainer {
    pub models: Vec<ConfigBuilderType>,
}

impl ConfigContainer {
    pub fn from_file(config_file: &str) -> Result<ConfigContainer, FWIGridError> {
        // Check the file extension to determine which method to use
        if config_file.ends_with(".yaml") || config_file.ends_with(".yml") {
            Self::from_yaml(config_file)
        } else if config_file.ends_with(".json") {
            Self::from_json(config_file)
        } else {
            Err(FWIGridError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )))
        }
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, FWIGridError> {
        let contents = read_to_string(config_file)?;
        let conf = serde_yaml::from_str(&contents)
            .map_err(|err| format!("Cannot parse config file {}: {}", config_file, err))?;
        Ok(conf)
    }

    pub fn from_json(config_file: &str) -> Result<Self, FWIGridError> {
        let contents = read_to_string(config_file)?;
        let conf = serde_json::from_str(&contents)
            .map_err(|err| format!("Cannot parse config file {}: {}", config_file, err))?;
        Ok(conf)
    }
}

fn read_to_string(config_file: &str) -> Result<String, FWIGridError> {
    let mut file = File::open(config_file)
        .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;
    Ok(contents)
}
