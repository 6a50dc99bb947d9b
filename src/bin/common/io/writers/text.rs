use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use rayon::prelude::*;
use strum::EnumProperty;

use fwi::constants::NODATAVAL;
use fwi::models::output::{Output, OutputVariableName};

use crate::common::config::builder::OutputTypeConfig;
use crate::common::helpers::FWIGridError;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// one value per cell line
    Txt,
    /// `lon,lat,value` per cell line
    Csv,
}

impl OutputFormat {
    fn from_name(name: &str) -> Result<Self, FWIGridError> {
        match name.to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unsupported output format {other}").into()),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Csv => "csv",
        }
    }
}

pub struct OutputType {
    name: String,
    path: String,
    format: OutputFormat,
    variables: Vec<OutputVariableName>,
}

impl OutputType {
    pub fn new(def: &OutputTypeConfig) -> Result<Self, FWIGridError> {
        Ok(OutputType {
            name: def.name.clone(),
            path: def.path.clone(),
            format: OutputFormat::from_name(&def.format)?,
            variables: def.variables.clone(),
        })
    }

    fn variable_file(&self, output: &Output, variable_name: &str) -> PathBuf {
        let date_string = output.time.format("%Y%m%d%H%M").to_string();
        Path::new(&self.path).join(format!(
            "{}_{}_{}.{}",
            date_string,
            self.name,
            variable_name,
            self.format.extension()
        ))
    }

    pub fn write_variables(
        &self,
        lats: &[f32],
        lons: &[f32],
        output: &Output,
    ) -> Result<(), FWIGridError> {
        for variable in &self.variables {
            let values = output
                .get(variable)
                .ok_or(format!("variable {variable} is not produced by the model"))?;
            log_summary(variable, &values);

            let file_path = self.variable_file(output, &variable.to_string());
            let file = File::create(&file_path).map_err(|error| {
                format!("error creating {}: {}", file_path.display(), error)
            })?;
            let mut writer = BufWriter::new(file);

            match self.format {
                OutputFormat::Txt => {
                    for value in &values {
                        writeln!(writer, "{value}").map_err(|error| {
                            format!("error writing {}: {}", file_path.display(), error)
                        })?;
                    }
                }
                OutputFormat::Csv => {
                    writeln!(writer, "lon,lat,{variable}").map_err(|error| {
                        format!("error writing {}: {}", file_path.display(), error)
                    })?;
                    for ((lon, lat), value) in lons.iter().zip(lats).zip(&values) {
                        writeln!(writer, "{lon},{lat},{value}").map_err(|error| {
                            format!("error writing {}: {}", file_path.display(), error)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Log the valid-value range of a variable before writing it
fn log_summary(variable: &OutputVariableName, values: &Array1<f32>) {
    let units = variable.get_str("units").unwrap_or("-");
    let masked = values.mapv(|v| if v <= (NODATAVAL + 1.0) { f32::NAN } else { v });
    if masked.iter().all(|v| v.is_nan()) {
        info!("{} [{}]: no valid values", variable, units);
        return;
    }
    let min = masked.min_skipnan();
    let max = masked.max_skipnan();
    info!("{} [{}]: min {:.2} max {:.2}", variable, units, min, max);
}

pub struct OutputWriter {
    outputs: Vec<OutputType>,
}

impl OutputWriter {
    pub fn new(outputs_defs: &[OutputTypeConfig]) -> Self {
        Self {
            outputs: outputs_defs
                .iter()
                .filter_map(|t| OutputType::new(t).ok())
                .collect(),
        }
    }

    pub fn write_output(
        &mut self,
        lats: &[f32],
        lons: &[f32],
        output: &Output,
    ) -> Result<(), FWIGridError> {
        self.outputs.par_iter_mut().for_each(|output_type| {
            match output_type.write_variables(lats, lons, output) {
                Ok(_) => (),
                Err(e) => warn!("Error writing output: {}", e),
            }
        });
        Ok(())
    }
}
