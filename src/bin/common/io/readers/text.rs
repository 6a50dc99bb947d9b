use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead},
    path::Path,
    str::FromStr,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use ndarray::Array1;

use fwi::{constants::NODATAVAL, models::input::InputVariableName};

use crate::common::helpers::FWIGridError;

use super::prelude::InputHandler;

/// Parse an input file path of the form
/// `<YYYYMMDDHHMM>_<grid>_<VARIABLE>.txt`
pub fn parse_line(line: &str) -> Result<(String, InputVariableName, DateTime<Utc>), FWIGridError> {
    let file_name = Path::new(line)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or(format!("could not extract a file name from {line}"))?;

    let (date, rest) = file_name
        .split_once('_')
        .ok_or(format!("missing date component in {file_name}"))?;
    let (grid, variable) = rest
        .rsplit_once('_')
        .ok_or(format!("missing variable component in {file_name}"))?;

    let date = NaiveDateTime::parse_from_str(date, "%Y%m%d%H%M")
        .map_err(|_| format!("could not parse date from {file_name}"))?;
    let date = DateTime::from_naive_utc_and_offset(date, Utc);

    let variable = InputVariableName::from_str(variable)
        .map_err(|_| format!("unknown input variable {variable} in {file_name}"))?;

    Ok((grid.into(), variable, date))
}

/// Input handler for plain text grids: the input list file contains one path
/// per line, each file holds one value per cell line, aligned to the cells
/// file of the run configuration.
pub struct TextInputHandler {
    files: HashMap<DateTime<Utc>, HashMap<InputVariableName, String>>,
    timeline: Vec<DateTime<Utc>>,
    expected_len: Option<usize>,
}

impl TextInputHandler {
    pub fn new(input_list_path: &str) -> Result<Self, FWIGridError> {
        let file = File::open(input_list_path)
            .map_err(|error| format!("error opening input list {input_list_path}: {error}"))?;
        let reader = io::BufReader::new(file);

        let mut files: HashMap<DateTime<Utc>, HashMap<InputVariableName, String>> = HashMap::new();

        for line in reader.lines() {
            let line =
                line.map_err(|error| format!("error reading {input_list_path}: {error}"))?;
            let line = line.trim().to_string();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (_, variable, date) = match parse_line(&line) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!("Skipping input line: {}", error);
                    continue;
                }
            };
            files.entry(date).or_default().insert(variable, line);
        }

        if files.is_empty() {
            return Err(format!("no usable inputs found in {input_list_path}").into());
        }

        let mut timeline: Vec<DateTime<Utc>> = files.keys().copied().collect();
        timeline.sort();

        Ok(TextInputHandler {
            files,
            timeline,
            expected_len: None,
        })
    }

    fn read_values(&self, path: &str) -> Result<Array1<f32>, FWIGridError> {
        let file =
            File::open(path).map_err(|error| format!("error opening {path}: {error}"))?;
        let reader = io::BufReader::new(file);

        let mut values: Vec<f32> = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|error| format!("error reading {path}: {error}"))?;
            let line = line.trim();
            if line.is_empty() {
                values.push(NODATAVAL);
                continue;
            }
            let value = line
                .parse::<f32>()
                .map_err(|_| format!("could not parse value '{line}' in {path}"))?;
            values.push(value);
        }

        if let Some(expected_len) = self.expected_len {
            if values.len() != expected_len {
                return Err(format!(
                    "{path} holds {} values, expected {expected_len}",
                    values.len()
                )
                .into());
            }
        }

        Ok(Array1::from_vec(values))
    }
}

impl InputHandler for TextInputHandler {
    fn set_coordinates(&mut self, lats: &[f32], lons: &[f32]) -> Result<(), FWIGridError> {
        if lats.len() != lons.len() {
            return Err("latitude and longitude lists differ in length".into());
        }
        self.expected_len = Some(lats.len());
        Ok(())
    }

    fn get_values(&self, var: InputVariableName, date: &DateTime<Utc>) -> Option<Array1<f32>> {
        let path = self.files.get(date)?.get(&var)?;
        match self.read_values(path) {
            Ok(values) => Some(values),
            Err(error) => {
                warn!("Error reading {}: {}", path, error);
                None
            }
        }
    }

    fn get_timeline(&self) -> Vec<DateTime<Utc>> {
        self.timeline.clone()
    }

    fn info_input(&self) -> String {
        let variables = self
            .files
            .values()
            .flat_map(|vars| vars.keys())
            .map(|var| var.to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} time steps from {} to {} with variables [{}]",
            self.timeline.len(),
            self.timeline
                .first()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            self.timeline
                .last()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            variables
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_fails_for_malformed_line() {
        let line = "test/path/to/foo.txt";
        let result = parse_line(line);
        assert!(result.is_err());
    }

    #[test]
    fn parse_line_fails_for_unknown_variable() {
        let line = "test/path/to/202205060000_grid_XYZ.txt";
        let result = parse_line(line);
        assert!(result.is_err());
    }

    #[test]
    fn parse_line_ok() {
        let line = "test/path/to/202205060000_grid_T.txt";
        let result = parse_line(line);
        assert!(result.is_ok());
        let (grid, variable, date) = result.expect("should unwrap");
        assert_eq!(grid, "grid");
        assert_eq!(variable, InputVariableName::T);
        assert_eq!(
            date,
            DateTime::parse_from_rfc3339("2022-05-06T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc)
        );
    }
}
