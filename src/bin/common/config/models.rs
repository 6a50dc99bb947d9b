use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
};

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::{info, warn};

use fwi::constants::NODATAVAL;
use fwi::modules::fwi::{
    config::FWIModelConfig,
    models::{FWIProperties, FWIState, FWIWarmState},
};

use crate::common::helpers::{timezone_for_coords, FWIGridError};
use crate::common::io::writers::text::OutputWriter;

use super::{
    builder::{FWIConfigBuilder, OutputTypeConfig},
    data::read_cells,
};

/// Fully resolved run configuration of the FWI model
pub struct FWIConfig {
    warm_state_path: String,
    warm_state: Vec<FWIWarmState>,
    warm_state_time: DateTime<Utc>,
    properties: FWIProperties,
    timezone: Tz,
    model_version: String,
    output_types_defs: Vec<OutputTypeConfig>,
}

impl FWIConfig {
    pub fn new(
        config_defs: &FWIConfigBuilder,
        date: DateTime<Utc>,
    ) -> Result<FWIConfig, FWIGridError> {
        let props_container = read_cells(&config_defs.cells_file_path)?;
        let n_cells = props_container.lons.len();

        let (warm_state, warm_state_time) = read_warm_state(&config_defs.warm_state_path, date)
            .unwrap_or_else(|| {
                info!("Seeding warm state with the station defaults");
                (
                    vec![FWIWarmState::default(); n_cells],
                    date - Duration::try_days(1).expect("Should be a valid duration"),
                )
            });

        if warm_state.len() != n_cells {
            return Err(format!(
                "warm state holds {} cells, the cells file holds {}",
                warm_state.len(),
                n_cells
            )
            .into());
        }

        let timezone = match &config_defs.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| format!("invalid timezone name {name}"))?,
            None => timezone_for_coords(&props_container.lats, &props_container.lons)?,
        };

        let properties = FWIProperties::new(props_container);

        Ok(FWIConfig {
            warm_state_path: config_defs.warm_state_path.clone(),
            warm_state,
            warm_state_time,
            properties,
            timezone,
            model_version: config_defs.model_version.clone(),
            output_types_defs: config_defs.output_types.clone(),
        })
    }

    pub fn get_properties(&self) -> &FWIProperties {
        &self.properties
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn new_state(&self) -> FWIState {
        info!("Model version: {}", &self.model_version);
        let config = FWIModelConfig::new(&self.model_version);
        FWIState::new(&self.warm_state, &self.warm_state_time, config)
    }

    pub fn get_output_writer(&self) -> Result<OutputWriter, FWIGridError> {
        Ok(OutputWriter::new(self.output_types_defs.as_slice()))
    }

    /// Persist the codes for the next run, stamped with the following day.
    /// Warm states are stamped at day precision so runs line up regardless of
    /// the local-noon hour.
    pub fn write_warm_state(&self, state: &FWIState) -> Result<(), FWIGridError> {
        let warm_state_time =
            state.time + Duration::try_days(1).expect("Should be a valid duration");
        let date_string = warm_state_time.format("%Y%m%d0000").to_string();
        let warm_state_name = format!("{}{}", self.warm_state_path, date_string);
        let mut warm_state_file = File::create(&warm_state_name)
            .map_err(|error| format!("error creating {}, {}", &warm_state_name, error))?;

        let mut warm_state_writer = BufWriter::new(&mut warm_state_file);

        for state in &state.data {
            let line = format!("{}\t{}\t{}", state.ffmc, state.dmc, state.dc);
            writeln!(warm_state_writer, "{}", line)
                .map_err(|error| format!("error writing to {}, {}", &warm_state_name, error))?;
        }
        Ok(())
    }
}

/// Parses one warm-state line: `ffmc dmc dc`, whitespace separated.
/// A partially missing triple counts as missing altogether: the codes are
/// replaced together or not at all.
pub fn parse_warm_state_line(line: &str) -> Result<FWIWarmState, FWIGridError> {
    let components: Vec<&str> = line.split_whitespace().collect();
    if components.len() != 3 {
        return Err(format!("expected 3 values, found {}", components.len()).into());
    }

    let mut codes = [0.0_f32; 3];
    for (slot, component) in codes.iter_mut().zip(&components) {
        *slot = component
            .parse::<f32>()
            .map_err(|_| format!("could not parse '{component}'"))?;
    }

    let [ffmc, dmc, dc] = codes;
    if codes.iter().any(|value| *value <= (NODATAVAL + 1.0)) {
        return Ok(FWIWarmState::missing());
    }
    Ok(FWIWarmState { ffmc, dmc, dc })
}

/// Reads the warm state from the file
/// The warm state is stored in a file with the following structure:
/// base_warm_file_YYYYmmDD0000
/// where <base_warm_file> is the base name of the file and `YYYYmmDD` is the day of the warm state
/// Each line holds the `ffmc dmc dc` triple of one cell.
pub fn read_warm_state(
    base_warm_file: &str,
    date: DateTime<Utc>,
) -> Option<(Vec<FWIWarmState>, DateTime<Utc>)> {
    // for the last n days before date, try to read the warm state
    // compose the filename as base_warm_file_YYYYmmDD0000
    let mut file: Option<File> = None;

    let mut current_date = date;

    for days_before in 0..4 {
        current_date = date - Duration::try_days(days_before).expect("Should be valid");

        let filename = format!("{}{}", base_warm_file, current_date.format("%Y%m%d0000"));

        let file_handle = File::open(filename);
        if file_handle.is_err() {
            continue;
        }
        file = Some(file_handle.expect("Should unwrap"));
        break;
    }
    let file = match file {
        Some(file) => file,
        None => {
            warn!(
                "WARNING: Could not find a valid warm state file for run date {}",
                date.format("%Y-%m-%d")
            );
            return None;
        }
    };

    info!(
        "Loading warm state from {}",
        current_date.format("%Y-%m-%d")
    );
    let mut warm_state: Vec<FWIWarmState> = Vec::new();

    let reader = io::BufReader::new(file);

    for (i, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!("Error reading warm state file: {}", error);
                return None;
            }
        };
        match parse_warm_state_line(&line) {
            Ok(state) => warm_state.push(state),
            Err(error) => {
                warn!("Error parsing warm state line {}: {}", i + 1, error);
                return None;
            }
        }
    }

    let current_date = current_date - Duration::try_days(1).expect("Should be valid");
    Some((warm_state, current_date))
}
