mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::Path;

use chrono::prelude::*;
use clap::Parser;

use common::config::builder::{ConfigBuilderType, ConfigContainer, FWIConfigBuilder};
use common::helpers::{daily_noons, get_input, FWIGridError};
use common::io::readers::prelude::InputHandler;
use common::io::readers::text::TextInputHandler;
use fwi::version::LONG_VERSION;
use log::{info, trace, warn};

const MAX_REPORTED_FAULTS: usize = 10;

#[derive(Parser, Debug)]
#[command(
    version,
    long_version = LONG_VERSION,
    about = "Canadian Forest Fire Weather Index System calculator on gridded weather data",
    long_about = "fwi-grid computes the Canadian Forest Fire Weather Index System \
(FFMC, DMC, DC, ISI, BUI and FWI) over a set of grid cells from daily noon weather \
observations, carrying the moisture codes forward from one run to the next."
)]
struct Args {
    #[arg(
        required = true,
        help = "Run date in the format YYYYMMDDHHMM",
        index = 1
    )]
    date: String,

    #[arg(required = true, help = "Path to the configuration file", index = 2)]
    config_path: String,

    #[arg(required = true, help = "Path to the input list file", index = 3)]
    input_path: String,
}

fn run_fwi(
    model_config: &FWIConfigBuilder,
    date: &DateTime<Utc>,
    handler: &mut dyn InputHandler,
) -> Result<(), FWIGridError> {
    let config = model_config
        .build(date)
        .map_err(|err| format!("Could not configure model: {err}"))?;

    let mut output_writer = config
        .get_output_writer()
        .map_err(|_| "Could not configure output writer")?;

    let props = config.get_properties();
    let mut state = config.new_state();

    let (lats, lons) = config.get_properties().get_coords();
    let (lats, lons) = (lats.as_slice(), lons.as_slice());

    handler.set_coordinates(lats, lons)?;

    let timezone = config.timezone();
    info!("Daily observations at noon {}", timezone);

    let len = state.len();
    let timeline = handler.get_timeline();
    for noon in daily_noons(&timeline, &timezone) {
        let step_time = Utc::now();
        info!("Processing {}", noon.format("%Y-%m-%d %H:%M"));
        let input = get_input(handler, &noon, len);

        let c = Utc::now();
        let faults = state.update(props, &input);
        trace!("Updating state took {} seconds", Utc::now() - c);

        if !faults.is_empty() {
            warn!("{} cells could not be updated", faults.len());
            for fault in faults.iter().take(MAX_REPORTED_FAULTS) {
                warn!("cell {}: {}", fault.index, fault.error);
            }
            if faults.len() > MAX_REPORTED_FAULTS {
                warn!("... and {} more", faults.len() - MAX_REPORTED_FAULTS);
            }
        }

        let c = Utc::now();
        let output = state.output(&input);
        trace!("Generating output took {} seconds", Utc::now() - c);

        let c = Utc::now();
        if let Err(err) = output_writer.write_output(lats, lons, &output) {
            warn!("Error writing output: {}", err);
        }
        trace!("Writing output took {} seconds", Utc::now() - c);

        info!("Writing warm state");
        let c = Utc::now();
        if let Err(err) = config.write_warm_state(&state) {
            warn!("Error writing warm state: {}", err);
        }
        trace!("Writing warm state took {} seconds", Utc::now() - c);

        trace!("Step took {} seconds", Utc::now() - step_time);
    }
    Ok(())
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let date_str = args.date;
    let config_path_str = args.config_path;
    let input_path_str = args.input_path;

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    if !Path::new(&config_path_str).is_file() {
        return Err(format!("Config file {} is not a file", config_path_str).into());
    }

    let date = NaiveDateTime::parse_from_str(&date_str, "%Y%m%d%H%M")
        .map_err(|_| format!("Could not parse run date '{}'", date_str))?;

    let date = DateTime::from_naive_utc_and_offset(date, Utc);

    let configs = ConfigContainer::from_file(&config_path_str)
        .map_err(|err| format!("Failed to load config: {}", err))?;

    let mut input_handler = TextInputHandler::new(&input_path_str)
        .map_err(|err| format!("Could not load input data: {}", err))?;
    info!("Input files: {}", input_handler.info_input());

    for model_config in &configs.models {
        info!("Running model: {}", model_config.get_model_name());
        let start_time = Utc::now();

        let model_run = match model_config {
            ConfigBuilderType::FWI(model_config) => {
                run_fwi(model_config, &date, &mut input_handler)
            }
        };

        if let Err(err) = model_run {
            warn!("Error running model: {}", err);
        }

        let elapsed_time = Utc::now() - start_time;
        info!("Elapsed time: {} seconds", elapsed_time.num_seconds());
    }

    Ok(())
}
