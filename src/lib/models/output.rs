use chrono::{DateTime, Utc};
use ndarray::Array1;
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumProperty, EnumString};

use crate::constants::NODATAVAL;

/// Daily result of a single cell: the three carried-forward moisture codes
/// plus the derived indices, recomputed fresh every day.
pub struct OutputElement {
    /// Fine Fuel Moisture Code
    pub ffmc: f32,
    /// Duff Moisture Code
    pub dmc: f32,
    /// Drought Code
    pub dc: f32,
    /// Initial Spread Index
    pub isi: f32,
    /// Build Up Index
    pub bui: f32,
    /// Fire Weather Index
    pub fwi: f32,

    // ----------------- INPUTS ---------------//
    /// Input temperature in celsius
    pub temperature: f32,
    /// Input 24h rain in mm
    pub rain: f32,
    /// Input wind speed in km/h
    pub wind_speed: f32,
    /// Input relative humidity in %
    pub humidity: f32,
}

impl Default for OutputElement {
    fn default() -> Self {
        Self {
            ffmc: NODATAVAL,
            dmc: NODATAVAL,
            dc: NODATAVAL,
            isi: NODATAVAL,
            bui: NODATAVAL,
            fwi: NODATAVAL,

            // input variables
            temperature: NODATAVAL,
            rain: NODATAVAL,
            wind_speed: NODATAVAL,
            humidity: NODATAVAL,
        }
    }
}

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    EnumString,
    EnumProperty,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum OutputVariableName {
    /// Fine Fuel Moisture Code
    #[strum(props(long_name = "Fine Fuel Moisture Code", units = "-"))]
    ffmc,
    /// Duff Moisture Code
    #[strum(props(long_name = "Duff Moisture Code", units = "-"))]
    dmc,
    /// Drought Code
    #[strum(props(long_name = "Drought Code", units = "-"))]
    dc,
    /// Initial Spread Index
    #[strum(props(long_name = "Initial Spread Index", units = "-"))]
    isi,
    /// Build Up Index
    #[strum(props(long_name = "Build Up Index", units = "-"))]
    bui,
    /// Fire Weather Index
    #[strum(props(long_name = "Fire Weather Index", units = "-"))]
    fwi,

    /// Input Temperature
    #[strum(props(long_name = "Input Temperature", units = "°C"))]
    temperature,
    /// Input Rain
    #[strum(props(long_name = "Input 24h Rain", units = "mm"))]
    rain,
    /// Input Wind Speed
    #[strum(props(long_name = "Input Wind Speed", units = "km/h"))]
    windSpeed,
    /// Input Relative Humidity
    #[strum(props(long_name = "Input Relative Humidity", units = "%"))]
    humidity,
}

pub struct Output {
    pub time: DateTime<Utc>,
    pub data: Array1<OutputElement>,
}

impl Output {
    pub fn new(time: DateTime<Utc>, data: Array1<OutputElement>) -> Self {
        Self { time, data }
    }

    pub fn get_array(&self, func: fn(&OutputElement) -> f32) -> Array1<f32> {
        let vec = self.data.par_iter().map(func).collect::<Vec<_>>();
        Array1::from_vec(vec)
    }

    pub fn get(&self, variable: &OutputVariableName) -> Option<Array1<f32>> {
        use OutputVariableName::*;
        match variable {
            ffmc => Some(self.get_array(|o| o.ffmc)),
            dmc => Some(self.get_array(|o| o.dmc)),
            dc => Some(self.get_array(|o| o.dc)),
            isi => Some(self.get_array(|o| o.isi)),
            bui => Some(self.get_array(|o| o.bui)),
            fwi => Some(self.get_array(|o| o.fwi)),

            // Input variables
            temperature => Some(self.get_array(|o| o.temperature)),
            rain => Some(self.get_array(|o| o.rain)),
            windSpeed => Some(self.get_array(|o| o.wind_speed)),
            humidity => Some(self.get_array(|o| o.humidity)),
        }
    }
}
