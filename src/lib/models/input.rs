use chrono::{DateTime, Utc};
use ndarray::Array1;

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::NODATAVAL;

/// InputElement is the daily weather observation of a single cell.
/// All values refer to the local noon of the observation day; rain is the
/// total precipitation of the 24 hours ending at that noon.
/// If the input unit provided is not the one expected by the model, the binary converts it (helpers.rs)
#[derive(Debug, Clone, Copy)]
pub struct InputElement {
    /// air temperature [°C]
    pub temperature: f32,
    /// 24h cumulated rain [mm]
    pub rain: f32,
    /// wind speed [km/h]
    pub wind_speed: f32,
    /// relative humidity [%]
    pub humidity: f32,
}

impl Default for InputElement {
    fn default() -> Self {
        Self {
            temperature: NODATAVAL,
            rain: NODATAVAL,
            wind_speed: NODATAVAL,
            humidity: NODATAVAL,
        }
    }
}

pub struct Input {
    pub time: DateTime<Utc>,
    pub data: Array1<InputElement>,
}

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum InputVariableName {
    /// WEATHER VARIABLES IN INPUT FILES

    /// Observed relative humidity [%]
    F,
    /// Relative humidity [%]
    H,
    /// Observed temperature [K or C]
    K,
    /// Forecasted temperature [K or C]
    T,
    /// Forecasted dew point temperature [K or C]
    R,
    /// Wind Speed [m/s]
    W,
    /// U component of the wind [m/s]
    U,
    /// V value of the wind [m/s]
    V,
    /// Observed precipitation [mm]
    O,
    /// Forecasted precipitation [mm]
    P,
}
