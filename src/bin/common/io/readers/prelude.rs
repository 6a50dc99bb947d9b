use chrono::{DateTime, Utc};
use fwi::models::input::InputVariableName;
use ndarray::Array1;

use crate::common::helpers::FWIGridError;

/// Trait defining the behavior of an InputHandler for the model
pub trait InputHandler {
    fn set_coordinates(&mut self, lats: &[f32], lons: &[f32]) -> Result<(), FWIGridError>;

    /// get the desired variable at the desired date
    fn get_values(&self, var: InputVariableName, date: &DateTime<Utc>) -> Option<Array1<f32>>;

    /// Returns the timeline of the input data
    fn get_timeline(&self) -> Vec<DateTime<Utc>>;

    /// Human readable description of the loaded inputs
    fn info_input(&self) -> String;
}
