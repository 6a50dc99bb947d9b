use crate::error::CellFault;
use crate::models::{input::Input, output::Output};
use chrono::prelude::*;
use ndarray::{Array1, Zip};

use super::{
    config::FWIModelConfig,
    constants::*,
    functions::{get_output_fn, update_state_fn},
};

// CELLS PROPERTIES
#[derive(Debug)]
pub struct FWIPropertiesElement {
    pub lon: f32,
    pub lat: f32,
}

#[derive(Debug)]
pub struct FWIProperties {
    pub data: Array1<FWIPropertiesElement>,
    pub len: usize,
}

pub struct FWICellPropertiesContainer {
    pub lons: Vec<f32>,
    pub lats: Vec<f32>,
}

impl FWIProperties {
    pub fn new(props: FWICellPropertiesContainer) -> Self {
        let data: Array1<FWIPropertiesElement> = props
            .lons
            .into_iter()
            .zip(props.lats)
            .map(|(lon, lat)| FWIPropertiesElement { lon, lat })
            .collect();

        let len = data.len();
        Self { data, len }
    }

    pub fn get_coords(&self) -> (Vec<f32>, Vec<f32>) {
        let lats: Vec<f32> = self.data.iter().map(|p| p.lat).collect();
        let lons: Vec<f32> = self.data.iter().map(|p| p.lon).collect();
        (lats, lons)
    }
}

// WARM STATE

/// Previous-day codes of a cell.
/// `Default` is the published station seed; `missing` marks a cell that must
/// keep faulting until a seed is supplied.
#[derive(Debug, Clone, Copy)]
pub struct FWIWarmState {
    pub ffmc: f32,
    pub dmc: f32,
    pub dc: f32,
}

impl Default for FWIWarmState {
    fn default() -> Self {
        FWIWarmState {
            ffmc: FFMC_INIT,
            dmc: DMC_INIT,
            dc: DC_INIT,
        }
    }
}

impl FWIWarmState {
    pub fn missing() -> Self {
        FWIWarmState {
            ffmc: NODATAVAL,
            dmc: NODATAVAL,
            dc: NODATAVAL,
        }
    }
}

// STATE
#[derive(Debug)]
pub struct FWIStateElement {
    pub ffmc: f32,
    pub dmc: f32,
    pub dc: f32,
}

impl FWIStateElement {
    pub fn has_codes(&self) -> bool {
        self.ffmc != NODATAVAL && self.dmc != NODATAVAL && self.dc != NODATAVAL
    }
}

#[derive(Debug)]
pub struct FWIState {
    pub time: DateTime<Utc>,
    pub data: Array1<FWIStateElement>,
    len: usize,
    config: FWIModelConfig,
}

impl FWIState {
    /// Create a new state from the previous-day codes.
    pub fn new(warm_state: &[FWIWarmState], time: &DateTime<Utc>, config: FWIModelConfig) -> FWIState {
        let data = Array1::from_vec(
            warm_state
                .iter()
                .map(|w| FWIStateElement {
                    ffmc: w.ffmc,
                    dmc: w.dmc,
                    dc: w.dc,
                })
                .collect(),
        );

        FWIState {
            time: *time,
            data,
            len: warm_state.len(),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update_state(&mut self, props: &FWIProperties, input: &Input) -> Vec<CellFault> {
        let time = &self.time;
        let config = &self.config;
        let errors = Zip::from(&mut self.data)
            .and(&props.data)
            .and(&input.data)
            .par_map_collect(|state, props, input_data| {
                update_state_fn(state, props, input_data, time, config).err()
            });

        errors
            .iter()
            .enumerate()
            .filter_map(|(index, error)| error.map(|error| CellFault { index, error }))
            .collect()
    }

    pub fn get_output(self: &FWIState, input: &Input) -> Output {
        let time = &self.time;

        let output_data = Zip::from(&self.data)
            .and(&input.data)
            .par_map_collect(|state, input| get_output_fn(state, input, &self.config));

        Output::new(*time, output_data)
    }

    /// Advance the cells by one day; the faulted cells keep their codes and
    /// are returned so the caller can mask or reseed them.
    pub fn update(&mut self, props: &FWIProperties, input: &Input) -> Vec<CellFault> {
        let new_time = &input.time;
        self.time = *new_time;
        self.update_state(props, input)
    }

    pub fn output(&self, input: &Input) -> Output {
        self.get_output(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellError;
    use crate::models::input::InputElement;

    fn two_cell_setup() -> (FWIProperties, DateTime<Utc>) {
        let props = FWIProperties::new(FWICellPropertiesContainer {
            lons: vec![9.0, 9.1],
            lats: vec![44.4, 44.5],
        });
        let time = Utc.with_ymd_and_hms(2022, 6, 10, 12, 0, 0).unwrap();
        (props, time)
    }

    fn valid_input(time: &DateTime<Utc>, len: usize) -> Input {
        let data = Array1::from_vec(
            (0..len)
                .map(|_| InputElement {
                    temperature: 17.0,
                    rain: 0.0,
                    wind_speed: 25.0,
                    humidity: 42.0,
                })
                .collect(),
        );
        Input { time: *time, data }
    }

    #[test]
    fn update_advances_time_and_codes() {
        let (props, time) = two_cell_setup();
        let warm = vec![FWIWarmState::default(); props.len];
        let mut state = FWIState::new(&warm, &time, FWIModelConfig::new("standard"));

        let next_day = time + chrono::Duration::days(1);
        let input = valid_input(&next_day, props.len);
        let faults = state.update(&props, &input);

        assert!(faults.is_empty());
        assert_eq!(state.time, next_day);
        for element in &state.data {
            assert!(element.ffmc > FFMC_INIT);
        }
    }

    #[test]
    fn missing_warm_cell_is_reported_and_masked() {
        let (props, time) = two_cell_setup();
        let warm = vec![FWIWarmState::default(), FWIWarmState::missing()];
        let mut state = FWIState::new(&warm, &time, FWIModelConfig::new("standard"));

        let input = valid_input(&time, props.len);
        let faults = state.update(&props, &input);

        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].index, 1);
        assert_eq!(faults[0].error, CellError::MissingPriorState);

        let output = state.output(&input);
        assert!(output.data[0].fwi >= 0.0);
        assert_eq!(output.data[1].fwi, NODATAVAL);
        // the masked cell still echoes its weather
        assert_eq!(output.data[1].temperature, 17.0);
    }

    #[test]
    fn faulted_cell_does_not_abort_the_batch() {
        let (props, time) = two_cell_setup();
        let warm = vec![FWIWarmState::default(); props.len];
        let mut state = FWIState::new(&warm, &time, FWIModelConfig::new("standard"));

        let mut input = valid_input(&time, props.len);
        input.data[1].rain = -4.0;
        let faults = state.update(&props, &input);

        assert_eq!(faults.len(), 1);
        assert!(matches!(
            faults[0].error,
            CellError::InvalidInput { variable: "rain", .. }
        ));
        // the valid cell advanced, the faulted one kept its seed
        assert!(state.data[0].ffmc > FFMC_INIT);
        assert_eq!(state.data[1].ffmc, FFMC_INIT);
    }
}
