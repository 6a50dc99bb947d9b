pub use crate::constants::NODATAVAL;

// Station defaults used to seed a cell with no previous-day codes
pub const FFMC_INIT: f32 = 85.0;
pub const DMC_INIT: f32 = 6.0;
pub const DC_INIT: f32 = 15.0;

// Scale bounds
pub const FFMC_MAX: f32 = 101.0;
pub const MOISTURE_MAX: f32 = 250.0;

// Daily rain thresholds below which the rain phase is skipped [mm/24h]
pub const FFMC_MIN_RAIN: f32 = 0.5;
pub const DMC_MIN_RAIN: f32 = 1.5;
pub const DC_MIN_RAIN: f32 = 2.8;

// Temperatures below which the drying term vanishes [°C]
pub const DMC_MIN_TEMP: f32 = -1.1;
pub const DC_MIN_TEMP: f32 = -2.8;

// Monthly effective day length [h] for the DMC drying factor,
// one table per latitude band (January..December)
pub const DAY_LENGTH_46N: [f32; 12] = [
    6.5, 7.5, 9.0, 12.8, 13.9, 13.9, 12.4, 10.9, 9.4, 8.0, 7.0, 6.0,
];
pub const DAY_LENGTH_20N: [f32; 12] = [
    7.9, 8.4, 8.9, 9.5, 9.9, 10.2, 10.1, 9.7, 9.1, 8.6, 8.1, 7.8,
];
pub const DAY_LENGTH_20S: [f32; 12] = [
    10.1, 9.6, 9.1, 8.5, 8.1, 7.8, 7.9, 8.3, 8.9, 9.4, 9.9, 10.2,
];
pub const DAY_LENGTH_40S: [f32; 12] = [
    11.5, 10.5, 9.2, 7.9, 6.8, 6.2, 6.5, 7.4, 8.7, 10.0, 11.2, 11.8,
];

// Latitude band boundaries [°] for the day length tables
pub const LAT_BAND_NORTH: f32 = 33.0;
pub const LAT_BAND_SOUTH: f32 = -30.0;

// Monthly day-length factor for the DC drying term, per hemisphere;
// the winter entries are negative
pub const DAY_LENGTH_FACTOR_NORTH: [f32; 12] = [
    -1.6, -1.6, -1.6, 0.9, 3.8, 5.8, 6.4, 5.0, 2.4, 0.4, -1.6, -1.6,
];
pub const DAY_LENGTH_FACTOR_SOUTH: [f32; 12] = [
    6.4, 5.0, 2.4, 0.4, -1.6, -1.6, -1.6, -1.6, -1.6, 0.9, 3.8, 5.8,
];

// Year-round constants used by the equatorial model version
pub const EQUATORIAL_DAY_LENGTH: f32 = 9.0;
pub const EQUATORIAL_DAY_LENGTH_FACTOR: f32 = 1.39;
