use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use itertools::izip;
use lazy_static::lazy_static;
use tzf_rs::DefaultFinder;

use ndarray::{azip, Array1, Zip};

use fwi::{
    constants::NODATAVAL,
    models::input::{Input, InputElement, InputVariableName::*},
};

use crate::common::io::readers::prelude::InputHandler;

lazy_static! {
    static ref TZ_FINDER: DefaultFinder = DefaultFinder::new();
}

/// Hour of the daily observation in local standard time
pub const OBSERVATION_HOUR: u32 = 12;

/// Tolerance when matching a timeline step to the local-noon instant
pub const NOON_TOLERANCE_HOURS: i64 = 3;

fn replace<'a>(
    dst: &'a mut Array1<InputElement>,
    src: &Array1<f32>,
    fun: fn(&'a mut InputElement) -> &'a mut f32,
) {
    Zip::from(dst).and(src).par_for_each(|d, s| {
        let result = fun(d);
        if *result <= (NODATAVAL + 1.0) {
            *result = *s;
        }
    });
}

fn maybe_replace<'a>(
    dst: &'a mut Array1<InputElement>,
    src: &Option<Array1<f32>>,
    fun: fn(&'a mut InputElement) -> &'a mut f32,
) {
    match src {
        Some(src) => replace(dst, src, fun),
        None => (),
    }
}

/// IANA timezone of the grid centroid
pub fn timezone_for_coords(lats: &[f32], lons: &[f32]) -> Result<Tz, FWIGridError> {
    if lats.is_empty() {
        return Err("cannot resolve a timezone from an empty grid".into());
    }
    let lat = lats.iter().sum::<f32>() / lats.len() as f32;
    let lon = lons.iter().sum::<f32>() / lons.len() as f32;
    let tz_name = TZ_FINDER.get_tz_name(lon as f64, lat as f64);
    tz_name
        .parse::<Tz>()
        .map_err(|_| format!("invalid timezone name {tz_name}").into())
}

/// UTC instants of noon local standard time, one per calendar day covered by
/// the input timeline
pub fn daily_noons(timeline: &[DateTime<Utc>], tz: &Tz) -> Vec<DateTime<Utc>> {
    let mut days: Vec<_> = timeline
        .iter()
        .map(|t| t.with_timezone(tz).date_naive())
        .collect();
    days.sort();
    days.dedup();

    days.iter()
        .filter_map(|day| {
            day.and_hms_opt(OBSERVATION_HOUR, 0, 0)
                .and_then(|noon| noon.and_local_timezone(*tz).single())
                .map(|noon| noon.with_timezone(&Utc))
        })
        .collect()
}

/// Timeline step closest to the target, if any falls within the tolerance
pub fn nearest_step(
    timeline: &[DateTime<Utc>],
    target: &DateTime<Utc>,
    tolerance: Duration,
) -> Option<DateTime<Utc>> {
    timeline
        .iter()
        .min_by_key(|t| t.signed_duration_since(*target).num_seconds().abs())
        .filter(|t| t.signed_duration_since(*target).num_seconds().abs() <= tolerance.num_seconds())
        .copied()
}

/// Assemble the daily input batch for the observation at `noon`: weather from
/// the timeline step closest to noon, rain summed over the 24 hours ending at
/// noon. Units are converted to the ones the model expects.
pub fn get_input(handler: &dyn InputHandler, noon: &DateTime<Utc>, len: usize) -> Input {
    let mut data: Array1<InputElement> = Array1::default(len);
    let timeline = handler.get_timeline();

    let weather_time = nearest_step(&timeline, noon, Duration::hours(NOON_TOLERANCE_HOURS));

    let mut temperature: Array1<f32> = Array1::ones(len) * NODATAVAL;

    if let Some(weather_time) = weather_time {
        // temperature, observed then forecast filling the gaps
        for variable in [K, T] {
            if let Some(mut values) = handler.get_values(variable, &weather_time) {
                values.mapv_inplace(|_t| if _t > 200.0 { _t - 273.15 } else { _t }); // conversion to Celsius
                azip!((dst in &mut temperature, v in &values) {
                    if *dst <= (NODATAVAL + 1.0) && *v > (NODATAVAL + 1.0) {
                        *dst = *v;
                    }
                });
            }
        }
        replace(&mut data, &temperature, |i| &mut i.temperature);

        // Observed relative humidity
        let humidity_obs = handler.get_values(F, &weather_time); // supposed in %
        maybe_replace(&mut data, &humidity_obs, |i| &mut i.humidity);

        // Forecasted relative humidity
        let humidity = handler.get_values(H, &weather_time); // supposed in %
        maybe_replace(&mut data, &humidity, |i| &mut i.humidity);

        // Forecasted dew point temperature: fill the humidity gaps with the
        // Magnus formula (https://en.wikipedia.org/wiki/Dew_point)
        if let Some(mut temp_dew) = handler.get_values(R, &weather_time) {
            temp_dew.mapv_inplace(|_t| if _t > 200.0 { _t - 273.15 } else { _t }); // conversion to Celsius
            let mut h: Array1<f32> = Array1::ones(len) * NODATAVAL;
            azip!((
                h in &mut h,
                r in &temp_dew,  // °C
                t in &temperature  // °C
            ){
                if *r > (NODATAVAL + 1.0) && *t > (NODATAVAL + 1.0) {
                    *h = 100.0 * (f32::exp((17.625 * r) / (r + 243.04)) / f32::exp((17.625 * t) / (t + 243.04)));
                }
            });
            replace(&mut data, &h, |i| &mut i.humidity);
        }

        // wind speed
        let ws = handler.get_values(W, &weather_time); // supposed in m/s
        if let Some(ws) = ws {
            let ws = ws.mapv(|_ws| {
                if _ws > (NODATAVAL + 1.0) {
                    _ws * 3.6 // conversion to km/h
                } else {
                    NODATAVAL
                }
            });
            replace(&mut data, &ws, |i| &mut i.wind_speed);
        }

        // U and V components of the wind
        let u = handler.get_values(U, &weather_time); // supposed in m/s
        let v = handler.get_values(V, &weather_time); // supposed in m/s
        if let (Some(u), Some(v)) = (u, v) {
            let ws = izip!(&u, &v)
                .map(|(_u, _v)| {
                    if *_u < (NODATAVAL + 1.0) || *_v < (NODATAVAL + 1.0) {
                        return NODATAVAL;
                    }
                    f32::sqrt(_u * _u + _v * _v) * 3.6 // conversion to km/h
                })
                .collect::<Array1<f32>>();
            replace(&mut data, &ws, |i| &mut i.wind_speed);
        }
    }

    // 24h cumulated rain ending at noon, observed preferred over forecast
    let window_start = *noon - Duration::hours(24);
    let mut rain: Array1<f32> = Array1::ones(len) * NODATAVAL;
    for step in timeline
        .iter()
        .filter(|t| **t > window_start && **t <= *noon)
    {
        let step_rain = handler
            .get_values(O, step) // supposed in mm
            .or_else(|| handler.get_values(P, step));
        if let Some(step_rain) = step_rain {
            azip!((acc in &mut rain, r in &step_rain) {
                if *r > (NODATAVAL + 1.0) {
                    *acc = if *acc > (NODATAVAL + 1.0) { *acc + *r } else { *r };
                }
            });
        }
    }
    replace(&mut data, &rain, |i| &mut i.rain);

    Input {
        time: noon.to_owned(),
        data,
    }
}

#[derive(Debug)]
pub struct FWIGridError {
    msg: String,
}

impl From<String> for FWIGridError {
    fn from(msg: String) -> Self {
        FWIGridError { msg }
    }
}

impl From<FWIGridError> for String {
    fn from(value: FWIGridError) -> String {
        value.msg
    }
}

impl From<&str> for FWIGridError {
    fn from(msg: &str) -> Self {
        FWIGridError { msg: msg.into() }
    }
}

impl Display for FWIGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}
