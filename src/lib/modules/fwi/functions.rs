use chrono::{DateTime, Datelike, Utc};

use crate::error::CellError;
use crate::models::{input::InputElement, output::OutputElement};

use super::{
    config::FWIModelConfig,
    constants::*,
    models::{FWIPropertiesElement, FWIStateElement},
};

// All coefficients below follow the daily equations of
// Van Wagner, C.E.; Pickett, T.L. (1985). Equations and FORTRAN program
// for the Canadian Forest Fire Weather Index System.

// FFMC MODULE

/// FF-scale to fine fuel moisture content [%]
pub fn ffmc_to_moisture(ffmc: f32) -> f32 {
    147.2 * (101.0 - ffmc) / (59.5 + ffmc)
}

/// Fine fuel moisture content [%] back to the FF scale
pub fn moisture_to_ffmc(moisture: f32) -> f32 {
    59.5 * (250.0 - moisture) / (147.2 + moisture)
}

/// Rain-soaking of the fine fuel moisture content, with the
/// over-saturation correction above moisture 150
pub fn moisture_rain_effect(moisture: f32, rain24: f32) -> f32 {
    let rain_eff = rain24 - FFMC_MIN_RAIN;
    let mut moisture_new = moisture
        + 42.5 * rain_eff * (-100.0 / (251.0 - moisture)).exp() * (1.0 - (-6.93 / rain_eff).exp());
    if moisture > 150.0 {
        moisture_new += 0.0015 * (moisture - 150.0).powf(2.0) * rain_eff.sqrt();
    }
    moisture_new.min(MOISTURE_MAX)
}

/// Fine Fuel Moisture Code update: rain phase above 0.5 mm, then drying or
/// wetting toward the humidity-dependent equilibria
pub fn update_ffmc(ffmc: f32, rain24: f32, temp: f32, hum: f32, w_speed: f32) -> f32 {
    let mut moisture = ffmc_to_moisture(ffmc);
    if rain24 > FFMC_MIN_RAIN {
        moisture = moisture_rain_effect(moisture, rain24);
    }

    let emc_dry = 0.942 * hum.powf(0.679)
        + 11.0 * ((hum - 100.0) / 10.0).exp()
        + 0.18 * (21.1 - temp) * (1.0 - (-0.115 * hum).exp());
    let emc_wet = 0.618 * hum.powf(0.753)
        + 10.0 * ((hum - 100.0) / 10.0).exp()
        + 0.18 * (21.1 - temp) * (1.0 - (-0.115 * hum).exp());

    if moisture > emc_dry {
        // drying, log rate from humidity and wind
        let k0 = 0.424 * (1.0 - (hum / 100.0).powf(1.7))
            + 0.0694 * w_speed.sqrt() * (1.0 - (hum / 100.0).powf(8.0));
        let k = 0.581 * k0 * (0.0365 * temp).exp();
        moisture = emc_dry + (moisture - emc_dry) * 10.0_f32.powf(-k);
    } else if moisture < emc_wet {
        // wetting, mirrored log rate
        let k0 = 0.424 * (1.0 - ((100.0 - hum) / 100.0).powf(1.7))
            + 0.0694 * w_speed.sqrt() * (1.0 - ((100.0 - hum) / 100.0).powf(8.0));
        let k = 0.581 * k0 * (0.0365 * temp).exp();
        moisture = emc_wet - (emc_wet - moisture) * 10.0_f32.powf(-k);
    }

    moisture_to_ffmc(moisture.clamp(0.0, MOISTURE_MAX)).clamp(0.0, FFMC_MAX)
}

// DMC MODULE

/// Rain effect on the Duff Moisture Code, through the duff moisture content
/// with the slope coefficient of the three code regimes
pub fn dmc_rain_effect(dmc: f32, rain24: f32) -> f32 {
    let rain_eff = 0.92 * rain24 - 1.27;
    let m0 = 20.0 + 280.0 / (0.023 * dmc).exp();
    let b = if dmc <= 33.0 {
        100.0 / (0.5 + 0.3 * dmc)
    } else if dmc <= 65.0 {
        14.0 - 1.3 * dmc.ln()
    } else {
        6.2 * dmc.ln() - 17.2
    };
    let mr = m0 + 1000.0 * rain_eff / (48.77 + b * rain_eff);
    (244.72 - 43.43 * (mr - 20.0).ln()).max(0.0)
}

/// Duff Moisture Code update: rain phase above 1.5 mm, temperature/day-length
/// drying with zero drying below -1.1 °C
pub fn update_dmc(dmc: f32, rain24: f32, temp: f32, hum: f32, l_e: f32) -> f32 {
    let mut dmc_new = dmc;
    if rain24 > DMC_MIN_RAIN {
        dmc_new = dmc_rain_effect(dmc, rain24);
    }
    if temp > DMC_MIN_TEMP {
        let k = 1.894 * (temp + 1.1) * (100.0 - hum) * l_e * 1e-6;
        dmc_new += 100.0 * k;
    }
    dmc_new.max(0.0)
}

// DC MODULE

/// Rain effect on the Drought Code through its moisture equivalent scale
pub fn dc_rain_effect(dc: f32, rain24: f32) -> f32 {
    let rain_eff = 0.83 * rain24 - 1.27;
    let q0 = 800.0 * (-dc / 400.0).exp();
    let qr = q0 + 3.937 * rain_eff;
    (400.0 * (800.0 / qr).ln()).max(0.0)
}

/// Drought Code update: rain phase above 2.8 mm, evapotranspiration term with
/// the temperature floored at -2.8 °C; only the seasonal factor remains below
/// it, and the winter factors are negative
pub fn update_dc(dc: f32, rain24: f32, temp: f32, l_f: f32) -> f32 {
    let mut dc_new = dc;
    if rain24 > DC_MIN_RAIN {
        dc_new = dc_rain_effect(dc, rain24);
    }
    let v = if temp > DC_MIN_TEMP {
        0.36 * (temp + 2.8) + l_f
    } else {
        l_f
    };
    (dc_new + 0.5 * v).max(0.0)
}

// ISI MODULE

/// Initial Spread Index from today's FFMC and wind speed [km/h]
pub fn compute_isi(ffmc: f32, w_speed: f32) -> f32 {
    let moisture = ffmc_to_moisture(ffmc);
    let f_wind = (0.05039 * w_speed).exp();
    let f_moist = 91.9 * (-0.1386 * moisture).exp() * (1.0 + moisture.powf(5.31) / (4.93 * 1e7));
    0.208 * f_wind * f_moist
}

// BUI MODULE

/// Build Up Index from today's DMC and DC; the two branches meet at
/// DMC = 0.4 DC
pub fn compute_bui(dmc: f32, dc: f32) -> f32 {
    if dmc == 0.0 && dc == 0.0 {
        return 0.0;
    }
    let bui = if dmc <= 0.4 * dc {
        0.8 * dmc * dc / (dmc + 0.4 * dc)
    } else {
        dmc - (1.0 - 0.8 * dc / (dmc + 0.4 * dc)) * (0.92 + (0.0114 * dmc).powf(1.7))
    };
    bui.max(0.0)
}

// FWI MODULE

/// Fire Weather Index from today's ISI and BUI; S-scale log transform above
/// an intermediate value of 1, B-scale passthrough below
pub fn compute_fwi(isi: f32, bui: f32) -> f32 {
    let f_d = if bui <= 80.0 {
        0.626 * bui.powf(0.809) + 2.0
    } else {
        1000.0 / (25.0 + 108.64 * (-0.023 * bui).exp())
    };
    let b = 0.1 * isi * f_d;
    let fwi = if b > 1.0 {
        (2.72 * (0.434 * b.ln()).powf(0.647)).exp()
    } else {
        b
    };
    fwi.max(0.0)
}

// DAY LENGTH TABLES

/// Monthly effective day length [h] for the DMC drying factor
pub fn day_length(lat: f32, month: u32) -> f32 {
    let idx = (month.clamp(1, 12) - 1) as usize;
    if lat > LAT_BAND_NORTH {
        DAY_LENGTH_46N[idx]
    } else if lat > 0.0 {
        DAY_LENGTH_20N[idx]
    } else if lat > LAT_BAND_SOUTH {
        DAY_LENGTH_20S[idx]
    } else {
        DAY_LENGTH_40S[idx]
    }
}

/// Monthly day-length factor for the DC drying term
pub fn day_length_factor(lat: f32, month: u32) -> f32 {
    let idx = (month.clamp(1, 12) - 1) as usize;
    if lat > 0.0 {
        DAY_LENGTH_FACTOR_NORTH[idx]
    } else {
        DAY_LENGTH_FACTOR_SOUTH[idx]
    }
}

pub fn day_length_equatorial(_lat: f32, _month: u32) -> f32 {
    EQUATORIAL_DAY_LENGTH
}

pub fn day_length_factor_equatorial(_lat: f32, _month: u32) -> f32 {
    EQUATORIAL_DAY_LENGTH_FACTOR
}

// VALIDATION

fn check_finite(variable: &'static str, value: f32) -> Result<(), CellError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CellError::InvalidInput { variable, value })
    }
}

/// Domain validation of a daily weather record.
/// NODATAVAL is missing data, not an error: the cell is skipped and masked.
pub fn validate(input: &InputElement) -> Result<(), CellError> {
    let InputElement {
        temperature,
        rain,
        wind_speed,
        humidity,
    } = *input;

    check_finite("temperature", temperature)?;
    check_finite("rain", rain)?;
    check_finite("windSpeed", wind_speed)?;
    check_finite("humidity", humidity)?;

    if rain != NODATAVAL && rain < 0.0 {
        return Err(CellError::InvalidInput {
            variable: "rain",
            value: rain,
        });
    }
    if wind_speed != NODATAVAL && wind_speed < 0.0 {
        return Err(CellError::InvalidInput {
            variable: "windSpeed",
            value: wind_speed,
        });
    }
    if humidity != NODATAVAL && !(0.0..=100.0).contains(&humidity) {
        return Err(CellError::InvalidInput {
            variable: "humidity",
            value: humidity,
        });
    }
    Ok(())
}

// UPDATE STATE

/// Advance the moisture codes of a single cell by one day.
/// The three codes are replaced together or not at all: on a fault the cell
/// keeps its previous codes and the error is reported to the caller.
pub fn update_state_fn(
    state: &mut FWIStateElement,
    props: &FWIPropertiesElement,
    input: &InputElement,
    time: &DateTime<Utc>,
    config: &FWIModelConfig,
) -> Result<(), CellError> {
    let InputElement {
        temperature,
        rain,
        wind_speed,
        humidity,
    } = *input;

    if rain == NODATAVAL || humidity == NODATAVAL || temperature == NODATAVAL || wind_speed == NODATAVAL
    {
        // keep the current codes if the day has no complete observation
        return Ok(());
    }
    validate(input)?;
    if !state.has_codes() {
        return Err(CellError::MissingPriorState);
    }

    let month = time.month();
    let l_e = config.day_length(props.lat, month);
    let l_f = config.day_length_factor(props.lat, month);

    let ffmc = config.ffmc(state.ffmc, rain, temperature, humidity, wind_speed);
    let dmc = config.dmc(state.dmc, rain, temperature, humidity, l_e);
    let dc = config.dc(state.dc, rain, temperature, l_f);

    state.ffmc = ffmc;
    state.dmc = dmc;
    state.dc = dc;
    Ok(())
}

// COMPUTE OUTPUTS

/// Today's full record for a cell: the codes plus the derived indices,
/// recomputed fresh from the codes and today's weather
pub fn get_output_fn(
    state: &FWIStateElement,
    input: &InputElement,
    config: &FWIModelConfig,
) -> OutputElement {
    let echo = OutputElement {
        temperature: input.temperature,
        rain: input.rain,
        wind_speed: input.wind_speed,
        humidity: input.humidity,
        ..OutputElement::default()
    };

    if !state.has_codes() {
        return echo;
    }

    let (ffmc, dmc, dc) = (state.ffmc, state.dmc, state.dc);
    let bui = config.bui(dmc, dc);
    let (isi, fwi) = if input.wind_speed == NODATAVAL {
        (NODATAVAL, NODATAVAL)
    } else {
        let isi = config.isi(ffmc, input.wind_speed);
        (isi, config.fwi(isi, bui))
    };

    OutputElement {
        ffmc,
        dmc,
        dc,
        isi,
        bui,
        fwi,
        ..echo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn mid_latitude_cell() -> FWIPropertiesElement {
        FWIPropertiesElement {
            lon: -72.0,
            lat: 46.0,
        }
    }

    #[test]
    fn daily_step_matches_published_worked_example() {
        // Worked example of Van Wagner & Pickett (1985): station defaults on
        // an April day, T 17 °C, RH 42 %, wind 25 km/h, no rain
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let input = InputElement {
            temperature: 17.0,
            rain: 0.0,
            wind_speed: 25.0,
            humidity: 42.0,
        };
        let mut state = FWIStateElement {
            ffmc: FFMC_INIT,
            dmc: DMC_INIT,
            dc: DC_INIT,
        };

        update_state_fn(&mut state, &props, &input, &noon(2022, 4, 15), &config)
            .expect("valid input");
        let output = get_output_fn(&state, &input, &config);

        assert_abs_diff_eq!(output.ffmc, 87.7, epsilon = 0.05);
        assert_abs_diff_eq!(output.dmc, 8.5, epsilon = 0.05);
        assert_abs_diff_eq!(output.dc, 19.0, epsilon = 0.05);
        assert_abs_diff_eq!(output.isi, 10.9, epsilon = 0.05);
        assert_abs_diff_eq!(output.bui, 8.5, epsilon = 0.05);
        assert_abs_diff_eq!(output.fwi, 10.1, epsilon = 0.05);
    }

    #[test]
    fn daily_step_is_idempotent() {
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let input = InputElement {
            temperature: 23.5,
            rain: 4.2,
            wind_speed: 12.0,
            humidity: 55.0,
        };
        let time = noon(2022, 7, 3);

        let mut first = FWIStateElement {
            ffmc: 77.0,
            dmc: 30.0,
            dc: 120.0,
        };
        let mut second = FWIStateElement {
            ffmc: 77.0,
            dmc: 30.0,
            dc: 120.0,
        };
        update_state_fn(&mut first, &props, &input, &time, &config).unwrap();
        update_state_fn(&mut second, &props, &input, &time, &config).unwrap();

        assert_eq!(first.ffmc, second.ffmc);
        assert_eq!(first.dmc, second.dmc);
        assert_eq!(first.dc, second.dc);
    }

    #[test]
    fn codes_and_indices_stay_in_bounds() {
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let time = noon(2022, 8, 1);

        // dry gale, tropical downpour, cold drizzle, saturated calm
        let scenarios = [
            (40.0, 0.0, 90.0, 5.0),
            (28.0, 120.0, 10.0, 95.0),
            (2.0, 6.0, 15.0, 85.0),
            (12.0, 0.6, 0.0, 100.0),
        ];
        let priors = [
            (85.0, 6.0, 15.0),
            (101.0, 0.0, 0.0),
            (0.0, 300.0, 800.0),
            (96.0, 60.0, 400.0),
        ];

        for &(temperature, rain, wind_speed, humidity) in &scenarios {
            for &(ffmc, dmc, dc) in &priors {
                let input = InputElement {
                    temperature,
                    rain,
                    wind_speed,
                    humidity,
                };
                let mut state = FWIStateElement { ffmc, dmc, dc };
                update_state_fn(&mut state, &props, &input, &time, &config).unwrap();
                let output = get_output_fn(&state, &input, &config);

                assert!((0.0..=FFMC_MAX).contains(&output.ffmc), "ffmc {}", output.ffmc);
                assert!(output.dmc >= 0.0, "dmc {}", output.dmc);
                assert!(output.dc >= 0.0, "dc {}", output.dc);
                assert!(output.isi >= 0.0, "isi {}", output.isi);
                assert!(output.bui >= 0.0, "bui {}", output.bui);
                assert!(output.fwi >= 0.0, "fwi {}", output.fwi);
            }
        }
    }

    #[test]
    fn freezing_winter_day_does_not_increase_codes() {
        // calm, saturated, freezing January day: every drying term is shut
        // off and the seasonal DC factor is negative
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let input = InputElement {
            temperature: -5.0,
            rain: 0.0,
            wind_speed: 0.0,
            humidity: 95.0,
        };
        let mut state = FWIStateElement {
            ffmc: 85.0,
            dmc: 6.0,
            dc: 15.0,
        };

        update_state_fn(&mut state, &props, &input, &noon(2022, 1, 10), &config).unwrap();

        assert!(state.ffmc <= 85.0);
        assert!(state.dmc <= 6.0);
        assert!(state.dc <= 15.0);
    }

    #[test]
    fn bui_is_continuous_at_the_branch_boundary() {
        let dc = 100.0;
        let boundary = 0.4 * dc;
        let below = compute_bui(boundary - 1e-3, dc);
        let above = compute_bui(boundary + 1e-3, dc);
        assert_abs_diff_eq!(below, above, epsilon = 1e-2);
    }

    #[test]
    fn rain_thresholds_are_strict() {
        // rain exactly at a threshold must not trigger that rain phase
        let dry = update_ffmc(85.0, 0.0, 17.0, 42.0, 25.0);
        assert_abs_diff_eq!(update_ffmc(85.0, 0.5, 17.0, 42.0, 25.0), dry, epsilon = 1e-6);

        let dmc_dry = update_dmc(6.0, 0.0, 17.0, 42.0, 12.8);
        assert_abs_diff_eq!(update_dmc(6.0, 1.5, 17.0, 42.0, 12.8), dmc_dry, epsilon = 1e-6);

        let dc_dry = update_dc(15.0, 0.0, 17.0, 0.9);
        assert_abs_diff_eq!(update_dc(15.0, 2.8, 17.0, 0.9), dc_dry, epsilon = 1e-6);
    }

    #[test]
    fn heavy_rain_lowers_every_code() {
        let ffmc = update_ffmc(90.0, 25.0, 15.0, 100.0, 0.0);
        assert!(ffmc < 90.0);
        let dmc = dmc_rain_effect(40.0, 25.0);
        assert!(dmc < 40.0);
        let dc = dc_rain_effect(300.0, 25.0);
        assert!(dc < 300.0);
    }

    #[test]
    fn day_length_tables_follow_latitude_bands() {
        // April in each band
        assert_abs_diff_eq!(day_length(46.0, 4), 12.8);
        assert_abs_diff_eq!(day_length(10.0, 4), 9.5);
        assert_abs_diff_eq!(day_length(-10.0, 4), 8.5);
        assert_abs_diff_eq!(day_length(-40.0, 4), 7.9);

        // hemisphere factor, January
        assert_abs_diff_eq!(day_length_factor(46.0, 1), -1.6);
        assert_abs_diff_eq!(day_length_factor(-40.0, 1), 6.4);
    }

    #[test]
    fn equatorial_version_uses_constant_factors() {
        let config = FWIModelConfig::new("equatorial");
        for month in 1..=12 {
            assert_abs_diff_eq!(config.day_length(46.0, month), EQUATORIAL_DAY_LENGTH);
            assert_abs_diff_eq!(
                config.day_length_factor(-40.0, month),
                EQUATORIAL_DAY_LENGTH_FACTOR
            );
        }
    }

    #[test]
    fn out_of_domain_inputs_fault_and_keep_the_codes() {
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let time = noon(2022, 6, 1);

        let bad_inputs = [
            InputElement {
                temperature: 17.0,
                rain: -3.0,
                wind_speed: 10.0,
                humidity: 42.0,
            },
            InputElement {
                temperature: 17.0,
                rain: 0.0,
                wind_speed: -1.0,
                humidity: 42.0,
            },
            InputElement {
                temperature: 17.0,
                rain: 0.0,
                wind_speed: 10.0,
                humidity: 120.0,
            },
        ];

        for input in &bad_inputs {
            let mut state = FWIStateElement {
                ffmc: 85.0,
                dmc: 6.0,
                dc: 15.0,
            };
            let result = update_state_fn(&mut state, &props, input, &time, &config);
            assert!(matches!(
                result,
                Err(CellError::InvalidInput { .. })
            ));
            assert_eq!(state.ffmc, 85.0);
            assert_eq!(state.dmc, 6.0);
            assert_eq!(state.dc, 15.0);
        }
    }

    #[test]
    fn missing_observation_keeps_the_codes_silently() {
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let input = InputElement::default();
        let mut state = FWIStateElement {
            ffmc: 85.0,
            dmc: 6.0,
            dc: 15.0,
        };

        update_state_fn(&mut state, &props, &input, &noon(2022, 6, 1), &config)
            .expect("missing data is not a fault");
        assert_eq!(state.ffmc, 85.0);
    }

    #[test]
    fn cell_without_prior_codes_faults() {
        let config = FWIModelConfig::new("standard");
        let props = mid_latitude_cell();
        let input = InputElement {
            temperature: 17.0,
            rain: 0.0,
            wind_speed: 10.0,
            humidity: 42.0,
        };
        let mut state = FWIStateElement {
            ffmc: NODATAVAL,
            dmc: NODATAVAL,
            dc: NODATAVAL,
        };

        let result = update_state_fn(&mut state, &props, &input, &noon(2022, 6, 1), &config);
        assert_eq!(result, Err(CellError::MissingPriorState));
    }
}
