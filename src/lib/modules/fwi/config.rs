use super::functions::{
    compute_bui, compute_fwi, compute_isi, day_length, day_length_equatorial, day_length_factor,
    day_length_factor_equatorial, update_dc, update_dmc, update_ffmc,
};

/// configuration structure for model config
/// holds the update/combination functions of the selected model version;
/// "equatorial" replaces the seasonal tables with year-round constants
#[derive(Debug, Clone)]
pub struct FWIModelConfig {
    pub model_version: String,

    ffmc_fn: fn(f32, f32, f32, f32, f32) -> f32,
    dmc_fn: fn(f32, f32, f32, f32, f32) -> f32,
    dc_fn: fn(f32, f32, f32, f32) -> f32,
    isi_fn: fn(f32, f32) -> f32,
    bui_fn: fn(f32, f32) -> f32,
    fwi_fn: fn(f32, f32) -> f32,
    day_length_fn: fn(f32, u32) -> f32,
    day_length_factor_fn: fn(f32, u32) -> f32,
}

impl FWIModelConfig {
    pub fn new(model_version_str: &str) -> Self {
        let day_length_fn: fn(f32, u32) -> f32;
        let day_length_factor_fn: fn(f32, u32) -> f32;

        match model_version_str {
            "equatorial" => {
                day_length_fn = day_length_equatorial;
                day_length_factor_fn = day_length_factor_equatorial;
            }
            _ => {
                day_length_fn = day_length;
                day_length_factor_fn = day_length_factor;
            }
        }

        FWIModelConfig {
            model_version: model_version_str.to_owned(),
            ffmc_fn: update_ffmc,
            dmc_fn: update_dmc,
            dc_fn: update_dc,
            isi_fn: compute_isi,
            bui_fn: compute_bui,
            fwi_fn: compute_fwi,
            day_length_fn,
            day_length_factor_fn,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ffmc(&self, ffmc: f32, rain24: f32, temperature: f32, humidity: f32, wind_speed: f32) -> f32 {
        (self.ffmc_fn)(ffmc, rain24, temperature, humidity, wind_speed)
    }

    pub fn dmc(&self, dmc: f32, rain24: f32, temperature: f32, humidity: f32, l_e: f32) -> f32 {
        (self.dmc_fn)(dmc, rain24, temperature, humidity, l_e)
    }

    pub fn dc(&self, dc: f32, rain24: f32, temperature: f32, l_f: f32) -> f32 {
        (self.dc_fn)(dc, rain24, temperature, l_f)
    }

    pub fn isi(&self, ffmc: f32, wind_speed: f32) -> f32 {
        (self.isi_fn)(ffmc, wind_speed)
    }

    pub fn bui(&self, dmc: f32, dc: f32) -> f32 {
        (self.bui_fn)(dmc, dc)
    }

    pub fn fwi(&self, isi: f32, bui: f32) -> f32 {
        (self.fwi_fn)(isi, bui)
    }

    pub fn day_length(&self, lat: f32, month: u32) -> f32 {
        (self.day_length_fn)(lat, month)
    }

    pub fn day_length_factor(&self, lat: f32, month: u32) -> f32 {
        (self.day_length_factor_fn)(lat, month)
    }
}
