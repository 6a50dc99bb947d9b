/// Sentinel value for missing data, used across inputs, states and outputs
pub const NODATAVAL: f32 = -9999.0;
