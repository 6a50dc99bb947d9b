pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " - Canadian Forest Fire Weather Index System calculator on gridded weather data"
);
