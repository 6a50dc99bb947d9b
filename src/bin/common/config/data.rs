use std::fs::File;
use std::io::{self, BufRead};

use fwi::modules::fwi::models::FWICellPropertiesContainer;

use crate::common::helpers::FWIGridError;

/// Reads the cells file: one `lon lat` pair per line, whitespace separated.
/// Lines starting with `#` or `%` are comments.
pub fn read_cells(file_name: &str) -> Result<FWICellPropertiesContainer, FWIGridError> {
    let file = File::open(file_name)
        .map_err(|error| format!("error opening cells file {file_name}: {error}"))?;
    let reader = io::BufReader::new(file);

    let mut lons: Vec<f32> = Vec::new();
    let mut lats: Vec<f32> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| format!("error reading {file_name}: {error}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let (lon, lat) = parse_cells_line(line)
            .map_err(|error| format!("{file_name} line {}: {error}", i + 1))?;
        lons.push(lon);
        lats.push(lat);
    }

    if lons.is_empty() {
        return Err(format!("no cells found in {file_name}").into());
    }

    Ok(FWICellPropertiesContainer { lons, lats })
}

pub fn parse_cells_line(line: &str) -> Result<(f32, f32), FWIGridError> {
    let mut components = line.split_whitespace();
    let lon = components
        .next()
        .ok_or("missing longitude")?
        .parse::<f32>()
        .map_err(|_| "could not parse longitude")?;
    let lat = components
        .next()
        .ok_or("missing latitude")?
        .parse::<f32>()
        .map_err(|_| "could not parse latitude")?;
    Ok((lon, lat))
}
