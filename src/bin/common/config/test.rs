#[cfg(test)]
mod tests {
    use fwi::modules::fwi::constants::NODATAVAL;

    use crate::common::config::data::parse_cells_line;
    use crate::common::config::models::parse_warm_state_line;

    #[test]
    fn parse_warm_state_line_ok() {
        let line = "85.0\t6.0\t15.0";
        let result = parse_warm_state_line(line);
        assert!(result.is_ok());
        let state = result.expect("should unwrap");
        assert_eq!(state.ffmc, 85.0);
        assert_eq!(state.dmc, 6.0);
        assert_eq!(state.dc, 15.0);
    }

    #[test]
    fn parse_warm_state_line_fails_for_malformed_line() {
        assert!(parse_warm_state_line("85.0 6.0").is_err());
        assert!(parse_warm_state_line("85.0 six 15.0").is_err());
        assert!(parse_warm_state_line("").is_err());
    }

    #[test]
    fn partially_missing_warm_state_counts_as_missing() {
        let line = format!("85.0 {} 15.0", NODATAVAL);
        let state = parse_warm_state_line(&line).expect("should parse");
        assert_eq!(state.ffmc, NODATAVAL);
        assert_eq!(state.dmc, NODATAVAL);
        assert_eq!(state.dc, NODATAVAL);
    }

    #[test]
    fn parse_cells_line_ok() {
        let (lon, lat) = parse_cells_line("9.05  44.42").expect("should parse");
        assert_eq!(lon, 9.05);
        assert_eq!(lat, 44.42);
    }

    #[test]
    fn parse_cells_line_fails_for_missing_latitude() {
        assert!(parse_cells_line("9.05").is_err());
    }
}
