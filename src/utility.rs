//! Utility functions for configuration parsing

use crate::configuration::{Generation, RouterConfig};
use crate::error::{Result, RouterError};
use crate::tic::{ChecksumCoverage, TicMode};

/// Iterate over the `(key, value)` pairs of a configuration block.
///
/// Blank lines and lines starting with `#` are skipped; lines without `=`
/// yield an empty value.
fn entries(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, ""),
        })
}

/// Extracts the value of `key` from a configuration block.
///
/// # Returns
/// * `Option<&str>` - Value of the last line defining `key`
pub fn get_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    entries(text)
        .filter(|(k, _)| *k == key)
        .map(|(_, value)| value)
        .last()
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T> {
    value.parse().map_err(|_| RouterError::invalid_number())
}

/// Parse a configuration block into a resolved [`RouterConfig`].
///
/// `TIC_MODE` and `GENERATION` select the defaults, the remaining keys
/// override them. The result is validated by building its control law
/// against the default calibration table.
///
/// # Errors
///
/// Returns a configuration error on unknown keys or values, malformed
/// numbers, or out-of-range steps and ceiling.
pub fn parse_config(text: &str) -> Result<RouterConfig> {
    let mode = match get_value(text, "TIC_MODE") {
        Some(name) => TicMode::from_name(name).ok_or_else(RouterError::unknown_value)?,
        None => TicMode::Standard,
    };
    let generation = match get_value(text, "GENERATION") {
        Some(name) => Generation::from_name(name).ok_or_else(RouterError::unknown_value)?,
        None => Generation::Indexed,
    };

    let mut config = RouterConfig::new(mode, generation);
    for (key, value) in entries(text) {
        match key {
            "TIC_MODE" | "GENERATION" => {}
            "CHECKSUM" => {
                config.coverage = if value.eq_ignore_ascii_case("auto") {
                    mode.default_coverage()
                } else if value.eq_ignore_ascii_case("include") {
                    ChecksumCoverage::IncludeFinalSeparator
                } else if value.eq_ignore_ascii_case("exclude") {
                    ChecksumCoverage::ExcludeFinalSeparator
                } else {
                    return Err(RouterError::unknown_value());
                };
            }
            "CEILING" => config.ceiling = parse_number(value)?,
            "FAST_STEP" => config.fast_step = parse_number(value)?,
            "SLOW_STEP" => config.slow_step = parse_number(value)?,
            "REPROBE_SECS" => {
                config.reprobe_ms = parse_number::<u64>(value)?.saturating_mul(1000);
            }
            "PACING_MS" => config.pacing_ms = parse_number(value)?,
            _ => {
                tic_log!(warn, "unknown configuration key");
                return Err(RouterError::unknown_key());
            }
        }
    }

    config.strategy(crate::control::DEFAULT_TABLE)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CONFIG;

    #[test]
    fn test_builtin_config() {
        let config = parse_config(CONFIG).unwrap();
        assert_eq!(config.mode, TicMode::Standard);
        assert_eq!(config.generation, Generation::Indexed);
        assert_eq!(config.coverage, ChecksumCoverage::IncludeFinalSeparator);
        assert_eq!(config.ceiling, 20);
        assert_eq!(config.fast_step, 1);
        assert_eq!(config.reprobe_ms, 60_000);
        assert_eq!(config.pacing_ms, 0);
    }

    #[test]
    fn test_historic_direct() {
        let text = "
            # old meter
            TIC_MODE = historic
            GENERATION=direct
            CEILING=1500
            FAST_STEP=50
            SLOW_STEP=5
        ";
        let config = parse_config(text).unwrap();
        assert_eq!(config.mode, TicMode::Historic);
        assert_eq!(config.coverage, ChecksumCoverage::ExcludeFinalSeparator);
        assert_eq!(config.ceiling, 1500);
        assert_eq!(config.fast_step, 50);
        assert_eq!(config.slow_step, 5);
        assert_eq!(config.pacing_ms, 1_000);
    }

    #[test]
    fn test_checksum_override() {
        let config = parse_config("TIC_MODE=historic\nCHECKSUM=include").unwrap();
        assert_eq!(config.coverage, ChecksumCoverage::IncludeFinalSeparator);
    }

    #[test]
    fn test_empty_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), RouterConfig::default());
    }

    #[test]
    fn test_errors() {
        let unknown = parse_config("WIFI_NETWORK=home").unwrap_err();
        assert!(unknown.as_config().unwrap().is_parse_error());

        assert!(parse_config("TIC_MODE=triphase").is_err());
        assert!(parse_config("CHECKSUM=maybe").is_err());
        assert!(parse_config("CEILING=lots").unwrap_err().as_config().unwrap().is_parse_error());
        assert!(parse_config("FAST_STEP=0").unwrap_err().as_config().unwrap().is_invalid_step());
        assert!(parse_config("GENERATION=direct\nCEILING=0").is_err());
    }

    #[test]
    fn test_get_value_last_wins() {
        assert_eq!(get_value("A=1\nA=2", "A"), Some("2"));
        assert_eq!(get_value("A=1", "B"), None);
    }
}
