//! Settings file loading and startup validation.
//!
//! Everything here fails before the pipeline runs: a malformed settings
//! file, an unknown zone code, a bad deadline string, or an out-of-range
//! first year is a startup error with a readable cause, never a silent
//! empty export.

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use gridline_core::Zone;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Earliest year the provider publishes transparency data for.
pub const EARLIEST_DATA_YEAR: i32 = 2015;

#[derive(Debug, Deserialize)]
struct RawSettings {
    provider: RawProvider,
    export: RawExport,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    api_token: String,
    zone: String,
    day_ahead_deadline: String,
}

#[derive(Debug, Deserialize)]
struct RawExport {
    first_historical_year: i32,
    output_dir: Option<PathBuf>,
}

/// Validated run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_token: String,
    pub zone: Zone,
    /// Local wall-clock time after which tomorrow's day-ahead data is
    /// expected to be published.
    pub day_ahead_deadline: NaiveTime,
    pub first_historical_year: i32,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(text).context("malformed settings file")?;

        if raw.provider.api_token.trim().is_empty() {
            bail!("provider.api_token must not be empty");
        }

        let zone: Zone = raw
            .provider
            .zone
            .parse()
            .with_context(|| format!("provider.zone '{}'", raw.provider.zone))?;

        let day_ahead_deadline =
            NaiveTime::parse_from_str(&raw.provider.day_ahead_deadline, "%H:%M").with_context(
                || {
                    format!(
                        "provider.day_ahead_deadline '{}' is not a HH:MM time",
                        raw.provider.day_ahead_deadline
                    )
                },
            )?;

        let first_historical_year = raw.export.first_historical_year;
        if first_historical_year < EARLIEST_DATA_YEAR {
            bail!(
                "export.first_historical_year {first_historical_year} predates available \
                 provider data ({EARLIEST_DATA_YEAR})"
            );
        }

        Ok(Settings {
            api_token: raw.provider.api_token,
            zone,
            day_ahead_deadline,
            first_historical_year,
            output_dir: raw.export.output_dir.unwrap_or_else(|| PathBuf::from("data")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[provider]
api_token = "secret-token"
zone = "DE_LU"
day_ahead_deadline = "12:40"

[export]
first_historical_year = 2022
output_dir = "out"
"#;

    #[test]
    fn valid_settings_parse() {
        let settings = Settings::from_toml(VALID).unwrap();
        assert_eq!(settings.zone, Zone::DeLu);
        assert_eq!(
            settings.day_ahead_deadline,
            NaiveTime::from_hms_opt(12, 40, 0).unwrap()
        );
        assert_eq!(settings.first_historical_year, 2022);
        assert_eq!(settings.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn output_dir_defaults_to_data() {
        let text = VALID.replace("output_dir = \"out\"\n", "");
        let settings = Settings::from_toml(&text).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let text = VALID.replace("DE_LU", "XX");
        let err = Settings::from_toml(&text).unwrap_err();
        assert!(format!("{err:#}").contains("unknown zone"));
    }

    #[test]
    fn malformed_deadline_is_rejected() {
        let text = VALID.replace("12:40", "noon");
        let err = Settings::from_toml(&text).unwrap_err();
        assert!(format!("{err:#}").contains("HH:MM"));
    }

    #[test]
    fn too_early_first_year_is_rejected() {
        let text = VALID.replace("2022", "2003");
        let err = Settings::from_toml(&text).unwrap_err();
        assert!(format!("{err:#}").contains("predates"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let text = VALID.replace("secret-token", " ");
        assert!(Settings::from_toml(&text).is_err());
    }
}
