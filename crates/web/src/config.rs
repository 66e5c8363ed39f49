use anyhow::{Context, Result};
use storage::models::DrawSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    /// Used for events created without explicit draw settings
    pub draw_defaults: DrawSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = DrawSettings::default();

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            draw_defaults: DrawSettings {
                lane_capacity: optional_number("DEFAULT_LANE_CAPACITY", defaults.lane_capacity)?,
                advance_per_heat: optional_number(
                    "DEFAULT_ADVANCE_PER_HEAT",
                    defaults.advance_per_heat,
                )?,
                advance_by_time: optional_number(
                    "DEFAULT_ADVANCE_BY_TIME",
                    defaults.advance_by_time,
                )?,
            },
        })
    }
}

fn optional_number(name: &str, default: u32) -> Result<u32> {
    match std::env::var(name) {
        Ok(raw) => parse_number(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .with_context(|| format!("{name} must be a non-negative number, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("DEFAULT_LANE_CAPACITY", " 8 ").unwrap(), 8);
        assert!(parse_number("DEFAULT_LANE_CAPACITY", "-1").is_err());
        assert!(parse_number("DEFAULT_LANE_CAPACITY", "eight").is_err());
    }
}
