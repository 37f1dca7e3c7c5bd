use crate::errors::ConfigError;
use crate::models::HourWindow;
use crate::storage::DEFAULT_STORAGE_KEY;
use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub window: HourWindow,
    pub port: u16,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            window: HourWindow::default(),
            port: 8080,
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let storage_key = match lookup("APP_STORAGE_KEY").filter(|key| !key.trim().is_empty()) {
            Some(key) if !is_plain_key(&key) => {
                return Err(ConfigError::InvalidVar {
                    var: "APP_STORAGE_KEY",
                    value: key,
                });
            }
            Some(key) => key,
            None => defaults.storage_key,
        };

        let start = parse_var(&lookup, "WINDOW_START_HOUR")?
            .unwrap_or(u32::from(defaults.window.start()));
        let end = parse_var(&lookup, "WINDOW_END_HOUR")?
            .unwrap_or(u32::from(defaults.window.end()));
        let window = HourWindow::new(start, end)?;

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        Ok(Self {
            data_dir,
            storage_key,
            window,
            port,
        })
    }
}

/// The key becomes a file name inside the data directory, so it must not
/// name a path of its own.
fn is_plain_key(key: &str) -> bool {
    !key.contains("..") && !key.contains(['/', '\\'])
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<TrackerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrackerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.window, HourWindow::new(10, 18).unwrap());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn window_bounds_come_from_env() {
        let config = config_from(&[("WINDOW_START_HOUR", "10"), ("WINDOW_END_HOUR", "21")]).unwrap();
        assert_eq!(config.window.hour_count(), 12);
    }

    #[test]
    fn storage_key_must_stay_inside_data_dir() {
        for key in ["../escape", "a/b", "..", "nested\\key"] {
            assert!(
                matches!(
                    config_from(&[("APP_STORAGE_KEY", key)]),
                    Err(ConfigError::InvalidVar { var: "APP_STORAGE_KEY", .. })
                ),
                "{key} should be rejected"
            );
        }
        let config = config_from(&[("APP_STORAGE_KEY", "squats-2024")]).unwrap();
        assert_eq!(config.storage_key, "squats-2024");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidVar { var: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("WINDOW_START_HOUR", "20"), ("WINDOW_END_HOUR", "9")]),
            Err(ConfigError::InvertedWindow { .. })
        ));
        assert!(matches!(
            config_from(&[("WINDOW_END_HOUR", "25")]),
            Err(ConfigError::HourOutOfRange(25))
        ));
    }
}
