use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

use crate::ConfigError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "RENTBOOK_HOME";

/// Data directory: `$RENTBOOK_HOME`, else `~/.rentbook`.
pub fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rentbook")
}

/// Stores user-configurable CLI preferences and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_book: Option<String>,
    #[serde(default = "Config::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "Config::default_reminder_warning_days")]
    pub reminder_warning_days: i64,
    #[serde(default = "Config::default_reminder_critical_days")]
    pub reminder_critical_days: i64,
    /// Accept zero and negative payments as manual adjustments.
    #[serde(default)]
    pub allow_adjustments: bool,
    #[serde(default = "Config::default_recent_tenants_limit")]
    pub recent_tenants_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-KE".into(),
            currency: "KES".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_book: None,
            cache_ttl_secs: Self::default_cache_ttl_secs(),
            reminder_warning_days: Self::default_reminder_warning_days(),
            reminder_critical_days: Self::default_reminder_critical_days(),
            allow_adjustments: false,
            recent_tenants_limit: Self::default_recent_tenants_limit(),
        }
    }
}

impl Config {
    /// Keys accepted by [`Config::set`], in display order.
    pub const KEYS: [&'static str; 9] = [
        "locale",
        "currency",
        "ui_color_enabled",
        "last_opened_book",
        "cache_ttl_secs",
        "reminder_warning_days",
        "reminder_critical_days",
        "allow_adjustments",
        "recent_tenants_limit",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_cache_ttl_secs() -> u64 {
        30
    }

    pub fn default_reminder_warning_days() -> i64 {
        5
    }

    pub fn default_reminder_critical_days() -> i64 {
        14
    }

    pub fn default_recent_tenants_limit() -> usize {
        5
    }

    /// Current value of `key` rendered as text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "last_opened_book" => self.last_opened_book.clone().unwrap_or_default(),
            "cache_ttl_secs" => self.cache_ttl_secs.to_string(),
            "reminder_warning_days" => self.reminder_warning_days.to_string(),
            "reminder_critical_days" => self.reminder_critical_days.to_string(),
            "allow_adjustments" => self.allow_adjustments.to_string(),
            "recent_tenants_limit" => self.recent_tenants_limit.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses `value` and assigns it to `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, value)?,
            "currency" => self.currency = non_empty(key, value)?.to_ascii_uppercase(),
            "ui_color_enabled" => self.ui_color_enabled = parse_bool(key, value)?,
            "last_opened_book" => {
                self.last_opened_book = (!value.is_empty()).then(|| value.to_string())
            }
            "cache_ttl_secs" => self.cache_ttl_secs = parse_number(key, value)?,
            "reminder_warning_days" => {
                let days: i64 = parse_number(key, value)?;
                if days < 0 || days > self.reminder_critical_days {
                    return Err(invalid(key, value, "must be between 0 and the critical threshold"));
                }
                self.reminder_warning_days = days;
            }
            "reminder_critical_days" => {
                let days: i64 = parse_number(key, value)?;
                if days < self.reminder_warning_days {
                    return Err(invalid(key, value, "must not be below the warning threshold"));
                }
                self.reminder_critical_days = days;
            }
            "allow_adjustments" => self.allow_adjustments = parse_bool(key, value)?,
            "recent_tenants_limit" => self.recent_tenants_limit = parse_number(key, value)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, value, "cannot be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "expected a non-negative whole number"))
}
