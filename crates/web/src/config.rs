use std::str::FromStr;

use anyhow::{Context, Result};
use volunteer_storage::EngineConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_keys: String,
    pub seed_file: Option<String>,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = EngineConfig::default();

        let config = Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            seed_file: std::env::var("SEED_FILE").ok().filter(|s| !s.is_empty()),
            engine: EngineConfig {
                blacklist_threshold: env_or("BLACKLIST_THRESHOLD", defaults.blacklist_threshold)?,
                excellent_threshold: env_or("EXCELLENT_THRESHOLD", defaults.excellent_threshold)?,
                credit_floor: env_or("CREDIT_FLOOR", defaults.credit_floor)?,
                initial_credit: env_or("INITIAL_CREDIT", defaults.initial_credit)?,
                no_show_penalty: env_or("NO_SHOW_PENALTY", defaults.no_show_penalty)?,
                late_cancel_penalty: env_or("LATE_CANCEL_PENALTY", defaults.late_cancel_penalty)?,
                activity_completion_bonus: env_or(
                    "ACTIVITY_COMPLETION_BONUS",
                    defaults.activity_completion_bonus,
                )?,
                cancel_deadline_hours: env_or(
                    "CANCEL_DEADLINE_HOURS",
                    defaults.cancel_deadline_hours,
                )?,
                allow_late_cancel: env_or("ALLOW_LATE_CANCEL", defaults.allow_late_cancel)?,
                require_materials_approval: env_or(
                    "REQUIRE_MATERIALS_APPROVAL",
                    defaults.require_materials_approval,
                )?,
                auto_complete_activities: env_or(
                    "AUTO_COMPLETE_ACTIVITIES",
                    defaults.auto_complete_activities,
                )?,
                under_subscription_window_days: env_or(
                    "UNDER_SUBSCRIPTION_WINDOW_DAYS",
                    defaults.under_subscription_window_days,
                )?,
                under_subscription_percent: env_or(
                    "UNDER_SUBSCRIPTION_PERCENT",
                    defaults.under_subscription_percent,
                )?,
            },
        };
        config
            .engine
            .validate()
            .context("Invalid engine configuration")?;

        Ok(config)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value}")),
        Err(_) => Ok(default),
    }
}
