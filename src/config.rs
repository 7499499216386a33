use std::env;

use crate::services::GridConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub store_backend: StoreBackend,
    pub admin_token: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub step_minutes: i64,
    pub tolerate_corrupt_storage: bool,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn flag(key: &str, default: bool) -> bool {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse_flag(&raw).unwrap_or_else(|| {
        tracing::warn!("ignoring unrecognized {key}={raw}, using {default}");
        default
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "slotbook.db".to_string()),
            store_backend: match env::var("STORE_BACKEND").as_deref() {
                Ok("memory") => StoreBackend::Memory,
                _ => StoreBackend::Sqlite,
            },
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            open_hour: parsed("OPEN_HOUR", 9),
            close_hour: parsed("CLOSE_HOUR", 21),
            step_minutes: parsed("STEP_MINUTES", 30),
            tolerate_corrupt_storage: flag("TOLERATE_CORRUPT_STORAGE", false),
        }
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig {
            open_hour: self.open_hour,
            close_hour: self.close_hour,
            step_minutes: self.step_minutes,
        }
    }
}
