use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub operation_timeout: Duration,
    pub order_max_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        Ok(Self {
            port,
            database_url,
            host,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            db_acquire_timeout: Duration::from_millis(parse_or("DB_ACQUIRE_TIMEOUT_MS", 3000)),
            operation_timeout: Duration::from_millis(parse_or("OPERATION_TIMEOUT_MS", 5000)),
            order_max_retries: parse_or("ORDER_MAX_RETRIES", 3),
        })
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            operation_timeout: self.operation_timeout,
            max_retries: self.order_max_retries.max(1),
        }
    }
}

/// Time and retry budget applied to every unit of work the core opens.
#[derive(Debug, Clone, Copy)]
pub struct CoreSettings {
    pub operation_timeout: Duration,
    pub max_retries: u32,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
