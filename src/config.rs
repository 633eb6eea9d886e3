use anyhow::{anyhow, Context};
use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::service::payment_calculator::PayoutModel;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    // Payment settings
    pub platform_fee_percentage: BigDecimal,
    pub payout_model: PayoutModel,
    // Email dispatch; without an API key the send-email endpoint only logs
    pub resend_api_key: Option<String>,
    pub from_email: String,
    // Background status reconciliation
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn init() -> anyhow::Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret =
            std::env::var("SUPABASE_JWT_SECRET").context("SUPABASE_JWT_SECRET must be set")?;

        let port = parse_or("PORT", 8000u16)?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10u32)?;
        let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", 15u64)?;
        let reconcile_interval_secs = parse_or("RECONCILE_INTERVAL_SECS", 3600u64)?;

        let platform_fee_percentage = std::env::var("PLATFORM_FEE_PERCENTAGE")
            .unwrap_or_else(|_| "0.10".to_string());
        let platform_fee_percentage = BigDecimal::from_str(&platform_fee_percentage)
            .map_err(|e| anyhow!("PLATFORM_FEE_PERCENTAGE is not a decimal: {}", e))?;

        let payout_model = std::env::var("PAYOUT_MODEL")
            .unwrap_or_else(|_| "gross".to_string())
            .parse::<PayoutModel>()
            .map_err(|e| anyhow!(e))?;

        let resend_api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "FlexiWork <noreply@flexiwork.app>".to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8081,http://localhost:19006".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            database_max_connections,
            jwt_secret,
            port,
            allowed_origins,
            request_timeout_secs,
            platform_fee_percentage,
            payout_model,
            resend_api_key,
            from_email,
            reconcile_interval_secs,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_when_unset() {
        let value: u64 = parse_or("FLEXIWORK_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        std::env::set_var("FLEXIWORK_TEST_BAD_PORT", "eighty");
        let result: anyhow::Result<u16> = parse_or("FLEXIWORK_TEST_BAD_PORT", 8000);
        assert!(result.is_err());
    }
}
