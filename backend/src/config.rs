use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

use crate::utils::cookies::SameSite;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Signing key for short-lived access tokens.
    pub jwt_secret: String,
    /// Signing key for refresh tokens; independent from `jwt_secret` so the
    /// two token kinds verify only under their own key.
    pub jwt_refresh_secret: String,
    pub access_token_expiration_hours: u64,
    pub refresh_token_expiration_days: u64,
    pub time_zone: Tz,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/centinela".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "change-this-access-secret-in-production".to_string());

        let jwt_refresh_secret = env::var("JWT_REFRESH_SECRET")
            .unwrap_or_else(|_| "change-this-refresh-secret-in-production".to_string());

        let access_token_expiration_hours = env::var("ACCESS_TOKEN_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .unwrap_or(8);

        let refresh_token_expiration_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7);

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let cookie_same_site = match env::var("COOKIE_SAME_SITE").as_deref() {
            Ok("lax") => SameSite::Lax,
            Ok("none") => SameSite::None,
            _ => SameSite::Strict,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_refresh_secret,
            access_token_expiration_hours,
            refresh_token_expiration_days,
            time_zone,
            cookie_secure,
            cookie_same_site,
        })
    }
}
