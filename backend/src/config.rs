use anyhow::{Context, Result};
use std::env;

use crate::auth::types::AuthConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub max_connections: usize,
    pub jwt_secret: String,
    pub token_duration_days: i64,
    pub cookie_name: String,
    /// `None` means permissive CORS
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "local.db".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            token_duration_days: env::var("TOKEN_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("TOKEN_DURATION_DAYS must be a valid number")?,
            cookie_name: env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| "__session".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|origins| parse_origins(&origins)),
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_duration_days: self.token_duration_days,
            cookie_name: self.cookie_name.clone(),
        }
    }
}

fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://localhost:3000 ,, https://planner.example.com"),
            vec![
                "http://localhost:3000".to_string(),
                "https://planner.example.com".to_string()
            ]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
