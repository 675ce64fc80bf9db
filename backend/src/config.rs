//! Process settings read from the environment.
//!
//! Repository selection lives in [`crate::db::repo_config`]; this module only
//! covers what the HTTP server and the services need at runtime.

use std::env;
use std::str::FromStr;

use crate::services::accounts::{DEFAULT_ACTIVATION_URL, DEFAULT_PASSWORD_RESET_URL};
use crate::services::pagination::DEFAULT_PAGE_SIZE;

pub const PAGE_SIZE_ENV: &str = "ELSYSER_PAGE_SIZE";
pub const ACTIVATION_URL_ENV: &str = "ELSYSER_ACTIVATION_URL";
pub const PASSWORD_RESET_URL_ENV: &str = "ELSYSER_PASSWORD_RESET_URL";
pub const SEED_FILE_ENV: &str = "ELSYSER_SEED_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Items per page of paginated lists.
    pub page_size: usize,
    /// Client URL with an `{activation_key}` placeholder.
    pub activation_url: String,
    /// Client URL with a `{reset_key}` placeholder.
    pub password_reset_url: String,
    /// Optional TOML file with subjects, teachers and admins to create at startup.
    pub seed_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            page_size: DEFAULT_PAGE_SIZE,
            activation_url: DEFAULT_ACTIVATION_URL.to_string(),
            password_reset_url: DEFAULT_PASSWORD_RESET_URL.to_string(),
            seed_file: None,
        }
    }
}

impl Settings {
    /// Read `HOST`, `PORT`, `ELSYSER_PAGE_SIZE`, the client URL templates and
    /// `ELSYSER_SEED_FILE`, keeping defaults for anything unset or invalid.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let page_size = parsed(PAGE_SIZE_ENV).filter(|size: &usize| *size > 0);
        if page_size.is_none() && env::var(PAGE_SIZE_ENV).is_ok() {
            log::warn!(
                "Ignoring invalid {}, using page size {}",
                PAGE_SIZE_ENV,
                defaults.page_size
            );
        }

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            page_size: page_size.unwrap_or(defaults.page_size),
            activation_url: env::var(ACTIVATION_URL_ENV)
                .ok()
                .filter(|url| url.contains("{activation_key}"))
                .unwrap_or(defaults.activation_url),
            password_reset_url: env::var(PASSWORD_RESET_URL_ENV)
                .ok()
                .filter(|url| url.contains("{reset_key}"))
                .unwrap_or(defaults.password_reset_url),
            seed_file: env::var(SEED_FILE_ENV).ok().filter(|p| !p.is_empty()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert!(settings.activation_url.contains("{activation_key}"));
        assert!(settings.password_reset_url.contains("{reset_key}"));
    }

    // All process-environment mutation stays in this one test.
    #[test]
    fn test_from_env_overrides_and_rejects_invalid_values() {
        env::set_var(PAGE_SIZE_ENV, "25");
        env::set_var(ACTIVATION_URL_ENV, "https://school.example/activate/{activation_key}");
        env::set_var(PASSWORD_RESET_URL_ENV, "https://school.example/reset");
        let settings = Settings::from_env();
        assert_eq!(settings.password_reset_url, DEFAULT_PASSWORD_RESET_URL);
        assert_eq!(settings.page_size, 25);
        assert_eq!(
            settings.activation_url,
            "https://school.example/activate/{activation_key}"
        );

        env::set_var(PAGE_SIZE_ENV, "0");
        env::set_var(ACTIVATION_URL_ENV, "https://school.example/no-placeholder");
        let settings = Settings::from_env();
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.activation_url, DEFAULT_ACTIVATION_URL);

        env::remove_var(PAGE_SIZE_ENV);
        env::remove_var(ACTIVATION_URL_ENV);
        env::remove_var(PASSWORD_RESET_URL_ENV);
    }
}
