use std::path::PathBuf;

use anyhow::{Context, Result};
use sharespace_api::crypto::DEFAULT_AUDIENCE;

/// Server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Shared secret of the identity provider. Empty disables authenticated routes.
    pub jwt_secret: String,
    pub jwt_audience: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("SHARESPACE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let jwt_secret = get("JWT_SECRET").unwrap_or_default();
        let jwt_audience = get("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.into());

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT: {raw}"))?,
            None => 8000,
        };

        Ok(Self {
            data_dir,
            jwt_secret,
            jwt_audience,
            cors_origins,
            port,
        })
    }

    pub fn auth_enabled(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}

/// Split a comma-separated origin list, dropping blanks and `*`.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.jwt_audience, "authenticated");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.port, 8000);
        assert!(!config.auth_enabled());
    }

    #[test]
    fn reads_all_values() {
        let config = config_from(&[
            ("SHARESPACE_DATA_DIR", "/var/lib/sharespace"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_AUDIENCE", "api"),
            ("CORS_ORIGINS", "http://localhost:5173/, https://app.example.com,,"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/sharespace"));
        assert!(config.auth_enabled());
        assert_eq!(config.jwt_audience, "api");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn wildcard_origin_means_any() {
        let config = config_from(&[("CORS_ORIGINS", "*")]).unwrap();
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }
}
