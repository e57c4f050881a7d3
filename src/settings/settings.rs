use crate::application_port::{DEFAULT_REFRESH_GRACE_SECS, DEFAULT_TOKEN_HEAD, SessionConfig};
use crate::domain_model::SessionKeyspace;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub session: Session,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    /// Mounts `POST /api/v1/session`, which issues tokens without checking credentials.
    #[serde(default)]
    pub issue_endpoint: bool,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub database: String,
    pub key_class: String,
    pub expire_secs: u64,
    #[serde(default = "default_refresh_grace_secs")]
    pub refresh_grace_secs: u64,
    #[serde(default = "default_token_head")]
    pub token_head: String,
    #[serde(default)]
    pub refresh_lock_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "redis" or "memory"
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_refresh_grace_secs() -> u64 {
    DEFAULT_REFRESH_GRACE_SECS
}

fn default_token_head() -> String {
    DEFAULT_TOKEN_HEAD.to_string()
}

impl Session {
    pub fn to_config(&self) -> Result<SessionConfig> {
        if self.database.is_empty() || self.key_class.is_empty() {
            return Err(anyhow!("session.database and session.key_class must be set"));
        }
        let mut config = SessionConfig::new(
            SessionKeyspace::new(&self.database, &self.key_class),
            self.expire_secs,
        )
        .with_refresh_grace(self.refresh_grace_secs)
        .with_token_head(&self.token_head);
        if let Some(secs) = self.refresh_lock_secs {
            config = config.with_refresh_lock(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "CADENCE";

/// Loads the settings file, then applies `CADENCE_<SECTION>__<KEY>` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

pub fn parse_settings_toml(contents: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(contents, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [http]
        address = "127.0.0.1:8080"

        [log]
        filter = "info"

        [session]
        database = "mall"
        key_class = "ums:admin"
        expire_secs = 86400

        [store]
        backend = "memory"
    "#;

    #[test]
    fn fills_session_defaults() {
        let settings = parse_settings_toml(MINIMAL).unwrap();
        assert!(!settings.http.issue_endpoint);
        assert_eq!(settings.session.refresh_grace_secs, 1800);
        assert_eq!(settings.session.token_head, "Bearer ");
        assert_eq!(settings.session.refresh_lock_secs, None);
        assert_eq!(settings.store.redis_url, None);

        let config = settings.session.to_config().unwrap();
        assert_eq!(config.keyspace.token_key("t"), "mall:ums:admin:t");
        assert_eq!(config.expire_secs, 86400);
    }

    #[test]
    fn reads_optional_refresh_lock() {
        let toml = MINIMAL.replace(
            "expire_secs = 86400",
            "expire_secs = 600\nrefresh_grace_secs = 60\nrefresh_lock_secs = 5",
        );
        let config = parse_settings_toml(&toml)
            .unwrap()
            .session
            .to_config()
            .unwrap();
        assert_eq!(config.refresh_grace_secs, 60);
        assert_eq!(config.refresh_lock_secs, Some(5));
    }

    #[test]
    fn rejects_grace_longer_than_ttl() {
        let toml = MINIMAL.replace("expire_secs = 86400", "expire_secs = 100");
        let settings = parse_settings_toml(&toml).unwrap();
        assert!(settings.session.to_config().is_err());
    }

    #[test]
    fn missing_section_is_an_error() {
        assert!(parse_settings_toml("[http]\naddress = \"x\"").is_err());
        assert!(parse_settings(Some("does/not/exist.toml")).is_err());
    }

    #[test]
    fn rejects_empty_namespace_parts() {
        for (from, to) in [
            ("database = \"mall\"", "database = \"\""),
            ("key_class = \"ums:admin\"", "key_class = \"\""),
        ] {
            let settings = parse_settings_toml(&MINIMAL.replace(from, to)).unwrap();
            let err = settings.session.to_config().unwrap_err();
            assert!(err.to_string().contains("must be set"));
        }
    }
}
