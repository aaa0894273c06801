use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Postgres always listens on the default port; TLS is not negotiated.
pub const POSTGRES_PORT: u16 = 5432;

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
    pub host: String,
    pub db_name: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Postgres {
    /// Connection string with the password masked, safe to log.
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "user={} dbname={} password=*** host={} port={} sslmode=disable",
            self.user, self.db_name, self.host, POSTGRES_PORT
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("postgres.host", &self.host),
            ("postgres.db_name", &self.db_name),
            ("postgres.user", &self.user),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{key} must not be empty"));
            }
        }

        if self.max_connections == 0 {
            return Err("postgres.max_connections must be at least 1".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            address: default_address(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    #[serde(default)]
    pub server: Server,
}

impl Settings {
    /// Reads `path` and overlays `REFERRAL_<SECTION>__<KEY>` environment variables.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("REFERRAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_address() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use uuid::Uuid;

    fn postgres() -> Postgres {
        Postgres {
            host: "localhost".to_string(),
            db_name: "referrals".to_string(),
            user: "referral".to_string(),
            password: "hunter2".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }

    #[test]
    fn connection_string_masks_password() {
        let rendered = postgres().redacted_connection_string();

        assert!(!rendered.contains("hunter2"));
        assert_eq!(
            rendered,
            "user=referral dbname=referrals password=*** host=localhost port=5432 sslmode=disable"
        );
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut settings = postgres();
        settings.host = "  ".to_string();

        assert_eq!(
            settings.validate(),
            Err("postgres.host must not be empty".to_string())
        );
        assert!(postgres().validate().is_ok());
    }

    #[test]
    fn server_section_falls_back_to_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [postgres]
                host = "db"
                db_name = "referrals"
                user = "referral"
                password = "secret"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .and_then(|config| config.try_deserialize())
            .expect("settings should parse");

        assert_eq!(settings.server.address, "0.0.0.0:8090");
        assert_eq!(settings.server.request_timeout_secs, 30);
        assert_eq!(settings.postgres.max_connections, 5);
    }

    #[test]
    fn environment_overrides_file_values() {
        let path = std::env::temp_dir()
            .join(format!("referral-{}.toml", Uuid::new_v4().simple()));
        std::fs::write(
            &path,
            r#"
            [postgres]
            host = "db"
            db_name = "referrals"
            user = "referral"
            password = ""
            "#,
        )
        .expect("write config file");
        std::env::set_var("REFERRAL_POSTGRES__PASSWORD", "from-env");

        let settings = Settings::load(path.to_str().expect("utf-8 path"));

        std::env::remove_var("REFERRAL_POSTGRES__PASSWORD");
        let _ = std::fs::remove_file(&path);
        let settings = settings.expect("settings should load");
        assert_eq!(settings.postgres.password, "from-env");
        assert_eq!(settings.postgres.host, "db");
    }
}
