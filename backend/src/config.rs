use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ENDPOINT_NAME: &str = "brain-model-ep--2020-06-16-14-46-14";
const DEFAULT_CONTENT_TYPE: &str = "application/x-image";
const DEFAULT_ACCEPT: &str = "application/json";
const DEFAULT_DATABASE: &str = "postgres";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be provided")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Everything one invocation needs, read once at cold start.
#[derive(Debug, Clone)]
pub struct Config {
    pub inference: InferenceConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub persistence_policy: PersistencePolicy,
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub region: String,
    pub access_id: String,
    pub secret_key: String,
    pub endpoint_name: String,
    pub content_type: String,
    pub accept: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL the fetch URL is built from: `{endpoint}/{bucket}/{key}`.
    pub endpoint: String,
    pub image_source: ImageSourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSourceKind {
    /// Plain GET of the object URL.
    Http,
    /// Authenticated `GetObject` through the S3 SDK.
    S3,
}

/// What a failed insert means for the invocation as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// The invocation fails.
    Fail,
    /// The invocation still reports success with `persisted: false`.
    Tolerate,
}

impl FromStr for ImageSourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ImageSourceKind::Http),
            "s3" => Ok(ImageSourceKind::S3),
            _ => Err(()),
        }
    }
}

impl FromStr for PersistencePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(PersistencePolicy::Fail),
            "tolerate" => Ok(PersistencePolicy::Tolerate),
            _ => Err(()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let region = require("REGION")?;
        let inference = InferenceConfig {
            access_id: require("ACCESS_ID")?,
            secret_key: require("SECRET_KEY")?,
            endpoint_name: get("INFERENCE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT_NAME.to_string()),
            content_type: get("INFERENCE_CONTENT_TYPE")
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            accept: get("INFERENCE_ACCEPT").unwrap_or_else(|| DEFAULT_ACCEPT.to_string()),
            region: region.clone(),
        };

        let port_raw = require("DB_PORT")?;
        let port = port_raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
            key: "DB_PORT",
            value: port_raw.clone(),
        })?;
        let database = DatabaseConfig {
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            host: require("DB_HOST")?,
            port,
            database: get("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        };

        let image_source = match get("IMAGE_SOURCE") {
            Some(value) => value.parse::<ImageSourceKind>().map_err(|_| ConfigError::Invalid {
                key: "IMAGE_SOURCE",
                value,
            })?,
            None => ImageSourceKind::Http,
        };
        let storage = StorageConfig {
            endpoint: get("STORAGE_ENDPOINT")
                .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", region))
                .trim_end_matches('/')
                .to_string(),
            image_source,
        };

        let persistence_policy = match get("PERSISTENCE_FAILURE_POLICY") {
            Some(value) => value.parse::<PersistencePolicy>().map_err(|_| ConfigError::Invalid {
                key: "PERSISTENCE_FAILURE_POLICY",
                value,
            })?,
            None => PersistencePolicy::Fail,
        };

        Ok(Config {
            inference,
            database,
            storage,
            persistence_policy,
        })
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("region", &self.region)
            .field("access_id", &self.access_id)
            .field("secret_key", &"<redacted>")
            .field("endpoint_name", &self.endpoint_name)
            .field("content_type", &self.content_type)
            .field("accept", &self.accept)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("REGION", "us-east-1".to_string()),
            ("ACCESS_ID", "AKIDEXAMPLE".to_string()),
            ("SECRET_KEY", "super-secret".to_string()),
            ("DB_USER", "radiology".to_string()),
            ("DB_PASSWORD", "hunter2".to_string()),
            ("DB_HOST", "db.internal".to_string()),
            ("DB_PORT", "5432".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.inference.endpoint_name, DEFAULT_ENDPOINT_NAME);
        assert_eq!(config.inference.content_type, "application/x-image");
        assert_eq!(config.inference.accept, "application/json");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.database, "postgres");
        assert_eq!(config.storage.endpoint, "https://s3.us-east-1.amazonaws.com");
        assert_eq!(config.storage.image_source, ImageSourceKind::Http);
        assert_eq!(config.persistence_policy, PersistencePolicy::Fail);
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let mut env = base_env();
        env.remove("SECRET_KEY");

        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut env = base_env();
        env.insert("DB_HOST", "   ".to_string());

        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Missing("DB_HOST")
        ));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut env = base_env();
        env.insert("DB_PORT", "fifty".to_string());

        match load(&env).unwrap_err() {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "DB_PORT");
                assert_eq!(value, "fifty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reads_overrides() {
        let mut env = base_env();
        env.insert("STORAGE_ENDPOINT", "http://localhost:9000/".to_string());
        env.insert("IMAGE_SOURCE", "S3".to_string());
        env.insert("PERSISTENCE_FAILURE_POLICY", "tolerate".to_string());
        env.insert("INFERENCE_ENDPOINT", "brain-model-canary".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.storage.endpoint, "http://localhost:9000");
        assert_eq!(config.storage.image_source, ImageSourceKind::S3);
        assert_eq!(config.persistence_policy, PersistencePolicy::Tolerate);
        assert_eq!(config.inference.endpoint_name, "brain-model-canary");
    }

    #[test]
    fn rejects_unknown_policy() {
        let mut env = base_env();
        env.insert("PERSISTENCE_FAILURE_POLICY", "ignore".to_string());

        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                key: "PERSISTENCE_FAILURE_POLICY",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("AKIDEXAMPLE"));
    }
}
