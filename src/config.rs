use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ClientError;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    #[serde(default = "default_tags_path")]
    pub tags_path: String,

    #[serde(default = "default_list_path")]
    pub list_path: String,

    #[serde(default = "default_download_path")]
    pub download_path: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

const ENV_PREFIX: &str = "BARKSY_";

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialClientConfig {
    server_url: Option<String>,
    upload_path: Option<String>,
    tags_path: Option<String>,
    list_path: Option<String>,
    download_path: Option<String>,
    log_dir: Option<String>,
}

impl PartialClientConfig {
    fn from_env() -> Result<Self, ClientError> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<PartialClientConfig>()
            .map_err(|e| ClientError::Config(format!("Failed to load config from environment: {e}")))
    }

    fn from_file(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            debug!(path = ?path, "Config file not found, using defaults.");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read config file at {path:?}: {e}"))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ClientError::Config(format!("Failed to parse TOML from config file at {path:?}: {e}"))
        })
    }

    /// `self` wins over `lower`.
    fn over(self, lower: PartialClientConfig) -> ClientConfig {
        ClientConfig {
            server_url: self.server_url.or(lower.server_url)
                .unwrap_or_else(default_server_url),
            upload_path: self.upload_path.or(lower.upload_path)
                .unwrap_or_else(default_upload_path),
            tags_path: self.tags_path.or(lower.tags_path)
                .unwrap_or_else(default_tags_path),
            list_path: self.list_path.or(lower.list_path)
                .unwrap_or_else(default_list_path),
            download_path: self.download_path.or(lower.download_path)
                .unwrap_or_else(default_download_path),
            log_dir: self.log_dir.or(lower.log_dir)
                .unwrap_or_else(default_log_dir),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost/".to_string()
}

fn default_upload_path() -> String {
    "server/file_upload.php".to_string()
}

fn default_tags_path() -> String {
    "server/get_tags.php".to_string()
}

fn default_list_path() -> String {
    "server/list_files.php".to_string()
}

fn default_download_path() -> String {
    "uploads/".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        PartialClientConfig::default().over(PartialClientConfig::default())
    }
}

/// Fully resolved request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload: Url,
    pub tags: Url,
    pub list: Url,
    pub downloads: Url,
}

impl ClientConfig {
    /// File (optional) < `BARKSY_*` environment (after `.env`) < defaults fill the gaps.
    pub fn load(config_path: Option<&str>) -> Result<Self, ClientError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => PartialClientConfig::from_file(Path::new(path_str))?,
            None => PartialClientConfig::default(),
        };
        let config = PartialClientConfig::from_env()?.over(file_config);

        info!(server_url = %config.server_url, "Loaded client configuration.");
        Ok(config)
    }

    /// Loads only from a file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        Ok(PartialClientConfig::from_file(path)?.over(PartialClientConfig::default()))
    }

    pub fn endpoints(&self) -> Result<Endpoints, ClientError> {
        let mut base = Url::parse(&self.server_url).map_err(|e| {
            ClientError::Config(format!("Invalid server_url {:?}: {e}", self.server_url))
        })?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path.trim_start_matches('/')).map_err(|e| {
                ClientError::Config(format!("Invalid endpoint path {path:?}: {e}"))
            })
        };

        let mut download_path = self.download_path.clone();
        if !download_path.ends_with('/') {
            download_path.push('/');
        }

        Ok(Endpoints {
            upload: join(&self.upload_path)?,
            tags: join(&self.tags_path)?,
            list: join(&self.list_path)?,
            downloads: join(&download_path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://localhost/");
        assert_eq!(config.upload_path, "server/file_upload.php");
        assert_eq!(config.tags_path, "server/get_tags.php");
        assert_eq!(config.list_path, "server/list_files.php");
        assert_eq!(config.download_path, "uploads/");
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://files.example.com/barksy\"").unwrap();
        writeln!(file, "list_path = \"api/list\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server_url, "http://files.example.com/barksy");
        assert_eq!(config.list_path, "api/list");
        assert_eq!(config.tags_path, "server/get_tags.php");
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = ").unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_higher_layer_wins() {
        let upper = PartialClientConfig {
            server_url: Some("http://env/".into()),
            ..Default::default()
        };
        let lower = PartialClientConfig {
            server_url: Some("http://file/".into()),
            log_dir: Some("/var/log/barksy".into()),
            ..Default::default()
        };
        let config = upper.over(lower);
        assert_eq!(config.server_url, "http://env/");
        assert_eq!(config.log_dir, "/var/log/barksy");
    }

    #[test]
    fn test_env_layer_uses_prefix() {
        let vars = vec![
            ("BARKSY_SERVER_URL".to_string(), "http://env.example.com/".to_string()),
            ("BARKSY_LIST_PATH".to_string(), "api/list".to_string()),
            ("SERVER_URL".to_string(), "http://unprefixed/".to_string()),
        ];
        let partial = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, PartialClientConfig>(vars)
            .unwrap();
        assert_eq!(partial.server_url.as_deref(), Some("http://env.example.com/"));
        assert_eq!(partial.list_path.as_deref(), Some("api/list"));
        assert!(partial.tags_path.is_none());
    }

    #[test]
    fn test_load_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://file.example.com/\"").unwrap();
        writeln!(file, "tags_path = \"file/tags\"").unwrap();
        writeln!(file, "log_dir = \"file-logs\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        // Only this test touches BARKSY_* variables.
        unsafe {
            std::env::set_var("BARKSY_SERVER_URL", "http://env.example.com/");
            std::env::set_var("BARKSY_LOG_DIR", "env-logs");
        }
        let result = ClientConfig::load(Some(&path));
        unsafe {
            std::env::remove_var("BARKSY_SERVER_URL");
            std::env::remove_var("BARKSY_LOG_DIR");
        }

        let config = result.unwrap();
        assert_eq!(config.server_url, "http://env.example.com/");
        assert_eq!(config.log_dir, "env-logs");
        assert_eq!(config.tags_path, "file/tags");
        assert_eq!(config.list_path, "server/list_files.php");
    }

    #[test]
    fn test_endpoints_join_under_base_path() {
        let config = ClientConfig {
            server_url: "http://example.com/app".into(),
            download_path: "uploads".into(),
            ..Default::default()
        };
        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.upload.as_str(), "http://example.com/app/server/file_upload.php");
        assert_eq!(endpoints.tags.as_str(), "http://example.com/app/server/get_tags.php");
        assert_eq!(endpoints.list.as_str(), "http://example.com/app/server/list_files.php");
        assert_eq!(endpoints.downloads.as_str(), "http://example.com/app/uploads/");
    }

    #[test]
    fn test_invalid_server_url() {
        let config = ClientConfig {
            server_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(config.endpoints(), Err(ClientError::Config(_))));
    }
}
