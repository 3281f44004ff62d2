//! Run settings resolved from the command line, the environment and an
//! optional JSON config file.
//!
//! Precedence per setting: command-line flag, then environment variable,
//! then config file, then the built-in default.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::debug;

use crate::IndexingError;
use umls_indexer_pipeline::loader::LoaderConfig;
use umls_indexer_repository::opensearch::DEFAULT_INDEX_NAME;
use umls_indexer_repository::ExistingIndexPolicy;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default progress interval, in documents.
const DEFAULT_NOTIFY_EVERY: u64 = 100_000;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "umls-indexer")]
#[command(about = "Index UMLS MRCONSO concepts into OpenSearch", long_about = None)]
pub struct Cli {
    /// JSON config file, or an inline JSON object
    #[arg(short, long, env = "UMLS_INDEXER_CONFIG")]
    pub config: Option<String>,

    /// Path of MRCONSO.RRF
    #[arg(long, env = "MRCONSO_PATH")]
    pub mrconso_path: Option<PathBuf>,

    /// JSON file with index settings and mappings (built-in mapping if omitted)
    #[arg(long, env = "MAPPING_PATH")]
    pub mapping_path: Option<PathBuf>,

    /// OpenSearch URL
    #[arg(long, env = "OPENSEARCH_URL")]
    pub opensearch_url: Option<String>,

    /// Basic auth user for the cluster
    #[arg(long, env = "OPENSEARCH_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password for the cluster
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Index name
    #[arg(long, env = "UMLS_INDEX")]
    pub index: Option<String>,

    /// Document type for legacy clusters
    #[arg(long, env = "UMLS_DOC_TYPE")]
    pub doc_type: Option<String>,

    /// Documents per bulk request
    #[arg(long, env = "UMLS_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Stop after this many documents
    #[arg(long, env = "UMLS_DEMO")]
    pub demo: Option<usize>,

    /// Log progress every N documents (0 disables)
    #[arg(long, env = "UMLS_NOTIFY_EVERY")]
    pub notify_every: Option<u64>,

    /// What to do if the index exists (keep|recreate|abort)
    #[arg(long, env = "UMLS_ON_EXISTING")]
    pub on_existing: Option<ExistingIndexPolicy>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Connection block of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusterSection {
    pub index: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ClusterSection {
    fn url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let url = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        Some(match self.port {
            Some(port) => format!("{}:{}", url, port),
            None => url,
        })
    }
}

/// Contents of the JSON config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mrconso_path: Option<PathBuf>,
    pub mapping_path: Option<PathBuf>,
    pub opensearch_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub index: Option<String>,
    pub doc_type: Option<String>,
    #[serde(alias = "chunk_size")]
    pub batch_size: Option<usize>,
    pub demo: Option<usize>,
    #[serde(alias = "notifiy_every")]
    pub notify_every: Option<u64>,
    pub on_existing: Option<ExistingIndexPolicy>,
    pub elasticsearch: ClusterSection,
}

impl FileConfig {
    /// Parse the `--config` argument: an inline JSON object, or else the path
    /// of a JSON file.
    pub fn from_arg(arg: &str) -> Result<Self, IndexingError> {
        match serde_json::from_str(arg) {
            Ok(config) => {
                debug!("Loaded inline config");
                Ok(config)
            }
            Err(_) if !arg.trim_start().starts_with('{') => Self::from_path(Path::new(arg)),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a config file.
    pub fn from_path(path: &Path) -> Result<Self, IndexingError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            IndexingError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Cluster login.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerSettings {
    pub mrconso_path: PathBuf,
    pub mapping_path: Option<PathBuf>,
    pub opensearch_url: String,
    pub credentials: Option<BasicAuth>,
    pub index: String,
    pub doc_type: Option<String>,
    pub batch_size: usize,
    pub demo: Option<usize>,
    pub notify_every: u64,
    pub on_existing: ExistingIndexPolicy,
    pub log_json: bool,
}

impl IndexerSettings {
    /// Resolve settings from `cli`, reading the config file it names, if any.
    pub fn load(cli: Cli) -> Result<Self, IndexingError> {
        let file = match &cli.config {
            Some(arg) => FileConfig::from_arg(arg)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge `cli` over `file` over the defaults.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, IndexingError> {
        let mrconso_path = cli
            .mrconso_path
            .or(file.mrconso_path)
            .ok_or_else(|| IndexingError::config("mrconso_path is required"))?;

        let index = cli
            .index
            .or(file.index)
            .or_else(|| file.elasticsearch.index.clone())
            .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        if index.trim().is_empty() {
            return Err(IndexingError::config("index name must not be empty"));
        }

        let batch_size = cli
            .batch_size
            .or(file.batch_size)
            .unwrap_or_else(|| LoaderConfig::default().batch_size);
        if batch_size == 0 {
            return Err(IndexingError::config("batch_size must be greater than zero"));
        }

        let opensearch_url = cli
            .opensearch_url
            .or(file.opensearch_url)
            .or_else(|| file.elasticsearch.url())
            .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

        let username = cli
            .username
            .or(file.username)
            .or_else(|| file.elasticsearch.username.clone());
        let password = cli
            .password
            .or(file.password)
            .or_else(|| file.elasticsearch.password.clone());
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(BasicAuth { username, password }),
            (None, None) => None,
            _ => {
                return Err(IndexingError::config(
                    "username and password must be given together",
                ))
            }
        };

        Ok(Self {
            mrconso_path,
            mapping_path: cli.mapping_path.or(file.mapping_path),
            opensearch_url,
            credentials,
            index,
            doc_type: cli.doc_type.or(file.doc_type),
            batch_size,
            demo: cli.demo.or(file.demo),
            notify_every: cli
                .notify_every
                .or(file.notify_every)
                .unwrap_or(DEFAULT_NOTIFY_EVERY),
            on_existing: cli.on_existing.or(file.on_existing).unwrap_or_default(),
            log_json: cli.log_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli_with_source() -> Cli {
        Cli {
            mrconso_path: Some(PathBuf::from("/data/MRCONSO.RRF")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = IndexerSettings::resolve(cli_with_source(), FileConfig::default()).unwrap();

        assert_eq!(settings.opensearch_url, DEFAULT_OPENSEARCH_URL);
        assert_eq!(settings.index, "umls");
        assert_eq!(settings.doc_type, None);
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.demo, None);
        assert_eq!(settings.notify_every, DEFAULT_NOTIFY_EVERY);
        assert_eq!(settings.on_existing, ExistingIndexPolicy::Abort);
        assert_eq!(settings.mapping_path, None);
        assert_eq!(settings.credentials, None);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli {
            index: Some("umls_cli".to_string()),
            batch_size: Some(50),
            ..cli_with_source()
        };
        let file = FileConfig {
            index: Some("umls_file".to_string()),
            batch_size: Some(1000),
            doc_type: Some("concept".to_string()),
            ..Default::default()
        };

        let settings = IndexerSettings::resolve(cli, file).unwrap();

        assert_eq!(settings.index, "umls_cli");
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.doc_type.as_deref(), Some("concept"));
    }

    #[test]
    fn test_missing_source_path_is_an_error() {
        let result = IndexerSettings::resolve(Cli::default(), FileConfig::default());

        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_zero_batch_size_is_an_error() {
        let cli = Cli {
            batch_size: Some(0),
            ..cli_with_source()
        };

        assert!(IndexerSettings::resolve(cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_file_config_accepts_importer_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "mrconso_path": "/umls/MRCONSO.RRF",
                "mapping_path": "/umls/mapping.json",
                "chunk_size": 2000,
                "notifiy_every": 5000,
                "on_existing": "recreate",
                "elasticsearch": {{
                    "index": "umls_2024", "host": "es.local", "port": 9201,
                    "username": "indexer", "password": "s3cret"
                }}
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let cli = Cli {
            config: Some(file.path().display().to_string()),
            ..Default::default()
        };
        let settings = IndexerSettings::load(cli).unwrap();

        assert_eq!(settings.mrconso_path, PathBuf::from("/umls/MRCONSO.RRF"));
        assert_eq!(settings.mapping_path, Some(PathBuf::from("/umls/mapping.json")));
        assert_eq!(settings.batch_size, 2000);
        assert_eq!(settings.notify_every, 5000);
        assert_eq!(settings.on_existing, ExistingIndexPolicy::Recreate);
        assert_eq!(settings.index, "umls_2024");
        assert_eq!(settings.opensearch_url, "http://es.local:9201");
        assert_eq!(
            settings.credentials,
            Some(BasicAuth {
                username: "indexer".to_string(),
                password: "s3cret".to_string(),
            })
        );
    }

    #[test]
    fn test_inline_json_config() {
        let cli = Cli {
            config: Some(r#"{"mrconso_path": "/umls/MRCONSO.RRF", "demo": 25}"#.to_string()),
            ..Default::default()
        };

        let settings = IndexerSettings::load(cli).unwrap();

        assert_eq!(settings.mrconso_path, PathBuf::from("/umls/MRCONSO.RRF"));
        assert_eq!(settings.demo, Some(25));
    }

    #[test]
    fn test_malformed_inline_json_is_a_json_error() {
        let result = FileConfig::from_arg("{ \"demo\": ");

        assert!(matches!(result, Err(IndexingError::JsonError(_))));
    }

    #[test]
    fn test_cli_credentials_override_file() {
        let cli = Cli {
            username: Some("admin".to_string()),
            password: Some("admin-pass".to_string()),
            ..cli_with_source()
        };
        let file = FileConfig {
            username: Some("indexer".to_string()),
            password: Some("s3cret".to_string()),
            ..Default::default()
        };

        let settings = IndexerSettings::resolve(cli, file).unwrap();

        let credentials = settings.credentials.unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "admin-pass");
        assert!(!format!("{:?}", credentials).contains("admin-pass"));
    }

    #[test]
    fn test_username_without_password_is_an_error() {
        let cli = Cli {
            username: Some("admin".to_string()),
            ..cli_with_source()
        };

        let result = IndexerSettings::resolve(cli, FileConfig::default());

        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();

        let result = FileConfig::from_path(file.path());

        assert!(matches!(result, Err(IndexingError::JsonError(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = FileConfig::from_path(Path::new("/nonexistent/indexer.json"));

        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_parse_command_line() {
        let cli = Cli::try_parse_from([
            "umls-indexer",
            "--mrconso-path",
            "MRCONSO.RRF",
            "--demo",
            "10",
            "--on-existing",
            "keep",
        ])
        .unwrap();

        assert_eq!(cli.mrconso_path, Some(PathBuf::from("MRCONSO.RRF")));
        assert_eq!(cli.demo, Some(10));
        assert_eq!(cli.on_existing, Some(ExistingIndexPolicy::Keep));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = Cli::try_parse_from(["umls-indexer", "--on-existing", "overwrite"]);

        assert!(result.is_err());
    }
}
