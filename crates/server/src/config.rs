use locstat::{ExtractConfig, PipelineConfig, MAX_ARCHIVE_BYTES};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
///
/// The archive size ceiling, sniff window, and top-files cap are fixed
/// pipeline policy and cannot be set here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    ///
    /// Kept above the archive ceiling so oversized uploads still reach the
    /// pipeline and get a typed `archive too large` answer.
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Cap on the total bytes an archive may unpack to, in MB (`None` lifts it)
    #[serde(default = "default_max_uncompressed_size_mb")]
    pub max_uncompressed_size_mb: Option<u64>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Parent directory for per-request workspaces (system temp dir when unset)
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,

    /// Classify and count files on the rayon pool
    #[serde(default = "default_true")]
    pub parallel_counting: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            max_uncompressed_size_mb: default_max_uncompressed_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            workspace_dir: None,
            parallel_counting: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server` config file and
    /// `LOCSTAT_SERVER__*` environment variables (highest precedence).
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("LOCSTAT_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.max_uncompressed_size_mb == Some(0) {
            anyhow::bail!("max_uncompressed_size_mb must be greater than zero when set");
        }
        if (self.max_body_size() as u64) <= MAX_ARCHIVE_BYTES {
            tracing::warn!(
                max_body_size_mb = self.max_body_size_mb,
                "body limit does not exceed the archive ceiling; oversized uploads will be cut off before size validation"
            );
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Pipeline configuration used for every request.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut extract = ExtractConfig::default();
        if let Some(dir) = &self.workspace_dir {
            extract = extract.with_workspace_parent(dir);
        }
        if let Some(mb) = self.max_uncompressed_size_mb {
            extract = extract.with_max_uncompressed_bytes(mb * 1024 * 1024);
        }

        let mut pipeline = PipelineConfig {
            extract,
            ..Default::default()
        };
        pipeline.count.parallel = self.parallel_counting;
        pipeline
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_body_size_mb() -> usize {
    201
}

fn default_max_uncompressed_size_mb() -> Option<u64> {
    Some(2048)
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
