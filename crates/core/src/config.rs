use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Profiled key name as it appears in the environment.
fn profiled_key(profile: &str, key: &str) -> String {
    if profile.is_empty() {
        key.to_string()
    } else {
        format!("{}_{}", profile, key)
    }
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    profiled_env_lookup(profile, key).map(|(_, v)| v)
}

/// Like `profiled_env_opt`, also returning the variable name that was read.
fn profiled_env_lookup(profile: &str, key: &str) -> Option<(String, String)> {
    if !profile.is_empty() {
        let name = profiled_key(profile, key);
        if let Some(v) = env_opt(&name) {
            return Some((name, v));
        }
    }
    env_opt(key).map(|v| (key.to_string(), v))
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_required(profile: &str, key: &str) -> Result<String, ConfigError> {
    profiled_env_opt(profile, key).ok_or_else(|| ConfigError::Missing {
        key: profiled_key(profile, key),
    })
}

/// Parse a profiled env var, falling back to `default` when unset.
/// A value that is set but does not parse is an error, not a silent default.
fn profiled_env_parse<T>(profile: &str, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match profiled_env_lookup(profile, key) {
        Some((name, raw)) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Everything the pipeline needs, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub aws: AwsConfig,
    pub feed: FeedConfig,
    pub lake: LakeConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LAKE_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env_opt("LAKE_PROFILE").unwrap_or_default();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            aws: AwsConfig::from_env_profiled(p),
            feed: FeedConfig::from_env_profiled(p)?,
            lake: LakeConfig::from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  aws:      region={}, endpoint={}, static_credentials={}",
            self.aws.region,
            self.aws.endpoint_url.as_deref().unwrap_or("(default)"),
            self.aws.has_static_credentials()
        );
        tracing::info!("  feed:     endpoint={}", self.feed.endpoint);
        tracing::info!(
            "  lake:     storage={}, bucket={}, database={}, table={}",
            self.lake.storage,
            self.lake.bucket,
            self.lake.database,
            self.lake.table
        );
        tracing::info!(
            "  query:    output={}, workgroup={}, poll={}ms, timeout={}",
            self.lake.output_location,
            self.lake.workgroup,
            self.lake.poll_interval_ms,
            match self.lake.query_timeout() {
                Some(t) => format!("{}s", t.as_secs()),
                None => "none".to_string(),
            }
        );
    }
}

// ── AWS ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "us-west-2"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    /// True when explicit keys are configured; otherwise the SDK default
    /// credential chain is used.
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

// ── External feed ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

impl FeedConfig {
    fn from_env_profiled(p: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: profiled_env_required(p, "NBA_ENDPOINT")?,
            api_key: profiled_env_required(p, "SPORTSDATA_API_KEY")?,
            timeout_secs: profiled_env_parse(p, "FEED_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Data lake ─────────────────────────────────────────────────

/// Which object store backs the lake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage kind '{other}' (expected s3, local or memory)")),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::S3 => write!(f, "s3"),
            StorageKind::Local => write!(f, "local"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LakeConfig {
    pub storage: StorageKind,
    pub bucket: String,
    pub database: String,
    pub table: String,
    /// Key prefix of the raw ingested objects (the table location).
    pub raw_prefix: String,
    /// Object name of the uploaded batch under `raw_prefix`.
    pub raw_object: String,
    /// URI prefix where the query engine writes results.
    pub output_location: String,
    pub workgroup: String,
    pub poll_interval_ms: u64,
    /// 0 disables the timeout.
    pub query_timeout_secs: u64,
    /// Wait between upload and the first dependent query.
    pub settle_secs: u64,
}

impl LakeConfig {
    fn from_env_profiled(p: &str) -> Result<Self, ConfigError> {
        let bucket = profiled_env_required(p, "LAKE_BUCKET")?;
        let default_output = format!("s3://{}/athena-results/", bucket);
        Ok(Self {
            storage: profiled_env_parse(p, "LAKE_STORAGE", StorageKind::S3)?,
            database: profiled_env_or(p, "LAKE_DATABASE", "glue_nba_data_lake"),
            table: profiled_env_or(p, "LAKE_TABLE", "nba_players"),
            raw_prefix: profiled_env_or(p, "LAKE_RAW_PREFIX", "raw-data/"),
            raw_object: profiled_env_or(p, "LAKE_RAW_OBJECT", "nba_player_data.jsonl"),
            output_location: profiled_env_or(p, "LAKE_OUTPUT_LOCATION", &default_output),
            workgroup: profiled_env_or(p, "LAKE_WORKGROUP", "primary"),
            poll_interval_ms: profiled_env_parse(p, "LAKE_POLL_INTERVAL_MS", 2000)?,
            query_timeout_secs: profiled_env_parse(p, "LAKE_QUERY_TIMEOUT_SECS", 300)?,
            settle_secs: profiled_env_parse(p, "LAKE_SETTLE_SECS", 5)?,
            bucket,
        })
    }

    /// Object key of the uploaded batch.
    pub fn raw_key(&self) -> String {
        let prefix = self.raw_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            self.raw_object.clone()
        } else {
            format!("{}/{}", prefix, self.raw_object)
        }
    }

    /// `s3://bucket/prefix/`, the location the catalog table points at.
    pub fn table_location(&self) -> String {
        let prefix = self.raw_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("s3://{}/", self.bucket)
        } else {
            format!("s3://{}/{}/", self.bucket, prefix)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────
