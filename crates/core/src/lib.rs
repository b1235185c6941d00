pub mod config;
pub mod error;
pub mod record;

pub use config::{AwsConfig, Config, FeedConfig, LakeConfig, StorageKind};
pub use error::ConfigError;
pub use record::PlayerRecord;
