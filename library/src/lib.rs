mod archive;
mod config;
mod persist;
pub use archive::{ArchiveLedger, DownloadRecord, DownloadRecords};
pub use config::{
    effective_quiet, ConfigError, FetcherOptions, SyncConfig, SyncDir, CONFIG_DIR_NAME,
    DEFAULT_OUTPUT_TEMPLATE,
};
pub use persist::Persist;
