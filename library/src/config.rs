use super::Persist;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = ".sync";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading or writing config: {0}")]
    IO(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Locations of the state files of one synced folder.
#[derive(Clone, Debug)]
pub struct SyncDir {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub sync_file: PathBuf,
    pub archive_file: PathBuf,
    pub config_file: PathBuf,
    pub fetcher_opts_file: PathBuf,
}

impl SyncDir {
    pub fn new<T: AsRef<Path>>(root: T) -> Self {
        let root = root.as_ref().to_owned();
        let config_dir = root.join(CONFIG_DIR_NAME);
        Self {
            sync_file: config_dir.join("sync_archive.json"),
            archive_file: config_dir.join("archive.txt"),
            config_file: config_dir.join("sync_config.conf"),
            fetcher_opts_file: config_dir.join("ytdl_opts.conf"),
            config_dir,
            root,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_dir.is_dir()
    }
}

/// Contents of `sync_config.conf`. Keys other than the known ones are carried
/// in `extra` and written back unchanged.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SyncConfig {
    /// The configured link, treating an empty string as unset.
    pub fn playlist_link(&self) -> Option<&str> {
        self.playlist_link.as_deref().filter(|link| !link.is_empty())
    }
}

impl Persist for SyncConfig {}

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "./%(playlist_title)s/%(title)s.%(ext)s";

/// Options handed through to the downloader.
///
/// Keys follow the names used in `ytdl_opts.conf`. Keys this type does not know
/// about are kept in `extra` so that saving never drops user settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetcherOptions {
    #[serde(default)]
    pub extractaudio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audioformat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub nocheckcertificate: bool,
    #[serde(default)]
    pub ignoreerrors: bool,
    #[serde(default)]
    pub no_warnings: bool,
    #[serde(default)]
    pub noplaylist: bool,
    #[serde(default = "default_output_template")]
    pub outtmpl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,
    /// Downloader program, `yt-dlp` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_output_template() -> String {
    DEFAULT_OUTPUT_TEMPLATE.to_string()
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            extractaudio: true,
            audioformat: Some("m4a".to_string()),
            format: Some("m4a".to_string()),
            nocheckcertificate: true,
            ignoreerrors: true,
            no_warnings: true,
            noplaylist: true,
            outtmpl: default_output_template(),
            quiet: None,
            executable: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Persist for FetcherOptions {}

/// `sync_config.conf` wins over `ytdl_opts.conf`, silent output is opt-in.
pub fn effective_quiet(config: &SyncConfig, options: &FetcherOptions) -> bool {
    config.quiet.or(options.quiet).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn sync_dir_layout() {
        let dir = SyncDir::new("/music/mix");
        assert_eq!(dir.config_dir, PathBuf::from("/music/mix/.sync"));
        assert_eq!(dir.sync_file, PathBuf::from("/music/mix/.sync/sync_archive.json"));
        assert_eq!(dir.archive_file, PathBuf::from("/music/mix/.sync/archive.txt"));
        assert_eq!(dir.config_file, PathBuf::from("/music/mix/.sync/sync_config.conf"));
        assert_eq!(
            dir.fetcher_opts_file,
            PathBuf::from("/music/mix/.sync/ytdl_opts.conf")
        );
    }

    #[test]
    fn fetcher_options_keep_unknown_keys() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("ytdl_opts.conf");
        std::fs::write(
            &path,
            r#"{"format": "bestaudio", "outtmpl": "%(title)s.%(ext)s", "ratelimit": 50000}"#,
        )?;

        let options = FetcherOptions::load(&path)?;
        assert_eq!(options.format.as_deref(), Some("bestaudio"));
        assert_eq!(options.outtmpl, "%(title)s.%(ext)s");
        assert!(!options.extractaudio);
        assert_eq!(options.extra.get("ratelimit"), Some(&serde_json::json!(50000)));

        options.save_pretty(&path)?;
        let reloaded = FetcherOptions::load(&path)?;
        assert_eq!(reloaded, options);
        Ok(())
    }

    #[test]
    fn defaults_are_written_with_original_keys() -> Result<()> {
        let value = serde_json::to_value(FetcherOptions::default())?;
        assert_eq!(value["extractaudio"], true);
        assert_eq!(value["audioformat"], "m4a");
        assert_eq!(value["format"], "m4a");
        assert_eq!(value["outtmpl"], DEFAULT_OUTPUT_TEMPLATE);
        assert!(value.get("quiet").is_none());
        Ok(())
    }

    #[test]
    fn sync_config_keeps_unknown_keys() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("sync_config.conf");
        std::fs::write(&path, r#"{"playlist_link": "https://x/list", "note": "mine"}"#)?;

        let mut config = SyncConfig::load(&path)?;
        config.playlist_link = Some("https://y/list".into());
        config.save_pretty(&path)?;

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(value["playlist_link"], "https://y/list");
        assert_eq!(value["note"], "mine");
        Ok(())
    }

    #[test]
    fn quiet_resolution() {
        let mut config = SyncConfig::default();
        let mut options = FetcherOptions::default();
        assert!(!effective_quiet(&config, &options));

        options.quiet = Some(true);
        assert!(effective_quiet(&config, &options));

        config.quiet = Some(false);
        assert!(!effective_quiet(&config, &options));
    }

    #[test]
    fn empty_link_is_unset() {
        let config = SyncConfig {
            playlist_link: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.playlist_link(), None);
    }

    #[test]
    fn missing_config_falls_back_to_default() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let config = SyncConfig::load_or_default(tmp.path().join("missing.conf"))?;
        assert_eq!(config, SyncConfig::default());
        Ok(())
    }
}
