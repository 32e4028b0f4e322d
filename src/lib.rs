pub mod error;
pub mod fetch;
pub mod logging;
pub mod reconcile;
pub mod template;

pub use error::Error;
pub use fetch::{FetchContext, FetchError, Fetcher, YtDlp};
pub use reconcile::{Reconciler, SyncSummary};

use library::{ArchiveLedger, DownloadRecords, FetcherOptions, Persist, SyncConfig, SyncDir};
use std::path::Path;
use template::OutputTemplate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOutcome {
    pub created_folder: bool,
    pub created_options: bool,
}

/// A folder kept in sync with a remote playlist.
///
/// All state is read when the folder is opened; `sync` compares the archive
/// loaded here against what the fetcher reports.
#[derive(Debug)]
pub struct YoutubeSync {
    dir: SyncDir,
    config: SyncConfig,
    options: FetcherOptions,
    archive: ArchiveLedger,
}

impl YoutubeSync {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let dir = SyncDir::new(root);
        let config = SyncConfig::load_or_default(&dir.config_file)?;
        let options = FetcherOptions::load_or_default(&dir.fetcher_opts_file)?;
        let archive = ArchiveLedger::open(&dir.sync_file)?;
        Ok(Self {
            dir,
            config,
            options,
            archive,
        })
    }

    pub fn dir(&self) -> &SyncDir {
        &self.dir
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn options(&self) -> &FetcherOptions {
        &self.options
    }

    pub fn archive(&self) -> &ArchiveLedger {
        &self.archive
    }

    pub fn quiet(&self) -> bool {
        library::effective_quiet(&self.config, &self.options)
    }

    /// Stores `playlist_link`, creating the `.sync` folder and the default
    /// downloader options on first use. Existing options are left alone.
    pub fn init(&mut self, playlist_link: &str) -> Result<InitOutcome, Error> {
        self.config.playlist_link = Some(playlist_link.to_string());

        let created_folder = !self.dir.is_initialized();
        if created_folder {
            tracing::info!("Creating youtube-sync folder...");
            std::fs::create_dir_all(&self.dir.config_dir)?;
        }

        if !self.dir.config_file.is_file() {
            tracing::info!("Creating youtube-sync config file");
        }
        self.config.save_pretty(&self.dir.config_file)?;

        let created_options = !self.dir.fetcher_opts_file.is_file();
        if created_options {
            tracing::info!("Creating youtube-dl config file");
            self.options.save_pretty(&self.dir.fetcher_opts_file)?;
        }

        Ok(InitOutcome {
            created_folder,
            created_options,
        })
    }

    /// Downloads new entries and removes the local files of vanished ones.
    pub fn sync(&mut self, fetcher: &dyn Fetcher) -> Result<SyncSummary, Error> {
        if !self.dir.is_initialized() {
            return Err(Error::NotInitialized(self.dir.root.clone()));
        }
        let link = self
            .config
            .playlist_link()
            .ok_or(Error::NoPlaylistLinkConfigured)?
            .to_string();

        let mut records = DownloadRecords::open(&self.dir.archive_file)?;
        let ctx = FetchContext {
            root: &self.dir.root,
            options: &self.options,
            quiet: self.quiet(),
        };
        let report = fetch::fetch_playlist(fetcher, &link, &ctx, &mut records)?;

        let template = OutputTemplate::new(self.options.outtmpl.as_str());
        let reconciler = Reconciler::new(&self.dir, template);
        let summary = reconciler.reconcile(&mut self.archive, &report, &mut records)?;
        tracing::info!(
            "synced {:?}: {} downloaded, {} present, {} failed, {} removed",
            report.collection_title,
            summary.downloaded,
            summary.present,
            summary.failed,
            summary.removed.len()
        );
        Ok(summary)
    }
}
