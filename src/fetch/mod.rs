mod ytdlp;

pub use ytdlp::YtDlp;

use library::{ConfigError, DownloadRecords, FetcherOptions};
use std::path::Path;
use sync_model::{EntryOutcome, EntryReport, FetchReport, RemoteEntry, RemotePlaylist};

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("failed to parse playlist info: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("link does not refer to a playlist (type {kind:?})")]
    NotAPlaylist { kind: Option<String> },
    #[error("download records: {0}")]
    Records(#[from] ConfigError),
}

/// Everything a fetcher needs to know about the folder being synced.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext<'a> {
    pub root: &'a Path,
    pub options: &'a FetcherOptions,
    pub quiet: bool,
}

/// The external collaborator that enumerates and downloads playlist entries.
pub trait Fetcher {
    /// Lists the remote playlist without downloading anything.
    fn resolve(&self, link: &str, ctx: &FetchContext<'_>) -> Result<RemotePlaylist, FetchError>;

    /// Downloads a single entry of `playlist` below `ctx.root`.
    fn download(
        &self,
        playlist: &RemotePlaylist,
        entry: &RemoteEntry,
        ctx: &FetchContext<'_>,
    ) -> Result<(), FetchError>;
}

/// Resolves `link` and downloads every entry missing from `records`.
///
/// Each successful download is appended to `records` right away, so an
/// interrupted run does not fetch the same entry twice.
pub fn fetch_playlist(
    fetcher: &dyn Fetcher,
    link: &str,
    ctx: &FetchContext<'_>,
    records: &mut DownloadRecords,
) -> Result<FetchReport, FetchError> {
    let playlist = fetcher.resolve(link, ctx)?;
    if !playlist.is_playlist() {
        return Err(FetchError::NotAPlaylist {
            kind: playlist.kind.clone(),
        });
    }
    tracing::info!(
        "playlist {:?} has {} entries",
        playlist.title,
        playlist.entries.len()
    );

    let mut report = FetchReport {
        collection_title: playlist.title.clone(),
        entries: Vec::with_capacity(playlist.entries.len()),
    };
    for entry in playlist.entries.iter() {
        let outcome = if records.contains(&entry.extractor, &entry.id) {
            tracing::debug!("{} has already been recorded in archive", entry.title);
            EntryOutcome::AlreadyPresent
        } else {
            tracing::info!("downloading {:?} ({})", entry.title, entry.id);
            match fetcher.download(&playlist, entry, ctx) {
                Ok(()) => {
                    records.append(&entry.extractor, &entry.id)?;
                    EntryOutcome::NewlyDownloaded
                }
                Err(err) if ctx.options.ignoreerrors => {
                    tracing::warn!("failed to download {:?}: {}", entry.title, err);
                    EntryOutcome::Failed(err.to_string())
                }
                Err(err) => return Err(err),
            }
        };
        report.entries.push(EntryReport {
            entry: entry.snapshot(),
            outcome,
        });
    }
    Ok(report)
}
