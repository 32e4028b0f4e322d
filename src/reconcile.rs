use crate::error::Error;
use crate::template::{self, OutputTemplate};
use library::{ArchiveLedger, DownloadRecords, SyncDir};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use sync_model::{EntryOutcome, FetchReport};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub downloaded: usize,
    pub present: usize,
    pub failed: usize,
    pub removed: Vec<String>,
}

/// Brings the archive ledger, the download records and the local files in line
/// with what the last fetch observed remotely.
#[derive(Debug)]
pub struct Reconciler<'a> {
    dir: &'a SyncDir,
    template: OutputTemplate,
}

impl<'a> Reconciler<'a> {
    pub fn new(dir: &'a SyncDir, template: OutputTemplate) -> Self {
        Self { dir, template }
    }

    /// `ledger` holds the snapshot loaded before the fetch and is updated and
    /// persisted in place.
    pub fn reconcile(
        &self,
        ledger: &mut ArchiveLedger,
        report: &FetchReport,
        records: &mut DownloadRecords,
    ) -> Result<SyncSummary, Error> {
        let mut candidates: BTreeMap<String, String> = ledger
            .iter()
            .map(|(title, id)| (title.to_string(), id.to_string()))
            .collect();

        let mut summary = SyncSummary::default();
        for entry_report in report.entries.iter() {
            let entry = &entry_report.entry;
            candidates.remove(&entry.title);
            match entry_report.outcome {
                EntryOutcome::NewlyDownloaded => {
                    summary.downloaded += 1;
                    ledger.insert(entry.title.as_str(), entry.id.as_str());
                }
                EntryOutcome::AlreadyPresent => {
                    summary.present += 1;
                    ledger.insert(entry.title.as_str(), entry.id.as_str());
                }
                EntryOutcome::Failed(_) => summary.failed += 1,
            }
        }

        // title of every vanished entry, looked up by id
        let mut vanished: BTreeMap<&str, &str> = BTreeMap::new();
        for (title, id) in candidates.iter() {
            vanished.entry(id.as_str()).or_insert(title.as_str());
        }
        let ids: HashSet<&str> = vanished.keys().copied().collect();
        let pruned = records.prune(&ids)?;

        let mut removed: Vec<String> = Vec::new();
        for id in pruned.iter() {
            if let Some(title) = vanished.get(id.as_str()) {
                if !removed.iter().any(|t| t == title) {
                    removed.push(title.to_string());
                }
            }
        }
        for (title, id) in candidates.iter() {
            if !removed.contains(title) {
                tracing::warn!(
                    "{:?} ({}) has no download record, dropping it from the archive",
                    title,
                    id
                );
                removed.push(title.to_string());
            }
        }

        for title in removed.iter() {
            tracing::info!("Removing song: {}", title);
            self.remove_media_file(&report.collection_title, title)?;
            ledger.remove(title);
        }

        ledger.persist(&self.dir.sync_file)?;
        summary.removed = removed;
        Ok(summary)
    }

    /// Glob matching the local file stored under `name` in `playlist_dir`,
    /// rooted at the synced folder.
    pub fn media_pattern(&self, playlist_dir: &str, name: &str) -> String {
        let rendered = self.template.glob(&[
            ("playlist_title", playlist_dir),
            ("title", name),
            ("ext", "*"),
        ]);
        if PathBuf::from(&rendered).is_absolute() {
            return rendered;
        }
        let mut relative = rendered.as_str();
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        let root = glob::Pattern::escape(&self.dir.root.to_string_lossy());
        format!("{}/{}", root.trim_end_matches('/'), relative)
    }

    /// Patterns tried in order: the name downloads are written under, then the
    /// name the downloader derives on its own from the raw title.
    fn media_patterns(&self, playlist_title: &str, title: &str) -> Vec<String> {
        let mut patterns = vec![self.media_pattern(
            &template::file_name(playlist_title),
            &template::file_name(title),
        )];
        let fallback = self.media_pattern(
            &template::downloader_file_name(playlist_title),
            &template::downloader_file_name(title),
        );
        if !patterns.contains(&fallback) {
            patterns.push(fallback);
        }
        patterns
    }

    fn remove_media_file(&self, playlist_title: &str, title: &str) -> Result<(), Error> {
        let patterns = self.media_patterns(playlist_title, title);
        for pattern in patterns.iter() {
            let matches: Vec<PathBuf> = glob::glob(pattern)?
                .filter_map(|path| match path {
                    Ok(path) => Some(path),
                    Err(err) => {
                        tracing::warn!("skipping unreadable path: {}", err);
                        None
                    }
                })
                .collect();
            match matches.len() {
                0 => continue,
                1 => {
                    tracing::debug!("deleting {}", matches[0].display());
                    std::fs::remove_file(&matches[0])?;
                    return Ok(());
                }
                _ => {
                    return Err(Error::AmbiguousMediaFile {
                        title: title.to_string(),
                        matches,
                    })
                }
            }
        }
        tracing::warn!("no local file matches {:?}", patterns);
        Ok(())
    }
}
