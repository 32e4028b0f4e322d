use serde::{Deserialize, Serialize};
use std::fmt;

pub const PLAYLIST_TYPE: &str = "playlist";

/// A playlist as reported by the remote source, before anything is downloaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlaylist {
    pub id: Option<String>,
    pub title: String,
    /// Resource type as reported by the source, e.g. `playlist` or `video`.
    pub kind: Option<String>,
    pub extractor_key: Option<String>,
    pub entries: Vec<RemoteEntry>,
}

impl RemotePlaylist {
    pub fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some(PLAYLIST_TYPE)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub id: String,
    pub title: String,
    /// Lower case extractor name used in download records, e.g. `youtube`.
    pub extractor: String,
    pub url: Option<String>,
}

impl RemoteEntry {
    pub fn snapshot(&self) -> PlaylistEntry {
        PlaylistEntry {
            title: self.title.clone(),
            id: self.id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub title: String,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOutcome {
    NewlyDownloaded,
    AlreadyPresent,
    Failed(String),
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewlyDownloaded => write!(f, "downloaded"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub entry: PlaylistEntry,
    pub outcome: EntryOutcome,
}

/// Everything one fetch observed about the remote playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub collection_title: String,
    pub entries: Vec<EntryReport>,
}
