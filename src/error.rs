use crate::fetch::FetchError;
use library::ConfigError;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} is not a youtube-sync folder")]
    NotInitialized(PathBuf),
    #[error("no playlist link configured")]
    NoPlaylistLinkConfigured,
    #[error("link does not refer to a playlist (type {kind:?})")]
    NotAPlaylist { kind: Option<String> },
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("fetch: {0}")]
    Fetch(FetchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad media file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("found {} files for {title:?}: {matches:?}", .matches.len())]
    AmbiguousMediaFile { title: String, matches: Vec<PathBuf> },
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotAPlaylist { kind } => Error::NotAPlaylist { kind },
            other => Error::Fetch(other),
        }
    }
}
