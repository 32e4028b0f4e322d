use super::{FetchContext, FetchError, Fetcher};
use crate::template::{self, OutputTemplate};
use library::FetcherOptions;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use sync_model::{RemoteEntry, RemotePlaylist};

pub const DEFAULT_PROGRAM: &str = "yt-dlp";
const DEFAULT_EXTRACTOR: &str = "youtube";

/// Drives the `yt-dlp` executable, or the one named by `executable` in the
/// downloader options.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlp;

/// Subset of `yt-dlp --flat-playlist --dump-single-json` output.
#[derive(Deserialize, Debug)]
struct FlatPlaylist {
    #[serde(rename = "_type")]
    kind: Option<String>,
    id: Option<String>,
    title: Option<String>,
    extractor_key: Option<String>,
    #[serde(default)]
    entries: Vec<Option<FlatEntry>>,
}

#[derive(Deserialize, Debug)]
struct FlatEntry {
    id: String,
    title: Option<String>,
    ie_key: Option<String>,
    url: Option<String>,
}

impl From<FlatPlaylist> for RemotePlaylist {
    fn from(flat: FlatPlaylist) -> Self {
        let entries = flat
            .entries
            .into_iter()
            .flatten()
            .map(|entry| RemoteEntry {
                title: entry.title.unwrap_or_else(|| entry.id.clone()),
                extractor: entry
                    .ie_key
                    .map(|key| key.to_lowercase())
                    .unwrap_or_else(|| DEFAULT_EXTRACTOR.to_string()),
                url: entry.url,
                id: entry.id,
            })
            .collect();
        RemotePlaylist {
            title: flat
                .title
                .or_else(|| flat.id.clone())
                .unwrap_or_default(),
            id: flat.id,
            kind: flat.kind,
            extractor_key: flat.extractor_key,
            entries,
        }
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::default()
    }

    fn program(options: &FetcherOptions) -> PathBuf {
        options
            .executable
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }

    fn common_args(options: &FetcherOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if options.nocheckcertificate {
            args.push("--no-check-certificates".into());
        }
        if options.no_warnings {
            args.push("--no-warnings".into());
        }
        args
    }

    fn resolve_args(link: &str, options: &FetcherOptions) -> Vec<OsString> {
        let mut args = vec!["--flat-playlist".into(), "--dump-single-json".into()];
        args.extend(Self::common_args(options));
        args.push(link.into());
        args
    }

    fn download_args(
        playlist: &RemotePlaylist,
        entry: &RemoteEntry,
        ctx: &FetchContext<'_>,
    ) -> Vec<OsString> {
        let options = ctx.options;
        let mut args = Self::common_args(options);
        if options.noplaylist {
            args.push("--no-playlist".into());
        }
        if let Some(format) = &options.format {
            args.push("--format".into());
            args.push(format.into());
        }
        if options.extractaudio {
            args.push("--extract-audio".into());
            if let Some(audio_format) = &options.audioformat {
                args.push("--audio-format".into());
                args.push(audio_format.into());
            }
        }
        if ctx.quiet {
            args.push("--quiet".into());
            args.push("--no-progress".into());
        }

        // a single entry download knows nothing about the playlist it came from
        let playlist_title = template::file_name(&playlist.title);
        let title = template::file_name(&entry.title);
        let output = OutputTemplate::new(options.outtmpl.as_str()).substitute(&[
            ("playlist_title", playlist_title.as_str()),
            ("title", title.as_str()),
        ]);
        args.push("--output".into());
        args.push(output.into());

        let target = entry
            .url
            .clone()
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", entry.id));
        args.push("--".into());
        args.push(target.into());
        args
    }
}

impl Fetcher for YtDlp {
    fn resolve(&self, link: &str, ctx: &FetchContext<'_>) -> Result<RemotePlaylist, FetchError> {
        let program = Self::program(ctx.options);
        tracing::debug!("resolving {} with {}", link, program.display());
        let output = Command::new(&program)
            .args(Self::resolve_args(link, ctx.options))
            .current_dir(ctx.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(FetchError::Exit {
                program: program.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let flat: FlatPlaylist = serde_json::from_slice(&output.stdout)?;
        Ok(flat.into())
    }

    fn download(
        &self,
        playlist: &RemotePlaylist,
        entry: &RemoteEntry,
        ctx: &FetchContext<'_>,
    ) -> Result<(), FetchError> {
        let program = Self::program(ctx.options);
        let output = Command::new(&program)
            .args(Self::download_args(playlist, entry, ctx))
            .current_dir(ctx.root)
            .stdin(Stdio::null())
            .stdout(if ctx.quiet {
                Stdio::null()
            } else {
                Stdio::inherit()
            })
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(FetchError::Exit {
                program: program.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::path::Path;

    const FLAT_PLAYLIST: &str = r#"{
        "_type": "playlist",
        "id": "PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG",
        "title": "Road Trip",
        "extractor_key": "YoutubeTab",
        "entries": [
            {"_type": "url", "ie_key": "Youtube", "id": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"},
            {"_type": "url", "ie_key": "Youtube", "id": "9bZkp7q19f0", "title": null, "url": null},
            {"_type": "url", "ie_key": "Youtube", "id": "v8OO5-lZ8hY", "title": "AC/DC: Thunderstruck (100%)", "url": null},
            null
        ]
    }"#;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn parses_flat_playlist() -> Result<()> {
        let flat: FlatPlaylist = serde_json::from_str(FLAT_PLAYLIST)?;
        let playlist = RemotePlaylist::from(flat);
        assert!(playlist.is_playlist());
        assert_eq!(playlist.title, "Road Trip");
        assert_eq!(playlist.entries.len(), 3);
        assert_eq!(playlist.entries[0].extractor, "youtube");
        assert_eq!(playlist.entries[0].title, "Never Gonna Give You Up");
        assert_eq!(playlist.entries[1].title, "9bZkp7q19f0");
        assert_eq!(playlist.entries[1].url, None);
        Ok(())
    }

    #[test]
    fn single_video_is_not_a_playlist() -> Result<()> {
        let flat: FlatPlaylist = serde_json::from_str(
            r#"{"_type": "video", "id": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "extractor_key": "Youtube"}"#,
        )?;
        let playlist = RemotePlaylist::from(flat);
        assert!(!playlist.is_playlist());
        assert!(playlist.entries.is_empty());
        Ok(())
    }

    #[test]
    fn download_args_follow_options() -> Result<()> {
        let flat: FlatPlaylist = serde_json::from_str(FLAT_PLAYLIST)?;
        let playlist = RemotePlaylist::from(flat);
        let options = FetcherOptions::default();
        let ctx = FetchContext {
            root: Path::new("/music"),
            options: &options,
            quiet: true,
        };
        let args = strings(YtDlp::download_args(&playlist, &playlist.entries[1], &ctx));
        assert_eq!(
            args,
            vec![
                "--no-check-certificates",
                "--no-warnings",
                "--no-playlist",
                "--format",
                "m4a",
                "--extract-audio",
                "--audio-format",
                "m4a",
                "--quiet",
                "--no-progress",
                "--output",
                "./Road Trip/9bZkp7q19f0.%(ext)s",
                "--",
                "https://www.youtube.com/watch?v=9bZkp7q19f0",
            ]
        );
        Ok(())
    }

    #[test]
    fn download_output_uses_file_name() -> Result<()> {
        let flat: FlatPlaylist = serde_json::from_str(FLAT_PLAYLIST)?;
        let mut playlist = RemotePlaylist::from(flat);
        playlist.title = "Rock/Metal".into();
        let options = FetcherOptions::default();
        let ctx = FetchContext {
            root: Path::new("/music"),
            options: &options,
            quiet: false,
        };
        let args = strings(YtDlp::download_args(&playlist, &playlist.entries[2], &ctx));
        let output = args
            .iter()
            .position(|arg| arg == "--output")
            .map(|idx| args[idx + 1].as_str());
        assert_eq!(
            output,
            Some("./Rock_Metal/AC_DC_ Thunderstruck (100%%).%(ext)s")
        );
        Ok(())
    }

    #[test]
    fn resolve_args_end_with_link() {
        let options = FetcherOptions {
            nocheckcertificate: false,
            no_warnings: false,
            ..Default::default()
        };
        let args = strings(YtDlp::resolve_args("https://youtube.com/playlist?list=PL1", &options));
        assert_eq!(
            args,
            vec![
                "--flat-playlist",
                "--dump-single-json",
                "https://youtube.com/playlist?list=PL1",
            ]
        );
    }

    #[test]
    fn program_precedence() {
        let mut options = FetcherOptions::default();
        assert_eq!(YtDlp::program(&options), PathBuf::from("yt-dlp"));
        options.executable = Some(PathBuf::from("/opt/yt-dlp"));
        assert_eq!(YtDlp::program(&options), PathBuf::from("/opt/yt-dlp"));
    }

    #[test]
    fn missing_program_is_spawn_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let options = FetcherOptions {
            executable: Some(tmp.path().join("does-not-exist")),
            ..Default::default()
        };
        let ctx = FetchContext {
            root: tmp.path(),
            options: &options,
            quiet: true,
        };
        let err = YtDlp::new().resolve("link", &ctx).unwrap_err();
        assert!(matches!(err, FetchError::Spawn { .. }));
        Ok(())
    }
}
