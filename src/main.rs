mod cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::Write;
use std::process::ExitCode;
use youtube_sync::{YoutubeSync, YtDlp};

fn main() -> Result<ExitCode> {
    // load environment variables
    dotenv::dotenv().ok();

    let opts = cli::Opts::parse();
    let code = run(opts, &mut std::io::stdout())?;
    Ok(ExitCode::from(code))
}

/// Runs the requested commands and returns the process exit status.
fn run<W: Write>(opts: cli::Opts, out: &mut W) -> Result<u8> {
    if opts.version {
        writeln!(out, "youtube-sync v{}", youtube_sync::VERSION)?;
        return Ok(0);
    }
    if opts.is_empty() {
        cli::Opts::command().write_help(out)?;
        writeln!(out)?;
        return Ok(0);
    }

    let root = match opts.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let mut ytsc = YoutubeSync::open(&root)?;
    youtube_sync::logging::init_tracing(ytsc.quiet());

    if let Some(playlist_link) = opts.playlist_link.as_deref() {
        let outcome = ytsc.init(playlist_link)?;
        if outcome.created_folder {
            writeln!(out, "Successfully initialized youtube-sync")?;
            writeln!(out, "Run 'youtube-sync --sync' to sync this folder")?;
        }
    }

    if opts.sync {
        match ytsc.sync(&YtDlp::new()) {
            Err(youtube_sync::Error::NotInitialized(path)) => {
                eprintln!("Cannot sync to an invalid dir: {}", path.display());
                eprintln!("Try running 'youtube-sync --init'");
                return Ok(1);
            }
            other => {
                other?;
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(args: &[&str]) -> Result<(u8, String)> {
        let opts = cli::Opts::try_parse_from(args)?;
        let mut out = Vec::new();
        let code = run(opts, &mut out)?;
        Ok((code, String::from_utf8(out)?))
    }

    #[test]
    fn no_arguments_prints_help() -> Result<()> {
        let (code, out) = run_with(&["youtube-sync"])?;
        assert_eq!(code, 0);
        assert!(out.contains("--init"));
        assert!(out.contains("--sync"));
        Ok(())
    }

    #[test]
    fn path_alone_prints_help() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().to_string_lossy().into_owned();
        let (code, out) = run_with(&["youtube-sync", "--path", &path])?;
        assert_eq!(code, 0);
        assert!(out.contains("--sync"));
        assert!(!tmp.path().join(".sync").exists());
        Ok(())
    }

    #[test]
    fn version_string() -> Result<()> {
        let (code, out) = run_with(&["youtube-sync", "-v"])?;
        assert_eq!(code, 0);
        assert_eq!(out, format!("youtube-sync v{}\n", youtube_sync::VERSION));
        Ok(())
    }

    #[test]
    fn init_reports_new_folder() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().to_string_lossy().into_owned();
        let args = ["youtube-sync", "-i", "https://x/list", "-p", &path];
        let (code, out) = run_with(&args)?;
        assert_eq!(code, 0);
        assert!(out.starts_with("Successfully initialized youtube-sync\n"));
        assert!(tmp.path().join(".sync").join("sync_config.conf").is_file());

        let (_, again) = run_with(&args)?;
        assert!(again.is_empty());
        Ok(())
    }

    #[test]
    fn sync_of_uninitialized_folder_fails() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().to_string_lossy().into_owned();
        let (code, out) = run_with(&["youtube-sync", "--sync", "--path", &path])?;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        Ok(())
    }
}
