use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "youtube-sync",
    about = "A small tool to sync a folder with a youtube playlist",
    disable_version_flag = true
)]
pub struct Opts {
    #[clap(
        short = 'i',
        long = "init",
        value_name = "PLAYLIST_LINK",
        help = "Initializes folder as a youtube-sync folder"
    )]
    pub playlist_link: Option<String>,
    #[clap(
        short = 'p',
        long = "path",
        env = "YOUTUBE_SYNC_PATH",
        help = "Specifies different youtube-sync directory"
    )]
    pub path: Option<PathBuf>,
    #[clap(
        short = 's',
        long = "sync",
        help = "Sync youtube-sync directory with the assigned youtube playlist"
    )]
    pub sync: bool,
    #[clap(short = 'v', long = "version", help = "Print version information")]
    pub version: bool,
}

impl Opts {
    /// Nothing to do, `--path` alone does not count.
    pub fn is_empty(&self) -> bool {
        self.playlist_link.is_none() && !self.sync && !self.version
    }
}
