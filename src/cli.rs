use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tubegrab")]
#[command(author, version, about = "Telegram bot for downloading YouTube, TikTok and Facebook videos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Print the installed yt-dlp version and exit
    CheckYtdlp,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
