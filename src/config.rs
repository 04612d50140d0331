use clap::Parser;
use std::path::PathBuf;

use crate::session::SessionId;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_DIR: &str = "~/.roulette-client/logs";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "roulette-client",
    version,
    about = "Terminal control panel for a hosted shotgun roulette session"
)]
pub struct Args {
    /// Base URL of the game server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Session to attach to
    #[arg(long, required_unless_present = "list_games")]
    pub session: Option<String>,

    /// Directory for the rolling log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,

    /// Print the sessions hosted by the server and exit
    #[arg(long)]
    pub list_games: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Attach(SessionId),
    ListGames,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_url: String,
    pub log_dir: PathBuf,
    pub mode: Mode,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let mode = match (args.list_games, args.session) {
            (false, Some(session)) => Mode::Attach(SessionId::new(session)),
            _ => Mode::ListGames,
        };
        AppConfig {
            server_url: args.server_url,
            log_dir: resolve_log_dir(&args.log_dir),
            mode,
        }
    }
}

pub fn resolve_log_dir(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.into_owned())
}
