mod agent;
mod app;
mod board;
mod config;
mod dispatch;
mod input;
mod logging;
mod prompt;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tokio::sync::mpsc;
use tracing::info;

use agent::{AgentName, CommandInvoker};
use app::AppState;
use board::trello::{TrelloClient, TrelloConfig};
use dispatch::Dispatcher;

#[derive(Parser)]
#[command(name = "boardhand", about = "A keyboard-first Trello board TUI with a coding agent at hand")]
struct Cli {
    /// Load environment from this .env file instead of searching for one
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open this board id (overrides TRELLO_BOARD_ID)
    #[arg(short, long, value_name = "ID")]
    board: Option<String>,

    /// Agent to start with
    #[arg(short, long, value_enum, default_value_t = AgentName::Codex)]
    agent: AgentName,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = config::load(cli.config.as_deref()).wrap_err("could not load configuration")?;
    let log_path = logging::init(cfg.log_path.as_deref());
    info!(source = ?cfg.source, log = ?log_path, "boardhand starting");

    let board_id = cli
        .board
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .or_else(|| cfg.board_id.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("could not start async runtime")?;

    let trello = TrelloClient::new(TrelloConfig::new(&cfg.trello_key, &cfg.trello_token))
        .wrap_err("could not build HTTP client")?;
    let agent = CommandInvoker::new(cfg.codex_cmd.clone(), cfg.claude_cmd.clone());

    let (sender, receiver) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(
        Arc::new(trello),
        Arc::new(agent),
        sender,
        runtime.handle().clone(),
    );
    let state = AppState::new(cfg.auth_configured(), board_id, cli.agent);

    let mut terminal = ratatui::init();
    let result = app::run(&mut terminal, state, &dispatcher, receiver);
    ratatui::restore();

    // Abandon in-flight workers; agent children are killed on drop.
    runtime.shutdown_background();
    info!("boardhand exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["boardhand", "-b", "abc", "-a", "claude", "-c", "x.env"]).unwrap();
        assert_eq!(cli.board.as_deref(), Some("abc"));
        assert_eq!(cli.agent, AgentName::Claude);
        assert_eq!(cli.config, Some(PathBuf::from("x.env")));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["boardhand"]).unwrap();
        assert_eq!(cli.agent, AgentName::Codex);
        assert!(cli.board.is_none());
    }
}
