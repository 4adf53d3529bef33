use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotifuse::{cli, config, error, types::Session};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Search for albums
    Search(SearchOptions),

    #[clap(about = "Fuse the tracks of the given albums into one new playlist")]
    Fuse(FuseOptions),

    /// Clear the stored session
    Logout,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Free-text search term
    query: String,

    /// Maximum number of results (1-50)
    #[clap(long, default_value_t = 10)]
    limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct FuseOptions {
    /// Name of the playlist to create
    #[clap(long)]
    name: String,

    /// Playlist description
    #[clap(long, default_value = "")]
    description: String,

    /// Make the playlist public
    #[clap(long)]
    public: bool,

    /// Album id to include; repeat for each album (at least two)
    #[clap(long = "album", required = true, num_args = 1)]
    albums: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<Session>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Search(opt) => cli::search(opt.query, opt.limit).await,
        Command::Fuse(opt) => {
            cli::fuse(opt.name, opt.description, opt.public, opt.albums).await
        }
        Command::Logout => cli::logout().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
