use std::sync::Arc;

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};

use trackgate::{
    config::{self, Credentials},
    downloader::Downloader,
    error,
    management::AuthStateStore,
    server::{self, AppState},
};

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
    /// Address to bind the server to (overrides SERVER_ADDRESS)
    #[clap(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let addr = cli.address.unwrap_or_else(config::server_addr);

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let downloader = Downloader::new(config::downloader_bin(), config::download_work_dir());

    let state = AppState {
        credentials: Arc::new(credentials),
        downloader: Arc::new(downloader),
        auth_states: Arc::new(AuthStateStore::default()),
    };

    server::start_api_server(&addr, state).await;
}
