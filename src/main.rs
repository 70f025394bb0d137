//! deskgrid - terminal data tables for REST listings.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use deskgrid::api::HttpClient;
use deskgrid::app::App;
use deskgrid::config::Config;
use deskgrid::events::EventHandler;
use deskgrid::listing::Listing;
use deskgrid::terminal::TerminalGuard;
use deskgrid::ui::TableTheme;
use deskgrid::{logging, AppError};

#[derive(Debug, Parser)]
#[command(name = "deskgrid", version, about = "Browse and act on REST listings in the terminal")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Table to open
    #[arg(short, long)]
    table: Option<String>,

    /// Color theme: dark or light
    #[arg(long)]
    theme: Option<String>,

    /// Rows per page, overriding the configuration
    #[arg(long, value_name = "N")]
    page_size: Option<u32>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the configured tables
    Tables,
    /// Write a sample configuration file
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Init) => return init(cli.config.clone()),
        Some(Command::Tables) => return list_tables(cli.config.clone()),
        None => {}
    }

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = run(cli);
    if let Err(e) = &result {
        error!(
            error = %e,
            critical = e.is_critical(),
            recoverable = e.is_recoverable(),
            "deskgrid exited with an error"
        );
    }
    logging::shutdown();

    result.map_err(|e| {
        let hint = e.suggested_action().map(|a| format!("\n{}", a)).unwrap_or_default();
        anyhow::anyhow!("{}{}", e.user_message(), hint)
    })
}

fn config_path(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Config::default_path().context("no configuration directory"),
    }
}

fn init(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path(path)?;
    Config::init(&path).with_context(|| format!("could not write {}", path.display()))?;
    println!("Wrote sample configuration to {}", path.display());
    Ok(())
}

fn list_tables(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(path.as_deref())?;
    let default = config.settings.default_table.as_deref();
    for table in &config.tables {
        let marker = if Some(table.name.as_str()) == default { "*" } else { " " };
        println!("{} {:<16} {:<28} {}", marker, table.name, table.display_title(), table.endpoint);
    }
    Ok(())
}

fn run(cli: Cli) -> deskgrid::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(theme) = cli.theme {
        config.settings.theme = theme;
    }
    config.validate()?;

    let mut table = config.select_table(cli.table.as_deref())?.clone();
    if let Some(page_size) = cli.page_size {
        table.items_per_page = Some(page_size);
    }
    let theme = TableTheme::by_name(&config.settings.theme).unwrap_or_default();
    let client = HttpClient::new(&config.server.base_url, config.server.token())?;
    let listing = Listing::build(&table, &config.settings, client, &theme)?;
    info!(table = %table.name, "Opening table");

    let mut app = App::new(listing, theme);
    let mut guard = TerminalGuard::new()?;
    let events = EventHandler::new();

    app.start();
    while !app.should_quit() {
        guard
            .terminal()
            .draw(|frame| app.view(frame))
            .map_err(|e| AppError::terminal(e.to_string()))?;
        app.update(events.next()?);
    }

    Ok(())
}
