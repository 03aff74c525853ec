//! src/main.rs

use anyhow::Result;
use clap::Parser;

mod clipboard;
mod commands;
mod config;
mod errors;
mod opener;
mod paths;
mod record;
mod state;
mod template;
mod workflow;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::handle_init().await?,
        Commands::Prefs {
            auto_advance,
            no_full_record,
            only_full_record,
            default_root,
            clipboard,
        } => {
            commands::prefs::handle_prefs(
                auto_advance,
                no_full_record,
                only_full_record,
                default_root,
                clipboard,
            )
            .await?
        }
        Commands::Discuss => commands::discuss::handle_discuss().await?,
        Commands::Topic(cmd) => commands::topic::handle_topic(cmd).await?,
        Commands::Member(cmd) => commands::topic::handle_member(cmd).await?,
        Commands::Round(cmd) => commands::round::handle_round(cmd).await?,
        Commands::Record(cmd) => commands::round::handle_record(cmd).await?,
        Commands::Template(cmd) => commands::template::handle_template(cmd).await?,
        Commands::Project(cmd) => commands::project::handle_project(cmd).await?,
        Commands::Opening { role } => commands::project::handle_opening(role).await?,
        Commands::Launch => commands::project::handle_launch().await?,
        Commands::Wizard => commands::wizard::handle_wizard().await?,
        Commands::Complete => commands::project::handle_complete().await?,
    }

    Ok(())
}
