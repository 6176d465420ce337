use anyhow::Result;
use clap::Parser;
use ironlog::cli::{Cli, Commands};
use ironlog::commands;
use ironlog::db::open;
use ironlog::types::{Config, OutputFmt, config_path};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    let cfg = Config::load(&config_path()?)?;

    match cli.cmd {
        // Config runs without a database.
        Commands::Config(cmd) => commands::config::handle(cmd).await?,

        cmd => {
            let db_path = cfg.get("db-path").unwrap_or("./ironlog.db").to_string();
            let pool = open(&db_path).await?;

            match cmd {
                Commands::User(cmd) => commands::user::handle(cmd, &pool, fmt).await?,
                Commands::Exercise(cmd) => commands::exercise::handle(cmd, &pool, fmt).await?,
                Commands::Workout(cmd) => commands::workout::handle(cmd, &pool, &cfg, fmt).await?,
                Commands::Program(cmd) => commands::program::handle(cmd, &pool, &cfg, fmt).await?,
                Commands::Analytics { user, period, graph } => {
                    commands::analytics::handle(user, &period, graph, &pool, &cfg, fmt).await?
                }
                Commands::Report { user, period, out } => {
                    commands::report::handle(user, &period, out, &pool, &cfg).await?
                }
                Commands::Seed => commands::seed::handle(&pool).await?,
                Commands::Config(_) => unreachable!("handled above"),
            }
        }
    }

    Ok(())
}
