use clap::Parser;
use pocket_ledger::args::{Args, Command};
use pocket_ledger::error::PublicError;
use pocket_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PublicError>() {
                Some(public) => error!("Exiting with error: {public}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(config, add_args.clone()).await?.print()
        }

        Command::Edit(edit_args) => {
            let config = Config::load(home).await?;
            commands::edit(config, edit_args.clone()).await?.print()
        }

        Command::Delete(id_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, id_args.clone()).await?.print()
        }

        Command::List(period_args) => {
            let config = Config::load(home).await?;
            commands::list(config, period_args.clone())
                .await?
                .print_plain()
        }

        Command::Summary(period_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, period_args.clone())
                .await?
                .print_plain()
        }

        Command::Share(share_args) => {
            let config = Config::load(home).await?;
            commands::share(config, share_args.clone())
                .await?
                .print_plain()
        }

        Command::Import(import_args) => {
            let config = Config::load(home).await?;
            commands::import(config, import_args.clone())
                .await?
                .print()
        }

        Command::Backup(dir_args) => {
            let config = Config::load(home).await?;
            commands::backup(config, dir_args.dir()).await?.print()
        }

        Command::Restore(dir_args) => {
            let config = Config::load(home).await?;
            commands::restore(config, dir_args.dir()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            // The library and the binary share one crate name.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
