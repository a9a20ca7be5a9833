use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::engine::models::ModInfo;
use crate::engine::state::{InstallProgress, InstallStage};
use crate::engine::{LaunchOutcome, LauncherEngine};
use crate::error::Result;
use crate::storage::ConfigStore;

mod archive;
mod cleanup;
mod config;
mod engine;
mod env;
mod error;
mod integrity;
mod logging;
mod networking;
mod process;
mod steam;
mod storage;
mod updater;
mod util;

#[derive(Parser, Debug)]
#[command(
    name = "Rebirth Launcher",
    author,
    version,
    about = "Keeps the Rebirth mod pack for 7 Days to Die up to date and starts the game"
)]
struct Cli {
    /// Use this config file instead of the one in the launcher directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror the log file to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check for a mod-pack update, then start the game (default).
    Launch {
        #[arg(long)]
        skip_update: bool,
        /// Game directory to use for this run.
        #[arg(long)]
        game_path: Option<PathBuf>,
    },
    /// Report whether a newer mod pack is published.
    Check,
    /// Install the latest mod pack without starting the game.
    Update {
        #[arg(long)]
        game_path: Option<PathBuf>,
    },
    /// Install or replace a single add-on mod.
    InstallMod {
        name: String,
        version: String,
        #[arg(long)]
        game_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = env::ensure_base_dirs() {
        eprintln!("warning: cannot create launcher directories: {err}");
    }
    logging::init(&env::log_path(), cli.verbose);
    info!("Rebirth Launcher {} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                "{}: {} ({})",
                err.kind(),
                err,
                err.detail().unwrap_or("no detail")
            );
            eprintln!("Error: {}", err.message());
            if let Some(detail) = err.detail() {
                eprintln!("Details: {detail}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = cli
        .config
        .map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::default_location);
    info!("using config file {}", store.path().display());
    let config = store.load().await?;
    let mut engine = LauncherEngine::from_config(config, store);

    match cli.command.unwrap_or(Command::Launch {
        skip_update: false,
        game_path: None,
    }) {
        Command::Launch {
            skip_update,
            game_path,
        } => {
            if let Some(path) = game_path {
                engine.override_game_path(path);
            }
            let bar = progress_bar();
            let mut on_progress = |update: InstallProgress| render(&bar, update);
            let outcome = engine.run(skip_update, Some(&mut on_progress)).await;
            bar.finish_and_clear();
            report_launch(outcome?);
        }
        Command::Check => match engine.check_for_update().await? {
            Some(release) => {
                println!(
                    "Update available: {} -> {}",
                    engine.config().version,
                    release.version
                );
                if let Some(changelog) = &release.changelog {
                    println!("\n{changelog}");
                }
            }
            None => println!("Rebirth {} is up to date", engine.config().version),
        },
        Command::Update { game_path } => {
            if let Some(path) = game_path {
                engine.override_game_path(path);
            }
            let bar = progress_bar();
            let mut on_progress = |update: InstallProgress| render(&bar, update);
            let installed = engine.update(Some(&mut on_progress)).await;
            bar.finish_and_clear();
            match installed? {
                Some(version) => println!("Rebirth {version} installed"),
                None => println!("Rebirth {} is up to date", engine.config().version),
            }
        }
        Command::InstallMod {
            name,
            version,
            game_path,
        } => {
            if let Some(path) = game_path {
                engine.override_game_path(path);
            }
            let bar = progress_bar();
            bar.set_message(format!("Downloading {name} {version}"));
            let mut on_progress =
                |fraction: f32| bar.set_position((fraction.clamp(0.0, 1.0) * 1000.0) as u64);
            let installed = engine
                .install_mod(&ModInfo { name, version }, &mut on_progress)
                .await;
            bar.finish_and_clear();
            println!("Mod installed into {}", installed?.display());
        }
    }
    Ok(())
}

fn report_launch(outcome: LaunchOutcome) {
    match outcome {
        LaunchOutcome::Installed(version) => println!("Rebirth {version} installed"),
        LaunchOutcome::UpdateAvailable(release) => println!(
            "Rebirth {} is available. Run `rebirth-launcher update` to install it.",
            release.version
        ),
        LaunchOutcome::CheckFailed(err) => println!("Could not check for updates: {err}"),
        LaunchOutcome::UpToDate | LaunchOutcome::Skipped => {}
    }
    println!("Game launched");
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(1000);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:40}] {percent:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn render(bar: &ProgressBar, update: InstallProgress) {
    bar.set_position((update.fraction.clamp(0.0, 1.0) * 1000.0) as u64);
    let message = match update.current_file {
        Some(file) if update.stage == InstallStage::Downloading => {
            format!("{} ({file})", update.message)
        }
        _ => update.message,
    };
    match update.stage {
        InstallStage::Failed(kind) => bar.abandon_with_message(format!("{kind}: {message}")),
        stage if stage.is_terminal() => bar.finish_with_message(message),
        _ => bar.set_message(message),
    }
}
