// Gridiron entry point.
//
// Subcommands:
// - build-dataset: fetch athletes and player stats, write the csv snapshots
// - train: fit the points regressor on player_stats.csv
// - analyze: fetch the league and open the analysis session
//
// Batch commands log to stderr; the interactive session owns the terminal
// and logs to logs/gridiron.log instead.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use gridiron_core::config::{self, Config};
use gridiron_core::logging::{init_tracing, LogTarget};
use gridiron_football::{build_dataset, load_league, FantasySession};
use gridiron_model::run_training;
use gridiron_tui::figure::Figure;

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Fantasy football dataset builder, points regressor and league analyzer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every active athlete's league stats and write the csv snapshots
    BuildDataset,

    /// Train the points regressor on the built dataset
    Train {
        /// Show the loss curve in the terminal when training finishes
        #[arg(long)]
        plot: bool,
    },

    /// Fetch the league and open the interactive analysis session
    Analyze {
        /// Print the text dump of every aggregate and exit
        #[arg(long)]
        dump: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_target = match cli.command {
        Commands::Analyze { dump: false } => LogTarget::default_file()?,
        _ => LogTarget::Stderr,
    };
    init_tracing(log_target)?;

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        league_id = config.league.league_id,
        year = config.league.year,
        "configuration loaded"
    );

    match cli.command {
        Commands::BuildDataset => cmd_build_dataset(&config).await,
        Commands::Train { plot } => cmd_train(&config, plot).await,
        Commands::Analyze { dump } => cmd_analyze(&config, dump).await,
    }
}

fn session(config: &Config) -> FantasySession {
    FantasySession::new(&config.league, &config.provider, &config.credentials)
}

async fn cmd_build_dataset(config: &Config) -> anyhow::Result<()> {
    let session = session(config);
    let summary = build_dataset(&session, &config.dataset, config.provider.concurrency)
        .await
        .context("dataset build failed")?;
    println!("{summary}");
    Ok(())
}

async fn cmd_train(config: &Config, plot: bool) -> anyhow::Result<()> {
    let dataset = config.dataset.clone();
    let training = config.training.clone();
    let report = tokio::task::spawn_blocking(move || run_training(&dataset, &training))
        .await
        .context("training task panicked")?
        .context("training failed")?;
    println!("{report}");

    if plot {
        let figure = Figure::loss_curve(&report.history.train_losses, &report.history.val_losses);
        gridiron_tui::show_figure(figure).await?;
    }
    Ok(())
}

async fn cmd_analyze(config: &Config, dump: bool) -> anyhow::Result<()> {
    let session = session(config);
    let summary = load_league(&session)
        .await
        .context("failed to load league")?;

    if dump {
        println!("{}", summary.debug_dump());
        return Ok(());
    }
    gridiron_tui::run_analyzer(summary).await
}
