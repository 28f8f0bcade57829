use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gw_predictor::api::state::AppState;
use gw_predictor::config::AppConfig;
use gw_predictor::models::{FixtureId, ResultEntry, Round, Scope};
use gw_predictor::source::build_source;
use gw_predictor::standings;
use gw_predictor::storage::StorageConfig;
use gw_predictor::submission::Submission;

#[derive(Parser)]
#[command(name = "gw-predictor")]
#[command(about = "Score football prediction leagues and serve their leaderboards")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a leaderboard
    Leaderboard {
        /// Gameweek to rank; omit for the overall table
        #[arg(long)]
        round: Option<Round>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the gameweek currently open for predictions
    CurrentRound,

    /// Submit predictions from a JSON file
    Submit {
        /// Submission file ({"name", "handle", "round", "picks"})
        #[arg(long)]
        file: PathBuf,
    },

    /// Record or update a fixture result
    RecordResult {
        #[arg(long)]
        round: Round,

        #[arg(long)]
        fixture: u32,

        #[arg(long)]
        home: Option<u32>,

        #[arg(long)]
        away: Option<u32>,

        /// Mark the fixture as finished
        #[arg(long)]
        finished: bool,

        /// Home team, required when the fixture is new
        #[arg(long)]
        home_team: Option<String>,

        /// Away team, required when the fixture is new
        #[arg(long)]
        away_team: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(std::path::Path::new(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting gw-predictor v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let source = build_source(&config.source, &storage)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let state = AppState::new(source, config.scoring);
            let app = gw_predictor::api::build_router(state, &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Leaderboard { round, json } => {
            let board = match round {
                Some(round) => {
                    standings::round_leaderboard(source.as_ref(), round, &config.scoring).await
                }
                None => standings::overall_leaderboard(source.as_ref(), &config.scoring).await,
            }
            .with_context(|| {
                let scope = round.map_or(Scope::Overall, |round| Scope::Round { round });
                format!("Could not load {}", scope.to_string().to_lowercase())
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print!("{}", board);
            }
        }
        Commands::CurrentRound => match source.current_round().await? {
            Some(round) => println!("{}", round),
            None => bail!("No fixtures scheduled"),
        },
        Commands::Submit { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let submission: Submission = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid submission in {}", file.display()))?;

            let fixtures = source.fetch_round(submission.round).await?;
            let record = submission.validate(&fixtures, chrono::Utc::now())?;
            source.submit(&record).await?;

            tracing::info!(
                "Stored GW {} predictions for {} ({} picks)",
                record.round,
                record.user_key(),
                record.picks.iter().filter(|p| p.is_complete()).count()
            );
        }
        Commands::RecordResult {
            round,
            fixture,
            home,
            away,
            finished,
            home_team,
            away_team,
        } => {
            if home.is_some() != away.is_some() {
                bail!("--home and --away must be given together");
            }
            let fixture_id = FixtureId(fixture);
            let matches = source.fetch_round(round).await?;
            let existing = matches.iter().find(|m| m.fixture_id == fixture_id);
            let entry = ResultEntry {
                fixture_id,
                home_team,
                away_team,
                kickoff: None,
                home_goals: home,
                away_goals: away,
                finished,
            };
            let Some(result) = entry.apply(round, existing) else {
                bail!(
                    "Fixture {} is new to GW {}; pass --home-team and --away-team",
                    fixture_id,
                    round
                );
            };
            source.record_result(&result).await?;

            tracing::info!(
                "GW {} {} v {}: {}",
                round,
                result.home_team,
                result.away_team,
                result.status_label().unwrap_or_else(|| "not started".to_string())
            );
        }
    }

    Ok(())
}
