use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roaster_infrastructure::RoasterPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

use commands::Runtime;

#[derive(Parser)]
#[command(name = "roaster")]
#[command(about = "Profile Roaster - roast LinkedIn profiles from the terminal", long_about = None)]
struct Cli {
    /// Data directory (defaults to <config dir>/roaster)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user and today's usage
    Status,
    /// Check whether a URL is a LinkedIn profile page
    CheckUrl { url: String },
    /// Sign in with an OAuth access token
    SignIn {
        #[arg(long, env = "ROASTER_ACCESS_TOKEN")]
        token: Option<String>,
    },
    /// Roast a profile exported as JSON
    Roast {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Rewrite a profile exported as JSON (Pro only)
    Polish {
        #[arg(long)]
        profile: PathBuf,
        /// Roast first and use it as context
        #[arg(long)]
        with_roast: bool,
    },
    /// Re-check the Pro subscription
    SyncPro,
    /// Forget the session but keep today's usage
    SignOut,
}

/// Console output plus a daily rolling log file under the data directory.
fn init_tracing(paths: &RoasterPaths) -> Result<WorkerGuard> {
    let log_dir = paths.logs_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("roaster")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = RoasterPaths::new(cli.data_dir)?;
    let _guard = init_tracing(&paths)?;

    if let Commands::CheckUrl { url } = &cli.command {
        commands::page::check_url(url);
        return Ok(());
    }

    let runtime = Runtime::load(paths)?;

    match cli.command {
        Commands::Status => commands::session::status(&runtime).await?,
        Commands::CheckUrl { .. } => {}
        Commands::SignIn { token } => commands::session::sign_in(&runtime, token).await?,
        Commands::Roast { profile } => commands::generate::roast(&runtime, &profile).await?,
        Commands::Polish {
            profile,
            with_roast,
        } => commands::generate::polish(&runtime, &profile, with_roast).await?,
        Commands::SyncPro => commands::session::sync_pro(&runtime).await?,
        Commands::SignOut => commands::session::sign_out(&runtime).await?,
    }

    Ok(())
}
