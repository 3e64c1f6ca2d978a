use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use upkeep::{
    config::{Config, LogFormat},
    database::Database,
    job_scheduling::{CronTriggers, JobExecutor, JobKind, JobRunSummary, JobScheduler, RunContext},
    notifications::build_mailer,
};

#[derive(Parser)]
#[command(name = "upkeep")]
#[command(version)]
#[command(about = "Recurring maintenance scheduling and work-order generation")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler until interrupted
    Run {
        /// Run every job once before waiting for the first trigger
        #[arg(long)]
        run_on_start: bool,
    },
    /// Run one job (or all of them, in order) and exit
    RunOnce {
        job: JobArg,
        /// Process as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Apply registry and tenant migrations
    Migrate,
    /// Print upcoming trigger times
    NextTriggers {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
    /// Write a default configuration file
    InitConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum JobArg {
    WorkOrders,
    Overdue,
    Reminders,
    All,
}

impl JobArg {
    fn kind(self) -> Option<JobKind> {
        match self {
            JobArg::WorkOrders => Some(JobKind::WorkOrders),
            JobArg::Overdue => Some(JobKind::Overdue),
            JobArg::Reminders => Some(JobKind::Reminders),
            JobArg::All => None,
        }
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("upkeep={level},sea_orm=warn").into());
    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

fn report(summary: &JobRunSummary) {
    println!(
        "{:<12} tenants ok={} skipped={} failed={}  created={} updated={} sent={} errors={} skipped_rows={}  ({} ms)",
        summary.job.as_str(),
        summary.tenants_completed,
        summary.tenants_skipped,
        summary.tenants_failed,
        summary.created,
        summary.updated,
        summary.sent,
        summary.errors,
        summary.skipped,
        summary.duration.as_millis()
    );
}

async fn connect(config: &Config) -> Result<(Database, Arc<JobExecutor>)> {
    info!("Using database: {}", config.database.url);
    let database = Database::new(&config.database).await?;
    let mailer = build_mailer(&config.mail)?;
    let executor = Arc::new(JobExecutor::from_config(&database, config, mailer)?);
    database.migrate(executor.registry().as_ref()).await?;
    info!("Database connection established and migrations applied");
    Ok((database, executor))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig = cli.command {
        init_logging(cli.log_level.as_deref().unwrap_or("info"), LogFormat::Text);
        return Config::write_default(&cli.config);
    }

    let mut config = Config::load_from_file(&cli.config)?;
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging.level, config.logging.format);

    info!("Starting upkeep v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config);

    match cli.command {
        Command::Run { run_on_start } => {
            config.scheduler.run_on_start |= run_on_start;
            let (_database, executor) = connect(&config).await?;
            let scheduler = JobScheduler::from_config(&config.scheduler, executor)?;

            let cancellation_token = CancellationToken::new();
            let shutdown = cancellation_token.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => info!("Received interrupt, shutting down"),
                    Err(e) => error!("Failed to listen for shutdown signal: {}", e),
                }
                shutdown.cancel();
            });

            scheduler.run(cancellation_token).await?;
        }
        Command::RunOnce { job, date } => {
            let (_database, executor) = connect(&config).await?;
            let ctx = date.map_or_else(RunContext::now, RunContext::for_date);

            match job.kind() {
                Some(kind) => report(&executor.run(kind, &ctx).await?),
                None => {
                    let mut failed = false;
                    for result in executor.run_all(&ctx).await {
                        match result {
                            Ok(summary) => report(&summary),
                            Err(_) => failed = true,
                        }
                    }
                    if failed {
                        anyhow::bail!("one or more jobs failed");
                    }
                }
            }
        }
        Command::Migrate => {
            connect(&config).await?;
        }
        Command::NextTriggers { count } => {
            let triggers = CronTriggers::from_config(&config.scheduler)?;
            for (at, jobs) in triggers.upcoming(Utc::now(), count) {
                let names: Vec<_> = jobs.iter().map(JobKind::as_str).collect();
                println!("{}  {}", at.format("%Y-%m-%d %H:%M:%S UTC"), names.join(", "));
            }
        }
        Command::InitConfig => {}
    }

    Ok(())
}
