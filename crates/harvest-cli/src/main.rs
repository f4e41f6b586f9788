use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use harvest_client::ReqwestFetcher;
use harvest_core::models::{NewSource, Source, SourceKind};
use harvest_core::scheduler::{Scheduler, TracingSweepReporter};
use harvest_core::scrape::ScrapeService;
use harvest_core::seed::seed_default_sources;
use harvest_core::throttle::{HostRateLimiter, ThrottledFetcher};
use harvest_core::traits::{PostingStore, SourceStore};
use harvest_core::{HarvestConfig, MemoryPostings};
use harvest_db::{Database, DatabaseConfig};

type SharedFetcher = ThrottledFetcher<ReqwestFetcher>;

#[derive(Parser)]
#[command(name = "harvest", version, about = "Multi-source job-posting harvester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a single URL once and print the outcome as JSON
    Scrape {
        /// Target URL
        #[arg(short, long)]
        url: String,

        /// Source type: rss, jsonld, links (anything else: selector, then JSON-LD)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// CSS selector for the selector strategy
        #[arg(short, long)]
        selector: Option<String>,

        /// Name recorded on saved postings (defaults to the URL)
        #[arg(short, long, default_value = "")]
        name: String,

        /// Save new postings to the database (requires DATABASE_URL)
        #[arg(long, default_value_t = false)]
        save: bool,
    },

    /// Run one sweep over every stored source, honouring robots.txt
    Sweep,

    /// Sweep on a fixed delay until interrupted
    Run,

    /// Insert the default sources if none exist
    Seed,

    /// Manage stored sources
    Sources {
        #[command(subcommand)]
        command: SourceCommands,
    },

    /// List stored postings, newest first
    Postings {
        /// Number of postings to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List stored sources
    List,

    /// Add a source
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        url: String,

        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        #[arg(short, long)]
        selector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("harvest=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = HarvestConfig::from_env().context("Invalid harvest configuration")?;

    match cli.command {
        Commands::Scrape {
            url,
            kind,
            selector,
            name,
            save,
        } => {
            let source = Source {
                id: Uuid::new_v4(),
                name,
                url,
                selector,
                kind: SourceKind::from_declared(kind.as_deref()),
            };
            let fetcher = build_fetcher(&config)?;
            if save {
                let db = connect_db().await?;
                cmd_scrape(fetcher, db.posting_repo(), &source).await?;
            } else {
                cmd_scrape(fetcher, MemoryPostings::new(), &source).await?;
            }
        }
        Commands::Sweep => {
            let db = connect_db().await?;
            let scheduler = Scheduler::new(
                build_fetcher(&config)?,
                db.source_repo(),
                db.posting_repo(),
                config.sweep_interval,
            );
            let summary = scheduler.run_sweep(&TracingSweepReporter).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Run => {
            let db = connect_db().await?;
            let scheduler = Scheduler::new(
                build_fetcher(&config)?,
                db.source_repo(),
                db.posting_repo(),
                config.sweep_interval,
            );

            let cancel = CancellationToken::new();
            tokio::spawn({
                let cancel = cancel.clone();
                async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("Interrupt received, stopping after the current sweep");
                        cancel.cancel();
                    }
                }
            });

            scheduler.run(cancel, &TracingSweepReporter).await;
        }
        Commands::Seed => {
            let db = connect_db().await?;
            let created = seed_default_sources(&db.source_repo())
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            if created == 0 {
                println!("Sources already present, nothing seeded");
            } else {
                println!("Seeded {created} default sources");
            }
        }
        Commands::Sources { command } => {
            let db = connect_db().await?;
            cmd_sources(command, &db).await?;
        }
        Commands::Postings { limit } => {
            let db = connect_db().await?;
            cmd_postings(limit, &db).await?;
        }
    }

    Ok(())
}

/// Reqwest behind the shared per-host limiter.
fn build_fetcher(config: &HarvestConfig) -> Result<SharedFetcher> {
    let inner = ReqwestFetcher::from_config(config).context("Failed to create HTTP client")?;
    let limiter = Arc::new(HostRateLimiter::new(config.min_delay));
    Ok(ThrottledFetcher::new(inner, limiter))
}

/// Connect using `DATABASE_URL` and apply pending migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(db)
}

async fn cmd_scrape<S: PostingStore>(
    fetcher: SharedFetcher,
    store: S,
    source: &Source,
) -> Result<()> {
    let service = ScrapeService::new(fetcher, store);
    let outcome = service
        .scrape_one(source)
        .await
        .with_context(|| format!("Scrape of {} failed", source.url))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_sources(command: SourceCommands, db: &Database) -> Result<()> {
    let repo = db.source_repo();
    match command {
        SourceCommands::List => {
            let sources = repo.list_all().await.map_err(|e| anyhow::anyhow!(e))?;
            if sources.is_empty() {
                println!("No sources configured. Run `harvest seed` or `harvest sources add`.");
                return Ok(());
            }
            for source in &sources {
                println!(
                    "  {}  [{}] {} ({})",
                    source.id, source.kind, source.name, source.url
                );
            }
            println!("\nTotal: {} sources", sources.len());
        }
        SourceCommands::Add {
            name,
            url,
            kind,
            selector,
        } => {
            let new_source = NewSource {
                name,
                url,
                selector,
                kind: SourceKind::from_declared(kind.as_deref()),
            };
            let created = repo
                .create(&new_source)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
    }
    Ok(())
}

async fn cmd_postings(limit: usize, db: &Database) -> Result<()> {
    let postings = db
        .posting_repo()
        .list_recent(limit)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    if postings.is_empty() {
        println!("No postings stored yet");
        return Ok(());
    }

    for posting in &postings {
        let company = if posting.company.is_empty() {
            String::new()
        } else {
            format!(" @ {}", posting.company)
        };
        println!(
            "  {}  {}{} ({})\n      {}",
            posting.fetched_at.format("%Y-%m-%d %H:%M"),
            posting.title,
            company,
            posting.source,
            posting.url,
        );
    }

    println!("\nShowing {} postings", postings.len());
    Ok(())
}
