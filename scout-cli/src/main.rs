//! kaggle-scout CLI
//!
//! Incremental crawler for Kaggle competitions and their popular discussions.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use scout_browser::{
    ChromiumBrowser, ChromiumConfig, ExtractionScripts, SelectorConfig, DEFAULT_EXTRACT_SCRIPT,
};
use scout_core::{
    normalize_text, to_utc_iso, RecordKind, DEFAULT_BASE_URL, DEFAULT_MAX_DISCUSSION_PAGES,
    DEFAULT_MAX_PAGES, DEFAULT_MIN_UPVOTES,
};
use scout_crawl::{CrawlConfig, CrawlOrchestrator, Pacer};
use scout_store::{
    DocumentStore, EnvFileRunState, FirestoreConfig, FirestoreStore, IncrementalStateStore,
    JsonDirStore, PersistOutcome, RunStatePort,
};

#[derive(Parser)]
#[command(name = "kaggle-scout")]
#[command(author, version, about = "Incremental Kaggle competition and discussion crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// Key-value file holding configuration and the last-scrape watermark
    #[arg(long, default_value = ".env", global = true)]
    env_file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl competitions and discussions, then persist them
    Run(RunArgs),

    /// Show the watermark and stored record counts
    Status(StoreArgs),

    /// Normalize text from stdin
    Normalize {
        /// Enable link placeholders and duplicate removal
        #[arg(long)]
        long_form: bool,
    },

    /// Convert a date string to UTC ISO-8601
    ParseDate {
        /// Raw date, e.g. "Thu Jan 1 2024 12:00:00 GMT+0530 (India Standard Time)"
        raw: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Competition listing pages to crawl
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Discussion listing pages to crawl per competition
    #[arg(long, default_value_t = DEFAULT_MAX_DISCUSSION_PAGES)]
    max_discussion_pages: u32,

    /// Minimum upvotes for a discussion to be collected
    #[arg(long, default_value_t = DEFAULT_MIN_UPVOTES)]
    min_upvotes: u32,

    /// Lower bound of the pause between requests
    #[arg(long, default_value = "5")]
    min_delay_secs: u64,

    /// Upper bound of the pause between requests
    #[arg(long, default_value = "10")]
    max_delay_secs: u64,

    /// Site root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// JavaScript file defining the extraction functions
    #[arg(long, default_value = DEFAULT_EXTRACT_SCRIPT)]
    extract_script: PathBuf,

    /// Selector file replacing the built-in kaggle.com selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Directory for snapshot files when the store is unavailable
    #[arg(long, default_value = ".")]
    backup_dir: PathBuf,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreKind {
    Firestore,
    Json,
}

#[derive(Args)]
struct StoreArgs {
    /// Document store backend
    #[arg(long, value_enum, env = "SCOUT_STORE", default_value = "firestore")]
    store: StoreKind,

    /// Directory of the json store
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Google Cloud project (or set GOOGLE_CLOUD_PROJECT env var)
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    firestore_project: Option<String>,

    /// OAuth2 access token (or set FIRESTORE_ACCESS_TOKEN env var)
    #[arg(long, env = "FIRESTORE_ACCESS_TOKEN", hide_env_values = true)]
    firestore_token: Option<String>,

    /// Firestore emulator host:port (or set FIRESTORE_EMULATOR_HOST env var)
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST")]
    firestore_emulator: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Values from the env file feed the env-backed flags, so parse again once loaded
    let cli = match dotenvy::from_path(&cli.env_file) {
        Ok(()) => Cli::parse(),
        Err(_) => cli,
    };

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run(args) => run_crawl(args, &cli.env_file).await?,
        Commands::Status(args) => show_status(args, &cli.env_file).await?,
        Commands::Normalize { long_form } => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            println!("{}", normalize_text(&input, long_form));
        }
        Commands::ParseDate { raw } => {
            let iso = to_utc_iso(&raw)?;
            println!("{iso}");
        }
    }

    Ok(())
}

fn open_store(args: &StoreArgs) -> Result<Arc<dyn DocumentStore>> {
    match args.store {
        StoreKind::Json => Ok(Arc::new(JsonDirStore::new(&args.data_dir))),
        StoreKind::Firestore => {
            let project = args.firestore_project.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "Firestore project required. Set GOOGLE_CLOUD_PROJECT or use --firestore-project"
                )
            })?;
            let config = FirestoreConfig::new(project)
                .with_access_token(args.firestore_token.clone())
                .with_emulator(args.firestore_emulator.clone());
            Ok(Arc::new(FirestoreStore::new(config)?))
        }
    }
}

async fn run_crawl(args: RunArgs, env_file: &Path) -> Result<()> {
    let selectors = match &args.selectors {
        Some(path) => SelectorConfig::load(path)
            .with_context(|| format!("loading selectors from {}", path.display()))?,
        None => SelectorConfig::kaggle()?,
    };
    let scripts = ExtractionScripts::load(&args.extract_script).with_context(|| {
        format!("reading extraction script {}", args.extract_script.display())
    })?;

    let store = open_store(&args.store)?;
    let run_state: Arc<dyn RunStatePort> = Arc::new(EnvFileRunState::new(env_file));
    let state = IncrementalStateStore::open(store.clone(), run_state).await?;

    let config = CrawlConfig {
        base_url: args.base_url,
        max_pages: args.max_pages,
        max_discussion_pages: args.max_discussion_pages,
        min_upvotes: args.min_upvotes,
        pacer: Pacer::from_secs(args.min_delay_secs, args.max_delay_secs),
        backup_dir: args.backup_dir,
        ..CrawlConfig::default()
    };

    info!(store = store.name(), "Launching browser");
    let browser = Arc::new(
        ChromiumBrowser::launch(ChromiumConfig {
            headless: !args.headful,
            ..ChromiumConfig::default()
        })
        .await?,
    );

    let orchestrator =
        CrawlOrchestrator::new(browser.clone(), store, state, selectors, scripts, config);
    let report = orchestrator.run().await;

    match Arc::try_unwrap(browser) {
        Ok(browser) => browser.close().await,
        Err(_) => warn!("Browser still in use, leaving it to exit with the process"),
    }

    let report = report?;
    info!(
        competitions = report.competitions,
        discussions = report.discussions,
        skipped_unchanged = report.skipped_unchanged,
        duplicates = report.duplicates,
        item_errors = report.item_errors,
        pages = report.competition_pages,
        stop = %report.terminal,
        elapsed_secs = report.elapsed.as_secs(),
        "Run finished"
    );

    println!(
        "Extracted {} competitions and {} discussions ({} unchanged skipped, {} item errors)",
        report.competitions, report.discussions, report.skipped_unchanged, report.item_errors
    );
    println!("Persistence: {}", report.persistence);

    if let PersistOutcome::Failed { .. } = report.persistence {
        anyhow::bail!("collected records could not be saved");
    }
    Ok(())
}

async fn show_status(args: StoreArgs, env_file: &Path) -> Result<()> {
    let run_state = EnvFileRunState::new(env_file);
    match run_state.load().await? {
        Some(state) => println!("Last scrape: {}", state.to_stored()),
        None => println!("Last scrape: never ({})", env_file.display()),
    }

    let store = open_store(&args)?;
    for kind in [RecordKind::Competition, RecordKind::Discussion] {
        match store.list_documents(kind.collection()).await {
            Ok(documents) => println!("{}: {} stored", kind, documents.len()),
            Err(e) => println!("{}: unavailable ({})", kind, e),
        }
    }

    Ok(())
}
