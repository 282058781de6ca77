//! fb-notifier CLI
//!
//! Run it from cron or a systemd timer; each invocation is one pass.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fb_notifier::{
    error::Result,
    models::{Config, SourceKind},
    pipeline::{LogObserver, NotificationComposer, Runner},
    services::{
        BrowserlessRenderer, FeedSource, NtfyNotifier, PageSource, browser::interaction_steps,
    },
    storage::{LocalStorage, SeenStorage},
    utils::http,
};

/// fb-notifier - push new page posts to ntfy
#[derive(Parser, Debug)]
#[command(
    name = "fb-notifier",
    version,
    about = "Watches a social-media page and pushes new posts to ntfy"
)]
struct Cli {
    /// Path to the JSON (or .toml) configuration file
    #[arg(short, long, env = "FB_NOTIFIER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check for new posts and notify (default)
    Run {
        /// Log what would be sent without sending or saving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show configuration and seen-set info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command.unwrap_or(Command::Run { dry_run: false }) {
        Command::Run { dry_run } => run(&config, dry_run).await?,

        Command::Validate => {
            log::info!("Validating configuration...");
            let source = config.source()?;
            log::info!("✓ Config OK");
            log::info!("    source: {}", describe(&source));
            log::info!("    identity: {:?}", config.effective_identity_policy()?);
            log::info!("    ntfy: {}", config.ntfy_endpoint());
        }

        Command::Info => {
            let storage = LocalStorage::new(&config.seen_posts_file);
            let seen = storage.load().await?;
            log::info!("Config: {}", cli.config.display());
            log::info!("Source: {}", describe(&config.source()?));
            log::info!("Seen-set: {} ({} posts)", storage.location(), seen.len());
        }
    }

    Ok(())
}

async fn run(config: &Config, dry_run: bool) -> Result<()> {
    log::info!("fb-notifier starting...");

    let client = http::create_client(&config.http)?;
    let storage = LocalStorage::new(&config.seen_posts_file);
    let notifier = NtfyNotifier::new(client.clone(), config);
    let observer = LogObserver;

    let runner = Runner {
        storage: &storage,
        notifier: &notifier,
        policy: config.effective_identity_policy()?,
        composer: NotificationComposer::new(&config.notification.title_prefix),
        observer: &observer,
        dry_run,
    };

    match config.source()? {
        SourceKind::Feed { url } => {
            runner.run(&FeedSource::new(url, client)).await?;
        }
        SourceKind::Page { url } => {
            let renderer = BrowserlessRenderer::new(client, &config.browser);
            let source = PageSource::new(
                url,
                config.selectors.clone(),
                interaction_steps(&config.browser),
                renderer,
            )?;
            runner.run(&source).await?;
        }
    }

    log::info!("Done!");
    Ok(())
}

fn describe(source: &SourceKind) -> String {
    match source {
        SourceKind::Feed { url } => format!("feed {url}"),
        SourceKind::Page { url } => format!("page {url}"),
    }
}
