//! NASA Mission Control CLI
//!
//! Command-line driver for the live NASA feeds: one-shot fetches, a polling
//! loop, cache diagnostics and the setup-time connectivity probe.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nasa_core::{DriverConfig, MediaTriple, SourceId};
use nasa_feeds::{check_connectivity, ClientConfig, NasaClient};

/// NASA Mission Control - live space data for a media-player entity
#[derive(Parser)]
#[command(name = "nasa-mc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Driver configuration file (JSON)
    #[arg(long, global = true, env = "NASA_MC_CONFIG", default_value = "nasa_config.json")]
    config: PathBuf,

    /// NASA API key (overrides the configuration file)
    #[arg(long, global = true, env = "NASA_API_KEY")]
    api_key: Option<String>,

    /// Serve every feed from one base URL instead of the public endpoints
    #[arg(long, global = true, env = "NASA_MC_BASE_URL", hide = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one source
    Fetch {
        /// Source identifier (apod, epic, iss, neo, insight, donki)
        source: String,
        /// Print the triple as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available sources
    Sources,

    /// Fetch every source and print the cache diagnostics
    Snapshot,

    /// Poll a source until interrupted
    Watch {
        /// Source to start with
        #[arg(short, long, default_value = "apod")]
        source: SourceId,
        /// Advance to the next source on every tick
        #[arg(long)]
        cycle: bool,
        /// Poll interval in seconds (defaults to the configured refresh interval)
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Check that the NASA APIs are reachable
    Probe,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
        /// Accept defaults without prompting
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "nasa=debug,info"
    } else {
        "nasa=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Commands::Fetch { source, json } => cmd_fetch(&cli, source, *json).await,
        Commands::Sources => cmd_sources(),
        Commands::Snapshot => cmd_snapshot(&cli).await,
        Commands::Watch {
            source,
            cycle,
            interval_secs,
        } => cmd_watch(&cli, *source, *cycle, *interval_secs).await,
        Commands::Probe => cmd_probe(&cli).await,
        Commands::Config { action } => match action {
            ConfigAction::Init { force, yes } => cmd_config_init(&cli.config, *force, *yes),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Configuration file plus command-line overrides. An unreadable file falls back to the defaults.
fn load_config(cli: &Cli) -> DriverConfig {
    let mut config = DriverConfig::load_or_default(&cli.config);
    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }
    config
}

fn build_client(cli: &Cli, config: &DriverConfig) -> Result<NasaClient> {
    let mut client_config = ClientConfig::from_driver(config);
    if let Some(base) = &cli.base_url {
        client_config = client_config.with_base_url(base);
    }
    NasaClient::with_config(client_config).context("Failed to create NASA client")
}

fn print_triple(source: &str, triple: &MediaTriple) {
    println!("{} {}", format!("[{source}]").cyan().bold(), triple.title.bold());
    println!("   {}", triple.description);
    if triple.has_image() {
        println!("   {} {}", "Image:".dimmed(), triple.image_url);
    }
}

fn format_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Fetch one source
async fn cmd_fetch(cli: &Cli, source: &str, json: bool) -> Result<()> {
    let config = load_config(cli);
    let client = build_client(cli, &config)?;

    let triple = client.fetch(source).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&triple)?);
    } else {
        print_triple(source, &triple);
    }

    Ok(())
}

/// List sources
fn cmd_sources() -> Result<()> {
    println!("{}", "🛰  Available sources".cyan().bold());
    for source in SourceId::ALL {
        println!(
            "   {:<8} {:<16} {:<38} {}",
            source.as_str().green(),
            source.display_name(),
            source.blurb().dimmed(),
            format!("refresh {}", format_ttl(source.ttl())).dimmed(),
        );
    }
    Ok(())
}

/// Fetch everything concurrently
async fn cmd_snapshot(cli: &Cli) -> Result<()> {
    let config = load_config(cli);
    let client = build_client(cli, &config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Fetching all sources...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let results = client.fetch_all().await;
    spinner.finish_and_clear();

    for (source, triple) in &results {
        print_triple(source.as_str(), triple);
    }

    println!("\n{}", "Cache:".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&client.cache_stats())?);

    Ok(())
}

/// Poll until Ctrl-C
async fn cmd_watch(
    cli: &Cli,
    source: SourceId,
    cycle: bool,
    interval_secs: Option<u64>,
) -> Result<()> {
    let config = load_config(cli);
    let client = build_client(cli, &config)?;

    let period = Duration::from_secs(
        interval_secs
            .unwrap_or(config.refresh_interval.saturating_mul(60))
            .max(1),
    );
    println!(
        "{} {} every {:?}{}",
        "📡 Watching".cyan().bold(),
        source.display_name(),
        period,
        if cycle { " (cycling)" } else { "" }
    );
    println!("   Press Ctrl+C to stop.\n");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    watch_loop(&client, source, cycle, period, shutdown).await;

    info!("Watch interrupted");
    println!("\n{}", "Stopped.".dimmed());
    Ok(())
}

/// Fetches on every tick until `shutdown` resolves; a fetch still running at
/// that point is dropped. Returns the number of triples shown.
async fn watch_loop<F>(
    client: &NasaClient,
    source: SourceId,
    cycle: bool,
    period: Duration,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(period);
    let mut current = source;
    let mut shown = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let triple = tokio::select! {
            _ = &mut shutdown => break,
            triple = client.fetch_source(current) => triple,
        };
        print_triple(current.as_str(), &triple);
        shown += 1;

        if cycle {
            current = current.next();
        }
    }

    shown
}

/// Connectivity probe
async fn cmd_probe(cli: &Cli) -> Result<()> {
    let config = load_config(cli);
    let client = build_client(cli, &config)?;

    println!("{}", "🔭 Testing NASA API connectivity...".cyan().bold());
    let report = check_connectivity(&client).await;

    for source in &report.passed {
        println!("   {} {}", "✓".green(), source.display_name());
    }
    for (source, failure) in &report.failures {
        println!("   {} {} {}", "✗".red(), source.display_name(), failure.dimmed());
    }

    if report.success {
        println!("\n{}", "✅ NASA APIs reachable".green().bold());
        Ok(())
    } else {
        bail!(report.error.unwrap_or_else(|| "Connectivity check failed".into()))
    }
}

/// Write a configuration file
fn cmd_config_init(path: &Path, force: bool, yes: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut config = DriverConfig::default();
    if !yes {
        config.api_key = Input::<String>::new()
            .with_prompt("NASA API key (blank for DEMO_KEY)")
            .allow_empty(true)
            .interact_text()?;
        config.refresh_interval = Input::<u64>::new()
            .with_prompt("Refresh interval (minutes)")
            .default(config.refresh_interval)
            .interact_text()?;
    }

    config.save(path).context("Failed to write configuration")?;
    println!("{} {}", "✅ Configuration saved to:".green(), path.display());
    Ok(())
}

/// Print the effective configuration
fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = load_config(cli);

    println!("{} {}", "📄 Configuration:".cyan().bold(), cli.config.display());
    if let Err(e) = DriverConfig::load(&cli.config) {
        println!("   {} {}", "⚠ Unreadable file, showing defaults:".yellow(), e);
    }
    println!("   {} {}", "API key:".dimmed(), config.masked_api_key());
    if !config.has_personal_key() {
        println!("   {}", "Using the public demo key (rate limited)".yellow());
    }
    println!("   {} {} min", "Refresh:".dimmed(), config.refresh_interval);
    println!("   {} {}", "Device ID:".dimmed(), config.device_id);
    println!("   {} {}", "Device name:".dimmed(), config.device_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from(["nasa-mc", "watch", "--source", "iss", "--cycle"]).unwrap();
        match cli.command {
            Commands::Watch { source, cycle, .. } => {
                assert_eq!(source, SourceId::Iss);
                assert!(cycle);
            }
            _ => panic!("expected watch"),
        }
        assert!(Cli::try_parse_from(["nasa-mc", "watch", "--source", "pluto"]).is_err());
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nasa_config.json");
        std::fs::write(&path, "{bad").unwrap();
        let path_arg = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["nasa-mc", "--config", path_arg, "--api-key", "k", "sources"]).unwrap();
        let config = load_config(&cli);
        assert_eq!(config.api_key, "k");
        assert_eq!(config.refresh_interval, DriverConfig::default().refresh_interval);
        assert_eq!(config.device_id, DriverConfig::default().device_id);
    }

    struct StallingTransport;

    #[async_trait::async_trait]
    impl nasa_core::JsonTransport for StallingTransport {
        async fn get_json(
            &self,
            _: &str,
            _: &[(&str, String)],
            _: &[(&str, &str)],
        ) -> Option<serde_json::Value> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            None
        }
    }

    #[tokio::test]
    async fn test_watch_stops_during_a_slow_fetch() {
        let client = NasaClient::with_transport(ClientConfig::default(), std::sync::Arc::new(StallingTransport));
        let shutdown = tokio::time::sleep(Duration::from_millis(100));

        let started = std::time::Instant::now();
        let shown = watch_loop(&client, SourceId::Iss, true, Duration::from_secs(60), shutdown).await;

        assert_eq!(shown, 0);
        assert!(started.elapsed() < Duration::from_secs(2));
        // The cancelled fetch released its in-flight slot.
        let refetch = tokio::time::timeout(Duration::from_millis(50), client.fetch_source(SourceId::Iss)).await;
        assert!(refetch.is_err());
    }

    #[test]
    fn test_format_ttl() {
        assert_eq!(format_ttl(SourceId::Apod.ttl()), "6h");
        assert_eq!(format_ttl(SourceId::Iss.ttl()), "2m");
        assert_eq!(format_ttl(Duration::from_secs(90)), "90s");
    }
}
