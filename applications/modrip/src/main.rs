/// modrip - crawl a module archive artist page and convert its modules to FLAC
use anyhow::Context;
use clap::{Parser, Subcommand};
use modrip::{
    config::{validate_artist_url, AppConfig},
    discover_modules, Orchestrator, PipelineSettings,
};
use modrip_catalog::{Catalog, CatalogClient, DownloadSummary};
use modrip_convert::{require_tools, FfmpegTranscoder, OpenMptRenderer, TranscodeSettings};
use modrip_core::{read_header, sniff, BatchSummary, ModripError, ModuleSource};
use std::{collections::HashSet, path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "modrip", version)]
#[command(about = "Render tracker modules to tagged 16-bit FLAC", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./modrip.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the artist listing, download its modules and convert them
    Run {
        /// Artist listing URL (overrides the configured one)
        #[arg(long)]
        artist_url: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Crawl the artist listing and download its modules only
    Fetch {
        /// Artist listing URL (overrides the configured one)
        #[arg(long)]
        artist_url: Option<String>,
    },
    /// Convert every module already in the module directory
    Convert {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the detected format and title of module files
    Sniff {
        /// Module files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "modrip=info,modrip_convert=info,modrip_catalog=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Sniff { files, json } = &cli.command {
        return sniff_files(files, *json);
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run { artist_url, json } => {
            override_artist_url(&mut config, artist_url)?;
            run(&config, json).await?;
        }
        Commands::Fetch { artist_url } => {
            override_artist_url(&mut config, artist_url)?;
            let (_, downloads) = fetch(&config).await?;
            println!(
                "{} downloaded, {} already present, {} failed",
                downloads.downloaded.len(),
                downloads.skipped.len(),
                downloads.failed.len()
            );
        }
        Commands::Convert { json } => {
            let modules = discover_modules(&config.paths.module_dir)?;
            convert(&config, modules, json).await?;
        }
        Commands::Sniff { .. } => {}
    }

    Ok(())
}

fn override_artist_url(config: &mut AppConfig, artist_url: Option<String>) -> anyhow::Result<()> {
    if let Some(url) = artist_url {
        validate_artist_url(&url)?;
        config.catalog.artist_url = url;
    }
    Ok(())
}

async fn run(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    // Nothing is crawled or downloaded when the conversion could never run
    if let Err(e) = require_tools(&config.required_tools()) {
        tracing::error!(error = %e, "Cannot convert modules");
        return Ok(());
    }

    let (catalog, downloads) = fetch(config).await?;
    let available: HashSet<&str> = downloads.available().collect();

    let modules: Vec<ModuleSource> = catalog
        .iter()
        .filter(|(identifier, _)| available.contains(identifier))
        .map(|(identifier, entry)| {
            let source = ModuleSource::new(config.paths.module_dir.join(identifier));
            match &entry.title {
                Some(title) => source.with_listing_title(title.clone()),
                None => source,
            }
        })
        .collect();

    convert(config, modules, json).await
}

async fn fetch(config: &AppConfig) -> anyhow::Result<(Catalog, DownloadSummary)> {
    tracing::info!(url = %config.catalog.artist_url, "Fetching catalog");

    let client = CatalogClient::new()?;
    let catalog = client
        .fetch_catalog(&config.catalog.artist_url)
        .await
        .with_context(|| format!("failed to crawl {}", config.catalog.artist_url))?;

    let downloads = client
        .download_all(&catalog, &config.paths.module_dir)
        .await?;

    Ok((catalog, downloads))
}

async fn convert(config: &AppConfig, modules: Vec<ModuleSource>, json: bool) -> anyhow::Result<()> {
    let renderer = Arc::new(OpenMptRenderer::new(&config.tools.renderer));
    let transcoder = Arc::new(FfmpegTranscoder::new(
        &config.tools.encoder,
        TranscodeSettings {
            sample_rate: config.transcode.sample_rate,
            compression_level: config.transcode.compression_level,
        },
    ));

    let orchestrator = Orchestrator::new(
        renderer,
        transcoder,
        PipelineSettings {
            workers: config.pipeline.workers,
            keep_waveforms: config.pipeline.keep_waveforms,
            existing_output: config.pipeline.existing_output,
            output_dir: config.paths.output_dir.clone(),
            required_tools: config.required_tools(),
        },
    );

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, queued modules will be cancelled");
                cancel.cancel();
            }
        })
    };

    let result = orchestrator.run(modules, cancel).await;
    interrupt.abort();

    match result {
        Ok(summary) => print_summary(&summary, json),
        Err(e @ ModripError::MissingTool { .. }) => {
            tracing::error!(error = %e, "Cannot convert modules");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(summary: &BatchSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

fn sniff_files(files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        match read_header(file) {
            Ok(header) => {
                let sniffed = sniff(&header);
                if !json {
                    println!(
                        "{}: {} {:?}",
                        file.display(),
                        sniffed.format(),
                        sniffed.title()
                    );
                }
                results.push(serde_json::json!({
                    "file": file,
                    "format": sniffed.format(),
                    "title": sniffed.title(),
                }));
            }
            Err(e) => {
                tracing::error!(file = %file.display(), error = %e, "Failed to read module");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
