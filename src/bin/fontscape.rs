/// fontscape CLI - Latent-Space Font Exploration Tool
///
/// This is the main CLI interface for fontscape, providing commands for
/// serving the exploration API and inspecting a font catalog locally.
///
/// Usage:
///   fontscape serve [--bind <addr>] [--port <port>]  - Start the HTTP API
///   fontscape import <input> <output>                - Convert a catalog file
///   fontscape fonts                                  - List catalog fonts
///   fontscape similar <font> [-k <n>] [-m <metric>]  - Nearest neighbors
///   fontscape status [--url <url>]                   - Remote server status
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use fontscape::http::HttpServer;
use fontscape::{FontCatalog, FontScape, Metric, ServiceConfig};
use std::path::PathBuf;
use tokio::signal;

// ============================================================================
// HTTP Client for Remote Operations
// ============================================================================

/// HTTP client for querying a running fontscape server.
struct HttpClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpClient {
    fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Get status from the remote server.
    async fn status(&self) -> Result<serde_json::Value> {
        let url = format!("{}/api/v1/status", self.base_url);
        let response = self.client.get(&url).send().await?;
        let data: serde_json::Value = response.error_for_status()?.json().await?;
        Ok(data)
    }
}

/// fontscape - Latent-Space Font Exploration
///
/// Serves a catalog of font embeddings for similarity search,
/// interpolation, and 2D mapping.
#[derive(Parser)]
#[command(name = "fontscape")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Catalog file path (default: ~/.fontscape/fonts.bin)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    ///
    /// Examples:
    ///   fontscape serve
    ///   fontscape serve --port 9000 --metrics euclidean,angular
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Bind to a specific address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        /// Distance metrics to index (comma-separated)
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "angular,euclidean,manhattan,hamming,dot"
        )]
        metrics: Vec<Metric>,

        /// Directory holding the specimen glyph images
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Convert a catalog file between formats
    ///
    /// The format is chosen by extension: `.json` for JSON, anything else
    /// for the binary snapshot format.
    ///
    /// Example:
    ///   fontscape import embeddings.json fonts.bin
    Import {
        /// Source catalog file
        input: PathBuf,

        /// Destination catalog file
        output: PathBuf,
    },

    /// List the fonts in the catalog
    Fonts,

    /// Show the nearest neighbors of a font
    ///
    /// The font may be given by label or by index.
    ///
    /// Examples:
    ///   fontscape similar Garamond
    ///   fontscape similar 42 -k 5 -m angular
    Similar {
        /// Font label or index
        font: String,

        /// Distance metric to query under
        #[arg(short, long, default_value = "euclidean")]
        metric: Metric,

        /// Number of neighbors to return
        #[arg(short, long, default_value_t = 10)]
        k: usize,
    },

    /// Show status of a running fontscape server
    Status {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

/// Default catalog path: ~/.fontscape/fonts.bin
fn default_catalog_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fontscape")
        .join("fonts.bin")
}

fn load_catalog(path: &std::path::Path) -> Result<FontCatalog> {
    FontCatalog::load(path).with_context(|| format!("Failed to load catalog from {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fontscape=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let catalog_path = cli.catalog.unwrap_or_else(default_catalog_path);

    match cli.command {
        Commands::Serve {
            port,
            bind,
            metrics,
            data_dir,
        } => {
            let catalog = load_catalog(&catalog_path)?;
            let config = ServiceConfig {
                metrics,
                data_dir,
                ..ServiceConfig::default()
            };
            let service =
                FontScape::build(catalog, config).context("Failed to build font service")?;
            run_http_server(service, &bind, port).await
        }

        Commands::Import { input, output } => {
            let catalog = load_catalog(&input)?;
            catalog
                .save(&output)
                .with_context(|| format!("Failed to write catalog to {:?}", output))?;

            println!("{}", "OK".green().bold());
            println!(
                "  Imported {} fonts ({} dimensions)",
                catalog.len().to_string().cyan(),
                catalog.dimensions()
            );
            println!("  Wrote: {}", output.display());
            Ok(())
        }

        Commands::Fonts => {
            let catalog = load_catalog(&catalog_path)?;

            println!("{} ({} fonts)", "Catalog".bold().cyan(), catalog.len());
            for (index, entry) in catalog.entries() {
                println!("  {:>5}  {}", index.to_string().bright_black(), entry.label);
            }
            Ok(())
        }

        Commands::Similar { font, metric, k } => {
            let catalog = load_catalog(&catalog_path)?;
            let config = ServiceConfig {
                metrics: vec![metric],
                default_metric: metric,
                ..ServiceConfig::default()
            };
            let service =
                FontScape::build(catalog, config).context("Failed to build font service")?;

            // Accept an index or a label.
            let records = match font.parse::<usize>() {
                Ok(index) => service.similar_fonts(index, Some(metric), Some(k)),
                Err(_) => service.similar_fonts_by_label(&font, Some(metric), Some(k)),
            }
            .with_context(|| format!("Similarity query failed for {:?}", font))?;

            println!(
                "{} {} ({})",
                "Nearest to".bold().cyan(),
                font,
                metric.name().bright_black()
            );
            for record in records {
                println!(
                    "  {:>5}  {}",
                    record.value.to_string().bright_black(),
                    record.name
                );
            }
            Ok(())
        }

        Commands::Status { url } => {
            let client = HttpClient::new(url.clone());
            let status = client
                .status()
                .await
                .with_context(|| format!("Failed to reach server at {}", url))?;

            println!("{}", "Server Status".bold().cyan());
            println!("  URL: {}", url);
            if let Some(count) = status.get("font_count") {
                println!("  Fonts: {}", count);
            }
            if let Some(dims) = status.get("dimensions") {
                println!("  Dimensions: {}", dims);
            }
            if let Some(metrics) = status.get("metrics").and_then(|m| m.as_array()) {
                let names: Vec<String> = metrics
                    .iter()
                    .filter_map(|m| m.as_str().map(String::from))
                    .collect();
                println!("  Metrics: {}", names.join(", "));
            }
            if let Some(model) = status.get("model_attached") {
                println!("  Model attached: {}", model);
            }
            if let Some(started) = status.get("started_at") {
                println!("  Started: {}", started.to_string().bright_black());
            }
            Ok(())
        }
    }
}

/// Run the HTTP API server until Ctrl+C.
async fn run_http_server(service: FontScape, bind: &str, port: u16) -> Result<()> {
    let bind_addr = format!("{}:{}", bind, port);

    println!("{}", "Starting fontscape HTTP server...".bold().cyan());
    println!();
    println!("  {} {}", "Bind:".bright_white(), bind_addr);
    println!();
    println!("  {}", "Endpoints:".bright_black());
    println!("    GET    /api/v1/fonts             - List fonts");
    println!("    POST   /api/v1/fonts/similar     - Nearest neighbors");
    println!("    POST   /api/v1/fonts/interpolate - Interpolation images");
    println!("    POST   /api/v1/map               - 2D similarity map");
    println!("    GET    /api/v1/status            - Service status");
    println!();
    println!("{}", "Server is running. Press Ctrl+C to stop.".green());
    println!();

    let server = HttpServer::new(service);

    // Handle Ctrl+C for graceful shutdown
    let shutdown = async {
        signal::ctrl_c().await.ok();
        println!();
        println!("{}", "Shutting down...".yellow());
    };

    tokio::select! {
        result = server.bind(&bind_addr) => {
            if let Err(e) = result {
                eprintln!("{} {}", "Server error:".red(), e);
            }
        }
        _ = shutdown => {}
    }

    println!("{}", "Server stopped.".green());
    Ok(())
}
