//! Vitrine CLI
//!
//! Drive the storefront components from the terminal: crawl a collection
//! through the infinite-scroll component, or probe an image's aspect ratio.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

mod crawl;

use crawl::{crawl, CrawlOptions};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vitrine storefront toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a collection page by page, printing cards as JSON
    Crawl {
        /// Collection URL to crawl
        url: Url,

        /// Number of scroll steps to simulate
        #[arg(short, long, default_value = "3")]
        pages: u32,

        /// Scroll towards earlier pages instead of later ones
        #[arg(long)]
        backwards: bool,

        /// Simulated viewport height in pixels
        #[arg(long, default_value = "900")]
        viewport: f32,
    },

    /// Print an image's natural dimensions and normalized aspect ratio
    Probe {
        /// Image URL
        url: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Crawl {
            url,
            pages,
            backwards,
            viewport,
        } => {
            crawl(CrawlOptions {
                url,
                pages,
                backwards,
                viewport,
            })
            .await
        }
        Commands::Probe { url } => probe(&url).await,
    }
}

async fn probe(url: &str) -> Result<()> {
    use vitrine_components::aspect::adaptive_ratio;
    use vitrine_media::{HttpImageProbe, ImageProbe};

    let probe = HttpImageProbe::new();
    let (width, height) = probe.dimensions(url).await?;
    println!("{width}x{height} ratio {}", adaptive_ratio(width, height));
    Ok(())
}
