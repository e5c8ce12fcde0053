//! CLI entry point for mdblog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdblog")]
#[command(version)]
#[command(about = "A small markdown blog server", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (falls back to the PORT environment variable)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List articles in the articles directory
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdblog=debug,info"
    } else {
        "mdblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Server { port, ip } => {
            let blog = mdblog::Blog::new(&base_dir)?;
            let port = port.or_else(port_from_env).unwrap_or(blog.config.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog.serve(&ip, port).await?;
        }

        Commands::List => {
            let blog = mdblog::Blog::new(&base_dir)?;
            let store = mdblog::content::ArticleStore::new(&blog.articles_dir, &blog.config);
            let previews = store.list_previews()?;

            println!("Articles ({}):", previews.len());
            for preview in previews {
                let first_line = preview.content.lines().next().unwrap_or("");
                match preview.modified {
                    Some(date) => println!(
                        "  {} - {} [{}]",
                        date.format("%Y-%m-%d"),
                        preview.file_name,
                        first_line
                    ),
                    None => println!("  {} [{}]", preview.file_name, first_line),
                }
            }
        }
    }

    Ok(())
}

/// The PORT environment variable, when set and numeric
fn port_from_env() -> Option<u16> {
    std::env::var("PORT").ok().and_then(|v| v.parse().ok())
}
