//! Inspection CLI for TOML route tables.
//!
//! `check` validates and prints a route table, `match` resolves a path and
//! method against it with a dry-run loader, `url` reverse-resolves a route
//! name into a concrete URL.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use url_router::dispatch::DispatchError;
use url_router::{Handler, HandlerLoader, ParamValues, RequestContext, Router};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect and exercise url-router route tables", long_about = None)]
struct Cli {
    /// Path to the TOML route table.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the route table and print it
    Check,
    /// Resolve a path against the route table
    Match {
        path: String,

        #[arg(short, long, default_value = "get")]
        method: String,
    },
    /// Reverse-resolve a route name into a URL
    Url {
        name: String,

        /// Parameter values as key=value pairs
        #[arg(short, long)]
        param: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "url_router=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = url_router::load_config(&cli.config)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Match { path, method } => {
            let mut router = Router::from_config(&config)?;
            router.set_loader(Arc::new(DryRunLoader));
            router.set_request(RequestContext::new(&method, &path));

            match router.start() {
                Ok(Some(output)) => println!("{output}"),
                Ok(None) => println!("no output"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Url { name, param } => {
            let mut router = Router::from_config(&config)?;
            router.load_routes();

            let values = if param.is_empty() {
                ParamValues::None
            } else {
                ParamValues::Named(
                    param
                        .iter()
                        .map(|pair| match pair.split_once('=') {
                            Some((key, value)) => (key.to_string(), value.to_string()),
                            None => (pair.clone(), String::new()),
                        })
                        .collect(),
                )
            };

            println!("{}", router.get_url(Some(&name), &values, None));
        }
    }

    Ok(())
}

/// Loader that reports the resolved callback instead of invoking anything.
struct DryRunLoader;

impl HandlerLoader for DryRunLoader {
    fn load_handler(&self, name: &str) -> Result<Arc<dyn Handler>, DispatchError> {
        Ok(Arc::new(DryRunHandler {
            name: name.to_string(),
        }))
    }
}

struct DryRunHandler {
    name: String,
}

impl Handler for DryRunHandler {
    fn call(&self, method: &str, args: &[Option<String>]) -> Option<String> {
        let args: Vec<&str> = args
            .iter()
            .map(|value| value.as_deref().unwrap_or("null"))
            .collect();
        Some(format!("{}@{}({})", self.name, method, args.join(", ")))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
