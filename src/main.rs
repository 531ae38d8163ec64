//! lasval - Headless client and shell caching proxy for the LAS validator
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use las_validator::{run_proxy, run_validate, ValidateOptions};
use lasval_app::config::{init_config_dir, load_settings, validate_settings};
use lasval_app::Settings;
use lasval_client::ValidationClient;
use lasval_core::ExportFormat;

/// lasval - Validate LAS well-log files against a remote service
#[derive(Parser, Debug)]
#[command(name = "lasval")]
#[command(about = "Validate LAS well-log files against a remote service", long_about = None)]
struct Args {
    /// Directory holding `.lasval/config.toml` (defaults to the current one)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one file, printing NDJSON events
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Validation service base URL
        #[arg(long)]
        server: Option<String>,

        /// Export the result (repeatable)
        #[arg(long, value_name = "json|text")]
        export: Vec<ExportFormat>,

        /// Directory for exported artifacts
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Write the rendered results page
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Serve the web shell through the versioned cache
    Proxy {
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,

        #[arg(long, value_name = "URL")]
        upstream: Option<String>,

        /// Shell version; selects the cache generation
        #[arg(long)]
        version: Option<String>,

        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },

    /// Probe the validation service
    Health {
        #[arg(long)]
        server: Option<String>,
    },

    /// Write a commented default `.lasval/config.toml`
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Err(e) = lasval_core::logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let base_path = args
        .config_dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let mut settings = load_settings(&base_path);

    match args.command {
        Command::Validate {
            file,
            server,
            export,
            out,
            html,
        } => {
            if let Some(server) = server {
                settings.server.base_url = server;
            }
            if let Some(out) = out {
                settings.export.directory = out;
            }
            validate_settings(&settings)?;

            let options = ValidateOptions {
                file,
                exports: export,
                html,
            };
            let code = match run_validate(settings, &options).await {
                Ok(outcome) => outcome.exit_code(),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    1
                }
            };
            std::process::exit(code);
        }

        Command::Proxy {
            listen,
            upstream,
            version,
            cache_dir,
        } => {
            let proxy = &mut settings.proxy;
            if let Some(listen) = listen {
                proxy.listen = listen;
            }
            if let Some(upstream) = upstream {
                proxy.upstream = upstream;
            }
            if let Some(version) = version {
                proxy.version = version;
            }
            if cache_dir.is_some() {
                proxy.cache_dir = cache_dir;
            }
            validate_settings(&settings)?;

            eprintln!(
                "Proxy for {} (shell {}) on http://{}",
                settings.proxy.upstream, settings.proxy.version, settings.proxy.listen
            );
            run_proxy(&settings.proxy).await?;
            Ok(())
        }

        Command::Health { server } => health(settings, server).await,

        Command::Init => {
            init_config_dir(&base_path)?;
            eprintln!("✅ Config written under {}", base_path.join(".lasval").display());
            Ok(())
        }
    }
}

async fn health(mut settings: Settings, server: Option<String>) -> color_eyre::Result<()> {
    if let Some(server) = server {
        settings.server.base_url = server;
    }

    let client = ValidationClient::new(&settings.server.base_url)?;
    let status = client.health().await?;
    println!("{}", serde_json::to_string(&status)?);

    if !status.healthy {
        std::process::exit(1);
    }
    Ok(())
}
