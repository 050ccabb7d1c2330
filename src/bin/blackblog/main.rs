use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use blackblog::logger::configure_logger;
use blackblog::render::TemplateRenderer;
use blackblog::server::server_run;
use blackblog::writer::write_static_blog;

use crate::config::open_config;

mod config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to blackblog.json, or the directory holding it
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes the whole blog as static files
    Build {
        /// Overrides OutputDir from the configuration
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Serves the blog, picking up post changes as they happen
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// Seconds between checks of the posts directory
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_secs: Option<u64>,
    },
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = open_config(args.config_path.map(PathBuf::from))?;

    if let Some(ref log) = config.log {
        if let Err(err) = configure_logger(log) {
            warn!("Error creating logger sinks. Using console instead. Desc={}", err);
        }
    }

    match args.command {
        Command::Build { output_dir } => {
            let output_dir = output_dir.map(PathBuf::from).unwrap_or_else(|| config.output_dir.clone());
            let config = Arc::new(config);
            let renderer = TemplateRenderer::new(config.clone());
            let count = write_static_blog(&config, &renderer, &output_dir)?;
            info!("Wrote {} posts to {}", count, output_dir.display());
        }
        Command::Serve { port, poll_secs } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(poll_secs) = poll_secs {
                config.poll_interval = poll_secs;
            }

            info!("Starting Blackblog =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            info!("Listening on {}:{}", config.address, config.port);
            server_run(config).await?;
        }
    }

    Ok(())
}
