//! # poole CLI
//!
//! Command-line interface for the poole static site generator.

mod commands;
mod console;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "poole")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Site directory (holds the `_poole` build root)
    #[arg(long, default_value = ".", env = "POOLE_SITE")]
    site: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the build root with a starter config, layout and page
    Init {
        /// Remove an existing build root first
        #[arg(long)]
        force: bool,
    },

    /// Build the site into the output directory
    Generate {
        /// Serve the output once the build is done
        #[arg(long)]
        serve: bool,

        /// Server port (with --serve)
        #[arg(long, default_value_t = commands::DEFAULT_PORT)]
        port: u16,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Optimize every asset again, ignoring the post-process cache
        #[arg(long)]
        force: bool,
    },

    /// Serve the generated site locally
    Serve {
        /// Server port
        #[arg(long, default_value_t = commands::DEFAULT_PORT)]
        port: u16,
    },

    /// Push the generated site to the configured git repository
    Deploy,

    /// List content files
    List {
        #[arg(value_enum)]
        what: ListKind,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum ListKind {
    Pages,
    Posts,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Init { force } => commands::init_site(&cli.site, force),
        Commands::Generate {
            serve,
            port,
            dry_run,
            force,
        } => commands::generate_site(
            &cli.site,
            commands::GenerateOptions {
                serve,
                port,
                dry_run,
                force,
            },
        ),
        Commands::Serve { port } => commands::serve_site(&cli.site, port),
        Commands::Deploy => commands::deploy_site(&cli.site),
        Commands::List { what } => commands::list_content(&cli.site, what),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            console::error(format!("{err:#}"));
            ExitCode::from(2)
        }
    }
}
