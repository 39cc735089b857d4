mod cmd;
mod output;
mod root;
mod setup;

use clap::{Parser, Subcommand};
use cmd::params::ParamsSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autostep",
    about = "Run declarative page automation scripts against a browser",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .autostep/)
    #[arg(long, global = true, env = "AUTOSTEP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the remote source for jobs and serve the control surface
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one script of a local site definition
    Run {
        /// Site file, or a site name looked up under .autostep/sites/
        site: String,
        /// Script name within the site
        script: String,
        /// Script argument as key=value (repeatable)
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
        /// WebDriver endpoint (default: webdriver.url from config)
        #[arg(long)]
        webdriver: Option<String>,
    },

    /// Check a site definition for problems a run would hit
    Validate {
        /// Site file, or a site name looked up under .autostep/sites/
        site: String,
    },

    /// Manage process parameters
    Params {
        #[command(subcommand)]
        subcommand: ParamsSubcommand,
    },

    /// Acknowledge the human confirmation a running server waits for
    Continue {
        /// Control surface URL (default: http://localhost:<server.port>)
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Run {
            site,
            script,
            args,
            webdriver,
        } => cmd::run::run(&root, &site, &script, &args, webdriver.as_deref(), cli.json),
        Commands::Validate { site } => cmd::validate::run(&root, &site, cli.json),
        Commands::Params { subcommand } => cmd::params::run(&root, subcommand, cli.json),
        Commands::Continue { url } => cmd::resume::run(&root, url.as_deref(), cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
