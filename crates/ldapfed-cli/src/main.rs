//! Ldapfed - Federated LDAP identity resolution
//!
//! Resolves users across an ordered set of directory servers and reports
//! per-server reachability.

mod commands;

use clap::{Parser, Subcommand};
use ldapfed_core::config::LdapfedConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ldapfed")]
#[command(author = "Ldapfed Team")]
#[command(version = ldapfed_core::VERSION)]
#[command(about = "Federated LDAP identity resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LDAPFED_CONFIG")]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "LDAPFED_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "LDAPFED_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LDAPFED_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true, env = "LDAPFED_LOG_FORMAT")]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the admin HTTP server
    Server,

    /// Probe every configured LDAP server and print the status report
    Status {
        /// Overall deadline in seconds, defaults to the request timeout
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Resolve a login and print its identity view
    Lookup {
        /// Login to search for
        login: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        LdapfedConfig::from_file(config_path)?
    } else {
        LdapfedConfig::from_env()
    };

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    config.validate()?;
    init_logging(&config);

    match cli.command {
        Some(Commands::Version) => commands::print_version(),
        Some(Commands::Status { timeout }) => commands::status(&config, timeout).await?,
        Some(Commands::Lookup { login }) => commands::lookup(&config, &login).await?,
        Some(Commands::Server) | None => commands::run_server(config).await?,
    }

    Ok(())
}

fn init_logging(config: &LdapfedConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Logs go to stderr so command output on stdout stays parseable
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
