use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lineseek::config::ServerConfig;
use lineseek::dataset::sort::sort_numeric;
use lineseek::output;
use lineseek::search::StrategyKind;
use lineseek::server::{QueryClient, SearchServer, TlsConnector};
use std::fs::OpenOptions;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lineseek")]
#[command(about = "Exact-match line search server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search server in the foreground
    Serve {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Dataset file (overrides config)
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Reload the dataset on every query
        #[arg(long)]
        reread: bool,

        /// Search strategy (overrides config)
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,

        /// Verbose logging
        #[arg(long)]
        debug: bool,
    },
    /// Send queries to a running server (reads stdin lines when none are given)
    Query {
        /// Queries to send, one connection each
        queries: Vec<String>,

        /// Server address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Connect with TLS, trusting this CA certificate (PEM)
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Sort a dataset file numerically by its first `;` field
    Sort {
        /// Input dataset
        input: PathBuf,
        /// Output file
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            dataset,
            reread,
            strategy,
            debug,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::load(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dataset) = dataset {
                config.dataset_path = dataset;
            }
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            config.reread_on_query |= reread;
            config.debug |= debug;
            config.validate()?;

            init_logging(config.debug, config.log_file.as_deref())?;
            serve(&config)?;
        }
        Commands::Query {
            queries,
            host,
            port,
            ca_cert,
            no_color,
        } => {
            init_logging(false, None)?;
            let mut client = QueryClient::new(host, port);
            if let Some(ca) = ca_cert {
                client = client.with_tls(TlsConnector::from_ca_file(&ca)?);
            }
            run_queries(&client, queries, !no_color)?;
        }
        Commands::Sort {
            input,
            output: out_path,
        } => {
            let report = sort_numeric(&input, &out_path)?;
            output::print_sort_report(&mut output::stdout(true), &report)?;
        }
    }

    Ok(())
}

fn serve(config: &ServerConfig) -> Result<()> {
    let result = SearchServer::new(config)
        .and_then(|server| server.bind())
        .and_then(|listener| listener.run());
    if let Err(e) = &result {
        tracing::error!("Server error: {:#}", e);
    }
    result
}

fn run_queries(client: &QueryClient, queries: Vec<String>, color: bool) -> Result<()> {
    let mut out = output::stdout(color);

    if !queries.is_empty() {
        let show_query = queries.len() > 1;
        for query in &queries {
            let verdict = client.query(query)?;
            output::print_verdict(&mut out, query, &verdict, show_query)?;
        }
        return Ok(());
    }

    // Interactive: one connection per stdin line
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        match client.query(&line) {
            Ok(verdict) => output::print_verdict(&mut out, &line, &verdict, false)?,
            Err(e) => tracing::error!("Query failed: {}", e),
        }
    }

    Ok(())
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if debug { "lineseek=debug" } else { "lineseek=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
