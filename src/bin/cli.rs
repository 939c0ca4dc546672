//! Influx Broker CLI
//!
//! Command-line access to the broker's building blocks:
//! - Compile request elements to InfluxQL
//! - Run them directly against InfluxDB
//! - Look up latest values and tags
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use influx_broker::config::{generate_default_config, Config};
use influx_broker::format::{format_response, Format};
use influx_broker::influx::{get_latest_values, get_tags, InfluxClient, QueryBackend};
use influx_broker::query::{
    compile_queries, validate_elements, Direction, MeasurementColumnPair, QueryError, RequestElement,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "influx-broker-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run InfluxQL query batches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// InfluxDB URL, overrides the config
    #[arg(long, global = true)]
    pub influx_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the InfluxQL for a JSON array of request elements
    Compile {
        /// JSON file (default: stdin)
        input: Option<PathBuf>,
        /// Row order for ungrouped statements (asc, desc)
        #[arg(short, long, default_value = "desc")]
        order: String,
    },

    /// Run a JSON array of request elements against a database
    Query {
        /// Database name
        #[arg(short, long)]
        db: String,
        /// JSON file (default: stdin)
        input: Option<PathBuf>,
        /// Response shape (per_query, table)
        #[arg(short, long, default_value = "per_query")]
        format: String,
        /// Row order for ungrouped statements (asc, desc)
        #[arg(short, long, default_value = "desc")]
        order: String,
    },

    /// Latest value of measurement columns
    Latest {
        /// Database name
        #[arg(short, long)]
        db: String,
        /// Pairs as measurement:column[:math], e.g. cpu:load:*100
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// List tag keys and values of a measurement
    Tags {
        /// Database name
        #[arg(short, long)]
        db: String,
        /// Measurement name
        measurement: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("influx_broker=debug"))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Commands::Compile { ref input, ref order } => {
            let elements = read_elements(input.as_deref())?;
            let query = compile_queries(&elements, Direction::from_param(Some(order.as_str())))?;
            for statement in query.split("; ") {
                println!("{}", statement);
            }
        }

        Commands::Query {
            ref db,
            ref input,
            ref format,
            ref order,
        } => {
            let elements = read_elements(input.as_deref())?;
            if elements.is_empty() {
                println!("[]");
                return Ok(());
            }
            let query = compile_queries(&elements, Direction::from_param(Some(order.as_str())))?;

            let client = connect(&cli)?;
            let response = client.execute(db, &query).await?;
            let formatted = format_response(Format::from_param(Some(format.as_str())), &elements, response.results)?;
            println!("{}", serde_json::to_string_pretty(&formatted)?);
        }

        Commands::Latest { ref db, ref pairs } => {
            let pairs = pairs
                .iter()
                .map(|p| parse_pair(p))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let client = connect(&cli)?;
            let values = get_latest_values(&client, db, &pairs).await?;

            let output: Vec<serde_json::Value> = pairs
                .iter()
                .zip(values)
                .map(|(pair, value)| {
                    serde_json::json!({
                        "measurement": pair.measurement,
                        "column": pair.result_column(),
                        "time": value.time,
                        "value": value.value,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Tags {
            ref db,
            ref measurement,
        } => {
            let client = connect(&cli)?;
            let tags = get_tags(&client, db, measurement).await?;

            if tags.is_empty() {
                println!("No tags on {}", measurement);
            }
            for (key, values) in tags {
                println!("{}: {}", key, values.join(", "));
            }
        }

        Commands::Config { ref output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

/// Build a client from the config file and `--influx-url`
fn connect(cli: &Cli) -> anyhow::Result<InfluxClient> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.influx_url {
        config.influx.url = url.clone();
    }
    InfluxClient::new((&config.influx).into()).context("invalid InfluxDB configuration")
}

/// Decode and validate request elements from a file or stdin
fn read_elements(input: Option<&Path>) -> anyhow::Result<Vec<RequestElement>> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?,
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
    };
    let elements: Vec<RequestElement> =
        serde_json::from_str(&content).context("request elements must be a JSON array")?;
    validate_elements(&elements).map_err(QueryError::from)?;
    Ok(elements)
}

/// Parse `measurement:column[:math]`
fn parse_pair(s: &str) -> anyhow::Result<MeasurementColumnPair> {
    let mut parts = s.splitn(3, ':');
    let (measurement, column) = match (parts.next(), parts.next()) {
        (Some(m), Some(c)) if !m.is_empty() && !c.is_empty() => (m, c),
        _ => bail!("invalid pair {:?}, expected measurement:column[:math]", s),
    };

    let pair = MeasurementColumnPair::new(measurement, column);
    Ok(match parts.next() {
        Some(math) if !math.is_empty() => pair.with_math(math),
        _ => pair,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        let pair = parse_pair("cpu:load").unwrap();
        assert_eq!(pair.measurement, "cpu");
        assert_eq!(pair.column_name, "load");
        assert!(pair.math.is_none());

        let pair = parse_pair("cpu:load:*100").unwrap();
        assert_eq!(pair.math.as_deref(), Some("*100"));

        assert!(parse_pair("cpu").is_err());
        assert!(parse_pair(":load").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "influx-broker-cli",
            "latest",
            "--db",
            "telemetry",
            "cpu:load",
            "mem:used:/1024",
            "--influx-url",
            "http://db:8086",
        ])
        .unwrap();
        assert_eq!(cli.influx_url.as_deref(), Some("http://db:8086"));
        assert!(matches!(cli.command, Commands::Latest { ref pairs, .. } if pairs.len() == 2));
    }
}
