//! logicnet CLI - build and drive an 8-bit adder made of rule nodes
//!
//! One invocation can, in this order:
//! - build the circuit
//! - print it in dot format
//! - add two random numbers with it
//! - remove it
//! - list the known regions

use clap::Parser;
use logicnet_circuit::{
    exercise, random_operands, BuildStrategy, RippleCarryAdder, SettlePolicy,
};
use logicnet_service::{
    Credentials, HttpRuleService, InMemoryRuleService, RuleService, ServiceConfig,
};
use logicnet_types::NodeName;
use std::ffi::OsString;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod output;
mod regions;

pub use config::{Backend, CliConfig};
pub use error::{CliError, CliResult};

/// Circuit name used when neither the flag nor the config file sets one.
const DEFAULT_NAME: &str = "computer";

/// Credentials profile used when neither the flag nor the config file sets one.
const DEFAULT_PROFILE: &str = "computer";

/// logicnet CLI application
#[derive(Parser, Debug)]
#[command(name = "logicnet")]
#[command(about = "Build and exercise an 8-bit adder made of remotely evaluated rules", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LOGICNET_CONFIG")]
    config: Option<String>,

    /// Rule service endpoint
    #[arg(short, long, env = "LOGICNET_ENDPOINT")]
    endpoint: Option<String>,

    /// Region to create and use nodes in
    #[arg(long, env = "LOGICNET_REGION")]
    region: Option<String>,

    /// Credentials profile
    #[arg(long, env = "LOGICNET_PROFILE")]
    profile: Option<String>,

    /// Additional headers for every request, in the form k1=v1,k2=v2
    #[arg(long)]
    headers: Option<String>,

    /// Where nodes live
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Name of the circuit
    #[arg(short, long)]
    name: Option<String>,

    /// Build the circuit
    #[arg(long)]
    build: bool,

    /// Create independent nodes concurrently when building
    #[arg(long)]
    parallel: bool,

    /// Print the circuit in dot format
    #[arg(long)]
    visualize: bool,

    /// Exercise the circuit with one random addition
    #[arg(long)]
    exercise: bool,

    /// Seed for the exercise operands (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Settle delay and retry backoff in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Convergence latency of the in-memory backend in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Remove the circuit (every node that is part of it)
    #[arg(long)]
    remove: bool,

    /// List the known regions
    #[arg(long)]
    list_regions: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn has_action(&self) -> bool {
        self.build || self.visualize || self.exercise || self.remove || self.list_regions
    }
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so stdout stays usable for the graph.
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    if !cli.has_action() {
        output::print_warning("Nothing to do, see --help");
        return Ok(());
    }

    let config = CliConfig::load(cli.config.as_deref())?;
    let backend = cli.backend.or(config.backend).unwrap_or_default();
    let name = NodeName::new(
        cli.name
            .clone()
            .or_else(|| config.name.clone())
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
    )?;
    let policy = settle_policy(&cli, &config, backend);
    let service = connect(&cli, config.service, backend)?;

    let rca = RippleCarryAdder::new(service, name)?;

    if cli.build {
        let strategy = if cli.parallel {
            BuildStrategy::Layered
        } else {
            BuildStrategy::Sequential
        };
        rca.build_with(strategy).await?;
        output::print_success(&format!("Built circuit {}", rca.name()));
    }

    if cli.visualize {
        let mut graph = Vec::new();
        rca.save_graph(&mut graph).await?;
        std::io::stdout().write_all(&graph)?;
    }

    if cli.exercise {
        let seed = cli
            .seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp().unsigned_abs());
        info!("Using seed {}.", seed);
        let (left, right) = random_operands(seed);
        let report = exercise(&rca, left, right, &policy).await?;
        let summary = format!(
            "{} + {} = {} after {} attempt(s)",
            left,
            right,
            report.sum.value(),
            report.attempts
        );
        if report.converged {
            output::print_success(&summary);
        } else {
            output::print_warning(&format!(
                "{}, expected {}",
                summary,
                report.expected_sum()
            ));
        }
    }

    if cli.remove {
        let deleted = rca.remove().await?;
        output::print_success(&format!(
            "Removed circuit {} ({} nodes)",
            rca.name(),
            deleted.len()
        ));
    }

    if cli.list_regions {
        output::print_lines(regions::list());
    }

    Ok(())
}

fn settle_policy(cli: &Cli, config: &CliConfig, backend: Backend) -> SettlePolicy {
    let settle_ms = cli.settle_ms.or(config.settle_ms);
    match (settle_ms, backend) {
        (Some(ms), _) => SettlePolicy::with_delay(Duration::from_millis(ms)),
        (None, Backend::Memory) if cli.latency_ms == 0 => SettlePolicy::immediate(),
        (None, _) => SettlePolicy::default(),
    }
}

/// Apply flag overrides and open the chosen backend.
fn connect(
    cli: &Cli,
    mut service: ServiceConfig,
    backend: Backend,
) -> CliResult<Arc<dyn RuleService>> {
    match backend {
        Backend::Memory => {
            debug!(latency_ms = cli.latency_ms, "Using in-memory rule service");
            Ok(Arc::new(InMemoryRuleService::with_latency(
                Duration::from_millis(cli.latency_ms),
            )))
        }
        Backend::Http => {
            if let Some(endpoint) = &cli.endpoint {
                service.endpoint = endpoint.clone();
            }
            if let Some(region) = &cli.region {
                service.region = region.clone();
            }
            if cli.profile.is_some() {
                service.profile = cli.profile.clone();
            }
            if let Some(headers) = &cli.headers {
                service = service.with_header_list(headers)?;
            }

            let profile = service
                .profile
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
            let credentials = match Credentials::default_path() {
                Ok(path) => Credentials::load(&path)?,
                Err(_) => Credentials::default(),
            };
            service.token = credentials.token(&profile).map(str::to_string);
            if service.token.is_none() {
                debug!(%profile, "No token for profile");
            }

            debug!(endpoint = %service.endpoint, region = %service.region, "Using HTTP rule service");
            Ok(Arc::new(HttpRuleService::new(&service)?))
        }
    }
}
