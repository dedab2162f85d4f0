//! CLI command definitions, routing, and tracing setup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use peanut_cluster::{KubeSource, ManifestSource, ObjectSource};
use peanut_core::{CatalogOptions, discover, to_yaml};
use peanut_server::{ApiServer, ApiServerConfig, AppState};
use peanut_shared::{
    AppConfig, SourceConfig, WorkloadKind, init_config, load_config, load_config_from,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// peanut-backstage: Backstage catalog documents from Kubernetes workloads.
#[derive(Parser)]
#[command(
    name = "peanut-backstage",
    version,
    about = "Serve Backstage catalog entities generated from Kubernetes workload labels.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug logging.
    #[arg(
        long,
        env = "PEANUT_DEBUG",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub debug: bool,

    /// Config file to use instead of ~/.peanut-backstage/peanut-backstage.toml.
    #[arg(long, env = "PEANUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the catalog over HTTP.
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:8080.
        #[arg(long, env = "PEANUT_LISTEN")]
        listen: Option<String>,

        /// Port to listen on; replaces the port of the listen address.
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Run one discovery pass and print a document to stdout.
    Render {
        /// Print this component instead of the Location.
        #[arg(long)]
        component: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where workload objects come from.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Workload kind: deployments, statefulsets, daemonsets or pods.
    #[arg(long, env = "PEANUT_KIND")]
    pub kind: Option<WorkloadKind>,

    /// Only list objects in this namespace.
    #[arg(short, long, env = "PEANUT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Label selector, e.g. `team=web`.
    #[arg(short = 'l', long, env = "PEANUT_SELECTOR")]
    pub selector: Option<String>,

    /// Read objects from manifest files instead of the cluster.
    #[arg(long, num_args = 1..)]
    pub manifests: Vec<PathBuf>,
}

impl SourceArgs {
    /// Overlay flags onto the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(kind) = self.kind {
            config.discovery.kind = kind;
        }
        if let Some(ns) = &self.namespace {
            config.discovery.namespace = Some(ns.clone());
        }
        if let Some(selector) = &self.selector {
            config.discovery.label_selector = Some(selector.clone());
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Default log filter for the given `-v` count and `--debug` flag.
fn log_filter(verbose: u8, debug: bool) -> &'static str {
    match (verbose, debug) {
        (0, false) => "peanut=info,tower_http=info",
        (0 | 1, _) => "peanut=debug,tower_http=debug",
        _ => "peanut=trace,tower_http=debug,kube=debug",
    }
}

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr; stdout carries only rendered documents.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, cli.debug)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Serve {
            listen,
            port,
            source,
        } => {
            let config = resolve_config(config_path, &source)?;
            cmd_serve(config, listen.as_deref(), port, &source.manifests).await
        }
        Command::Render { component, source } => {
            let config = resolve_config(config_path, &source)?;
            cmd_render(config, component.as_deref(), &source.manifests).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Flags over config file over defaults.
fn resolve_config(path: Option<PathBuf>, source: &SourceArgs) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };
    source.apply(&mut config);
    debug!(?config, "resolved config");
    Ok(config)
}

fn listen_address(
    config: &AppConfig,
    listen: Option<&str>,
    port: Option<u16>,
) -> Result<SocketAddr> {
    let raw = listen.unwrap_or(&config.server.listen);
    let mut addr: SocketAddr = raw
        .parse()
        .map_err(|e| eyre!("invalid listen address '{raw}': {e}"))?;
    if let Some(port) = port {
        addr.set_port(port);
    }
    Ok(addr)
}

async fn object_source(
    config: &AppConfig,
    manifests: &[PathBuf],
) -> Result<Arc<dyn ObjectSource>> {
    let source_config = SourceConfig::from(config);
    if manifests.is_empty() {
        Ok(Arc::new(KubeSource::connect(source_config).await?))
    } else {
        info!(
            files = manifests.len(),
            "reading workloads from manifest files"
        );
        let source = ManifestSource::new(manifests.to_vec(), source_config);
        Ok(Arc::new(source))
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(
    config: AppConfig,
    listen: Option<&str>,
    port: Option<u16>,
    manifests: &[PathBuf],
) -> Result<()> {
    let bind_address = listen_address(&config, listen, port)?;
    let source = object_source(&config, manifests).await?;

    let state = AppState::new(source, CatalogOptions::from(&config));
    ApiServer::new(state, ApiServerConfig { bind_address })
        .run()
        .await?;
    Ok(())
}

async fn cmd_render(
    config: AppConfig,
    component: Option<&str>,
    manifests: &[PathBuf],
) -> Result<()> {
    let document = render_document(&config, component, manifests).await?;
    print!("{document}");
    Ok(())
}

/// Run one discovery pass and encode the Location, or the named Component.
async fn render_document(
    config: &AppConfig,
    component: Option<&str>,
    manifests: &[PathBuf],
) -> Result<String> {
    let source = object_source(config, manifests).await?;
    let options = CatalogOptions::from(config);
    let catalog = discover(source.as_ref(), &options).await?;

    let document = match component {
        Some(name) => {
            let component = catalog
                .component(name)
                .ok_or_else(|| eyre!("component not found: {name}"))?;
            to_yaml(component)?
        }
        None => to_yaml(&catalog.location(&options))?,
    };
    Ok(document)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(path, &SourceArgs::default())?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
