use crate::echo::echo_handler;
use crate::error::DeclarationError;
use crate::framework::Framework;
use crate::logging::{init_logging, LogConfig};
use crate::runtime_config::{RuntimeConfig, ServiceConfig, DEFAULT_ADDR};
use crate::server::HttpServer;
use crate::spec::load_declarations;
use crate::validator::print_issues;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for swagger-framework
#[derive(Parser, Debug)]
#[command(name = "swagger-framework")]
#[command(about = "Serve, check and document Swagger 1.2 declarations", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve every declared operation with the echo handler, plus the docs
    Serve {
        /// Directory holding index.json|yaml and one declaration per api
        #[arg(short, long, env = "SF_DECLARATIONS")]
        declarations: PathBuf,

        /// YAML service file (framework options and http settings)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address and port to bind the server to
        #[arg(long)]
        addr: Option<String>,
    },
    /// Set up the declarations and build the router, reporting any error
    Validate {
        #[arg(short, long, env = "SF_DECLARATIONS")]
        declarations: PathBuf,
    },
    /// Print the rendered docs index, or one api declaration
    Docs {
        #[arg(short, long, env = "SF_DECLARATIONS")]
        declarations: PathBuf,

        /// resourcePath of the api to render (default: the index)
        #[arg(short, long)]
        resource: Option<String>,
    },
}

fn load(declarations: &Path, config: Option<&ServiceConfig>) -> Result<Framework> {
    let options = config.and_then(|c| c.framework.clone());
    load_declarations(declarations, options, |_| echo_handler())
}

fn report(err: &DeclarationError) {
    if !err.issues().is_empty() {
        print_issues(err.issues());
    }
}

/// Run a parsed command, writing command output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Serve {
            declarations,
            config,
            addr,
        } => {
            let config = config
                .as_deref()
                .map(ServiceConfig::load)
                .transpose()?
                .unwrap_or_default();
            let runtime = config.runtime(RuntimeConfig::from_env());
            let mut framework = load(&declarations, Some(&config))?;
            framework.body_limit(runtime.body_limit)?;
            let service = framework.service().map_err(|e| {
                report(&e);
                anyhow!(e)
            })?;
            let addr = addr
                .or_else(|| config.http.addr.clone())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string());
            let handle = HttpServer::new(service)
                .workers(runtime.workers)
                .body_limit(runtime.body_limit)
                .start(addr.as_str())
                .with_context(|| format!("failed to bind {}", addr))?;
            writeln!(out, "listening on http://{}", handle.addr())?;
            info!(addr = %handle.addr(), docs = %framework.docs_path(), "Serving declarations");
            handle
                .join()
                .map_err(|_| anyhow!("an HTTP worker panicked"))?;
            Ok(())
        }
        Commands::Validate { declarations } => {
            let mut framework = load(&declarations, None)?;
            let router = framework.dispatcher().map_err(|e| {
                report(&e);
                anyhow!(e)
            })?;
            writeln!(
                out,
                "OK: {} api(s), {} route(s)",
                framework.apis().len(),
                router.routes_count()
            )?;
            Ok(())
        }
        Commands::Docs {
            declarations,
            resource,
        } => {
            let mut framework = load(&declarations, None)?;
            framework.setup().map_err(|e| {
                report(&e);
                anyhow!(e)
            })?;
            let docs = framework.docs();
            let rendered = match resource {
                Some(path) => serde_json::to_string_pretty(
                    &docs
                        .declaration(&path)
                        .ok_or_else(|| anyhow!("no api with resourcePath {}", path))?,
                )?,
                None => serde_json::to_string_pretty(&docs.index())?,
            };
            writeln!(out, "{}", rendered)?;
            Ok(())
        }
    }
}

/// Parse the process arguments, set up logging and run.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}
