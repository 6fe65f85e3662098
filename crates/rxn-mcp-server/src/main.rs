use clap::{Args, Parser};
use rxn_agent::{Agent, AgentConfig, ChatConfig, McpSession, OpenAiCompatibleClient};
use rxn_eval::engine::evodex::{BridgeConfig, EvodexBridge};
use rxn_eval::Evaluator;
use rxn_resolve::{ResolverChain, ResolverConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod server;
mod tools;

#[derive(Parser)]
#[command(
    name = "rxn-tools",
    about = "MCP tools for judging the enzymatic plausibility of reactions"
)]
struct Cli {
    /// Log level for rxn-* crates (RUST_LOG overrides)
    #[arg(long, global = true, env = "RXN_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the MCP server (stdio transport)
    Serve {
        #[command(flatten)]
        services: ServiceArgs,
    },

    /// Evaluate one substrate/product pair and print the verdict as JSON
    Evaluate {
        substrate_name: String,
        product_name: String,

        #[command(flatten)]
        services: ServiceArgs,
    },

    /// Answer a natural-language question with a tool-calling model
    Ask {
        query: String,

        /// Server to spawn; defaults to this executable
        #[arg(long, env = "RXN_SERVER_COMMAND")]
        server: Option<PathBuf>,

        #[command(flatten)]
        llm: LlmArgs,

        #[command(flatten)]
        services: ServiceArgs,
    },
}

/// Lookup services and the chemistry bridge.
#[derive(Args, Clone)]
struct ServiceArgs {
    #[arg(long, env = "RXN_PUBCHEM_URL", default_value = rxn_resolve::config::PUBCHEM_BASE_URL)]
    pubchem_url: String,

    #[arg(long, env = "RXN_CACTUS_URL", default_value = rxn_resolve::config::CACTUS_BASE_URL)]
    cactus_url: String,

    #[arg(long, env = "RXN_CHEMSPIDER_URL", default_value = rxn_resolve::config::CHEMSPIDER_BASE_URL)]
    chemspider_url: String,

    /// ChemSpider is skipped without a key. Prefer the environment
    /// variable: `ask` never forwards the key on a command line.
    #[arg(long, env = "CHEMSPIDER_API_KEY", hide_env_values = true)]
    chemspider_api_key: Option<String>,

    #[arg(long, env = "RXN_LOOKUP_TIMEOUT_SECS", default_value_t = 10)]
    lookup_timeout_secs: u64,

    #[arg(long, env = "RXN_SETTLE_DELAY_MS", default_value_t = 1000)]
    settle_delay_ms: u64,

    /// Python interpreter with the evodex package installed
    #[arg(long, env = "RXN_PYTHON")]
    python: Option<PathBuf>,

    #[arg(long, env = "RXN_BRIDGE_TIMEOUT_SECS", default_value_t = 120)]
    bridge_timeout_secs: u64,
}

impl ServiceArgs {
    fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            pubchem_url: self.pubchem_url.clone(),
            cactus_url: self.cactus_url.clone(),
            chemspider_url: self.chemspider_url.clone(),
            chemspider_api_key: self
                .chemspider_api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(self.lookup_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            interpreter: self.python.clone(),
            timeout: Duration::from_secs(self.bridge_timeout_secs),
        }
    }

    fn evaluator(&self) -> Result<Evaluator, Box<dyn std::error::Error>> {
        let resolver = ResolverChain::from_config(&self.resolver_config())?;
        let engine = EvodexBridge::new(&self.bridge_config())?;
        Ok(Evaluator::new(resolver, Arc::new(engine)))
    }

    /// Arguments for a spawned `serve`; the API key travels via the environment.
    fn forward(&self) -> Vec<String> {
        let mut args = vec![
            "--pubchem-url".to_string(),
            self.pubchem_url.clone(),
            "--cactus-url".into(),
            self.cactus_url.clone(),
            "--chemspider-url".into(),
            self.chemspider_url.clone(),
            "--lookup-timeout-secs".into(),
            self.lookup_timeout_secs.to_string(),
            "--settle-delay-ms".into(),
            self.settle_delay_ms.to_string(),
            "--bridge-timeout-secs".into(),
            self.bridge_timeout_secs.to_string(),
        ];
        if let Some(python) = &self.python {
            args.push("--python".into());
            args.push(python.to_string_lossy().into_owned());
        }
        args
    }
}

/// Command line for the `serve` child of `ask`.
fn serve_args(log_level: &str, services: &ServiceArgs) -> Vec<String> {
    let mut args = vec![
        "serve".to_string(),
        "--log-level".into(),
        log_level.to_string(),
    ];
    args.extend(services.forward());
    args
}

#[derive(Args)]
struct LlmArgs {
    /// OpenAI-compatible endpoint (DashScope compatible mode by default)
    #[arg(long, env = "RXN_LLM_URL", default_value = rxn_agent::chat::DEFAULT_BASE_URL)]
    llm_url: String,

    #[arg(long, env = "RXN_LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    #[arg(long, env = "RXN_LLM_MODEL", default_value = rxn_agent::chat::DEFAULT_MODEL)]
    llm_model: String,

    #[arg(long, env = "RXN_MAX_ITERATIONS", default_value_t = 5)]
    max_iterations: usize,

    #[arg(long, env = "RXN_LLM_TIMEOUT_SECS", default_value_t = 120)]
    llm_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // All logging goes to stderr so stdout is reserved for MCP JSON-RPC.
    let level = &cli.log_level;
    let filter = format!(
        "rxn_tools={level},rxn_eval={level},rxn_resolve={level},rxn_agent={level}"
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let log_level = cli.log_level.clone();
    match cli.command {
        Commands::Serve { services } => {
            let evaluator = Arc::new(services.evaluator()?);
            tracing::info!(
                "Starting rxn-tools MCP server on the {} engine",
                evaluator.engine_name()
            );
            server::run(tools::ToolRegistry::new(evaluator)).await?;
        }

        Commands::Evaluate {
            substrate_name,
            product_name,
            services,
        } => {
            let evaluator = services.evaluator()?;
            let verdict = evaluator.evaluate(&substrate_name, &product_name).await?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }

        Commands::Ask {
            query,
            server,
            llm,
            services,
        } => {
            let program = match server {
                Some(path) => path,
                None => std::env::current_exe()?,
            };
            let args = serve_args(&log_level, &services);

            let session = Arc::new(McpSession::spawn(&program.to_string_lossy(), &args).await?);
            let model = OpenAiCompatibleClient::new(ChatConfig {
                base_url: llm.llm_url,
                api_key: llm.llm_api_key.filter(|k| !k.trim().is_empty()),
                model: llm.llm_model,
                timeout: Duration::from_secs(llm.llm_timeout_secs),
                ..ChatConfig::default()
            })?;
            let agent = Agent::initialize(
                Arc::new(model),
                session.clone(),
                AgentConfig {
                    max_iterations: llm.max_iterations,
                    ..AgentConfig::default()
                },
            )
            .await?;

            let outcome = agent.run(&query).await;
            session.close().await?;
            println!("{}", outcome?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rxn-tools").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_ask_forwards_log_level_and_services() {
        let cli = parse(&[
            "--log-level",
            "debug",
            "ask",
            "Can propanol become propanal?",
            "--pubchem-url",
            "http://localhost:9000",
            "--python",
            "/opt/evodex/bin/python",
            "--chemspider-api-key",
            "secret",
        ]);
        let Commands::Ask { services, .. } = &cli.command else {
            panic!("expected ask");
        };

        let args = serve_args(&cli.log_level, services);
        assert_eq!(args[..3], ["serve", "--log-level", "debug"]);
        assert!(args.windows(2).any(|w| w == ["--pubchem-url", "http://localhost:9000"]));
        assert!(args.windows(2).any(|w| w == ["--python", "/opt/evodex/bin/python"]));
        assert!(!args.iter().any(|a| a.contains("secret")));

        // The forwarded command line must parse as a `serve` invocation.
        let child = Cli::try_parse_from(std::iter::once("rxn-tools".to_string()).chain(args))
            .unwrap();
        assert_eq!(child.log_level, "debug");
        assert!(matches!(child.command, Commands::Serve { .. }));
    }

    #[test]
    fn test_log_level_after_subcommand() {
        let cli = parse(&["ask", "q", "--log-level", "trace"]);
        assert_eq!(cli.log_level, "trace");
    }
}
