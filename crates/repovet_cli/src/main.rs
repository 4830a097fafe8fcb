use clap::Parser;
use repovet_core::config::RepovetConfig;
use repovet_core::tools::ToolProvider;
use repovet_mcp::{CapabilityRegistry, McpProvider};
use repovet_pipeline::{
    AnthropicClient, CancelHandle, LlmClient, MockClient, Orchestrator, ToolInvocationNode,
    REQUIRED_TOOLS,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "repovet", version, about = "Audit a repository with LLM-orchestrated scanners")]
struct Args {
    /// Repository URL to audit
    repo_url: String,

    /// Path to the TOML config file
    #[arg(short, long, default_value = "repovet.toml")]
    config: String,

    /// Override the configured iteration cap
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Use the scripted mock reasoning engine (no API key needed)
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = RepovetConfig::load_or_default(&args.config);
    if let Some(n) = args.max_iterations {
        config.audit.max_iterations = n;
    }

    // Connect providers and build the merged registry. Discovery failures
    // abort before any reasoning call.
    let mut connections: Vec<Arc<McpProvider>> = Vec::new();
    for provider_config in &config.providers {
        info!("Connecting provider '{}'...", provider_config.name);
        match McpProvider::connect(provider_config).await {
            Ok(provider) => connections.push(Arc::new(provider)),
            Err(e) => {
                println!("Error: provider '{}' failed to connect: {e}", provider_config.name);
                return Ok(());
            }
        }
    }
    let providers: Vec<Arc<dyn ToolProvider>> = connections
        .iter()
        .map(|p| p.clone() as Arc<dyn ToolProvider>)
        .collect();

    let registry =
        match CapabilityRegistry::discover(providers, REQUIRED_TOOLS, config.audit.max_providers)
            .await
        {
            Ok(registry) => Arc::new(registry),
            Err(e) => {
                println!("{}", e.to_summary());
                disconnect_all(&connections).await;
                return Ok(());
            }
        };
    info!("Tools available: {}", registry.tool_names().join(", "));

    let llm: Arc<dyn LlmClient> = if args.mock {
        Arc::new(MockClient::default())
    } else {
        match AnthropicClient::new(&config.llm) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                println!("{}", e.to_summary());
                disconnect_all(&connections).await;
                return Ok(());
            }
        }
    };

    let cancel = CancelHandle::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    let invoker = ToolInvocationNode::new(registry, &config.audit);
    let orchestrator = Orchestrator::new(llm, invoker, config.audit.max_iterations, cancel);
    let summary = orchestrator.run_to_summary(&args.repo_url).await;

    println!("{summary}");

    disconnect_all(&connections).await;
    Ok(())
}

async fn disconnect_all(connections: &[Arc<McpProvider>]) {
    for provider in connections {
        provider.disconnect().await;
    }
}
