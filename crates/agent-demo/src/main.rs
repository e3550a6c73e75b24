use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_sdk::{Agent, PlatformClient, server};

mod agent;

use agent::DemoAgent;

#[derive(Parser, Debug)]
#[command(name = "agent-demo")]
#[command(about = "Demo agent that simulates a streaming LLM response")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "AGENT_DEMO_PORT", default_value = "8000")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "AGENT_DEMO_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Orchestrator URL to register with on startup (optional)
    #[arg(long, env = "AGENT_DEMO_PLATFORM_URL")]
    platform_url: Option<String>,

    /// Externally reachable endpoint advertised at registration
    #[arg(long, env = "AGENT_DEMO_ENDPOINT")]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "AGENT_DEMO_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "agent_demo=debug,agent_sdk=debug,tower_http=debug"
    } else {
        "agent_demo=info,agent_sdk=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let agent = Arc::new(DemoAgent::new());
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    if let Some(platform_url) = &cli.platform_url {
        register(&agent, platform_url, cli.endpoint.as_deref(), addr.port()).await;
    }

    server::serve(agent, addr).await
}

/// Best-effort registration with the orchestrator; the agent serves
/// either way, so a failure is only logged.
async fn register(agent: &Arc<DemoAgent>, platform_url: &str, endpoint: Option<&str>, port: u16) {
    let mut info = agent.info();
    info.endpoint = endpoint
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("http://localhost:{}", port));

    let result = match PlatformClient::new(platform_url, "startup") {
        Ok(client) => client.register_agent(&info).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(_) => info!("registered with platform at {}", platform_url),
        Err(err) => warn!(
            "failed to register with platform at {}: {} ({})",
            platform_url,
            err,
            err.code()
        ),
    }
}
