use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator::LlmClient;
use server::config::{StudioConfig, DEFAULT_PORT};
use server::{create_router, state::AppState};

#[derive(Parser)]
#[command(name = "interview-studio")]
#[command(about = "Multi-agent technical interview orchestration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Base URL of an OpenAI-compatible provider
        #[arg(long)]
        llm_url: Option<String>,

        /// Model to request from the provider
        #[arg(long)]
        llm_model: Option<String>,
    },
    /// Check a running server
    Status {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Send a one-off prompt to the configured provider and stream the reply
    Ask { prompt: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        None => serve(cli.port, None, None).await,
        Some(Commands::Serve {
            port,
            llm_url,
            llm_model,
        }) => serve(port.or(cli.port), llm_url, llm_model).await,
        Some(Commands::Status { port }) => status(port).await,
        Some(Commands::Ask { prompt }) => ask(&prompt).await,
    }
}

async fn load_config() -> Result<StudioConfig> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    Ok(StudioConfig::read(&cwd).await.apply_env())
}

async fn serve(
    port: Option<u16>,
    llm_url: Option<String>,
    llm_model: Option<String>,
) -> Result<()> {
    let mut config = load_config().await?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(llm_url) = llm_url {
        config.llm.base_url = llm_url;
    }
    if let Some(llm_model) = llm_model {
        config.llm.model = llm_model;
    }

    let port = config.server.port;
    tracing::info!(
        model = %config.llm.model,
        provider = %config.llm.base_url,
        "Starting Interview Studio"
    );

    let state = AppState::new(&config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    println!("Interview Studio listening on http://localhost:{port}");
    println!("API docs at http://localhost:{port}/swagger-ui");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn status(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/health");
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("no server reachable at {url}"))?;

    let body: serde_json::Value = response.json().await?;
    println!(
        "status: {} | version: {} | model: {} | active sessions: {}",
        body["status"].as_str().unwrap_or("unknown"),
        body["version"].as_str().unwrap_or("unknown"),
        body["model"].as_str().unwrap_or("unknown"),
        body["active_sessions"]
    );
    Ok(())
}

async fn ask(prompt: &str) -> Result<()> {
    let config = load_config().await?;
    let client = LlmClient::new(config.llm);

    let stream = client
        .chat_stream(None, prompt)
        .await
        .context("provider request failed")?;
    let mut stream = Box::pin(stream);

    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        write!(stdout, "{}", chunk?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}
