use argus::adapters::health_handler::HealthHandler;
use argus::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use argus::adapters::query_handler::ApiState;
use argus::adapters::tavily::TavilyClient;
use argus::assistant::client::{AssistantPort, OpenAiAssistantClient};
use argus::assistant::orchestrator::{self, RunOrchestrator};
use argus::assistant::tools::{ToolRegistry, WebSearchTool};
use argus::cli::Cli;
use argus::config::Settings;
use argus::domain::SearchPort;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Argus gateway on {}:{}", host, port);

    // Construct outbound clients
    let assistant_client: Arc<dyn AssistantPort> =
        Arc::new(OpenAiAssistantClient::new(&settings.assistant)?);
    let search_client: Arc<dyn SearchPort> = Arc::new(TavilyClient::new(&settings.search)?);

    // Register tools
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(WebSearchTool::new(search_client)));

    // Register the fixed assistant definition upstream
    let assistant_id =
        orchestrator::register_assistant(assistant_client.as_ref(), &settings.assistant, &tools)
            .await?;
    info!(%assistant_id, model = %settings.assistant.model, "assistant registered");

    let run_orchestrator = Arc::new(RunOrchestrator::new(
        assistant_client,
        tools,
        assistant_id.clone(),
        settings.assistant.poll.clone(),
    ));

    // Initialize handlers
    let collector = Arc::new(MetricsCollector::new()?);
    let health_handler = Arc::new(HealthHandler::new(Some(assistant_id)));
    let metrics_handler = Arc::new(MetricsHandler::new(collector.clone()));

    let api_state = ApiState {
        orchestrator: run_orchestrator,
        metrics: collector,
    };

    // Create application using the library function
    let app = argus::create_app(api_state, health_handler, metrics_handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
