use chrono::Local;
use clap::Parser;
use fin_core::config::{
    EnrichmentConfig, FeedConfig, ScheduleConfig, ServerConfig, DEFAULT_FEED_URL, DEFAULT_PORT,
};
use fin_core::{ArticleSource, EnrichmentModel, Error, Result};
use fin_feed::EventRegistrySource;
use fin_inference::ModelKind;
use fin_pipeline::{DailyTrigger, PipelineRunner, Scheduler};
use fin_web::{create_app, AppState};
use std::sync::Arc;
use tracing::{error, info};

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetches financial news and enriches it with summaries and sentiment", long_about = None)]
pub struct Cli {
    /// Base URL of the summarization / sentiment service
    #[arg(long, env = "ENRICHMENT_API_URL")]
    enrichment_url: Option<String>,
    /// API key for the article feed
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    news_api_key: Option<String>,
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,
    #[arg(long, default_value = "remote", help = "Model to use for enrichment. Available models: remote (default), local")]
    model: ModelKind,
    /// Timeout applied to every outbound call (e.g. 30s, 1m)
    #[arg(long, default_value = "30s")]
    request_timeout: HumanDuration,
    /// Local time of the daily cycle, HH:MM
    #[arg(long, default_value = "00:00", value_parser = parse_schedule)]
    schedule_at: ScheduleConfig,
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
enum Commands {
    /// Run the scheduler and serve the manual trigger endpoints (default)
    Serve,
    /// Run a single ingestion cycle and print the outcome
    Run,
    /// Summarize a piece of text
    Summarize { text: String },
    /// Classify the sentiment of a piece of text
    Sentiment { text: String },
    /// Print when the next scheduled cycle fires
    NextRun,
}

fn parse_schedule(value: &str) -> std::result::Result<ScheduleConfig, String> {
    ScheduleConfig::parse(value).map_err(|e| e.to_string())
}

impl Cli {
    fn create_model(&self) -> Result<Arc<dyn EnrichmentModel>> {
        let enrichment = self
            .enrichment_url
            .as_deref()
            .map(|url| EnrichmentConfig::new(url).map(|c| c.with_timeout(self.request_timeout.0)))
            .transpose()?;
        fin_inference::create_model(fin_inference::Config {
            kind: self.model,
            enrichment,
        })
    }

    fn create_source(&self) -> Result<Arc<dyn ArticleSource>> {
        let api_key = self
            .news_api_key
            .clone()
            .ok_or_else(|| Error::Config("NEWS_API_KEY is required to fetch articles".to_string()))?;
        let config = FeedConfig::new(&self.feed_url, api_key)?.with_timeout(self.request_timeout.0);
        Ok(Arc::new(EventRegistrySource::new(config)?))
    }

    fn create_runner(&self, enricher: Arc<dyn EnrichmentModel>) -> Result<Arc<PipelineRunner>> {
        Ok(Arc::new(PipelineRunner::new(self.create_source()?, enricher)))
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn serve(cli: &Cli) -> Result<()> {
    let enricher = cli.create_model()?;
    info!("🧠 Enrichment model initialized (using {})", enricher.name());

    let runner = cli.create_runner(enricher.clone())?;
    let scheduler = Arc::new(Scheduler::new(runner, DailyTrigger::from(cli.schedule_at)));
    scheduler.start();
    info!("⏰ Next scheduled cycle at {}", scheduler.next_run());

    let app = create_app(AppState::new(enricher).with_scheduler(scheduler.clone()));
    let address = cli.server_config().address();
    let listener = tokio::net::TcpListener::bind(address.as_str()).await?;
    info!("🌐 Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    fin_core::logging::init_logging(cli.log_json);

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => serve(&cli).await?,
        Commands::Run => {
            let runner = cli.create_runner(cli.create_model()?)?;
            let outcome = runner.run_cycle().await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Summarize { text } => {
            let summary = cli.create_model()?.summarize(text).await?;
            println!("{}", summary);
        }
        Commands::Sentiment { text } => {
            let scores = cli.create_model()?.analyze_sentiment(text).await?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Commands::NextRun => {
            let next = DailyTrigger::from(cli.schedule_at).next_after(&Local::now());
            println!("{}", next.to_rfc3339());
        }
    }

    Ok(())
}
