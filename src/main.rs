use std::path::PathBuf;
use std::sync::Arc;

use air_planner::{
    AppState, GeminiClient, ModelCandidates, PlannerConfig, TripPlanner, VERSION, telemetry, web,
};
use anyhow::Result;
use clap::Parser;

/// A.I.R - AI trip planning service with sequential model fallback
#[derive(Parser, Debug)]
#[command(name = "air-planner", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "AIR_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration, print a summary and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn apply(&self, config: &mut PlannerConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

fn print_summary(config: &PlannerConfig, source: &str) {
    println!("air-planner {VERSION}");
    println!("Using config from: {source}");
    println!("Listen address: {}:{}", config.server.host, config.server.port);
    println!("TLS: {}", if config.server.tls.is_some() { "enabled" } else { "disabled" });
    println!("Models (in priority order): {}", config.gemini.models.join(" -> "));
    println!("Currency: {}", config.planner.currency);
    println!("Response check: {:?}", config.planner.response_check);
    println!("Log level: {}", config.logging.level);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = PlannerConfig::load_from_path(cli.config.clone())?;
    cli.apply(&mut config);
    config.validate()?;

    if cli.check {
        let source = cli
            .config
            .as_ref()
            .map_or_else(|| "defaults and environment".to_string(), |p| p.display().to_string());
        print_summary(&config, &source);
        return Ok(());
    }

    let _telemetry = telemetry::init(&config.logging)?;

    let client = GeminiClient::new(&config.gemini)?;
    let candidates = ModelCandidates::new(config.gemini.models.clone())?;
    let planner = TripPlanner::new(Arc::new(client), candidates)
        .with_currency(config.planner.currency.clone())
        .with_response_check(config.planner.response_check);

    tracing::info!(
        models = ?planner.candidates(),
        currency = planner.currency(),
        "Starting air-planner {}",
        VERSION
    );

    web::run(&config.server, AppState::new(planner)).await
}
