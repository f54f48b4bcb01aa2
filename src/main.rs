use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tripagent::api::AppState;
use tripagent::config::LoggingConfig;
use tripagent::models::BUDGET_LEVELS;
use tripagent::{Planner, TripAgentConfig, TripRequest, planner_for, web};

/// Travel Itinerary Planner Agent
#[derive(Parser, Debug)]
#[command(name = "tripagent", version, about)]
struct Cli {
    /// Destination city/country
    #[arg(long)]
    destination: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Comma-separated list of interests
    #[arg(long)]
    interests: Option<String>,

    /// Budget level (budget, moderate, luxury)
    #[arg(long)]
    budget: Option<String>,

    /// Serve the web form instead of planning from the command line
    #[arg(long)]
    serve: bool,

    /// Port for the web form (overrides the configured port)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = TripAgentConfig::load()?;
    init_tracing(&config.logging);

    let planner: Arc<dyn Planner> = Arc::from(planner_for(&config)?);

    if cli.serve {
        let port = cli.port.unwrap_or(config.server.port);
        web::run(port, AppState { planner }).await?;
        return Ok(());
    }

    let request = build_request(&cli)?;

    println!("\nGenerating itinerary... This may take a moment.");
    match planner.plan(&request).await {
        Ok(itinerary) => {
            println!("\n{}", itinerary.format_text());
        }
        Err(e) => {
            tracing::error!(error = %e, "planning failed");
            eprintln!("\nError generating itinerary: {}", e.user_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build the trip request from flags, prompting interactively for any
/// missing field
fn build_request(cli: &Cli) -> Result<TripRequest> {
    let interactive = cli.destination.is_none()
        || cli.start_date.is_none()
        || cli.end_date.is_none()
        || cli.interests.is_none()
        || cli.budget.is_none();

    if interactive {
        println!("--- Travel Itinerary Planner ---");
    }

    let destination = field(&cli.destination, "Enter destination: ")?;
    let start_date = field(&cli.start_date, "Enter start date (YYYY-MM-DD): ")?;
    let end_date = field(&cli.end_date, "Enter end date (YYYY-MM-DD): ")?;
    let interests_input = field(&cli.interests, "Enter interests (comma-separated): ")?;
    let budget = field(
        &cli.budget,
        &format!("Enter budget ({}): ", BUDGET_LEVELS.join(", ")),
    )?;

    let interests: Vec<String> = interests_input
        .split(',')
        .map(|interest| interest.trim().to_string())
        .filter(|interest| !interest.is_empty())
        .collect();

    Ok(TripRequest::new(
        destination,
        start_date,
        end_date,
        interests,
        budget,
    )?)
}

fn field(flag: &Option<String>, prompt_label: &str) -> io::Result<String> {
    match flag {
        Some(value) => Ok(value.clone()),
        None => prompt(prompt_label),
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
