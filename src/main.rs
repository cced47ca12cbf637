use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use station_balancer::config::{BalanceConfig, DEFAULT_MAX_ITERATIONS};
use station_balancer::{BalanceResult, Balancer, EventConfiguration, Minutes};

#[derive(Parser, Debug)]
#[command(name = "station-balancer")]
#[command(version)]
#[command(about = "Balance test durations across research session stations")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print suggested test relocations for an event
    Plan {
        #[command(flatten)]
        balance: BalanceArgs,

        /// Output format
        #[arg(long, short = 'o', default_value = "table")]
        output: OutputFormat,
    },

    /// Apply the suggested relocations and write the event back out
    Apply {
        #[command(flatten)]
        balance: BalanceArgs,

        /// Where to write the updated event (defaults to the input file)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// Balance Arguments (shared by plan and apply)
// =============================================================================

#[derive(Parser, Debug)]
struct BalanceArgs {
    /// Event configuration JSON file
    #[arg(long, short = 'e')]
    event: PathBuf,

    /// Maximum minutes per station. Overrides the event's own max_time.
    #[arg(long, conflicts_with = "no_cap")]
    max_time: Option<Minutes>,

    /// Balance without any per-station cap
    #[arg(long)]
    no_cap: bool,

    /// Maximum number of relocations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn run_balancer(
    args: &BalanceArgs,
) -> Result<(EventConfiguration, BalanceConfig, BalanceResult), Box<dyn std::error::Error>> {
    let event = EventConfiguration::load(&args.event)?;
    event.validate()?;

    let config =
        BalanceConfig::for_event(&event, args.max_time, args.no_cap, args.max_iterations);
    config.validate()?;

    tracing::info!(
        event = %event.event_name,
        stations = event.stations.len(),
        tests = event.tests.len(),
        max_time = ?config.max_time,
        max_iterations = config.max_iterations,
        "Balancing event"
    );

    let result = Balancer::new(config.clone()).run(&event.stations, &event.tests);
    Ok((event, config, result))
}

fn station_name<'a>(event: &'a EventConfiguration, station_id: &'a str) -> &'a str {
    event
        .stations
        .iter()
        .find(|s| s.id == station_id && !s.name.is_empty())
        .map(|s| s.name.as_str())
        .unwrap_or(station_id)
}

fn print_table(event: &EventConfiguration, config: &BalanceConfig, result: &BalanceResult) {
    println!("Event: {}", event.event_name);
    match config.max_time {
        Some(cap) => println!("Max time: {} min", cap),
        None => println!("Max time: none"),
    }
    println!("{}", "=".repeat(60));
    println!(
        "Busiest station:  {} min -> {} min",
        result.original_max_time, result.adjusted_max_time
    );
    println!(
        "Spread:           {} min -> {} min",
        result.original_spread(),
        result.adjusted_spread()
    );
    if let Some(cap) = config.max_time {
        if result.exceeds_max_time(cap) {
            println!(
                "Warning: busiest station is still {} min over max time",
                result.adjusted_max_time.saturating_sub(cap)
            );
        }
    }
    println!();

    if result.suggestions.is_empty() {
        println!("No relocations suggested.");
    } else {
        println!("{:<4} {:<24} {:<20} {:<20}", "#", "TEST", "FROM", "TO");
        println!("{}", "-".repeat(70));
        for (i, s) in result.suggestions.iter().enumerate() {
            println!(
                "{:<4} {:<24} {:<20} {:<20}",
                i + 1,
                s.test_name,
                format!(
                    "{} ({}->{})",
                    station_name(event, &s.source_station_id),
                    s.source_before,
                    s.source_after
                ),
                format!(
                    "{} ({}->{})",
                    station_name(event, &s.destination_station_id),
                    s.dest_before,
                    s.dest_after
                ),
            );
        }
    }
    println!();

    println!("{:<24} {:>8} {:>8}", "STATION", "BEFORE", "AFTER");
    println!("{}", "-".repeat(42));
    for (id, times) in result.station_times.iter() {
        let marker = match config.max_time {
            Some(cap) if times.after > cap => " [over]",
            _ => "",
        };
        println!(
            "{:<24} {:>8} {:>8}{}",
            station_name(event, id),
            times.before,
            times.after,
            marker
        );
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Plan { balance, output } => {
            let (event, config, result) = run_balancer(&balance)?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Table => print_table(&event, &config, &result),
            }
        }
        Commands::Apply { balance, output } => {
            let (mut event, _, result) = run_balancer(&balance)?;
            let changed = event.apply_assignments(&result.suggested_assignments);
            let path = output.unwrap_or(balance.event);
            event.save(&path)?;
            println!(
                "Applied {} relocation(s) across {} station(s), wrote {}",
                result.suggestions.len(),
                changed,
                path.display()
            );
        }
    }

    Ok(())
}
