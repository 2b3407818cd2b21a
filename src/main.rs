//! Energylog CLI
//!
//! Command-line interface over a JSON export of journal entries:
//! - Trend insights for a period
//! - Ranked energy and stress sources
//! - Fast or deep pattern discovery with live progress
//! - Default config generation

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use energylog::{
    generate_default_config, logging, AnalyticsEngine, Config, DailyEntry, Metric, PatternMode,
    PatternResult, RunOutcome, SourcePhrase, TrendsReport,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "energylog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Energy & stress journal analytics")]
#[command(long_about = "Energylog analyzes a journal of daily energy and stress entries.\nSee how they relate, what drives them, and which themes keep coming back.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show trends and insights
    Insights {
        /// JSON file with an array of daily entries
        entries: PathBuf,
        /// Requested period in days
        #[arg(short, long, default_value = "30")]
        period: u32,
    },

    /// Rank energy and stress sources
    Sources {
        /// JSON file with an array of daily entries
        entries: PathBuf,
    },

    /// Discover patterns in energy and stress sources
    Patterns {
        /// JSON file with an array of daily entries
        entries: PathBuf,
        /// Analysis mode (fast, deep)
        #[arg(short, long, default_value = "fast")]
        mode: PatternMode,
        /// Print progress to stderr
        #[arg(long)]
        progress: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    // A second init (e.g. under a test harness) is harmless
    let _ = logging::init_logging(&config.logging);

    let json = match cli.format.as_str() {
        "json" => true,
        "table" => false,
        other => bail!("Unknown output format: {} (expected table or json)", other),
    };

    match cli.command {
        Commands::Insights { entries, period } => {
            let entries = read_entries(&entries)?;
            let engine = AnalyticsEngine::new(&config);
            let report = engine.get_trends_and_insights(&entries, period);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Sources { entries } => {
            let entries = read_entries(&entries)?;
            let sources = energylog::extract_sources(&entries);

            if json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                print_sources("Energy sources", &sources.energy_sources);
                println!();
                print_sources("Stress sources", &sources.stress_sources);
            }
        }

        Commands::Patterns {
            entries,
            mode,
            progress,
        } => {
            let entries = read_entries(&entries)?;
            let engine = AnalyticsEngine::new(&config);

            if progress {
                let mut events = engine.subscribe();
                tokio::spawn(async move {
                    while let Ok(event) = events.recv().await {
                        eprintln!(
                            "[{:>5.1}%] {:<16} ~{}ms left",
                            event.percentage, event.stage, event.estimated_time_remaining_ms
                        );
                    }
                });
            }

            let aborter = engine.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    aborter.abort_analysis();
                }
            });

            let outcome = match mode {
                PatternMode::Fast => engine.run_fast_analysis(&entries).await,
                PatternMode::Deep => engine.run_deep_analysis(&entries).await,
            };

            match outcome {
                RunOutcome::Completed => {}
                RunOutcome::Aborted => {
                    eprintln!("Analysis aborted");
                    std::process::exit(130);
                }
                RunOutcome::Failed(message) => bail!(message),
                RunOutcome::Rejected => bail!("An analysis is already running"),
            }

            let state = engine.state().await;
            if let Some(error) = &state.error {
                eprintln!("Warning: {}", error);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&state.patterns)?);
            } else {
                for &metric in Metric::all() {
                    if let Some(result) = state.patterns.get(metric) {
                        print_patterns(result);
                        println!();
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn read_entries(path: &Path) -> anyhow::Result<Vec<DailyEntry>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let entries: Vec<DailyEntry> = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not a JSON array of entries", path))?;
    tracing::debug!(entries = entries.len(), "Loaded entries from {:?}", path);
    Ok(entries)
}

fn format_avg(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_report(report: &TrendsReport) {
    let summary = &report.summary;
    println!("Days tracked: {}", summary.days_tracked);
    println!("Average energy: {}", format_avg(summary.average_energy));
    println!("Average stress: {}", format_avg(summary.average_stress));
    if let Some(day) = &summary.peak_energy_day {
        println!("Highest energy: {}", day);
    }
    if let Some(day) = &summary.peak_stress_day {
        println!("Highest stress: {}", day);
    }

    if !report.trend_data.is_empty() {
        println!();
        println!("{:<12} {:>8} {:>8}", "Date", "Energy", "Stress");
        println!("{}", "-".repeat(30));
        for day in &report.trend_data {
            println!(
                "{:<12} {:>8} {:>8}",
                day.date,
                format_avg(day.energy_avg),
                format_avg(day.stress_avg)
            );
        }
    }

    for insight in report.insights.values() {
        println!();
        println!(
            "{} - {} ({:.0}% confidence)",
            insight.title,
            insight.subtitle,
            insight.confidence * 100.0
        );
        println!("  {}", insight.description);
        for datum in &insight.data {
            println!("  {}: {}", datum.label, datum.value);
        }
        for action in &insight.action_items {
            println!("  * {}", action);
        }
    }
}

fn print_sources(title: &str, phrases: &[SourcePhrase]) {
    println!("{}", title);
    if phrases.is_empty() {
        println!("  (none recorded)");
        return;
    }
    println!("{:<30} {:>6} {:>10}", "Source", "Days", "Frequency");
    println!("{}", "-".repeat(48));
    for phrase in phrases {
        println!(
            "{:<30} {:>6} {:>9.0}%",
            phrase.text,
            phrase.count,
            phrase.frequency * 100.0
        );
    }
}

fn print_patterns(result: &PatternResult) {
    println!(
        "{} patterns ({} mode, {}): {} mentions",
        result.metric, result.mode, result.discovery_method, result.total_mentions
    );
    if let Some(reason) = &result.failure {
        println!("  failed: {}", reason);
        return;
    }
    if result.main_patterns.is_empty() {
        println!("  (no patterns)");
        return;
    }
    for main in &result.main_patterns {
        println!("  {} ({})", main.label, main.total_count);
        for sub in &main.sub_patterns {
            println!("    - {} ({})", sub.label, sub.count);
        }
    }
}
